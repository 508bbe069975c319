//! Application layer: commands, queries and their wiring.

pub mod command;
pub mod query;

use std::sync::Arc;

use chrono::Duration;

use common::{AppError, AppResult};
use domain::{CredentialHasher, UsersRepository, DEFAULT_JWT_EXPIRATION_HOURS};

use crate::decorator::{apply_decorators, CommandHandler, MetricsClient, NoopMetrics, QueryHandler};
use crate::repository::InMemoryUsersRepository;
use crate::token::{AccessToken, TokenIssuer};

use self::command::{RegisterUser, RegisterUserHandler};
use self::query::{GetUser, GetUserHandler, LoginUser, LoginUserHandler, UserView};

/// Every handler the service exposes, already decorated.
#[derive(Clone)]
pub struct Application {
    pub commands: Commands,
    pub queries: Queries,
}

#[derive(Clone)]
pub struct Commands {
    pub register_user: CommandHandler<RegisterUser>,
}

#[derive(Clone)]
pub struct Queries {
    pub login_user: QueryHandler<LoginUser, AccessToken>,
    pub get_user: QueryHandler<GetUser, UserView>,
}

/// Wire the handlers over the given collaborators.
pub fn new_application(
    users: Arc<dyn UsersRepository>,
    hasher: CredentialHasher,
    issuer: Arc<TokenIssuer>,
    metrics: Arc<dyn MetricsClient>,
    token_ttl: Duration,
) -> Application {
    Application {
        commands: Commands {
            register_user: apply_decorators(
                RegisterUserHandler::new(users.clone(), hasher.clone()),
                metrics.clone(),
            ),
        },
        queries: Queries {
            login_user: apply_decorators(
                LoginUserHandler::new(users.clone(), hasher, issuer, token_ttl),
                metrics.clone(),
            ),
            get_user: apply_decorators(GetUserHandler::new(users), metrics),
        },
    }
}

/// Application over a fresh in-memory repository with metrics disabled.
pub fn new_component_test_application(
    hasher: CredentialHasher,
    issuer: Arc<TokenIssuer>,
) -> Application {
    new_application(
        Arc::new(InMemoryUsersRepository::new()),
        hasher,
        issuer,
        Arc::new(NoopMetrics),
        Duration::hours(DEFAULT_JWT_EXPIRATION_HOURS),
    )
}

/// Run CPU-bound hashing off the async workers.
pub(crate) async fn run_blocking<T, F>(work: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::internal(format!("blocking task failed: {}", e)))?
}
