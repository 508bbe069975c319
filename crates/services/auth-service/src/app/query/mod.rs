mod get_user;
mod login_user;
mod types;

pub use get_user::{GetUser, GetUserHandler};
pub use login_user::{LoginUser, LoginUserHandler};
pub use types::UserView;
