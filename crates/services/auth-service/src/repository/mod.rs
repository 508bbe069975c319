//! Storage adapters for [`domain::UsersRepository`].

pub mod entities;
mod memory;
mod pg_users_repository;

pub use memory::InMemoryUsersRepository;
pub use pg_users_repository::PgUsersRepository;
