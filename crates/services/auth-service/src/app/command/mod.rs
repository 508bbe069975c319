mod register_user;

pub use register_user::{RegisterUser, RegisterUserHandler};
