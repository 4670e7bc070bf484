pub mod auth;
pub mod pins;
pub mod repositories;
pub mod subscription;
pub mod users;
