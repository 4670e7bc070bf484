pub mod auth;
pub mod pin_handlers;

pub use pin_handlers::{authenticate_with_pin, current_user};
