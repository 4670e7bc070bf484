pub mod pin_admin_handlers;

pub use pin_admin_handlers::{generate_pins, list_pin_users, pin_report};
