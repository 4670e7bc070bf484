pub mod middleware;

pub use middleware::{
    CurrentPrincipal, admin_middleware, identity_middleware,
};
