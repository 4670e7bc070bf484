pub mod authorization;
pub mod pin_code;
pub mod session_token;

pub use authorization::{
    AuthorizationHeaderError, AuthorizationScheme, MediaBrowserAuthorization,
    parse_authorization, parse_media_browser_params,
};
pub use pin_code::{PinCode, PinCodeError};
pub use session_token::{SessionToken, SessionTokenError};
