//! Identity resolution: PIN mode, token mode and the credentials behind them.

pub mod access_tokens;
pub mod crypto;
pub mod identity;
pub mod request;
pub mod resolver;
pub mod token_authenticator;
pub mod value_objects;

pub use access_tokens::{AccessTokenError, AccessTokenService, IssuedToken};
pub use crypto::{AuthCrypto, AuthCryptoError};
pub use identity::{
    AuthFailure, DeviceClaims, INVALID_PIN_MESSAGE, IdentityResult, Principal,
};
pub use request::AuthRequest;
pub use resolver::{
    AuthMode, AuthenticationResolver, PinAuthSettings, path_starts_with_segments,
};
pub use token_authenticator::{
    AuthenticatorError, AuthorizationInfo, StoredTokenAuthenticator,
    TokenAuthenticator,
};
