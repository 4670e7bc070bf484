macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions shared by the server and its clients.
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";

    pub mod users {
        pub const AUTHENTICATE_WITH_PIN: &str =
            v1_path!("/users/authenticate-with-pin");
        pub const CURRENT: &str = v1_path!("/users/me");
    }

    pub mod admin {
        pub mod pins {
            pub const GENERATE: &str = v1_path!("/admin/pins/generate");
            pub const USERS: &str = v1_path!("/admin/pins/users");
            pub const REPORT: &str = v1_path!("/admin/pins/report");
        }
    }
}

pub const HEALTH: &str = "/health";

/// Header names understood by the identity layer.
pub mod headers {
    /// Presence of this header forces PIN-mode authentication on any route.
    pub const PIN_AUTH_MARKER: &str = "x-turnstile-pin-auth";
    /// Carries the PIN itself; preferred over the request body.
    pub const PIN: &str = "x-turnstile-pin";
    /// Legacy media-client token header.
    pub const EMBY_TOKEN: &str = "x-emby-token";
}

/// Query parameter carrying an API key.
pub const API_KEY_QUERY_PARAM: &str = "api_key";
