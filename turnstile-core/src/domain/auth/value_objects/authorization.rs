//! Parsing of the media-client `Authorization` header:
//!
//! ```text
//! Authorization: MediaBrowser Client="Web", Device="Firefox", DeviceId="abc", Version="10.9", Token="..."
//! ```

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthorizationHeaderError {
    #[error("unterminated quoted value in authorization parameters")]
    UnterminatedQuote,
    #[error("authorization parameter `{0}` is missing `=`")]
    MissingEquals(String),
    #[error("authorization parameter has an empty name")]
    EmptyName,
}

/// Credential carried by an `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationScheme {
    Bearer(String),
    MediaBrowser(MediaBrowserAuthorization),
    /// Any other scheme; not ours to judge.
    Other,
}

/// Fields of a `MediaBrowser` authorization header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaBrowserAuthorization {
    pub client: Option<String>,
    pub device: Option<String>,
    pub device_id: Option<String>,
    pub version: Option<String>,
    pub token: Option<String>,
}

const MEDIA_BROWSER_SCHEMES: [&str; 2] = ["mediabrowser", "emby"];

/// Classify and parse an `Authorization` header value.
pub fn parse_authorization(
    header: &str,
) -> Result<AuthorizationScheme, AuthorizationHeaderError> {
    let header = header.trim();
    let (scheme, rest) = match header.split_once(char::is_whitespace) {
        Some((scheme, rest)) => (scheme, rest.trim()),
        None => (header, ""),
    };

    if scheme.eq_ignore_ascii_case("bearer") {
        return Ok(AuthorizationScheme::Bearer(rest.to_string()));
    }

    if MEDIA_BROWSER_SCHEMES
        .iter()
        .any(|candidate| scheme.eq_ignore_ascii_case(candidate))
    {
        return parse_media_browser_params(rest)
            .map(AuthorizationScheme::MediaBrowser);
    }

    Ok(AuthorizationScheme::Other)
}

/// Parse a `Key="value", Key=value` parameter list.
///
/// Keys are matched case-insensitively; unknown keys are ignored.
pub fn parse_media_browser_params(
    params: &str,
) -> Result<MediaBrowserAuthorization, AuthorizationHeaderError> {
    let mut auth = MediaBrowserAuthorization::default();

    for (name, value) in split_params(params)? {
        let value = (!value.is_empty()).then_some(value);
        match name.to_ascii_lowercase().as_str() {
            "client" => auth.client = value,
            "device" => auth.device = value,
            "deviceid" => auth.device_id = value,
            "version" => auth.version = value,
            "token" => auth.token = value,
            _ => {}
        }
    }

    Ok(auth)
}

fn split_params(
    params: &str,
) -> Result<Vec<(String, String)>, AuthorizationHeaderError> {
    let mut pairs = Vec::new();
    let mut chars = params.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace() || *c == ',') {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut name = String::new();
        let mut saw_equals = false;
        while let Some(c) = chars.next() {
            if c == '=' {
                saw_equals = true;
                break;
            }
            if c == ',' {
                break;
            }
            name.push(c);
        }
        let name = name.trim().to_string();
        if !saw_equals {
            return Err(AuthorizationHeaderError::MissingEquals(name));
        }
        if name.is_empty() {
            return Err(AuthorizationHeaderError::EmptyName);
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '"' {
                    closed = true;
                    break;
                }
                value.push(c);
            }
            if !closed {
                return Err(AuthorizationHeaderError::UnterminatedQuote);
            }
            while chars.peek().is_some_and(|c| *c != ',') {
                chars.next();
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                value.push(c);
                chars.next();
            }
            value = value.trim().to_string();
        }

        pairs.push((name, value));
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_media_browser_header() {
        let parsed = parse_authorization(
            r#"MediaBrowser Client="Web", Device="Firefox", DeviceId="abc-123", Version="10.9.0", Token="tok_abcdefghijklmnop""#,
        )
        .unwrap();

        let AuthorizationScheme::MediaBrowser(auth) = parsed else {
            panic!("expected MediaBrowser scheme");
        };
        assert_eq!(auth.client.as_deref(), Some("Web"));
        assert_eq!(auth.device.as_deref(), Some("Firefox"));
        assert_eq!(auth.device_id.as_deref(), Some("abc-123"));
        assert_eq!(auth.version.as_deref(), Some("10.9.0"));
        assert_eq!(auth.token.as_deref(), Some("tok_abcdefghijklmnop"));
    }

    #[test]
    fn accepts_unquoted_values_and_any_key_case() {
        let auth =
            parse_media_browser_params("client=Tv, TOKEN = plain-token ,x=y")
                .unwrap();
        assert_eq!(auth.client.as_deref(), Some("Tv"));
        assert_eq!(auth.token.as_deref(), Some("plain-token"));
    }

    #[test]
    fn commas_inside_quotes_are_preserved() {
        let auth =
            parse_media_browser_params(r#"Device="Living Room, TV""#).unwrap();
        assert_eq!(auth.device.as_deref(), Some("Living Room, TV"));
    }

    #[test]
    fn rejects_malformed_parameter_lists() {
        assert_eq!(
            parse_media_browser_params(r#"Token="unterminated"#),
            Err(AuthorizationHeaderError::UnterminatedQuote)
        );
        assert!(matches!(
            parse_media_browser_params("Token"),
            Err(AuthorizationHeaderError::MissingEquals(_))
        ));
        assert_eq!(
            parse_media_browser_params(r#"="value""#),
            Err(AuthorizationHeaderError::EmptyName)
        );
    }

    #[test]
    fn classifies_schemes() {
        assert_eq!(
            parse_authorization("Bearer abc").unwrap(),
            AuthorizationScheme::Bearer("abc".into())
        );
        assert_eq!(
            parse_authorization("Basic dXNlcjpwYXNz").unwrap(),
            AuthorizationScheme::Other
        );
    }
}
