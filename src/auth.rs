use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::config::Config;
use crate::error::UpdateError;

/// Username and password presented through HTTP Basic auth.
#[derive(Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn from_basic_header(headers: &HeaderMap) -> Result<Self, UpdateError> {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(UpdateError::Unauthenticated("missing authorization header"))?;

        let encoded = value
            .strip_prefix("Basic ")
            .ok_or(UpdateError::Unauthenticated("incorrect authorization format"))?;

        let decoded = BASE64
            .decode(encoded.trim())
            .map_err(|_| UpdateError::Unauthenticated("invalid base64 in authorization header"))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| UpdateError::Unauthenticated("authorization header is not utf-8"))?;

        // the password may itself contain ':'
        let (username, password) = decoded
            .split_once(':')
            .ok_or(UpdateError::Unauthenticated("missing password"))?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Checks the request's Basic credentials against the configured login.
pub fn authorize(headers: &HeaderMap, config: &Config) -> Result<(), UpdateError> {
    let presented = Credentials::from_basic_header(headers)?;
    if presented.username != config.username || presented.password != config.password {
        return Err(UpdateError::Unauthenticated("incorrect login"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::valid_config;
    use axum::http::HeaderValue;

    fn basic(user_pass: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("Basic {}", BASE64.encode(user_pass));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        headers
    }

    #[test]
    fn decodes_basic_credentials() {
        let creds = Credentials::from_basic_header(&basic("alice:se:cret")).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "se:cret");
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(Credentials::from_basic_header(&HeaderMap::new()).is_err());

        let mut bearer = HeaderMap::new();
        bearer.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert!(Credentials::from_basic_header(&bearer).is_err());

        let mut garbage = HeaderMap::new();
        garbage.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic !!!"));
        assert!(Credentials::from_basic_header(&garbage).is_err());

        assert!(Credentials::from_basic_header(&basic("nocolon")).is_err());
    }

    #[test]
    fn authorizes_exact_match_only() {
        let config = valid_config();
        assert!(authorize(&basic("alice:correct horse battery"), &config).is_ok());

        for attempt in [
            "Alice:correct horse battery",
            "alice:Correct horse battery",
            "alice:correct horse battery ",
            " alice:correct horse battery",
            "alice:",
        ] {
            assert!(
                matches!(
                    authorize(&basic(attempt), &config),
                    Err(UpdateError::Unauthenticated(_))
                ),
                "{attempt} should be rejected"
            );
        }
    }
}
