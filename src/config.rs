//! Credentials and endpoint configuration.

use crate::{Error, Result};
use std::fmt;
use url::Url;

/// Default endpoint URI template.
pub const DEFAULT_URI_TEMPLATE: &str = "{{protocol}}://api.mailjet.com/{{version}}/";

/// Default protocol substituted for `{{protocol}}`.
pub const DEFAULT_PROTOCOL: &str = "http";

/// Default API version substituted for `{{version}}`.
pub const DEFAULT_VERSION: &str = "0.1";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "MAILJET_API_KEY";

/// Environment variable holding the API secret.
pub const API_SECRET_VAR: &str = "MAILJET_API_SECRET";

/// The API key and secret sent as basic auth with every request.
///
/// The secret is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Reads credentials from `MAILJET_API_KEY` and `MAILJET_API_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] naming the first variable that is
    /// unset or empty.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(read_var(API_KEY_VAR)?, read_var(API_SECRET_VAR)?))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

fn read_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::ConfigurationError(format!(
            "Environment variable {} is not set",
            name
        ))),
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Where requests are sent: a URI template plus the values substituted into
/// its `{{protocol}}` and `{{version}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub uri_template: String,
    pub protocol: String,
    pub version: String,
}

impl Endpoint {
    /// Substitutes the placeholders and returns the base URI, always ending
    /// in `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mailjet::Endpoint;
    ///
    /// let endpoint = Endpoint::default();
    /// assert_eq!(endpoint.base_uri(), "http://api.mailjet.com/0.1/");
    /// ```
    pub fn base_uri(&self) -> String {
        let mut uri = self
            .uri_template
            .replace("{{protocol}}", &self.protocol)
            .replace("{{version}}", &self.version);
        if !uri.ends_with('/') {
            uri.push('/');
        }
        uri
    }

    /// Returns the full URL for a remote method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the interpolated URI does not parse,
    /// [`Error::ConfigurationError`] if it cannot carry a path, and
    /// [`Error::UnknownMethod`] if `method` is not a single path segment.
    pub fn method_url(&self, method: &str) -> Result<Url> {
        if method.is_empty()
            || method == "."
            || method == ".."
            || method.contains(['/', '\\', '?', '#'])
        {
            return Err(Error::UnknownMethod(method.to_string()));
        }

        let mut url = Url::parse(&self.base_uri())?;
        url.path_segments_mut()
            .map_err(|()| {
                Error::ConfigurationError(format!("URI template has no path: {}", self.uri_template))
            })?
            .pop_if_empty()
            .push(method);
        Ok(url)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            uri_template: DEFAULT_URI_TEMPLATE.to_string(),
            protocol: DEFAULT_PROTOCOL.to_string(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url_interpolates_template() {
        let endpoint = Endpoint {
            protocol: "https".to_string(),
            version: "0.2".to_string(),
            ..Endpoint::default()
        };
        assert_eq!(
            endpoint.method_url("userInfos").unwrap().as_str(),
            "https://api.mailjet.com/0.2/userInfos"
        );
    }

    #[test]
    fn test_template_without_trailing_slash() {
        let endpoint = Endpoint {
            uri_template: "http://127.0.0.1:8080/{{version}}".to_string(),
            ..Endpoint::default()
        };
        assert_eq!(
            endpoint.method_url("HelpMethod").unwrap().as_str(),
            "http://127.0.0.1:8080/0.1/HelpMethod"
        );
    }

    #[test]
    fn test_bad_template_is_invalid_url() {
        let endpoint = Endpoint {
            uri_template: "not a uri".to_string(),
            ..Endpoint::default()
        };
        assert!(matches!(
            endpoint.method_url("userInfos"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_method_url_keeps_version_segment() {
        let endpoint = Endpoint::default();
        assert_eq!(
            endpoint.method_url("userInfos").unwrap().as_str(),
            "http://api.mailjet.com/0.1/userInfos"
        );
        for method in ["/userInfos", "../userInfos", "..", "//evil.example/x", "a?b=c"] {
            assert!(
                matches!(endpoint.method_url(method), Err(Error::UnknownMethod(ref m)) if m == method),
                "{} should be rejected",
                method
            );
        }
    }

    #[test]
    fn test_method_url_without_version() {
        let endpoint = Endpoint {
            uri_template: "http://127.0.0.1:8080/".to_string(),
            ..Endpoint::default()
        };
        assert_eq!(
            endpoint.method_url("HelpMethod").unwrap().as_str(),
            "http://127.0.0.1:8080/HelpMethod"
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials::new("key", "hunter2");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("key"));
        assert!(!debug.contains("hunter2"));
    }
}
