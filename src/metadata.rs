//! Request metadata and verb types.

use crate::{Error, Params};
use std::fmt;
use std::str::FromStr;

/// The HTTP verbs the Mailjet API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
        }
    }

    pub(crate) fn to_method(self) -> http::Method {
        match self {
            Verb::Get => http::Method::GET,
            Verb::Post => http::Method::POST,
        }
    }
}

impl FromStr for Verb {
    type Err = Error;

    /// Parses `GET` or `POST`, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use mailjet::{Error, Verb};
    ///
    /// assert_eq!("post".parse::<Verb>().unwrap(), Verb::Post);
    /// assert!(matches!("DELETE".parse::<Verb>(), Err(Error::UnsupportedVerb(_))));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            other => Err(Error::UnsupportedVerb(other.to_string())),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for an individual API request.
///
/// Contains the verb, the method path appended to the endpoint URI, and the
/// parameters. The output format parameter is added by the client, not here.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP verb.
    pub verb: Verb,

    /// The remote method path (e.g. `userInfos`).
    pub method: String,

    /// Caller-supplied parameters.
    pub params: Params,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with no parameters.
    pub fn new(verb: Verb, method: impl Into<String>) -> Self {
        Self {
            verb,
            method: method.into(),
            params: Params::new(),
        }
    }

    /// Replaces the request parameters.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Adds a single parameter to the request.
    pub fn with_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<crate::params::ParamValue>,
    ) -> Self {
        self.params.insert(key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_parse_ignores_case() {
        assert_eq!("get".parse::<Verb>().unwrap(), Verb::Get);
        assert_eq!("Post".parse::<Verb>().unwrap(), Verb::Post);
    }

    #[test]
    fn test_verb_parse_rejects_others() {
        for verb in ["PUT", "delete", "", "GETS"] {
            match verb.parse::<Verb>() {
                Err(Error::UnsupportedVerb(v)) => assert_eq!(v, verb.to_uppercase()),
                other => panic!("Expected UnsupportedVerb, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_with_param_accumulates() {
        let metadata = RequestMetadata::new(Verb::Get, "HelpMethod").with_param("name", "userInfos");
        assert_eq!(metadata.method, "HelpMethod");
        assert_eq!(metadata.params.require_str("name").unwrap(), "userInfos");
    }
}
