//! Remote method introspection through the `HelpMethod` endpoint.
//!
//! `HelpMethod?name=<method>` answers `{status, method: {request_type, ...}}`.
//! The dispatcher uses it to learn whether a method without a local shortcut
//! expects `GET` or `POST`.

use crate::{metadata::RequestMetadata, Client, Error, Result, Verb};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Method path of the self-description endpoint.
pub const HELP_METHOD: &str = "HelpMethod";

/// Status value signalling success in a response envelope.
pub const STATUS_OK: &str = "OK";

/// The decoded answer of `HelpMethod`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub status: String,

    #[serde(default)]
    pub method: Option<MethodInfo>,

    /// Any other fields of the envelope.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Description of a single remote method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    #[serde(default)]
    pub request_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MethodDescriptor {
    /// Returns `true` if the lookup succeeded.
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Returns the declared request verb as the service spelled it.
    pub fn request_type(&self) -> Option<&str> {
        self.method.as_ref()?.request_type.as_deref()
    }

    /// Parses the declared verb.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVerb`] if the declared verb is missing or
    /// is neither `GET` nor `POST`.
    pub fn verb(&self) -> Result<Verb> {
        self.request_type().unwrap_or_default().parse()
    }
}

/// Returns `true` if `name` designates the introspection endpoint itself.
pub fn is_help_method(name: &str) -> bool {
    name.eq_ignore_ascii_case(HELP_METHOD)
}

impl Client {
    /// Fetches the description of a remote method.
    ///
    /// Returns `Ok(None)` when the endpoint answers with something that is not
    /// a method descriptor, including a 2xx body that is not JSON at all.
    ///
    /// # Errors
    ///
    /// Propagates executor errors, including [`Error::RemoteRequest`] for a
    /// 4xx/5xx answer.
    pub async fn describe(&self, name: &str) -> Result<Option<MethodDescriptor>> {
        let metadata = RequestMetadata::new(Verb::Get, HELP_METHOD).with_param("name", name);
        let response = match self.call::<Value>(metadata).await {
            Ok(response) => response,
            Err(Error::DeserializationFailed { raw_response, .. }) => {
                tracing::warn!(
                    method = %name,
                    raw_response = %raw_response,
                    "HelpMethod answer is not JSON"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match serde_json::from_value::<MethodDescriptor>(response.data) {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(e) => {
                tracing::warn!(
                    method = %name,
                    error = %e,
                    raw_response = %response.raw_body,
                    "HelpMethod answer is not a method descriptor"
                );
                Ok(None)
            }
        }
    }

    /// Learns the verb of a fully-qualified remote method.
    ///
    /// The introspection endpoint itself is answered locally as `GET`. When
    /// descriptor caching is enabled, successful lookups are remembered.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownMethod`] if the descriptor is absent or not `OK`
    /// - [`Error::UnsupportedVerb`] if it declares a verb other than GET/POST
    pub async fn resolve_verb(&self, name: &str) -> Result<Verb> {
        if is_help_method(name) {
            return Ok(Verb::Get);
        }

        if let Some(cache) = self.descriptor_cache() {
            if let Some(verb) = lock(cache).get(name).copied() {
                tracing::debug!(method = %name, verb = %verb, "Descriptor cache hit");
                return Ok(verb);
            }
        }

        let descriptor = match self.describe(name).await? {
            Some(descriptor) if descriptor.is_ok() => descriptor,
            _ => return Err(Error::UnknownMethod(name.to_string())),
        };
        let verb = descriptor.verb()?;

        if let Some(cache) = self.descriptor_cache() {
            lock(cache).insert(name.to_string(), verb);
        }

        Ok(verb)
    }
}

fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
