//! Error types for Mailjet API calls.
//!
//! Every failure the client can produce is a variant of [`Error`]. Errors that
//! come from an HTTP exchange keep the raw response body so that production
//! failures can be debugged without re-running the request.

use crate::transport::TransportError;
use http::StatusCode;

/// The main error type for Mailjet API calls.
///
/// # Examples
///
/// ```no_run
/// use mailjet::{Category, Client, Error, Params};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().api_key_secret("key", "secret").build()?;
///
/// match client.invoke(Category::User, "infos", Params::new()).await {
///     Ok(payload) => println!("Account: {}", payload["infos"]),
///     Err(Error::UnknownMethod(name)) => eprintln!("No such method: {}", name),
///     Err(Error::RemoteRequest { status, message, .. }) => {
///         eprintln!("Mailjet answered {}: {:?}", status, message);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The category name is not one of the known method categories.
    #[error("Invalid method category \"{0}\"")]
    InvalidCategory(String),

    /// A method call was dispatched without a category.
    #[error("No method category selected")]
    NoCategorySelected,

    /// The remote service does not know the fully-qualified method.
    #[error("Invalid method \"{0}\"")]
    UnknownMethod(String),

    /// A verb other than `GET` or `POST` was requested or advertised.
    #[error("Invalid HTTP method \"{0}\" (\"GET\" or \"POST\" only)")]
    UnsupportedVerb(String),

    /// The server answered with a 4xx or 5xx status code.
    ///
    /// # Fields
    ///
    /// * `status` - The HTTP status code
    /// * `message` - The `message` field of the JSON error body, if any
    /// * `raw_response` - The raw response body
    #[error("An error occurred sending request. Status code: {status}")]
    RemoteRequest {
        /// The HTTP status code
        status: StatusCode,
        /// The remote error message, when the body carried one
        message: Option<String>,
        /// The raw response body
        raw_response: String,
    },

    /// Request parameters were not a flat mapping of scalars and arrays,
    /// or a shortcut was missing one of its arguments.
    #[error("Malformed parameters: {0}")]
    MalformedParameters(String),

    /// The injected transport failed to complete the exchange.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body could not be decoded into the expected type.
    ///
    /// # Fields
    ///
    /// * `raw_response` - The raw response body as a string
    /// * `serde_error` - The error message from serde
    /// * `status` - The HTTP status code of the response
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Invalid configuration was provided to the builder.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The interpolated endpoint URI could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns the HTTP status code if this error has one.
    ///
    /// # Examples
    ///
    /// ```
    /// use mailjet::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::RemoteRequest {
    ///     status: StatusCode::NOT_FOUND,
    ///     message: None,
    ///     raw_response: String::new(),
    /// };
    /// assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    /// assert_eq!(Error::NoCategorySelected.status(), None);
    /// ```
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::RemoteRequest { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::RemoteRequest { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for Mailjet API calls.
pub type Result<T> = std::result::Result<T, Error>;
