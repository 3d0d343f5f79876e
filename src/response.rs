//! Response wrapper that preserves both decoded data and raw response details.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successfully decoded API response.
///
/// Besides the decoded data this keeps the raw body, status, headers and the
/// latency of the exchange, which is what you want at hand when a payload
/// does not look the way you expected.
///
/// # Examples
///
/// ```no_run
/// use mailjet::{Client, Params};
///
/// # async fn example() -> Result<(), mailjet::Error> {
/// let client = Client::builder().api_key_secret("key", "secret").build()?;
///
/// let response = client
///     .request_get::<serde_json::Value>("userInfos", Params::new())
///     .await?;
///
/// println!("Status field: {}", response.data["status"]);
/// println!("Request took {:?}", response.latency);
/// println!("Raw body: {}", response.raw_body);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded response data.
    pub data: T,

    /// The raw response body as a string.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from handing the request to the transport until the body was read.
    pub latency: Duration,
}

impl<T> Response<T> {
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Maps the response data to a different type, keeping the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mailjet::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     7u64,
    ///     "{\"contact_id\":7}".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(20),
    /// );
    ///
    /// let mapped = response.map(|id| id.to_string());
    /// assert_eq!(mapped.data, "7");
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
        }
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Consumes the response and returns the data.
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
