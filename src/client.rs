//! The Mailjet API client.
//!
//! The [`Client`] type is the main entry point. Use [`ClientBuilder`] to
//! configure credentials, the endpoint and the transport.
//!
//! Remote methods can be reached three ways:
//!
//! - the typed shortcuts ([`Client::lists_add_contact`], ...);
//! - by category and method name ([`Client::invoke`], [`Client::category`]),
//!   which consults the dispatch table and falls back to `HelpMethod`
//!   introspection to pick the verb;
//! - directly by method path and verb ([`Client::request_get`],
//!   [`Client::request_post`], [`Client::request`]).

use crate::{
    category::Category,
    config::{Credentials, Endpoint},
    metadata::{RequestMetadata, Verb},
    shortcuts::{DispatchTable, Handler},
    transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse},
    Error, Params, Response, Result,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Name of the output format parameter appended to every request.
pub const OUTPUT_PARAM: &str = "output";

/// The only output format this client decodes.
pub const OUTPUT_FORMAT: &str = "json";

/// A client for the Mailjet API.
///
/// Cloning is cheap; clones share the transport, configuration and
/// descriptor cache. There is no per-call state on the client, so one
/// instance can serve concurrent calls.
///
/// # Examples
///
/// ```no_run
/// use mailjet::{Category, Client, Params};
///
/// # async fn example() -> Result<(), mailjet::Error> {
/// let client = Client::builder()
///     .api_key_secret("key", "secret")
///     .build()?;
///
/// // Typed shortcut
/// let contact_id = client.lists_add_contact("a@example.com", 42, true).await?;
/// println!("Added contact {}", contact_id);
///
/// // Any remote method, verb learned from HelpMethod
/// let infos = client
///     .category("user")?
///     .call("infos", Params::new())
///     .await?;
/// println!("Account: {}", infos["infos"]);
///
/// // Same thing without the scope handle
/// let infos = client.invoke(Category::User, "infos", Params::new()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    endpoint: Endpoint,
    credentials: Credentials,
    shortcuts: DispatchTable,
    descriptor_cache: Option<Mutex<HashMap<String, Verb>>>,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client with the default endpoint and transport.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Result<Self> {
        Self::builder().api_key_secret(api_key, api_secret).build()
    }

    /// Creates a client from `MAILJET_API_KEY` and `MAILJET_API_SECRET`.
    pub fn from_env() -> Result<Self> {
        Self::builder().credentials(Credentials::from_env()?).build()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// Returns the dispatch table of local shortcuts.
    pub fn shortcuts(&self) -> &DispatchTable {
        &self.inner.shortcuts
    }

    pub(crate) fn descriptor_cache(&self) -> Option<&Mutex<HashMap<String, Verb>>> {
        self.inner.descriptor_cache.as_ref()
    }

    /// Selects a category by name (case-insensitive) and returns a handle
    /// scoped to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCategory`] if the name is not a known category.
    pub fn category(&self, name: &str) -> Result<Scope<'_>> {
        let category = name.parse::<Category>()?;
        Ok(self.scope(category))
    }

    /// Returns a handle scoped to `category`.
    pub fn scope(&self, category: Category) -> Scope<'_> {
        Scope {
            client: self,
            category,
        }
    }

    /// Calls `method` in `category`.
    ///
    /// Equivalent to `execute(MethodCall::new(method).in_category(category).with_params(params))`.
    pub async fn invoke(&self, category: Category, method: &str, params: Params) -> Result<Value> {
        self.execute(
            MethodCall::new(method)
                .in_category(category)
                .with_params(params),
        )
        .await
    }

    /// Dispatches a method call.
    ///
    /// The fully-qualified name is looked up in the dispatch table first; a
    /// registered shortcut answers without introspection. Otherwise the verb
    /// is learned from `HelpMethod` and the decoded payload is returned
    /// unmodified.
    ///
    /// # Errors
    ///
    /// - [`Error::NoCategorySelected`] if the call has no category
    /// - [`Error::UnknownMethod`] if the method name is empty or the remote
    ///   service does not describe it
    /// - [`Error::UnsupportedVerb`] if the service advertises a verb other
    ///   than `GET` or `POST`
    /// - any executor error from the request itself
    pub async fn execute(&self, call: MethodCall) -> Result<Value> {
        let category = call.category.ok_or(Error::NoCategorySelected)?;
        if call.method.is_empty() {
            return Err(Error::UnknownMethod(category.qualify("")));
        }
        let name = category.qualify(&call.method);

        if let Some(handler) = self.inner.shortcuts.get(&name) {
            tracing::debug!(method = %name, "Dispatching to local shortcut");
            return handler(self, call.params).await;
        }

        let verb = self.resolve_verb(&name).await?;
        tracing::debug!(method = %name, verb = %verb, "Dispatching to remote method");

        let metadata = RequestMetadata::new(verb, name).with_params(call.params);
        Ok(self.call::<Value>(metadata).await?.data)
    }

    /// Performs a request with a verb given by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVerb`] before any I/O if `verb` is not
    /// `GET` or `POST`.
    pub async fn request<T>(
        &self,
        verb: &str,
        method: impl Into<String>,
        params: Params,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let verb = verb.parse::<Verb>()?;
        self.call(RequestMetadata::new(verb, method).with_params(params))
            .await
    }

    /// Performs a GET request; parameters go in the query string.
    pub async fn request_get<T>(&self, method: impl Into<String>, params: Params) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.call(RequestMetadata::new(Verb::Get, method).with_params(params))
            .await
    }

    /// Performs a POST request; parameters go in a form-encoded body.
    pub async fn request_post<T>(&self, method: impl Into<String>, params: Params) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.call(RequestMetadata::new(Verb::Post, method).with_params(params))
            .await
    }

    /// Executes a request described by `metadata` and decodes the JSON body.
    ///
    /// The output format parameter is always set, replacing any value the
    /// caller supplied. Credentials are attached by the transport as basic
    /// auth.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if the method path does not form a valid URL
    /// - [`Error::Transport`] if the transport fails
    /// - [`Error::RemoteRequest`] for 4xx and 5xx statuses
    /// - [`Error::DeserializationFailed`] if the body does not decode as `T`
    pub async fn call<T>(&self, metadata: RequestMetadata) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let start_time = Instant::now();
        let url = self.inner.endpoint.method_url(&metadata.method)?;

        let mut params = metadata.params;
        params.insert(OUTPUT_PARAM, OUTPUT_FORMAT);

        tracing::debug!(
            verb = %metadata.verb,
            url = %url,
            "Executing Mailjet request"
        );

        let request = TransportRequest {
            verb: metadata.verb,
            url,
            credentials: self.inner.credentials.clone(),
            params: params.to_pairs(),
        };

        let response = self.inner.transport.send(request).await.map_err(|e| {
            tracing::warn!(
                error = %e,
                verb = %metadata.verb,
                method = %metadata.method,
                "Request failed"
            );
            Error::Transport(e)
        })?;

        parse_response(response, start_time.elapsed())
    }

    /// Performs a request and extracts one top-level field of the JSON
    /// envelope.
    pub(crate) async fn fetch_field<T>(
        &self,
        metadata: RequestMetadata,
        field: &str,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut response = self.call::<Value>(metadata).await?;
        let value = match response.data.get_mut(field) {
            Some(value) => value.take(),
            None => {
                tracing::error!(
                    field = field,
                    raw_response = %response.raw_body,
                    "Response is missing expected field"
                );
                return Err(Error::DeserializationFailed {
                    raw_response: response.raw_body,
                    serde_error: format!("missing field `{}`", field),
                    status: response.status,
                });
            }
        };

        serde_json::from_value(value).map_err(|e| Error::DeserializationFailed {
            raw_response: response.raw_body,
            serde_error: e.to_string(),
            status: response.status,
        })
    }
}

/// Classifies a transport response and decodes successful bodies.
fn parse_response<T>(response: TransportResponse, latency: Duration) -> Result<Response<T>>
where
    T: DeserializeOwned,
{
    let TransportResponse {
        status,
        headers,
        body,
    } = response;

    tracing::info!(
        status = status.as_u16(),
        latency_ms = latency.as_millis(),
        "Received HTTP response"
    );

    if status.is_client_error() || status.is_server_error() {
        if status.is_client_error() {
            tracing::error!(
                status = status.as_u16(),
                response = %body,
                "Client error (4xx)"
            );
        } else {
            tracing::warn!(
                status = status.as_u16(),
                response = %body,
                "Server error (5xx)"
            );
        }

        return Err(Error::RemoteRequest {
            status,
            message: remote_message(&body),
            raw_response: body,
        });
    }

    match serde_json::from_str::<T>(&body) {
        Ok(data) => Ok(Response::new(data, body, status, headers, latency)),
        Err(e) => {
            tracing::error!(
                error = %e,
                raw_response = %body,
                "Failed to deserialize response"
            );

            Err(Error::DeserializationFailed {
                raw_response: body,
                serde_error: e.to_string(),
                status,
            })
        }
    }
}

/// Pulls the error message out of a JSON error body, if there is one.
fn remote_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error_message", "error"]
        .iter()
        .find_map(|key| value.get(*key)?.as_str().map(str::to_string))
}

/// A call to a remote method by category and name.
///
/// # Examples
///
/// ```
/// use mailjet::{Category, MethodCall, Params};
///
/// let call = MethodCall::new("addcontact")
///     .in_category(Category::Lists)
///     .with_params(Params::new().with("contact", "a@example.com"));
///
/// assert_eq!(call.qualified_name().as_deref(), Some("listsAddcontact"));
/// ```
#[derive(Debug, Clone)]
pub struct MethodCall {
    category: Option<Category>,
    method: String,
    params: Params,
}

impl MethodCall {
    /// Creates a call with no category and no parameters.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            category: None,
            method: method.into(),
            params: Params::new(),
        }
    }

    pub fn in_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Sets the parameters from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedParameters`] unless `params` is an object of
    /// scalars and scalar arrays (or `null`).
    pub fn with_json_params(mut self, params: Value) -> Result<Self> {
        self.params = Params::try_from(params)?;
        Ok(self)
    }

    /// Returns `category + Method`, or `None` without a category.
    pub fn qualified_name(&self) -> Option<String> {
        self.category.map(|category| category.qualify(&self.method))
    }
}

/// A handle scoped to one category, returned by [`Client::category`].
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    client: &'a Client,
    category: Category,
}

impl<'a> Scope<'a> {
    pub fn category(&self) -> Category {
        self.category
    }

    /// Calls `method` in this scope's category.
    pub async fn call(&self, method: &str, params: Params) -> Result<Value> {
        self.client.invoke(self.category, method, params).await
    }

    /// Calls `method` with parameters given as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedParameters`] before any I/O unless `params`
    /// is a flat JSON object (or `null`).
    pub async fn call_json(&self, method: &str, params: Value) -> Result<Value> {
        let call = MethodCall::new(method)
            .in_category(self.category)
            .with_json_params(params)?;
        self.client.execute(call).await
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use mailjet::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), mailjet::Error> {
/// let client = ClientBuilder::new()
///     .api_key_secret("key", "secret")
///     .protocol("https")
///     .timeout(Duration::from_secs(30))
///     .cache_descriptors(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    credentials: Option<Credentials>,
    endpoint: Endpoint,
    transport: Option<Arc<dyn Transport>>,
    timeout: Option<Duration>,
    cache_descriptors: bool,
    shortcuts: DispatchTable,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with the default endpoint and the
    /// default shortcuts.
    pub fn new() -> Self {
        Self {
            credentials: None,
            endpoint: Endpoint::default(),
            transport: None,
            timeout: None,
            cache_descriptors: false,
            shortcuts: DispatchTable::with_defaults(),
        }
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn api_key_secret(self, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        self.credentials(Credentials::new(api_key, api_secret))
    }

    /// Replaces the endpoint URI template. `{{protocol}}` and `{{version}}`
    /// are substituted per request.
    pub fn uri_template(mut self, template: impl Into<String>) -> Self {
        self.endpoint.uri_template = template.into();
        self
    }

    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.endpoint.protocol = protocol.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.endpoint.version = version.into();
        self
    }

    /// Sets the request timeout of the default transport. Has no effect when
    /// a custom transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Supplies the transport used for every request.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Remembers the verb of each introspected method for the life of the
    /// client. Off by default, since verbs can change server-side.
    pub fn cache_descriptors(mut self, enabled: bool) -> Self {
        self.cache_descriptors = enabled;
        self
    }

    /// Registers a local shortcut for a fully-qualified method name,
    /// replacing any existing handler for that name.
    pub fn shortcut(mut self, name: impl Into<String>, handler: Handler) -> Self {
        self.shortcuts.register(name, handler);
        self
    }

    /// Removes the handler for a fully-qualified method name, so calls to it
    /// go through introspection.
    pub fn without_shortcut(mut self, name: &str) -> Self {
        self.shortcuts.remove(name);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no credentials were provided, if the endpoint
    /// template does not produce a valid URL, or if the default transport
    /// cannot be created.
    pub fn build(self) -> Result<Client> {
        let credentials = self.credentials.ok_or_else(|| {
            Error::ConfigurationError("API key and secret are required".to_string())
        })?;

        self.endpoint.method_url(crate::introspect::HELP_METHOD)?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let mut transport = ReqwestTransport::new().map_err(|e| {
                    Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
                })?;
                if let Some(timeout) = self.timeout {
                    transport = transport.timeout(timeout);
                }
                Arc::new(transport)
            }
        };

        let descriptor_cache = self
            .cache_descriptors
            .then(|| Mutex::new(HashMap::new()));

        Ok(Client {
            inner: Arc::new(ClientInner {
                transport,
                endpoint: self.endpoint,
                credentials,
                shortcuts: self.shortcuts,
                descriptor_cache,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use http::{HeaderMap, StatusCode};

    /// Records every request and answers with a fixed response.
    struct RecordingTransport {
        requests: Arc<Mutex<Vec<TransportRequest>>>,
        status: StatusCode,
        body: &'static str,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(
            &self,
            request: TransportRequest,
        ) -> std::result::Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(TransportResponse {
                status: self.status,
                headers: HeaderMap::new(),
                body: self.body.to_string(),
            })
        }
    }

    fn recording_client(
        status: StatusCode,
        body: &'static str,
    ) -> (Client, Arc<Mutex<Vec<TransportRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let client = Client::builder()
            .api_key_secret("key", "secret")
            .transport(RecordingTransport {
                requests: requests.clone(),
                status,
                body,
            })
            .build()
            .unwrap();
        (client, requests)
    }

    #[tokio::test]
    async fn test_output_format_overrides_caller_value() {
        let (client, requests) = recording_client(StatusCode::OK, r#"{"status":"OK"}"#);

        client
            .request_get::<Value>("userInfos", Params::new().with("output", "xml"))
            .await
            .unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].params,
            vec![("output".to_string(), "json".to_string())]
        );
        assert_eq!(requests[0].credentials.api_key(), "key");
        assert_eq!(requests[0].url.as_str(), "http://api.mailjet.com/0.1/userInfos");
    }

    #[tokio::test]
    async fn test_unsupported_verb_sends_nothing() {
        let (client, requests) = recording_client(StatusCode::OK, "{}");

        let result = client.request::<Value>("PUT", "userInfos", Params::new()).await;

        assert!(matches!(result, Err(Error::UnsupportedVerb(ref v)) if v == "PUT"));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_category_sends_nothing() {
        let (client, requests) = recording_client(StatusCode::OK, "{}");

        let result = client.execute(MethodCall::new("infos")).await;

        assert!(matches!(result, Err(Error::NoCategorySelected)));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_message_is_extracted() {
        let (client, _) = recording_client(
            StatusCode::UNAUTHORIZED,
            r#"{"status":"ERROR","message":"Invalid api key"}"#,
        );

        match client.request_get::<Value>("userInfos", Params::new()).await {
            Err(Error::RemoteRequest {
                status, message, ..
            }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message.as_deref(), Some("Invalid api key"));
            }
            other => panic!("Expected RemoteRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_build_requires_credentials() {
        assert!(matches!(
            Client::builder().build(),
            Err(Error::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_build_rejects_bad_template() {
        let result = Client::builder()
            .api_key_secret("key", "secret")
            .uri_template("{{protocol}}//nowhere")
            .build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_category_rejects_unknown() {
        let (client, _) = recording_client(StatusCode::OK, "{}");
        assert!(matches!(
            client.category("campaign"),
            Err(Error::InvalidCategory(ref name)) if name == "campaign"
        ));
        assert_eq!(client.category("REPORT").unwrap().category(), Category::Report);
    }
}
