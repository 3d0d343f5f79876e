//! Typed shortcut methods and the dispatch table.
//!
//! A shortcut is bound to one remote method and one verb, skips
//! introspection, and returns a single field of the response rather than the
//! whole envelope. The [`DispatchTable`] maps fully-qualified method names to
//! handlers so that [`Client::execute`] can route dynamic calls to them.

use crate::{
    introspect::HELP_METHOD, metadata::RequestMetadata, Client, MethodDescriptor, Params, Result,
    Verb,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// The future returned by a shortcut handler.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

/// A shortcut handler: reads its arguments from the parameters and returns
/// its result as JSON.
///
/// # Examples
///
/// ```
/// use mailjet::{Client, Params, shortcuts::HandlerFuture};
/// use serde_json::Value;
///
/// fn report_emails(client: &Client, params: Params) -> HandlerFuture<'_> {
///     Box::pin(async move {
///         let response = client.request_get::<Value>("reportEmailsent", params).await?;
///         Ok(response.into_data())
///     })
/// }
///
/// # fn build() -> Result<(), mailjet::Error> {
/// let client = Client::builder()
///     .api_key_secret("key", "secret")
///     .shortcut("reportEmailsent", report_emails)
///     .build()?;
/// assert!(client.shortcuts().contains("reportEmailsent"));
/// # Ok(())
/// # }
/// ```
pub type Handler = for<'a> fn(&'a Client, Params) -> HandlerFuture<'a>;

/// Maps fully-qualified method names to shortcut handlers.
///
/// Lookups ignore ASCII case, so `helpMETHOD` finds the `helpMethod` handler.
#[derive(Clone, Default)]
pub struct DispatchTable {
    handlers: HashMap<String, (String, Handler)>,
}

impl DispatchTable {
    /// Creates an empty table: every call goes through introspection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the table with the built-in shortcuts:
    /// `listsAll`, `contactInfos`, `listsAddcontact` and `helpMethod`.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.register("listsAll", lists_all_handler);
        table.register("contactInfos", contact_infos_handler);
        table.register("listsAddcontact", lists_add_contact_handler);
        table.register("helpMethod", help_method_handler);
        table
    }

    pub fn register(&mut self, name: impl Into<String>, handler: Handler) {
        let name = name.into();
        self.handlers
            .insert(name.to_ascii_lowercase(), (name, handler));
    }

    pub fn remove(&mut self, name: &str) -> Option<Handler> {
        self.handlers
            .remove(&name.to_ascii_lowercase())
            .map(|(_, handler)| handler)
    }

    pub fn get(&self, name: &str) -> Option<Handler> {
        self.handlers
            .get(&name.to_ascii_lowercase())
            .map(|(_, handler)| *handler)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered names as they were registered, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.values().map(|(name, _)| name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

// Handlers forward every caller parameter; the arguments they read are
// validated and written back in their canonical form.

fn lists_all_handler(client: &Client, params: Params) -> HandlerFuture<'_> {
    Box::pin(async move { Ok(Value::Array(client.lists_all_with(params).await?)) })
}

fn contact_infos_handler(client: &Client, params: Params) -> HandlerFuture<'_> {
    Box::pin(async move {
        let contact = params.require_str("contact")?;
        Ok(Value::Object(client.contact_infos_with(&contact, params).await?))
    })
}

fn lists_add_contact_handler(client: &Client, params: Params) -> HandlerFuture<'_> {
    Box::pin(async move {
        let contact = params.require_str("contact")?;
        let list_id = params.require_i64("id")?;
        let force = params.flag("force")?;
        let contact_id = client
            .lists_add_contact_with(&contact, list_id, force, params)
            .await?;
        Ok(Value::from(contact_id))
    })
}

fn help_method_handler(client: &Client, params: Params) -> HandlerFuture<'_> {
    Box::pin(async move {
        params.require_str("name")?;
        let response = client.request_get::<Value>(HELP_METHOD, params).await?;
        Ok(response.into_data())
    })
}

impl Client {
    /// Fetches the account information (`GET userInfos`, field `infos`).
    pub async fn user_infos(&self) -> Result<Map<String, Value>> {
        self.fetch_field(RequestMetadata::new(Verb::Get, "userInfos"), "infos")
            .await
    }

    /// Lists every mailing list of the account (`GET listsAll`, field `lists`).
    pub async fn lists_all(&self) -> Result<Vec<Value>> {
        self.lists_all_with(Params::new()).await
    }

    /// Like [`Client::lists_all`], with extra request parameters such as
    /// `limit` or `start`.
    pub async fn lists_all_with(&self, params: Params) -> Result<Vec<Value>> {
        let metadata = RequestMetadata::new(Verb::Get, "listsAll").with_params(params);
        self.fetch_field(metadata, "lists").await
    }

    /// Fetches one contact by email or id (`GET contactInfos`, field `contact`).
    pub async fn contact_infos(&self, contact: &str) -> Result<Map<String, Value>> {
        self.contact_infos_with(contact, Params::new()).await
    }

    /// Like [`Client::contact_infos`], with extra request parameters.
    pub async fn contact_infos_with(
        &self,
        contact: &str,
        params: Params,
    ) -> Result<Map<String, Value>> {
        let metadata = RequestMetadata::new(Verb::Get, "contactInfos")
            .with_params(params)
            .with_param("contact", contact);
        self.fetch_field(metadata, "contact").await
    }

    /// Adds a contact to a mailing list and returns the contact id
    /// (`POST listsAddcontact`, field `contact_id`).
    ///
    /// With `force`, the contact is created if it does not exist yet.
    pub async fn lists_add_contact(&self, contact: &str, list_id: i64, force: bool) -> Result<u64> {
        self.lists_add_contact_with(contact, list_id, force, Params::new())
            .await
    }

    /// Like [`Client::lists_add_contact`], with extra request parameters.
    pub async fn lists_add_contact_with(
        &self,
        contact: &str,
        list_id: i64,
        force: bool,
        params: Params,
    ) -> Result<u64> {
        let metadata = RequestMetadata::new(Verb::Post, "listsAddcontact")
            .with_params(params)
            .with_param("contact", contact)
            .with_param("id", list_id)
            .with_param("force", force);
        self.fetch_field(metadata, "contact_id").await
    }

    /// Describes a remote method (`GET HelpMethod`), returning the whole
    /// descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownMethod`] if the answer is not a
    /// descriptor.
    pub async fn help_method(&self, name: &str) -> Result<MethodDescriptor> {
        self.describe(name)
            .await?
            .ok_or_else(|| crate::Error::UnknownMethod(HELP_METHOD.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = DispatchTable::with_defaults();
        assert_eq!(
            table.names(),
            vec!["contactInfos", "helpMethod", "listsAddcontact", "listsAll"]
        );
        assert!(!table.contains("userInfos"));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let table = DispatchTable::with_defaults();
        assert!(table.get("helpMETHOD").is_some());
        assert!(table.contains("LISTSALL"));
        assert!(table.names().contains(&"listsAddcontact"));
    }

    #[test]
    fn test_register_and_remove() {
        let mut table = DispatchTable::new();
        table.register("listsAll", lists_all_handler);
        assert!(table.get("listsAll").is_some());
        assert!(table.remove("listsall").is_some());
        assert!(table.get("listsAll").is_none());
    }
}
