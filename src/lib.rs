//! # mailjet - a client for the Mailjet v0.1 HTTP API
//!
//! Remote methods are named `category + Method` (`userInfos`,
//! `listsAddcontact`, ...). This crate lets you call them three ways:
//! typed shortcuts for the common ones, dynamic calls by category and method
//! name, and raw GET/POST requests by method path.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailjet::{Category, Client, Params};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailjet::Error> {
//!     let client = Client::builder()
//!         .api_key_secret("my-key", "my-secret")
//!         .build()?;
//!
//!     // Typed shortcut: skips introspection, returns `contact_id`
//!     let contact_id = client.lists_add_contact("a@example.com", 42, true).await?;
//!     println!("Contact id: {}", contact_id);
//!
//!     // Dynamic call: the verb is learned from `HelpMethod`
//!     let infos = client.category("user")?.call("infos", Params::new()).await?;
//!     if infos["status"] == "OK" {
//!         println!("{}", infos["infos"]);
//!     }
//!
//!     // Explicit category, no handle
//!     let report = client
//!         .invoke(Category::Report, "emailsent", Params::new().with("limit", 10))
//!         .await?;
//!     println!("{}", report);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Dispatch
//!
//! A dynamic call resolves as follows:
//!
//! 1. the fully-qualified name is looked up in the client's
//!    [`DispatchTable`]; a registered shortcut answers directly;
//! 2. otherwise `HelpMethod?name=<method>` is queried for the verb, and the
//!    method is called with `GET` or `POST`; its decoded payload is returned
//!    unmodified.
//!
//! Verb lookups can be memoized with [`ClientBuilder::cache_descriptors`].
//!
//! ## Error Handling
//!
//! ```no_run
//! use mailjet::{Client, Error, Params};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::new("key", "secret")?;
//! match client.category("contact")?.call("infos", Params::new().with("contact", "a@example.com")).await {
//!     Ok(payload) => println!("{}", payload),
//!     Err(Error::RemoteRequest { status, raw_response, .. }) => {
//!         eprintln!("HTTP error {}: {}", status, raw_response);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Transport
//!
//! Requests go through the [`Transport`] trait. The default
//! [`ReqwestTransport`] sends credentials as basic auth, GET parameters in
//! the query string and POST parameters as a form body. Supply your own with
//! [`ClientBuilder::transport`].

mod category;
mod client;
pub mod config;
mod error;
pub mod introspect;
pub mod metadata;
pub mod params;
mod response;
pub mod shortcuts;
pub mod transport;

pub use category::Category;
pub use client::{Client, ClientBuilder, MethodCall, Scope, OUTPUT_FORMAT, OUTPUT_PARAM};
pub use config::{Credentials, Endpoint};
pub use error::{Error, Result};
pub use introspect::{MethodDescriptor, MethodInfo};
pub use metadata::Verb;
pub use params::{ParamValue, Params};
pub use response::Response;
pub use shortcuts::{DispatchTable, Handler};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportRequest, TransportResponse};
