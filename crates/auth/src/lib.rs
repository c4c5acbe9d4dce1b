//! Authentication filter chain for Trellis.
//!
//! A request is authenticated by an [`AuthFilter`]:
//! - the client named by the request (or the filter's own clients) is resolved from the [`Clients`] registry
//! - a profile already bound to the request's session is read back from the [`ProfileStore`]
//! - otherwise the client extracts [`Credentials`] and resolves a [`UserProfile`] from them
//!
//! The resolved profile is seeded into the [`RequestAttributes`] under every [`ProfileType`] it satisfies.

#![deny(missing_docs)]

mod action;
mod attributes;
mod authenticator;
mod client;
mod clients;
mod context;
mod credentials;
mod error;
mod filter;
mod finder;
mod profile;
mod store;

pub use action::HttpAction;
pub use attributes::RequestAttributes;
pub use authenticator::{Authenticator, StaticAuthenticator};
pub use client::{BasicAuthClient, Client, ClientKind, FormClient, HeaderClient, ParameterClient};
pub use clients::Clients;
pub use context::{HttpWebContext, WebContext};
pub use credentials::Credentials;
pub use error::{AuthError, ClientError, RegistryError, StoreError};
pub use filter::AuthFilter;
pub use finder::{ClientFinder, DefaultClientFinder};
pub use profile::{ProfileType, UserProfile};
pub use store::{InMemoryProfileStore, ProfileStore};

/// Request attribute holding the identifier of the profile bound to the session.
pub const AUTH_ID: &str = "auth.id";
