//! API specification extraction from Rust sources.
//!
//! Source files are parsed with `syn` into [`SourceUnit`]s. The [`DependencyCollector`] lists the
//! names each unit depends on, the [`RouteCollector`] lists the routes it registers, and
//! [`ApiSpec`] assembles both for a whole source tree.

#![deny(missing_docs)]

mod api;
mod dependencies;
mod error;
mod routes;
mod unit;

pub use api::ApiSpec;
pub use dependencies::DependencyCollector;
pub use error::SpecError;
pub use routes::{RouteCollector, RouteSpec};
pub use unit::{SourceUnit, module_path};
