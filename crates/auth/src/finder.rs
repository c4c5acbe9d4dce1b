use std::sync::Arc;

use crate::{Client, Clients, WebContext};

/// Selects the clients able to handle a request.
pub trait ClientFinder: Send + Sync {
    /// Returns the clients matching a comma-separated list of client names, in the order the
    /// names are given. An empty result means no client matches.
    fn find(&self, clients: &Clients, context: &dyn WebContext, names: &str) -> Vec<Arc<dyn Client>>;
}

/// Matches client names against the registry exactly, ignoring blanks and repeated names.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultClientFinder;

impl ClientFinder for DefaultClientFinder {
    fn find(&self, clients: &Clients, _context: &dyn WebContext, names: &str) -> Vec<Arc<dyn Client>> {
        let mut found: Vec<Arc<dyn Client>> = Vec::new();

        for name in names.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            if found.iter().any(|client| client.name() == name) {
                continue;
            }

            match clients.find_by_name(name) {
                Some(client) => found.push(client.clone()),
                None => log::debug!("No registered client is named '{name}'"),
            }
        }

        found
    }
}
