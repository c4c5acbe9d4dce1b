use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use serde::Serialize;
use walkdir::WalkDir;

use crate::{DependencyCollector, RouteCollector, RouteSpec, SourceUnit, SpecError};

/// The API description of a source tree: its routes and the dependencies of every module.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ApiSpec {
    /// Registered routes, ordered by module then source position.
    pub routes: Vec<RouteSpec>,
    /// Dependencies per module path.
    pub dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl ApiSpec {
    /// Parses every `.rs` file below `root`.
    pub fn from_dir(root: &Path) -> Result<Self, SpecError> {
        if !root.is_dir() {
            return Err(SpecError::Io {
                path: root.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }

        let mut units = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_file() || path.extension().is_none_or(|extension| extension != "rs") {
                continue;
            }

            log::debug!("Parsing {}", path.display());
            units.push(SourceUnit::read(root, path)?);
        }

        Ok(Self::from_units(&units))
    }

    /// Assembles the description of already parsed units.
    pub fn from_units(units: &[SourceUnit]) -> Self {
        let mut spec = Self::default();

        for unit in units {
            spec.routes.extend(RouteCollector.accept(unit));

            spec.dependencies
                .entry(unit.module().to_string())
                .or_default()
                .extend(DependencyCollector.accept(unit));
        }

        spec.routes
            .sort_by(|left, right| (&left.module, left.line).cmp(&(&right.module, right.line)));

        spec
    }
}
