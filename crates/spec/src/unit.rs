use std::path::{Component, Path};

use crate::SpecError;

/// A parsed source file and the module path it is compiled as.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    module: String,
    file: syn::File,
}

impl SourceUnit {
    /// Parses a unit from its source text.
    pub fn parse(module: impl Into<String>, source: &str) -> Result<Self, SpecError> {
        let module = module.into();

        let file = syn::parse_file(source).map_err(|source| SpecError::Parse {
            module: module.clone(),
            source,
        })?;

        Ok(Self { module, file })
    }

    /// Reads and parses `path`, deriving the module path from its location below `root`.
    pub fn read(root: &Path, path: &Path) -> Result<Self, SpecError> {
        let source = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let relative = path.strip_prefix(root).unwrap_or(path);

        Self::parse(module_path(relative), &source)
    }

    /// The module path, e.g. `crate::routes`.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The syntax tree.
    pub fn file(&self) -> &syn::File {
        &self.file
    }
}

/// The module path of a source file relative to the crate's source root.
///
/// `lib.rs` and `main.rs` are the crate root, `a/mod.rs` and `a.rs` are `crate::a`.
pub fn module_path(relative: &Path) -> String {
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if let Some(last) = segments.pop() {
        let stem = last.strip_suffix(".rs").unwrap_or(&last);

        let is_root = segments.is_empty() && matches!(stem, "lib" | "main");

        if stem != "mod" && !is_root {
            segments.push(stem.to_string());
        }
    }

    std::iter::once("crate".to_string()).chain(segments).collect::<Vec<_>>().join("::")
}
