use std::collections::BTreeSet;

use syn::{Item, UseTree};

use crate::SourceUnit;

/// Names every source unit depends on implicitly.
const PRELUDE: &str = "std::prelude";

/// Collects the names visible to a source unit.
///
/// The result holds the prelude, the unit's own module, the path of every imported item
/// (renamed imports keep their original path), the module of every glob import and every
/// `extern crate`. Relative `self::` and `super::` imports are resolved against the unit's module.
#[derive(Debug, Default, Clone, Copy)]
pub struct DependencyCollector;

impl DependencyCollector {
    /// Collects the dependencies of one unit.
    pub fn accept(&self, unit: &SourceUnit) -> BTreeSet<String> {
        let mut dependencies = BTreeSet::from([PRELUDE.to_string(), unit.module().to_string()]);
        let module: Vec<&str> = unit.module().split("::").collect();

        collect_items(&unit.file().items, &module, &mut dependencies);

        dependencies
    }
}

fn collect_items(items: &[Item], module: &[&str], dependencies: &mut BTreeSet<String>) {
    for item in items {
        match item {
            Item::Use(item) => {
                let mut paths = Vec::new();
                expand(&item.tree, Vec::new(), &mut paths);

                for path in paths {
                    if let Some(path) = resolve(module, &path) {
                        dependencies.insert(path);
                    }
                }
            }
            Item::ExternCrate(item) if item.ident != "self" => {
                dependencies.insert(item.ident.to_string());
            }
            Item::Mod(item) => {
                if let Some((_, items)) = &item.content {
                    let name = item.ident.to_string();
                    let mut nested = module.to_vec();
                    nested.push(&name);

                    collect_items(items, &nested, dependencies);
                }
            }
            _ => {}
        }
    }
}

/// Flattens a use tree into the paths it imports. A glob contributes the path it globs.
fn expand(tree: &UseTree, prefix: Vec<String>, paths: &mut Vec<Vec<String>>) {
    match tree {
        UseTree::Path(path) => {
            let mut prefix = prefix;
            prefix.push(path.ident.to_string());
            expand(&path.tree, prefix, paths);
        }
        UseTree::Name(name) => paths.push(leaf(prefix, name.ident.to_string())),
        UseTree::Rename(rename) => paths.push(leaf(prefix, rename.ident.to_string())),
        UseTree::Glob(_) => paths.push(prefix),
        UseTree::Group(group) => {
            for tree in &group.items {
                expand(tree, prefix.clone(), paths);
            }
        }
    }
}

/// `use a::b::{self}` imports `a::b` itself.
fn leaf(mut prefix: Vec<String>, name: String) -> Vec<String> {
    if name != "self" || prefix.is_empty() {
        prefix.push(name);
    }

    prefix
}

/// Resolves `self::` and `super::` against the module the import appears in.
fn resolve(module: &[&str], path: &[String]) -> Option<String> {
    let supers = path.iter().take_while(|segment| *segment == "super").count();

    let (mut resolved, rest): (Vec<&str>, &[String]) = match path.first().map(String::as_str) {
        None => return None,
        Some("self") => (module.to_vec(), &path[1..]),
        Some("super") => {
            let keep = module.len().saturating_sub(supers).max(1);
            (module[..keep].to_vec(), &path[supers..])
        }
        Some(_) => (Vec::new(), path),
    };

    resolved.extend(rest.iter().map(String::as_str));

    (!resolved.is_empty()).then(|| resolved.join("::"))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn collect(module: &str, source: &str) -> Vec<String> {
        let unit = SourceUnit::parse(module, source).unwrap();
        DependencyCollector.accept(&unit).into_iter().collect()
    }

    #[test]
    fn collects_imports() {
        let dependencies = collect(
            "myapp",
            indoc! {r#"
                use trellis::App;
                use std::collections::*;
                use l1::Type;
                use l1::*;

                pub struct Application(App);
            "#},
        );

        insta::assert_debug_snapshot!(dependencies, @r#"
        [
            "l1",
            "l1::Type",
            "myapp",
            "std::collections",
            "std::prelude",
            "trellis::App",
        ]
        "#);
    }

    #[test]
    fn expands_groups_and_renames() {
        let dependencies = collect(
            "crate",
            indoc! {r#"
                use std::{collections::{BTreeMap, HashMap as Map}, sync::*};
                use axum::routing::{self, get};
                extern crate serde as json;
                extern crate self as myself;
            "#},
        );

        insta::assert_debug_snapshot!(dependencies, @r#"
        [
            "axum::routing",
            "axum::routing::get",
            "crate",
            "serde",
            "std::collections::BTreeMap",
            "std::collections::HashMap",
            "std::prelude",
            "std::sync",
        ]
        "#);
    }

    #[test]
    fn resolves_relative_imports() {
        let dependencies = collect(
            "crate::routes::users",
            indoc! {r#"
                use self::model::User;
                use super::Pagination;
                use super::super::config::*;
                use crate::error::Error;

                mod model {
                    use super::helpers::format;
                }
            "#},
        );

        insta::assert_debug_snapshot!(dependencies, @r#"
        [
            "crate::config",
            "crate::error::Error",
            "crate::routes::Pagination",
            "crate::routes::users",
            "crate::routes::users::helpers::format",
            "crate::routes::users::model::User",
            "std::prelude",
        ]
        "#);
    }

    #[test]
    fn unit_without_imports() {
        assert_eq!(collect("crate", "fn main() {}"), ["crate", "std::prelude"]);
    }
}
