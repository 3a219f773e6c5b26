//! Module path resolution for generated `use` statements

use super::helpers::TemplateHelpers;
use std::path::Path;
use tracing::debug;

/// Resolves output directories to Rust module paths
///
/// A directory such as `src/dao` becomes `<root>::dao`, where the root is
/// the configured module root or the working directory's base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePathResolver {
    root: String,
}

impl ModulePathResolver {
    /// Resolver anchored at an explicit module root
    ///
    /// # Examples
    ///
    /// ```
    /// # use daogen::codegen::ModulePathResolver;
    /// let resolver = ModulePathResolver::new("my-app");
    /// assert_eq!(resolver.module_path("src/models"), "my_app::models");
    /// ```
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self {
            root: segments(root).join("::"),
        }
    }

    /// Resolver anchored at the base name of `dir`
    #[must_use]
    pub fn from_working_dir(dir: &Path) -> Self {
        let base = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(&base)
    }

    /// Configured root, or the working directory's base name when empty
    #[must_use]
    pub fn from_config(module_root: &str, working_dir: &Path) -> Self {
        if module_root.trim().is_empty() {
            Self::from_working_dir(working_dir)
        } else {
            Self::new(module_root)
        }
    }

    /// The module root, possibly empty
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Module path of an output directory
    ///
    /// An empty directory resolves to the root alone.
    #[must_use]
    pub fn module_path(&self, dir: &str) -> String {
        let mut parts: Vec<String> = Vec::new();
        if !self.root.is_empty() {
            parts.push(self.root.clone());
        }
        let mut dir_segments = segments(dir);
        if dir_segments.first().is_some_and(|s| s == "src") {
            dir_segments.remove(0);
        }
        parts.extend(dir_segments);
        let path = parts.join("::");
        debug!(dir, module = %path, "resolved module path");
        path
    }

    /// Module name of an output directory: its last segment, or `default`
    ///
    /// # Examples
    ///
    /// ```
    /// # use daogen::codegen::ModulePathResolver;
    /// assert_eq!(ModulePathResolver::module_name("src/persistence/dao", "dao"), "dao");
    /// assert_eq!(ModulePathResolver::module_name("", "models"), "models");
    /// ```
    #[must_use]
    pub fn module_name(dir: &str, default: &str) -> String {
        segments(dir)
            .pop()
            .unwrap_or_else(|| default.to_string())
    }
}

/// Join a module path with an item path
#[must_use]
pub fn join_path(module: &str, item: &str) -> String {
    if module.is_empty() {
        item.to_string()
    } else {
        format!("{module}::{item}")
    }
}

fn segments(dir: &str) -> Vec<String> {
    dir.split(['/', '\\'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(TemplateHelpers::to_module_segment)
        .collect()
}
