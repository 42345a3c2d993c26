//! Generator options and package naming
//!
//! Output packages are derived from CLR namespaces. The default layout places every namespace
//! under the `dotnet` prefix; a package override, the skip-prefix flag and root packages change
//! that for the namespaces the user asks about.

use crate::error::ConfigError;
use std::collections::HashSet;
use std::path::PathBuf;

pub const DEFAULT_PACKAGE_PREFIX: &str = "dotnet";

/// How namespaces become packages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageOptions {
    /// Replaces the `dotnet` prefix for namespaces declared by the loaded assemblies
    pub package_override: Option<String>,
    /// Drop the `dotnet` prefix for namespaces declared by the loaded assemblies
    pub skip_prefix: bool,
    /// Lowercased packages that never receive the `dotnet` prefix
    pub root_packages: HashSet<String>,
}

/// Everything a generation run needs
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    pub output_dir: Option<PathBuf>,
    pub search_dirs: Vec<PathBuf>,
    pub assemblies: Vec<String>,
    pub packages: PackageOptions,
}

impl GeneratorOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(output_dir.into()),
            ..Self::default()
        }
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    pub fn with_assembly(mut self, name: impl Into<String>) -> Self {
        self.assemblies.push(name.into());
        self
    }

    /// Check required options, returning the output directory
    pub fn validate(&self) -> Result<&PathBuf, ConfigError> {
        let output_dir = self
            .output_dir
            .as_ref()
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or(ConfigError::MissingOutputDir)?;

        if self.assemblies.is_empty() {
            return Err(ConfigError::NoAssemblies);
        }

        Ok(output_dir)
    }
}

/// Maps namespaces to output packages
#[derive(Debug, Clone)]
pub struct PackageResolver {
    options: PackageOptions,
    local_namespaces: HashSet<String>,
}

impl PackageResolver {
    /// `local_namespaces` are the namespaces declared by the loaded assemblies
    pub fn new<I, S>(options: PackageOptions, local_namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let root_packages = options
            .root_packages
            .iter()
            .map(|package| package.to_lowercase())
            .collect();
        Self {
            options: PackageOptions {
                root_packages,
                ..options
            },
            local_namespaces: local_namespaces.into_iter().map(Into::into).collect(),
        }
    }

    /// Package for a namespace; empty when the namespace lands in the root package
    pub fn package_of(&self, namespace: &str) -> String {
        let lowered = namespace.to_lowercase();
        let is_local = self.local_namespaces.contains(namespace);

        if is_local {
            if let Some(package) = &self.options.package_override {
                return join_package(package, &lowered);
            }
            if self.options.skip_prefix {
                return lowered;
            }
        }

        if !lowered.is_empty() && self.options.root_packages.contains(&lowered) {
            return lowered;
        }

        join_package(DEFAULT_PACKAGE_PREFIX, &lowered)
    }

    /// Package path followed by a `.` separator, or nothing for the root package
    pub fn qualifier(&self, namespace: &str) -> String {
        let package = self.package_of(namespace);
        if package.is_empty() {
            package
        } else {
            package + "."
        }
    }
}

fn join_package(prefix: &str, lowered: &str) -> String {
    match (prefix.is_empty(), lowered.is_empty()) {
        (true, _) => lowered.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}.{lowered}"),
    }
}
