//! Assembly loading over a list of search directories
//!
//! An assembly identifier is either an absolute path to a listing file or a file name that is
//! probed in every search directory. When several directories contain the file, the last one
//! wins.

use crate::error::LoadError;
use crate::model::Assembly;
use crate::parser::ListingParser;
use std::fs;
use std::path::{Path, PathBuf};

/// Locates and parses assembly listings
#[derive(Debug, Clone, Default)]
pub struct AssemblyLoader {
    search_dirs: Vec<PathBuf>,
}

impl AssemblyLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add_search_dir(&mut self, dir: impl Into<PathBuf>) {
        self.search_dirs.push(dir.into());
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Find the listing file for an assembly identifier
    pub fn resolve(&self, name: &str) -> Result<PathBuf, LoadError> {
        let direct = Path::new(name);
        if direct.is_absolute() {
            return if direct.exists() {
                Ok(direct.to_path_buf())
            } else {
                Err(self.not_found(name))
            };
        }

        self.search_dirs
            .iter()
            .map(|dir| dir.join(name))
            .filter(|candidate| candidate.is_file())
            .last()
            .ok_or_else(|| self.not_found(name))
    }

    /// Resolve, read and parse a single assembly
    pub fn load(&self, name: &str) -> Result<Assembly, LoadError> {
        let path = self.resolve(name)?;
        let source = fs::read_to_string(&path).map_err(|source| LoadError::Unreadable {
            path: path.clone(),
            source,
        })?;

        let assembly =
            ListingParser::parse_listing_with_source(&source, Some(path.display().to_string()))
                .map_err(|source| LoadError::Malformed {
                    path: path.clone(),
                    source,
                })?;

        tracing::info!(
            assembly = %assembly.name,
            path = %path.display(),
            types = assembly.types.len(),
            "loaded assembly"
        );
        Ok(assembly)
    }

    /// Load every named assembly, failing on the first error
    pub fn load_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Assembly>, LoadError> {
        names.iter().map(|name| self.load(name.as_ref())).collect()
    }

    fn not_found(&self, name: &str) -> LoadError {
        let searched = if self.search_dirs.is_empty() {
            "no search directories".to_string()
        } else {
            self.search_dirs
                .iter()
                .map(|dir| dir.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        LoadError::NotFound {
            name: name.to_string(),
            searched,
        }
    }
}
