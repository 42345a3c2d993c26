//! Error types for the clrstub translator
//!
//! Following the miette patterns of the metadata crate for consistent error reporting.
//! Every error is terminal for the whole run.

use clrstub_metadata::LoadError;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid generator options, detected before any processing
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("You must specify an output folder")]
    #[diagnostic(
        code(clrstub::config::missing_output),
        help("Pass the directory the bindings are written to with `-o <dir>`")
    )]
    MissingOutputDir,

    #[error("You must specify at least one assembly to output")]
    #[diagnostic(
        code(clrstub::config::no_assemblies),
        help("List one or more assembly listings after the options")
    )]
    NoAssemblies,
}

/// Main generator error type
#[derive(Error, Diagnostic, Debug)]
pub enum GenerateError {
    #[error("Invalid configuration")]
    #[diagnostic(code(clrstub::generate::configuration))]
    Configuration(#[from] ConfigError),

    #[error("Unable to find assembly `{name}`")]
    #[diagnostic(
        code(clrstub::generate::input_resolution),
        help("Searched: {searched}")
    )]
    InputResolution { name: String, searched: String },

    #[error("Failed to load assembly metadata")]
    #[diagnostic(code(clrstub::generate::metadata_load))]
    MetadataLoad(
        #[source]
        #[diagnostic_source]
        LoadError,
    ),

    #[error("Malformed metadata for `{type_name}`: {reason}")]
    #[diagnostic(
        code(clrstub::generate::malformed_metadata),
        help("The metadata provider produced a type that violates a runtime invariant")
    )]
    MalformedMetadata { type_name: String, reason: String },

    #[error("Failed to write {}", path.display())]
    #[diagnostic(code(clrstub::generate::output))]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<LoadError> for GenerateError {
    fn from(error: LoadError) -> Self {
        match error {
            LoadError::NotFound { name, searched } => {
                GenerateError::InputResolution { name, searched }
            }
            other => GenerateError::MetadataLoad(other),
        }
    }
}

impl GenerateError {
    pub fn malformed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        GenerateError::MalformedMetadata {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

pub type GenerateResult<T> = Result<T, GenerateError>;
