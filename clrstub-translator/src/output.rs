//! Writing generated units below the output root

use crate::emitter::OutputUnit;
use crate::error::{GenerateError, GenerateResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub assemblies: usize,
    pub units_written: usize,
    pub companions: usize,
    pub files: Vec<PathBuf>,
}

/// Write every unit, creating directories as needed and replacing existing files
pub fn write_units(output_dir: &Path, units: &[OutputUnit]) -> GenerateResult<Vec<PathBuf>> {
    fs::create_dir_all(output_dir).map_err(|source| GenerateError::Output {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(units.len());
    for unit in units {
        let path = output_dir.join(&unit.relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| GenerateError::Output {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, &unit.contents).map_err(|source| GenerateError::Output {
            path: path.clone(),
            source,
        })?;
        tracing::trace!(path = %path.display(), "wrote unit");
        written.push(path);
    }

    Ok(written)
}
