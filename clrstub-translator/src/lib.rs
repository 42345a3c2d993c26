//! clrstub translator
//!
//! Turns the public surface of CLR assemblies into Haxe `extern` declarations.
//!
//! ## Pipeline
//!
//! - **Discovery**: every loaded type enters the `TypeUniverse`, hierarchy closures are
//!   precomputed and the `NameRegistry` records generic families
//! - **Emission**: each public top-level type is rendered independently (in parallel) by the
//!   `DeclarationEmitter`, using the `NameResolver`, `TypeMapper`, `VisibilityResolver` and
//!   `MethodGroupBuilder`
//! - **Output**: units are written below the output root, replacing previous runs

pub mod emitter;
pub mod error;
pub mod mapping;
pub mod method_groups;
pub mod naming;
pub mod options;
pub mod output;
pub mod universe;
pub mod visibility;

pub use emitter::{DeclarationEmitter, OutputUnit};
pub use error::{ConfigError, GenerateError, GenerateResult};
pub use mapping::{EmitContext, Position, TypeMapper};
pub use method_groups::{MethodEntry, MethodGroup, MethodGroupBuilder, TypeMethods};
pub use naming::{NameRegistry, NameResolver};
pub use options::{GeneratorOptions, PackageOptions, PackageResolver};
pub use output::{write_units, GenerationSummary};
pub use universe::{TypeId, TypeUniverse};
pub use visibility::{MethodResolution, VisibilityResolver};

use clrstub_metadata::{Assembly, AssemblyLoader};
use rayon::prelude::*;

/// Translate loaded assemblies into output units, in input order
pub fn translate(assemblies: &[Assembly], packages: &PackageOptions) -> GenerateResult<Vec<OutputUnit>> {
    let universe = TypeUniverse::build(assemblies);
    let registry = NameRegistry::build(&universe);
    let package_resolver = PackageResolver::new(packages.clone(), universe.namespaces());

    let names = NameResolver::new(&universe, &registry);
    let mapper = TypeMapper::new(names, &package_resolver);
    let emitter = DeclarationEmitter::new(&universe, mapper);

    let roots: Vec<TypeId> = universe
        .top_level_public()
        .into_iter()
        .filter(|&id| emitter.is_emitted(id))
        .collect();

    tracing::debug!(
        types = universe.len(),
        families = registry.len(),
        units = roots.len(),
        "discovery complete"
    );

    roots.par_iter().map(|&id| emitter.emit_unit(id)).collect()
}

/// Run the whole pipeline: validate, load, translate and write
pub fn generate(options: &GeneratorOptions) -> GenerateResult<GenerationSummary> {
    let output_dir = options.validate()?;

    let loader = AssemblyLoader::with_search_dirs(options.search_dirs.iter().cloned());
    let assemblies = loader.load_all(&options.assemblies)?;

    let units = translate(&assemblies, &options.packages)?;
    let files = write_units(output_dir, &units)?;

    let summary = GenerationSummary {
        assemblies: assemblies.len(),
        units_written: files.len(),
        companions: units.iter().map(|unit| unit.companions).sum(),
        files,
    };

    tracing::info!(
        assemblies = summary.assemblies,
        units = summary.units_written,
        companions = summary.companions,
        output = %output_dir.display(),
        "generation complete"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests;
