//! Collision-free simple names for declared types
//!
//! Output declarations live in a flattened scope: generic families that differ only by arity
//! share one base name, and nested types are lifted next to their owner. The registry records
//! every public type under its arity-stripped key so the resolver can tell when a digit suffix
//! is required.

use crate::universe::{TypeId, TypeUniverse};
use clrstub_metadata::{TypeName, TypeRef};
use indexmap::IndexMap;

/// Public types grouped by base key (namespace, enclosing path and base name, arity stripped)
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    families: IndexMap<String, Vec<TypeId>>,
}

impl NameRegistry {
    pub fn build(universe: &TypeUniverse<'_>) -> Self {
        let mut families: IndexMap<String, Vec<TypeId>> = IndexMap::new();
        for id in universe.ids() {
            let entry = universe.entry(id);
            if entry.is_public() {
                families.entry(entry.name.base_key()).or_default().push(id);
            }
        }
        Self { families }
    }

    pub fn family(&self, key: &str) -> &[TypeId] {
        self.families.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when more than one public type shares the base key
    pub fn is_ambiguous(&self, key: &str) -> bool {
        self.family(key).len() > 1
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    universe: &'a TypeUniverse<'a>,
    registry: &'a NameRegistry,
}

impl<'a> NameResolver<'a> {
    pub fn new(universe: &'a TypeUniverse<'a>, registry: &'a NameRegistry) -> Self {
        Self { universe, registry }
    }

    /// Simple name of a type reference; `None` for references with no declaration name
    pub fn simple_name_of(&self, reference: &TypeRef) -> Option<String> {
        match reference {
            TypeRef::GenericInstance {
                definition,
                arguments,
            } => Some(self.simple_name(definition, Some(arguments.len()))),
            other => other.type_name().map(|name| self.simple_name(&name, None)),
        }
    }

    /// Simple name of a declaration, or of a closed instantiation with `instantiation_arity`
    /// arguments
    pub fn simple_name(&self, name: &TypeName, instantiation_arity: Option<usize>) -> String {
        let mut simple = match name.declaring() {
            Some(declaring) => self.simple_name(&declaring, None) + "_",
            None => String::new(),
        };
        simple.push_str(name.base_name());

        if self.registry.is_ambiguous(&name.base_key()) {
            let arity = instantiation_arity.or_else(|| {
                self.universe
                    .lookup(name)
                    .map(|id| self.universe.entity(id).generic_arity())
            });
            if let Some(arity) = arity.filter(|&arity| arity > 0) {
                simple.push_str(&arity.to_string());
            }
        }

        simple
    }

    /// Simple name of a declared type in the universe
    pub fn declared_name(&self, id: TypeId) -> String {
        self.simple_name(&self.universe.entry(id).name, None)
    }
}
