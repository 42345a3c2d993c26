//! Method groups
//!
//! Haxe has one function per name with `@:overload` alternatives, while the CLR allows any number
//! of same-named methods and lets static and instance members share a name. Methods are grouped
//! by exposed name; static groups move to a companion declaration when they would collide with
//! an instance name anywhere in the hierarchy.

use crate::mapping::{EmitContext, Position, TypeMapper};
use crate::universe::{TypeId, TypeUniverse};
use crate::visibility::{MethodResolution, VisibilityResolver};
use clrstub_metadata::{Method, TypeEntity};
use indexmap::IndexMap;
use std::cmp::Reverse;
use std::collections::HashSet;

pub const CONSTRUCTOR_KEY: &str = "new";

#[derive(Debug, Clone, PartialEq)]
pub struct MethodEntry<'a> {
    pub attributes: String,
    /// `(params) : Return`
    pub signature: String,
    pub source: &'a Method,
    pub is_forced_ancestor: bool,
}

impl MethodEntry<'_> {
    pub fn arity(&self) -> usize {
        self.source.arity()
    }
}

/// All emitted signatures sharing one exposed name. The last entry is canonical.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodGroup<'a> {
    pub key: String,
    pub entries: Vec<MethodEntry<'a>>,
}

impl<'a> MethodGroup<'a> {
    pub fn canonical(&self) -> Option<&MethodEntry<'a>> {
        self.entries.last()
    }

    /// Non-canonical overload forms
    pub fn overloads(&self) -> &[MethodEntry<'a>] {
        match self.entries.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    fn finish(key: String, mut entries: Vec<MethodEntry<'a>>) -> Self {
        if entries.iter().any(|entry| entry.is_forced_ancestor) {
            // Stable: derived entries keep their order after the forced ones
            entries.sort_by_key(|entry| !entry.is_forced_ancestor);
        } else {
            entries.sort_by(|a, b| {
                (Reverse(a.arity()), &a.signature).cmp(&(Reverse(b.arity()), &b.signature))
            });
        }

        // The canonical entry always survives; a forced ancestor form stays even when
        // it renders the same as the canonical one
        let Some(canonical) = entries.pop() else {
            return Self { key, entries };
        };
        let mut seen = HashSet::new();
        entries.retain(|entry| {
            (entry.is_forced_ancestor || entry.signature != canonical.signature)
                && seen.insert(entry.signature.clone())
        });
        entries.push(canonical);

        Self { key, entries }
    }
}

/// Method groups of one type, split between the primary and companion declarations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMethods<'a> {
    pub primary: Vec<MethodGroup<'a>>,
    /// Static-only groups, present when a static name collides with an instance name
    pub companion: Option<Vec<MethodGroup<'a>>>,
}

impl TypeMethods<'_> {
    pub fn requires_companion(&self) -> bool {
        self.companion.is_some()
    }
}

type DraftTable<'a> = IndexMap<String, Vec<MethodEntry<'a>>>;

#[derive(Debug, Clone, Copy)]
pub struct MethodGroupBuilder<'a> {
    universe: &'a TypeUniverse<'a>,
    visibility: VisibilityResolver<'a>,
    mapper: TypeMapper<'a>,
}

impl<'a> MethodGroupBuilder<'a> {
    pub fn new(universe: &'a TypeUniverse<'a>, mapper: TypeMapper<'a>) -> Self {
        Self {
            universe,
            visibility: VisibilityResolver::new(universe),
            mapper,
        }
    }

    pub fn build(&self, id: TypeId, ctx: &EmitContext<'_>) -> TypeMethods<'a> {
        let entity = self.universe.entity(id);
        let mut instance: DraftTable<'a> = IndexMap::new();
        let mut statics: DraftTable<'a> = IndexMap::new();

        for method in &entity.methods {
            let forced_ancestor = match self.visibility.resolve(id, method) {
                MethodResolution::Ineligible => continue,
                MethodResolution::Hidden => {
                    tracing::trace!(method = %method.name, "hidden by ancestor declaration");
                    continue;
                }
                MethodResolution::Emit => None,
                MethodResolution::Forced { ancestor } => {
                    tracing::trace!(
                        method = %method.name,
                        ancestor = %self.universe.entry(ancestor.declaring).name,
                        "keeping ancestor signature as forced overload"
                    );
                    Some(ancestor.method)
                }
            };

            let attributes = method_attributes(entity, method, forced_ancestor.is_some());
            let table = if method.is_static && !method.is_constructor {
                &mut statics
            } else {
                &mut instance
            };
            let entries = table.entry(group_key(entity, method)).or_default();

            if let Some(ancestor) = forced_ancestor {
                entries.push(MethodEntry {
                    attributes: attributes.clone(),
                    signature: self.signature(ancestor, ctx),
                    source: ancestor,
                    is_forced_ancestor: true,
                });
            }
            entries.push(MethodEntry {
                attributes,
                signature: self.signature(method, ctx),
                source: method,
                is_forced_ancestor: false,
            });
        }

        let instance_names = &self.universe.closure(id).instance_names;
        // Keys of statics on generic types carry the type parameters and never collide
        let collision = statics
            .keys()
            .find(|key| instance_names.contains(*key) || instance.contains_key(*key))
            .cloned();

        match collision {
            Some(name) => {
                tracing::debug!(
                    type_name = %self.universe.entry(id).name,
                    method = %name,
                    "static method collides with instance method; using companion declaration"
                );
                TypeMethods {
                    primary: finish_groups(instance),
                    companion: Some(finish_groups(statics)),
                }
            }
            None => {
                for (key, entries) in statics {
                    instance.entry(key).or_default().extend(entries);
                }
                TypeMethods {
                    primary: finish_groups(instance),
                    companion: None,
                }
            }
        }
    }

    /// `(params) : Return` for a method, with the method's own generic parameters in scope
    pub fn signature(&self, method: &Method, ctx: &EmitContext<'_>) -> String {
        let ctx = ctx.in_method(&method.generic_params);
        let params = self.mapper.parameters(&method.params, &ctx);
        let return_type = if method.is_constructor {
            "Void".to_string()
        } else {
            self.mapper.map(&method.return_type, &ctx, Position::General)
        };
        format!("({params}) : {return_type}")
    }
}

fn finish_groups(table: DraftTable<'_>) -> Vec<MethodGroup<'_>> {
    let mut table = table;
    table.sort_keys();
    table
        .into_iter()
        .map(|(key, entries)| MethodGroup::finish(key, entries))
        .collect()
}

/// Exposed name, with the type's parameters appended for statics on generic types
fn group_key(entity: &TypeEntity, method: &Method) -> String {
    if method.is_constructor {
        return CONSTRUCTOR_KEY.to_string();
    }
    let name = method.exposed_name();
    if method.is_static && !entity.generic_params.is_empty() {
        format!("{name}<{}>", entity.generic_params.join(","))
    } else {
        name.to_string()
    }
}

pub fn method_attributes(entity: &TypeEntity, method: &Method, is_override: bool) -> String {
    let mut attributes = String::new();
    if method.is_public() && !entity.is_interface() {
        attributes.push_str("public ");
    }
    if method.is_static {
        attributes.push_str("static ");
    }
    if is_override && !method.is_static && !method.is_constructor {
        attributes.push_str("override ");
    }
    attributes
}
