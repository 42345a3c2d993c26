//! Type expression mapping
//!
//! Converts usage-site type references into Haxe type syntax. Mapping is a pure function of the
//! reference, the emission context and the position the type appears in.

use crate::naming::NameResolver;
use crate::options::PackageResolver;
use clrstub_metadata::{GenericOwner, Parameter, TypeName, TypeRef};
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

lazy_static! {
    // Field, property, generic argument, array element and inheritance positions
    static ref EXACT_TYPES: HashMap<&'static str, &'static str> = HashMap::from([
        ("System.String", "String"),
        ("System.Boolean", "Bool"),
        ("System.Single", "Single"),
        ("System.Double", "Float"),
        ("System.Int32", "Int"),
        ("System.UInt32", "UInt"),
        ("System.Type", "cs.system.Type"),
    ]);

    // Parameter and return positions
    static ref GENERAL_TYPES: HashMap<&'static str, &'static str> = HashMap::from([
        ("System.Void", "Void"),
        ("System.Object", "Dynamic"),
        ("System.String", "String"),
        ("System.Boolean", "Bool"),
        ("System.Single", "Float"),
        ("System.Double", "Float"),
        ("System.SByte", "Int"),
        ("System.Int16", "Int"),
        ("System.Int32", "Int"),
        ("System.UInt16", "UInt"),
        ("System.UInt32", "UInt"),
        ("System.Type", "cs.system.Type"),
    ]);

    static ref HAXE_KEYWORDS: HashSet<&'static str> = HashSet::from([
        "function", "class", "static", "var", "if", "else", "while", "do", "for", "break",
        "return", "continue", "extends", "implements", "import", "switch", "case", "default",
        "private", "public", "try", "catch", "new", "this", "throw", "extern", "enum", "in",
        "interface", "untyped", "cast", "override", "typedef", "dynamic", "package", "callback",
        "inline", "using",
    ]);
}

/// Where a type expression appears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Exact,
    General,
}

/// What the emitter is currently inside of
#[derive(Debug, Clone, Copy)]
pub struct EmitContext<'c> {
    pub namespace: &'c str,
    pub top_level: &'c TypeName,
    pub method_generics: &'c [String],
}

impl<'c> EmitContext<'c> {
    pub fn new(namespace: &'c str, top_level: &'c TypeName) -> Self {
        Self {
            namespace,
            top_level,
            method_generics: &[],
        }
    }

    pub fn in_method(self, method_generics: &'c [String]) -> Self {
        Self {
            method_generics,
            ..self
        }
    }

    fn is_method_generic(&self, reference: &TypeRef) -> bool {
        match reference {
            TypeRef::GenericParam {
                name,
                owner: GenericOwner::Method,
            } => self.method_generics.iter().any(|param| param == name),
            _ => false,
        }
    }
}

/// Haxe reserved words cannot name parameters
pub fn is_reserved_word(name: &str) -> bool {
    HAXE_KEYWORDS.contains(name)
}

pub fn parameter_name(name: &str) -> String {
    if is_reserved_word(name) {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    names: NameResolver<'a>,
    packages: &'a PackageResolver,
}

impl<'a> TypeMapper<'a> {
    pub fn new(names: NameResolver<'a>, packages: &'a PackageResolver) -> Self {
        Self { names, packages }
    }

    pub fn names(&self) -> &NameResolver<'a> {
        &self.names
    }

    pub fn packages(&self) -> &PackageResolver {
        self.packages
    }

    pub fn map(&self, reference: &TypeRef, ctx: &EmitContext<'_>, position: Position) -> String {
        match reference {
            TypeRef::GenericParam { .. } if ctx.is_method_generic(reference) => "Dynamic".to_string(),
            TypeRef::GenericParam { name, .. } => name.clone(),
            TypeRef::Indirect { element, .. } => self.map(element, ctx, position),
            TypeRef::Array { element, rank } => {
                if ctx.is_method_generic(element) {
                    return self.map_nominal(&TypeName::new("System", "Array"), None, ctx);
                }
                let element = self.map(element, ctx, Position::Exact);
                if *rank > 1 {
                    format!("cs.NativeArray{rank}<{element}>")
                } else {
                    format!("cs.NativeArray<{element}>")
                }
            }
            TypeRef::Primitive(kind) => match builtin(&kind.canonical_name(), position) {
                Some(builtin) => builtin.to_string(),
                None => self.map_nominal(&kind.type_name(), None, ctx),
            },
            TypeRef::Named(name) => match builtin(&name.lookup_name(), position) {
                Some(builtin) => builtin.to_string(),
                None => self.map_nominal(name, None, ctx),
            },
            TypeRef::GenericInstance {
                definition,
                arguments,
            } => self.map_instance(definition, arguments, ctx),
        }
    }

    fn map_instance(&self, definition: &TypeName, arguments: &[TypeRef], ctx: &EmitContext<'_>) -> String {
        if arguments.iter().any(|argument| ctx.is_method_generic(argument)) {
            return match element_contract(definition, arguments.len()) {
                Some(contract) => self.map_nominal(&contract, None, ctx),
                None => "Dynamic".to_string(),
            };
        }

        let arguments: Vec<String> = arguments
            .iter()
            .map(|argument| self.map(argument, ctx, Position::Exact))
            .collect();
        format!(
            "{}<{}>",
            self.map_nominal(definition, Some(arguments.len()), ctx),
            arguments.join(",")
        )
    }

    /// Qualified simple name of a declaration
    pub fn map_nominal(&self, name: &TypeName, instantiation_arity: Option<usize>, ctx: &EmitContext<'_>) -> String {
        let simple = self.names.simple_name(name, instantiation_arity);
        let foreign_namespace = name.namespace != ctx.namespace;

        if name.is_nested() {
            let top_level = name.top_level();
            if top_level.lookup_name() == ctx.top_level.lookup_name() {
                return simple;
            }
            let module = self.names.simple_name(&top_level, None);
            if foreign_namespace {
                format!("{}{module}.{simple}", self.packages.qualifier(&name.namespace))
            } else {
                format!("{module}.{simple}")
            }
        } else if foreign_namespace {
            format!("{}{simple}", self.packages.qualifier(&name.namespace))
        } else {
            simple
        }
    }

    /// `name:Type` pairs joined by `, `
    pub fn parameters(&self, params: &[Parameter], ctx: &EmitContext<'_>) -> String {
        params
            .iter()
            .map(|param| {
                let mapped = self.map(&param.param_type, ctx, Position::General);
                let wrapped = if param.is_out {
                    format!("cs.Out<{mapped}>")
                } else if param.is_by_ref() {
                    format!("cs.Ref<{mapped}>")
                } else {
                    mapped
                };
                format!("{}:{wrapped}", parameter_name(&param.name))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn builtin(canonical: &str, position: Position) -> Option<&'static str> {
    let table = match position {
        Position::Exact => &*EXACT_TYPES,
        Position::General => &*GENERAL_TYPES,
    };
    table.get(canonical).copied()
}

/// Non-generic base of a single-argument element contract
fn element_contract(definition: &TypeName, arity: usize) -> Option<TypeName> {
    if arity != 1 || definition.is_nested() {
        return None;
    }
    match (definition.namespace.as_str(), definition.base_name()) {
        ("System.Collections.Generic", "IEnumerable") => {
            Some(TypeName::new("System.Collections", "IEnumerable"))
        }
        ("System.Collections.Generic", "IComparer") => {
            Some(TypeName::new("System.Collections", "IComparer"))
        }
        ("System", "IComparable") => Some(TypeName::new("System", "IComparable")),
        _ => None,
    }
}
