//! Declaration emitter
//!
//! Serializes one public top-level type, its public nested types and an optional static
//! companion into a single Haxe module.

use crate::error::{GenerateError, GenerateResult};
use crate::mapping::{EmitContext, Position, TypeMapper};
use crate::method_groups::{method_attributes, MethodGroup, MethodGroupBuilder};
use crate::universe::{TypeId, TypeUniverse};
use crate::visibility::{ArityMatch, VisibilityResolver};
use clrstub_metadata::{Event, Method, Property, TypeEntity, TypeName, TypeRef};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Types that map onto Haxe built-ins and never get a declaration of their own
pub const BUILTIN_TYPES: [&str; 2] = ["System.Type", "System.String"];

/// One generated module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    /// Runtime name of the top-level type
    pub type_name: String,
    pub package: String,
    /// Path relative to the output root
    pub relative_path: PathBuf,
    pub contents: String,
    pub companions: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct DeclarationEmitter<'a> {
    universe: &'a TypeUniverse<'a>,
    mapper: TypeMapper<'a>,
    visibility: VisibilityResolver<'a>,
    groups: MethodGroupBuilder<'a>,
}

impl<'a> DeclarationEmitter<'a> {
    pub fn new(universe: &'a TypeUniverse<'a>, mapper: TypeMapper<'a>) -> Self {
        Self {
            universe,
            mapper,
            visibility: VisibilityResolver::new(universe),
            groups: MethodGroupBuilder::new(universe, mapper),
        }
    }

    /// Whether a type gets its own output unit
    pub fn is_emitted(&self, id: TypeId) -> bool {
        let entry = self.universe.entry(id);
        entry.declaring.is_none()
            && entry.is_public()
            && !BUILTIN_TYPES.contains(&entry.name.lookup_name().as_str())
    }

    pub fn emit_unit(&self, id: TypeId) -> GenerateResult<OutputUnit> {
        let name = &self.universe.entry(id).name;
        let package = self.mapper.packages().package_of(&name.namespace);
        let simple = self.mapper.names().declared_name(id);

        let mut contents = if package.is_empty() {
            "package;\n\n".to_string()
        } else {
            format!("package {package};\n\n")
        };
        let ctx = EmitContext::new(&name.namespace, name);
        let companions = self.emit_type(id, &ctx, &mut contents)?;

        let mut relative_path: PathBuf = name
            .namespace
            .to_lowercase()
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect();
        relative_path.push(format!("{simple}.hx"));

        tracing::debug!(
            type_name = %name,
            path = %relative_path.display(),
            companions,
            "emitted declaration unit"
        );

        Ok(OutputUnit {
            type_name: name.lookup_name(),
            package,
            relative_path,
            contents,
            companions,
        })
    }

    /// Emit a type and its nested types, returning the number of companions written
    fn emit_type(&self, id: TypeId, ctx: &EmitContext<'_>, out: &mut String) -> GenerateResult<usize> {
        let entity = self.universe.entity(id);
        if entity.is_enum() {
            self.emit_enum(id, ctx, out)?;
            return Ok(0);
        }

        let mut companions = 0;
        for nested in self.universe.public_nested(id) {
            companions += self.emit_type(nested, ctx, out)?;
        }

        let simple = self.mapper.names().declared_name(id);
        let native = self.universe.entry(id).name.base_key();

        out.push_str(&format!("@:native(\"{native}\")"));
        if entity.is_sealed && !entity.is_interface() {
            out.push_str(" @:final");
        }
        out.push('\n');

        let keyword = if entity.is_interface() { "interface" } else { "class" };
        let _ = writeln!(
            out,
            "extern {keyword} {simple}{}{} {{",
            generic_params(&entity.generic_params),
            self.inheritance_clause(entity, ctx)
        );

        self.emit_events(entity, ctx, out)?;
        if !entity.is_interface() {
            self.emit_fields(entity, ctx, out);
            self.emit_properties(id, entity, ctx, out);
        }

        let methods = self.groups.build(id, ctx);
        write_groups(&methods.primary, out);
        out.push_str("}\n\n");

        if let Some(statics) = &methods.companion {
            tracing::debug!(type_name = %native, "emitting static companion");
            let _ = writeln!(out, "@:native(\"{native}\") @:final");
            let _ = writeln!(out, "extern class {simple}_Static {{");
            write_groups(statics, out);
            out.push_str("}\n\n");
            companions += 1;
        }

        Ok(companions)
    }

    fn emit_enum(&self, id: TypeId, ctx: &EmitContext<'_>, out: &mut String) -> GenerateResult<()> {
        let entry = self.universe.entry(id);
        let entity = entry.entity;

        let storage = entity
            .fields
            .iter()
            .find(|field| !field.is_static)
            .ok_or_else(|| GenerateError::malformed(entry.name.lookup_name(), "enum has no instance storage field"))?;

        let _ = writeln!(
            out,
            "@:fakeEnum({}) @:native(\"{}\")",
            self.mapper.map(&storage.field_type, ctx, Position::General),
            entry.name.base_key()
        );
        let _ = writeln!(out, "extern enum {} {{", self.mapper.names().declared_name(id));
        for tag in entity
            .fields
            .iter()
            .filter(|field| field.is_static && !field.is_special_name)
        {
            let _ = writeln!(out, "  {};", tag.name);
        }
        out.push_str("}\n\n");
        Ok(())
    }

    fn inheritance_clause(&self, entity: &TypeEntity, ctx: &EmitContext<'_>) -> String {
        let mut clause = String::new();
        if let Some(base) = &entity.base_type {
            clause.push_str(" extends ");
            clause.push_str(&self.mapper.map(base, ctx, Position::Exact));
        }

        let relation = if entity.is_interface() { "extends" } else { "implements" };
        for interface in &entity.interfaces {
            let visible = self
                .universe
                .resolve(interface)
                .map_or(true, |id| self.universe.entry(id).is_public());
            if visible {
                let _ = write!(clause, " {relation} {}", self.mapper.map(interface, ctx, Position::Exact));
            }
        }
        clause
    }

    fn emit_events(&self, entity: &TypeEntity, ctx: &EmitContext<'_>, out: &mut String) -> GenerateResult<()> {
        for event in &entity.events {
            let Some(adder) = accessor(entity, event.adder) else {
                continue;
            };
            if !adder.is_public() {
                continue;
            }
            let Some((argument, arity)) = self.event_argument(event)? else {
                continue;
            };

            let class = if arity == 1 { "NativeEvent1" } else { "NativeEvent" };
            let _ = writeln!(
                out,
                "  public {}var {}(default,null) : {}<{}>;",
                if adder.is_static { "static " } else { "" },
                member_name(&event.name),
                self.mapper.map_nominal(&TypeName::new("System", class), None, ctx),
                self.mapper.map(&argument, ctx, Position::General)
            );
        }
        Ok(())
    }

    /// Argument type and parameter count of the handler's invocation contract
    fn event_argument(&self, event: &Event) -> GenerateResult<Option<(TypeRef, usize)>> {
        let Some(handler_id) = self.universe.resolve(&event.handler_type) else {
            return Ok(None);
        };
        let handler = self.universe.entity(handler_id);
        let invoke = handler.invoke_method().ok_or_else(|| {
            GenerateError::malformed(
                self.universe.entry(handler_id).name.lookup_name(),
                format!("delegate used by event `{}` has no Invoke method", event.name),
            )
        })?;

        let arity = invoke.arity();
        let argument = match invoke.params.as_slice() {
            [only] => &only.param_type,
            [_, second] => &second.param_type,
            _ => return Ok(None),
        };

        let argument = match (argument, &event.handler_type) {
            (TypeRef::GenericParam { name, .. }, TypeRef::GenericInstance { arguments, .. }) => handler
                .generic_params
                .iter()
                .position(|param| param == name)
                .and_then(|idx| arguments.get(idx))
                .unwrap_or(argument),
            _ => argument,
        };

        Ok(Some((argument.clone(), arity)))
    }

    fn emit_fields(&self, entity: &TypeEntity, ctx: &EmitContext<'_>, out: &mut String) {
        for field in entity.fields.iter().filter(|field| field.visibility.is_public()) {
            let _ = writeln!(
                out,
                "  public {}var {} : {};",
                if field.is_static { "static " } else { "" },
                field.name,
                self.mapper.map(&field.field_type, ctx, Position::Exact)
            );
        }
    }

    fn emit_properties(&self, id: TypeId, entity: &TypeEntity, ctx: &EmitContext<'_>, out: &mut String) {
        for property in entity.properties.iter().filter(|property| !property.is_indexer()) {
            if let Some(line) = self.property_line(id, entity, property, ctx) {
                out.push_str(&line);
            }
        }
    }

    fn property_line(
        &self,
        id: TypeId,
        entity: &TypeEntity,
        property: &Property,
        ctx: &EmitContext<'_>,
    ) -> Option<String> {
        let getter = accessor(entity, property.getter);
        let setter = accessor(entity, property.setter);

        let inherited = |method: Option<&Method>| {
            method.map_or(true, |method| {
                self.visibility
                    .visible_ancestor_method(id, method, ArityMatch::Any)
                    .is_some()
            })
        };
        if inherited(getter) && inherited(setter) {
            return None;
        }

        let exposed = |method: Option<&Method>| {
            method.is_some_and(|method| method.is_public() && !self.visibility.is_hidden_override(id, method))
        };
        if !exposed(getter) && !exposed(setter) {
            return None;
        }

        let attributes = method_attributes(entity, getter.or(setter)?, false);
        let readable = getter.is_some_and(Method::is_public);
        let writable = setter.is_some_and(Method::is_public);
        let property_type = self.mapper.map(&property.property_type, ctx, Position::Exact);
        let name = member_name(&property.name);

        Some(if readable && writable {
            format!("  {attributes}var {name} : {property_type};\n")
        } else {
            format!(
                "  {attributes}var {name}({},{}) : {property_type};\n",
                access(readable),
                access(writable)
            )
        })
    }
}

fn accessor(entity: &TypeEntity, index: Option<usize>) -> Option<&Method> {
    index.and_then(|index| entity.method(index))
}

fn access(allowed: bool) -> &'static str {
    if allowed {
        "default"
    } else {
        "never"
    }
}

/// Member name without interface qualification
fn member_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn generic_params(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(","))
    }
}

fn write_groups(groups: &[MethodGroup<'_>], out: &mut String) {
    for group in groups {
        let Some(canonical) = group.canonical() else {
            continue;
        };
        out.push('\n');
        for overload in group.overloads() {
            let _ = writeln!(out, "  @:overload(function{} {{}})", overload.signature);
        }
        let _ = writeln!(
            out,
            "  {}function {}{};",
            canonical.attributes, group.key, canonical.signature
        );
    }
}
