// Declaration parsing module
// Handles type declarations and their fields, properties, events, constructors and methods

use crate::error::*;
use crate::model::*;
use crate::parser::{DeclarationScope, ListingParser, Rule};
use pest::iterators::Pair;

/// Modifier keywords collected ahead of a declaration
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Modifiers {
    visibility: Option<Visibility>,
    is_static: bool,
    is_sealed: bool,
    is_virtual: bool,
    is_operator: bool,
    is_special_name: bool,
}

impl Modifiers {
    fn visibility_or(&self, default: Visibility) -> Visibility {
        self.visibility.unwrap_or(default)
    }

    /// Accessor modifiers fall back to those of the owning property or event
    fn inherit(self, owner: Modifiers) -> Modifiers {
        Modifiers {
            visibility: self.visibility.or(owner.visibility),
            is_static: self.is_static || owner.is_static,
            is_sealed: self.is_sealed || owner.is_sealed,
            is_virtual: self.is_virtual || owner.is_virtual,
            is_operator: false,
            is_special_name: self.is_special_name || owner.is_special_name,
        }
    }
}

impl ListingParser {
    pub(crate) fn parse_modifiers(pair: Pair<Rule>) -> Modifiers {
        let mut modifiers = Modifiers::default();
        for modifier in pair.into_inner() {
            match modifier.as_str() {
                "public" => modifiers.visibility = Some(Visibility::Public),
                "private" => modifiers.visibility = Some(Visibility::Private),
                "protected" => modifiers.visibility = Some(Visibility::Protected),
                "internal" => modifiers.visibility = Some(Visibility::Internal),
                "static" => modifiers.is_static = true,
                "sealed" => modifiers.is_sealed = true,
                "virtual" => modifiers.is_virtual = true,
                "operator" => modifiers.is_operator = true,
                "specialname" => modifiers.is_special_name = true,
                _ => {}
            }
        }
        modifiers
    }

    /// Parse a type declaration and, recursively, its nested types
    pub(crate) fn parse_type_decl(
        pair: Pair<Rule>,
        scope: &DeclarationScope,
    ) -> ParseResult<TypeEntity> {
        let span = Self::span_from_pair(&pair);
        let mut inner = pair.into_inner();

        let modifiers = Self::parse_modifiers(Self::expect_pair(&mut inner, Rule::modifiers)?);
        let kind = match Self::expect_pair(&mut inner, Rule::type_kind)?.as_str() {
            "interface" => TypeKind::Interface,
            "enum" => TypeKind::Enum,
            _ => TypeKind::Class,
        };
        let name = Self::expect_pair(&mut inner, Rule::identifier)?
            .as_str()
            .to_string();

        let mut entity = TypeEntity::new(scope.namespace.clone(), name.clone(), kind);
        entity.enclosing = scope.enclosing.clone();
        entity.visibility = modifiers.visibility_or(Visibility::Internal);
        // Static classes are abstract and sealed; enums are always sealed
        entity.is_sealed = modifiers.is_sealed || modifiers.is_static || kind == TypeKind::Enum;
        entity.span = span;

        let nested_scope = scope.nested_in(&name);

        for part in inner {
            match part.as_rule() {
                Rule::generic_params => {
                    entity.generic_params = Self::parse_generic_params(part);
                }
                Rule::extends_clause => {
                    let mut clause = part.into_inner();
                    Self::expect_pair(&mut clause, Rule::kw_extends)?;
                    let base = Self::expect_pair(&mut clause, Rule::type_ref)?;
                    entity.base_type = Some(Self::parse_type_reference(base)?);
                }
                Rule::implements_clause => {
                    for itf in part.into_inner() {
                        if itf.as_rule() == Rule::type_ref {
                            entity.interfaces.push(Self::parse_type_reference(itf)?);
                        }
                    }
                }
                Rule::type_decl => {
                    let nested = Self::parse_type_decl(part, &nested_scope)?;
                    entity.nested_types.push(nested);
                }
                Rule::field_decl => entity.fields.push(Self::parse_field(part)?),
                Rule::property_decl => Self::parse_property(part, &mut entity)?,
                Rule::event_decl => Self::parse_event(part, &mut entity)?,
                Rule::ctor_decl => entity.methods.push(Self::parse_constructor(part)?),
                Rule::method_decl => entity.methods.push(Self::parse_method(part)?),
                _ => return Err(Self::unexpected_rule_from_pair(&part, "member declaration")),
            }
        }

        Ok(entity)
    }

    fn parse_generic_params(pair: Pair<Rule>) -> Vec<String> {
        pair.into_inner()
            .map(|param| param.as_str().to_string())
            .collect()
    }

    fn parse_field(pair: Pair<Rule>) -> ParseResult<Field> {
        let span = Self::span_from_pair(&pair);
        let mut inner = pair.into_inner();
        let modifiers = Self::parse_modifiers(Self::expect_pair(&mut inner, Rule::modifiers)?);
        Self::expect_pair(&mut inner, Rule::kw_field)?;
        let name = Self::expect_pair(&mut inner, Rule::identifier)?.as_str().to_string();
        let field_type = Self::parse_type_reference(Self::expect_pair(&mut inner, Rule::type_ref)?)?;

        Ok(Field {
            name,
            field_type,
            visibility: modifiers.visibility_or(Visibility::Private),
            is_static: modifiers.is_static,
            is_special_name: modifiers.is_special_name,
            span,
        })
    }

    /// Parse a property, synthesizing tagged `get_`/`set_` accessor methods on the owner
    fn parse_property(pair: Pair<Rule>, owner: &mut TypeEntity) -> ParseResult<()> {
        let span = Self::span_from_pair(&pair);
        let mut inner = pair.into_inner();
        let modifiers = Self::parse_modifiers(Self::expect_pair(&mut inner, Rule::modifiers)?);
        Self::expect_pair(&mut inner, Rule::kw_property)?;
        let name = Self::expect_pair(&mut inner, Rule::dotted_name)?.as_str().to_string();
        let property_type =
            Self::parse_type_reference(Self::expect_pair(&mut inner, Rule::type_ref)?)?;

        let mut property = Property {
            name: name.clone(),
            property_type: property_type.clone(),
            getter: None,
            setter: None,
            index_params: Vec::new(),
            span,
        };

        for part in inner {
            match part.as_rule() {
                Rule::index_params => {
                    property.index_params = part
                        .into_inner()
                        .map(Self::parse_param)
                        .collect::<ParseResult<Vec<_>>>()?;
                }
                Rule::accessor_block => {
                    for accessor in part.into_inner() {
                        let accessor_span = Self::source_span(&accessor);
                        let (kind, accessor_modifiers) = Self::parse_accessor(accessor)?;
                        let (accessor_kind, prefix) = match kind.as_str() {
                            "get" => (AccessorKind::Getter, "get_"),
                            "set" => (AccessorKind::Setter, "set_"),
                            _ => {
                                return Err(ParseError::InvalidAccessor {
                                    accessor: kind.clone(),
                                    member_kind: "property".to_string(),
                                    span: accessor_span,
                                });
                            }
                        };
                        let slot = if accessor_kind == AccessorKind::Getter {
                            &mut property.getter
                        } else {
                            &mut property.setter
                        };
                        if slot.is_some() {
                            return Err(ParseError::DuplicateAccessor {
                                member: name.clone(),
                                kind,
                                span: accessor_span,
                            });
                        }

                        let mut method = Method::new(accessor_method_name(prefix, &name));
                        Self::apply_accessor_modifiers(&mut method, accessor_modifiers.inherit(modifiers));
                        method.accessor = accessor_kind;
                        method.span = span;
                        method.params = property.index_params.clone();
                        if accessor_kind == AccessorKind::Getter {
                            method.return_type = property_type.clone();
                        } else {
                            method.params.push(Parameter::new("value", property_type.clone()));
                        }

                        *slot = Some(owner.methods.len());
                        owner.methods.push(method);
                    }
                }
                _ => return Err(Self::unexpected_rule_from_pair(&part, "property accessors")),
            }
        }

        owner.properties.push(property);
        Ok(())
    }

    /// Parse an event, synthesizing tagged `add_`/`remove_` accessor methods on the owner
    fn parse_event(pair: Pair<Rule>, owner: &mut TypeEntity) -> ParseResult<()> {
        let span = Self::span_from_pair(&pair);
        let mut inner = pair.into_inner();
        let modifiers = Self::parse_modifiers(Self::expect_pair(&mut inner, Rule::modifiers)?);
        Self::expect_pair(&mut inner, Rule::kw_event)?;
        let name = Self::expect_pair(&mut inner, Rule::dotted_name)?.as_str().to_string();
        let handler_type = Self::parse_type_reference(Self::expect_pair(&mut inner, Rule::type_ref)?)?;
        let block = Self::expect_pair(&mut inner, Rule::accessor_block)?;

        let mut event = Event {
            name: name.clone(),
            handler_type: handler_type.clone(),
            adder: None,
            remover: None,
            span,
        };

        for accessor in block.into_inner() {
            let accessor_span = Self::source_span(&accessor);
            let (kind, accessor_modifiers) = Self::parse_accessor(accessor)?;
            let (accessor_kind, prefix) = match kind.as_str() {
                "add" => (AccessorKind::Adder, "add_"),
                "remove" => (AccessorKind::Remover, "remove_"),
                _ => {
                    return Err(ParseError::InvalidAccessor {
                        accessor: kind.clone(),
                        member_kind: "event".to_string(),
                        span: accessor_span,
                    });
                }
            };
            let slot = if accessor_kind == AccessorKind::Adder {
                &mut event.adder
            } else {
                &mut event.remover
            };
            if slot.is_some() {
                return Err(ParseError::DuplicateAccessor {
                    member: name.clone(),
                    kind,
                    span: accessor_span,
                });
            }

            let mut method = Method::new(accessor_method_name(prefix, &name));
            Self::apply_accessor_modifiers(&mut method, accessor_modifiers.inherit(modifiers));
            method.accessor = accessor_kind;
            method.span = span;
            method.params.push(Parameter::new("value", handler_type.clone()));

            *slot = Some(owner.methods.len());
            owner.methods.push(method);
        }

        owner.events.push(event);
        Ok(())
    }

    fn parse_accessor(pair: Pair<Rule>) -> ParseResult<(String, Modifiers)> {
        let mut inner = pair.into_inner();
        let kind = Self::expect_pair(&mut inner, Rule::accessor_kind)?.as_str().to_string();
        let modifiers = Self::parse_modifiers(Self::expect_pair(&mut inner, Rule::modifiers)?);
        Ok((kind, modifiers))
    }

    fn apply_accessor_modifiers(method: &mut Method, modifiers: Modifiers) {
        method.visibility = modifiers.visibility_or(Visibility::Private);
        method.is_static = modifiers.is_static;
        method.is_virtual = modifiers.is_virtual;
    }

    fn parse_constructor(pair: Pair<Rule>) -> ParseResult<Method> {
        let span = Self::span_from_pair(&pair);
        let mut inner = pair.into_inner();
        let modifiers = Self::parse_modifiers(Self::expect_pair(&mut inner, Rule::modifiers)?);
        Self::expect_pair(&mut inner, Rule::kw_ctor)?;
        let params = Self::parse_param_list(Self::expect_pair(&mut inner, Rule::param_list)?)?;

        let mut method = Method::new(if modifiers.is_static { ".cctor" } else { ".ctor" });
        method.visibility = modifiers.visibility_or(Visibility::Private);
        method.is_static = modifiers.is_static;
        method.is_constructor = true;
        method.params = params;
        method.span = span;
        Ok(method)
    }

    fn parse_method(pair: Pair<Rule>) -> ParseResult<Method> {
        let span = Self::span_from_pair(&pair);
        let mut inner = pair.into_inner();
        let modifiers = Self::parse_modifiers(Self::expect_pair(&mut inner, Rule::modifiers)?);
        Self::expect_pair(&mut inner, Rule::kw_method)?;
        let name = Self::expect_pair(&mut inner, Rule::dotted_name)?.as_str().to_string();

        let mut method = Method::new(name);
        method.visibility = modifiers.visibility_or(Visibility::Private);
        method.is_static = modifiers.is_static;
        method.is_virtual = modifiers.is_virtual;
        method.is_operator = modifiers.is_operator;
        method.span = span;

        for part in inner {
            match part.as_rule() {
                Rule::generic_params => method.generic_params = Self::parse_generic_params(part),
                Rule::param_list => method.params = Self::parse_param_list(part)?,
                Rule::type_ref => method.return_type = Self::parse_type_reference(part)?,
                _ => return Err(Self::unexpected_rule_from_pair(&part, "method signature")),
            }
        }

        Ok(method)
    }

    fn parse_param_list(pair: Pair<Rule>) -> ParseResult<Vec<Parameter>> {
        pair.into_inner().map(Self::parse_param).collect()
    }

    fn parse_param(pair: Pair<Rule>) -> ParseResult<Parameter> {
        let mut is_out = false;
        let mut is_by_ref_mode = false;
        let mut name = String::new();
        let mut param_type = None;

        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::param_mode => {
                    is_by_ref_mode = true;
                    is_out = part.as_str() == "out";
                }
                Rule::identifier => name = part.as_str().to_string(),
                Rule::type_ref => param_type = Some(Self::parse_type_reference(part)?),
                _ => return Err(Self::unexpected_rule_from_pair(&part, "parameter")),
            }
        }

        let mut param_type =
            param_type.ok_or_else(|| ParseError::unexpected_rule("parameter type", None, None))?;
        // `ref`/`out` parameters are by-reference even when the `&` suffix is left off
        if is_by_ref_mode && !matches!(param_type, TypeRef::Indirect { kind: Indirection::ByRef, .. }) {
            param_type = TypeRef::by_ref(param_type);
        }
        Ok(Parameter {
            name,
            param_type,
            is_out,
        })
    }
}

/// Accessor name for a possibly interface-qualified member: `I.P` gives `I.get_P`
fn accessor_method_name(prefix: &str, member: &str) -> String {
    match member.rfind('.') {
        Some(idx) => format!("{}.{}{}", &member[..idx], prefix, &member[idx + 1..]),
        None => format!("{prefix}{member}"),
    }
}
