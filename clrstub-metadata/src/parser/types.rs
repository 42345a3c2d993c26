// Type reference parsing module
// Handles generic parameters, arrays, indirections and (generic) nominal references

use crate::error::*;
use crate::model::*;
use crate::parser::{ListingParser, Rule};
use pest::iterators::Pair;

impl ListingParser {
    /// Parse a type reference: an atom followed by array/byref/pointer suffixes
    pub(crate) fn parse_type_reference(pair: Pair<Rule>) -> ParseResult<TypeRef> {
        let mut inner = pair.into_inner();
        let atom = inner
            .next()
            .ok_or_else(|| ParseError::unexpected_rule("type atom", None, None))?;

        let mut ty = match atom.as_rule() {
            Rule::method_generic => TypeRef::method_param(Self::generic_param_name(atom)?),
            Rule::type_generic => TypeRef::type_param(Self::generic_param_name(atom)?),
            Rule::named_type => Self::parse_named_type(atom)?,
            _ => return Err(Self::unexpected_rule_from_pair(&atom, "type reference")),
        };

        for suffix in inner {
            ty = match suffix.as_rule() {
                Rule::array_suffix => {
                    let commas = suffix.as_str().chars().filter(|c| *c == ',').count();
                    TypeRef::array_of(ty, commas as u32 + 1)
                }
                Rule::byref_suffix => TypeRef::Indirect {
                    kind: Indirection::ByRef,
                    element: Box::new(ty),
                },
                Rule::pointer_suffix => TypeRef::Indirect {
                    kind: Indirection::Pointer,
                    element: Box::new(ty),
                },
                _ => return Err(Self::unexpected_rule_from_pair(&suffix, "type suffix")),
            };
        }

        Ok(ty)
    }

    fn generic_param_name(pair: Pair<Rule>) -> ParseResult<String> {
        let mut inner = pair.into_inner();
        Ok(Self::expect_pair(&mut inner, Rule::identifier)?
            .as_str()
            .to_string())
    }

    fn parse_named_type(pair: Pair<Rule>) -> ParseResult<TypeRef> {
        let mut inner = pair.into_inner();
        let path = Self::expect_pair(&mut inner, Rule::type_path)?;
        let name = Self::parse_type_path(path.as_str());

        match inner.next() {
            Some(args) if args.as_rule() == Rule::generic_args => {
                let arguments = args
                    .into_inner()
                    .map(Self::parse_type_reference)
                    .collect::<ParseResult<Vec<_>>>()?;
                Ok(TypeRef::generic(name, arguments))
            }
            Some(other) => Err(Self::unexpected_rule_from_pair(&other, "generic arguments")),
            None if name.is_nested() => Ok(TypeRef::Named(name)),
            None => Ok(TypeRef::named(&name.lookup_name())),
        }
    }

    /// Split ``Ns.Outer`1/Inner`` into namespace, enclosing chain and name
    pub(crate) fn parse_type_path(path: &str) -> TypeName {
        let mut segments = path.split('/');
        let top = TypeName::parse_dotted(segments.next().unwrap_or_default());
        segments.fold(top, |name, nested| name.nested(nested))
    }
}
