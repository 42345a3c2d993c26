// clrstub Listing Parser
// Pest-based parser turning an assembly listing into the metadata model

use crate::error::*;
use crate::model::*;
use miette::SourceSpan;
use pest::iterators::{Pair, Pairs};
use pest::Parser;

mod members;
mod types;

#[derive(pest_derive::Parser)]
#[grammar = "listing.pest"]
pub struct ListingParser;

/// Where a type declaration sits: namespace plus enclosing raw names
#[derive(Debug, Clone, Default)]
pub(crate) struct DeclarationScope {
    pub namespace: String,
    pub enclosing: Vec<String>,
}

impl DeclarationScope {
    fn nested_in(&self, name: &str) -> Self {
        let mut enclosing = self.enclosing.clone();
        enclosing.push(name.to_string());
        Self {
            namespace: self.namespace.clone(),
            enclosing,
        }
    }
}

impl ListingParser {
    /// Parse a complete assembly listing
    pub fn parse_listing(input: &str) -> ParseResult<Assembly> {
        Self::parse_listing_with_source(input, None)
    }

    /// Parse a complete assembly listing, remembering the file it came from
    pub fn parse_listing_with_source(
        input: &str,
        source_file: Option<String>,
    ) -> ParseResult<Assembly> {
        let mut pairs = Self::parse(Rule::listing, input)
            .map_err(|e| ParseError::from_pest_error(e, input.to_string()))?;
        let listing = Self::expect_pair(&mut pairs, Rule::listing)?;

        let mut assembly = Assembly::new(String::new());
        assembly.source_file = source_file;

        for pair in listing.into_inner() {
            match pair.as_rule() {
                Rule::assembly_decl => {
                    let mut inner = pair.into_inner();
                    Self::expect_pair(&mut inner, Rule::kw_assembly)?;
                    assembly.name = Self::expect_pair(&mut inner, Rule::dotted_name)?
                        .as_str()
                        .to_string();
                }
                Rule::namespace_block => {
                    let types = Self::parse_namespace_block(pair)?;
                    assembly.types.extend(types);
                }
                Rule::EOI => {}
                _ => return Err(Self::unexpected_rule_from_pair(&pair, "namespace block")),
            }
        }

        Ok(assembly)
    }

    /// Parse a standalone type reference such as ``System.Collections.Generic.List`1<!!T>[]``
    pub fn parse_type_ref(input: &str) -> ParseResult<TypeRef> {
        // Offsets below are relative to the trimmed text, so it is also the diagnostic source
        let input = input.trim();
        let mut pairs = Self::parse(Rule::type_ref, input)
            .map_err(|e| ParseError::from_pest_error(e, input.to_string()))?;
        let pair = Self::expect_pair(&mut pairs, Rule::type_ref)?;
        if pair.as_str().len() != input.len() {
            let end = pair.as_span().end();
            return Err(ParseError::Syntax {
                src: input.to_string(),
                span: SourceSpan::new(end.into(), input.len() - end),
                message: "trailing input after type reference".to_string(),
            });
        }
        Self::parse_type_reference(pair)
    }

    fn parse_namespace_block(pair: Pair<Rule>) -> ParseResult<Vec<TypeEntity>> {
        let mut scope = DeclarationScope::default();
        let mut types = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::kw_namespace => {}
                Rule::dotted_name => scope.namespace = inner.as_str().to_string(),
                Rule::type_decl => types.push(Self::parse_type_decl(inner, &scope)?),
                _ => return Err(Self::unexpected_rule_from_pair(&inner, "type declaration")),
            }
        }

        Ok(types)
    }

    pub(crate) fn span_from_pair(pair: &Pair<Rule>) -> Span {
        let span = pair.as_span();
        Span::new(span.start(), span.end())
    }

    pub(crate) fn source_span(pair: &Pair<Rule>) -> SourceSpan {
        let span = pair.as_span();
        SourceSpan::new(span.start().into(), span.end() - span.start())
    }

    /// Take the next pair, requiring it to match `rule`
    pub(crate) fn expect_pair<'i>(pairs: &mut Pairs<'i, Rule>, rule: Rule) -> ParseResult<Pair<'i, Rule>> {
        match pairs.next() {
            Some(pair) if pair.as_rule() == rule => Ok(pair),
            Some(pair) => Err(Self::unexpected_rule_from_pair(&pair, &format!("{rule:?}"))),
            None => Err(ParseError::unexpected_rule(&format!("{rule:?}"), None, None)),
        }
    }

    pub(crate) fn unexpected_rule_from_pair(pair: &Pair<Rule>, expected: &str) -> ParseError {
        ParseError::unexpected_rule(expected, Some(pair.as_rule()), Some(Self::source_span(pair)))
    }
}
