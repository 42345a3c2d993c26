// clrstub Metadata Error Handling
// Listing syntax errors and assembly loading failures with miette integration

use crate::parser::Rule;
use miette::{Diagnostic, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing an assembly listing
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("Listing syntax error: {message}")]
    #[diagnostic(
        code(clrstub::listing::syntax),
        help("Check the listing syntax near the highlighted location")
    )]
    Syntax {
        #[source_code]
        src: String,
        #[label("error occurred here")]
        span: SourceSpan,
        message: String,
    },

    #[error("Unexpected grammar rule")]
    #[diagnostic(
        code(clrstub::listing::unexpected_rule),
        help("Expected rule: {expected}")
    )]
    UnexpectedRule {
        expected: String,
        found: Option<Rule>,
        #[label("found here")]
        span: Option<SourceSpan>,
    },

    #[error("Duplicate {kind} accessor on `{member}`")]
    #[diagnostic(
        code(clrstub::listing::duplicate_accessor),
        help("Each accessor kind may appear at most once per property or event")
    )]
    DuplicateAccessor {
        member: String,
        kind: String,
        #[label("repeated accessor")]
        span: SourceSpan,
    },

    #[error("`{accessor}` is not a valid accessor for a {member_kind}")]
    #[diagnostic(
        code(clrstub::listing::invalid_accessor),
        help("Properties take `get`/`set`, events take `add`/`remove`")
    )]
    InvalidAccessor {
        accessor: String,
        member_kind: String,
        #[label("invalid accessor")]
        span: SourceSpan,
    },
}

impl ParseError {
    /// Create a parse error from a Pest parsing error
    pub fn from_pest_error(error: pest::error::Error<Rule>, src: String) -> Self {
        let span = match error.location {
            pest::error::InputLocation::Pos(pos) => SourceSpan::new(pos.into(), 1),
            pest::error::InputLocation::Span((start, end)) => {
                SourceSpan::new(start.into(), end - start)
            }
        };

        let message = match &error.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
                let expected: Vec<&str> = positives.iter().map(rule_description).collect();
                format!("expected {}", expected.join(" or "))
            }
            pest::error::ErrorVariant::ParsingError { .. } => "unexpected input".to_string(),
            pest::error::ErrorVariant::CustomError { message } => message.clone(),
        };

        ParseError::Syntax { src, span, message }
    }

    pub fn unexpected_rule(expected: &str, found: Option<Rule>, span: Option<SourceSpan>) -> Self {
        ParseError::UnexpectedRule {
            expected: expected.to_string(),
            found,
            span,
        }
    }
}

/// Human readable description of a grammar rule for error messages
fn rule_description(rule: &Rule) -> &'static str {
    match rule {
        Rule::identifier => "an identifier",
        Rule::dotted_name => "a dotted name",
        Rule::type_path | Rule::named_type => "a type name",
        Rule::type_ref => "a type reference",
        Rule::type_kind => "`class`, `interface` or `enum`",
        Rule::modifier | Rule::modifiers => "a modifier",
        Rule::kw_assembly => "`assembly`",
        Rule::kw_namespace => "`namespace`",
        Rule::kw_field => "`field`",
        Rule::kw_property => "`property`",
        Rule::kw_event => "`event`",
        Rule::kw_method => "`method`",
        Rule::kw_ctor => "`ctor`",
        Rule::type_decl => "a type declaration",
        Rule::param | Rule::param_list => "a parameter list",
        Rule::accessor_decl | Rule::accessor_kind => "an accessor",
        Rule::generic_args | Rule::generic_params => "generic arguments",
        Rule::EOI => "end of input",
        _ => "valid listing syntax",
    }
}

/// Errors raised while locating and reading assemblies
#[derive(Error, Diagnostic, Debug)]
pub enum LoadError {
    #[error("Unable to find assembly `{name}`")]
    #[diagnostic(
        code(clrstub::load::not_found),
        help("Searched: {searched}. Add the directory containing it with `-i`")
    )]
    NotFound { name: String, searched: String },

    #[error("Error loading assembly {}", path.display())]
    #[diagnostic(code(clrstub::load::unreadable))]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed assembly listing {}", path.display())]
    #[diagnostic(code(clrstub::load::malformed))]
    Malformed {
        path: PathBuf,
        #[source]
        #[diagnostic_source]
        source: ParseError,
    },
}

pub type ParseResult<T> = Result<T, ParseError>;
