// clrstub Metadata Library
// Read-only CLR type metadata model plus the listing parser and loader that provide it

pub mod error;
pub mod loader;
pub mod model;
pub mod parser;

pub use error::*;
pub use loader::AssemblyLoader;
pub use model::*;
pub use parser::ListingParser;

// Re-export parser rule for manual testing
pub use parser::Rule;

/// Parse an assembly listing held in memory
pub fn parse_listing(input: &str) -> Result<Assembly, ParseError> {
    ListingParser::parse_listing(input)
}

pub fn parse_listing_with_source(
    input: &str,
    source_file: Option<String>,
) -> Result<Assembly, ParseError> {
    ListingParser::parse_listing_with_source(input, source_file)
}

/// Parse a single type reference in listing syntax
pub fn parse_type_ref(input: &str) -> Result<TypeRef, ParseError> {
    ListingParser::parse_type_ref(input)
}

#[cfg(test)]
mod tests;
