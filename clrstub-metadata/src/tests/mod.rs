//! Unit tests for the assembly listing parser and metadata model

mod test_type_references;
