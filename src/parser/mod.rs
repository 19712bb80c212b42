//! Endpoint extraction: lexical recognition of HTTP route declarations.
//!
//! No AST, no import resolution, no router composition: just pattern
//! families run over raw text.

pub mod collate;
pub mod extract;
pub mod method;

pub use collate::locale_cmp;
pub use extract::{extract, sort_endpoints, EndpointRecord, PatternFamily};
pub use method::HttpMethod;
