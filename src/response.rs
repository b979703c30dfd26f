#![forbid(unsafe_code)]

//! Semi-structured query-response decoding

pub mod parser;
pub mod value;

pub use parser::parse_response;
pub use value::GenericValue;
