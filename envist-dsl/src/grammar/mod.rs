//! Type annotation grammar

pub mod parser;

pub use parser::*;
