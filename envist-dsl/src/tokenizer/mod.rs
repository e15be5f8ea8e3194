//! Structural tokenizer: raw strings → lists, maps and scalars

pub mod scanner;
pub mod structure;
pub mod token;

pub use scanner::*;
pub use structure::*;
pub use token::*;
