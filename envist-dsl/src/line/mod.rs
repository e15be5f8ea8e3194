//! Single-line `.env` syntax

pub mod validator;

pub use validator::*;
