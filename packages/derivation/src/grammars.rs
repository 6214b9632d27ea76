pub mod definition;
pub mod display;
pub mod error;
pub mod parse;
pub mod types;
