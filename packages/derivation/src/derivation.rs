pub mod engine;
pub mod options;
pub mod tree;
