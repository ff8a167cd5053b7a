// File: src/model.rs
pub mod adapter;
pub mod item;
pub mod parser;
pub mod sanitize;

pub use item::*;
