// File: src/lib.rs
pub mod color_utils;
pub mod config;
pub mod convert;
pub mod engine;
pub mod filters;
pub mod model;
pub mod observable;
pub mod paths;
pub mod storage;
pub mod store;
