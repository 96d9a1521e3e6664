// src/core/mod.rs
pub mod complexity;
pub mod context;
pub mod engine;
pub mod generator;
pub mod ranker;
pub mod selector;
pub mod taxonomy;
pub mod types;
