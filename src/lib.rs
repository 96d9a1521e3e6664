// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod evaluation;
pub mod loader;
pub mod logging;
pub mod oracle;
pub mod persistence;

pub use crate::config::{ResourcePaths, Settings, SimplifierConfig, Variant};
pub use crate::core::engine::{Resources, Simplifier, Stage};
pub use crate::error::{Result, SimplifyError};
pub use crate::loader::LoadedResources;
