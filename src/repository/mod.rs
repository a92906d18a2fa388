// src/repository/mod.rs

//! Repository file generation
//!
//! This module provides functionality for:
//! - Reading, rendering and writing INI repository files
//! - Projecting entitled content (plus server overrides) into repository sections

mod generator;
mod repofile;

pub use generator::{RepoFileGenerator, RepoFileOptions, SectionKey, join_url};
pub use repofile::{RepoFile, RepoSection};
