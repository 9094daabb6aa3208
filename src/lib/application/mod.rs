//! # Application Module
//!
//! Use cases built on the provider and storage infrastructure.
//!
//! ## Submodules
//!
//! - [`outline`] - Topic to page-by-page outline through the text provider
//! - [`generate`] - Outline pages to images through the image provider
//! - [`prompts`] - Built-in and overridable prompt templates

pub mod generate;
pub mod outline;
pub mod prompts;
