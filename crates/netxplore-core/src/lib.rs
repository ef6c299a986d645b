//! Core building blocks for netxplore: the message model, transcript
//! parsing, the filter pipeline, configuration, and the error taxonomy.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums in [`error`]; `anyhow::Result` only
//!   where configuration files are loaded.
//! - **Logging**: `tracing` macros. Pipeline entry points are instrumented.

pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod parser;
pub mod source;

pub use error::{AnalysisError, ErrorCode, ParamError};
pub use filter::{FilterOutcome, FilterSpec, RawFilterParams};
pub use model::{Language, Message, TranscriptFormat};
pub use parser::{ParseReport, SkipReason};
