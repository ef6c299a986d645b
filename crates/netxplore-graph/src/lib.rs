#![forbid(unsafe_code)]
//! Interaction graphs over chat transcripts.
//!
//! Builds on `netxplore-core`: a filtered message stream becomes an
//! [`graph::InteractionGraph`], which is scored by [`metrics`], partitioned
//! by [`community`], and projected into serializable [`view`]s that
//! [`compare`] can diff.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums; parameter errors come from
//!   `netxplore_core::error::ParamError`.
//! - **Logging**: `tracing` macros; engine entry points are instrumented.

pub mod analysis;
pub mod community;
pub mod compare;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod view;

pub use analysis::{NetworkAnalysis, analyze_file, analyze_text};
pub use error::CentralityError;
