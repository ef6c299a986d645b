//! Interaction graph construction and structure.

pub mod build;
pub mod components;

pub use build::{InteractionGraph, Participant};
pub use components::{connected_components, largest_component};
