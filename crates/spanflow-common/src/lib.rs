//! Common utilities for spanflow.
//!
//! This crate provides shared infrastructure used by the layout engine and
//! its front-ends:
//! - **Warning System** - deduplicated warnings for clamped or ignored input
//! - **Images** - decoded RGBA image buffers handed to render surfaces

pub mod image;
pub mod warning;
