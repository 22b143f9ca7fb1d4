//! Common utilities for Xiasi.
//!
//! This crate provides foundational types and utilities used across all Xiasi crates:
//!
//! - [`BinaryReader`] - Bounds-checked little-endian reading from byte slices
//! - [`TreeNode`] - Labelled result trees consumed by browsing front-ends
//! - [`simd`] - SIMD-accelerated byte searching (via memchr)

mod error;
mod node;
mod reader;

pub mod simd;

pub use error::{Error, Result};
pub use node::TreeNode;
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for SIMD-accelerated byte searching
pub use memchr;
