//! # WorldSync Testkit
//!
//! Test utilities for WorldSync.
//!
//! This crate provides:
//! - Canned wire frames and batch builders
//! - Property-based test generators using proptest
//! - Shared wire test vectors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use worldsync_testkit::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn batches_decode(text in batch_text_strategy(8, 32)) {
//!         prop_assert!(decode_batch_str(&text).is_ok());
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use vectors::*;
