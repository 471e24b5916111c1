//! Carton - The artist's toolbox for Vize.
//!
//! This crate provides the foundational utilities and data structures shared by the
//! JSX template compiler, much like a carton (artist's portfolio case) holds all the
//! essential tools and materials an artist needs for their work.
//!
//! # Modules
//!
//! - **Allocator**: Arena-based allocation for the element tree
//! - **Shared utilities**: DOM tag configuration and string helpers
//!
//! # Example
//!
//! ```
//! use vize_carton::{Box, Bump, Vec};
//!
//! let bump = Bump::new();
//!
//! let boxed = Box::new_in(42, &bump);
//! assert_eq!(*boxed, 42);
//!
//! let mut vec = Vec::new_in(&bump);
//! vec.push(1);
//! vec.push(2);
//! assert_eq!(vec.len(), 2);
//! ```

pub mod dom_tag_config;
pub mod general;

// Re-export bumpalo types for convenience
pub use bumpalo::boxed::Box;
pub use bumpalo::collections::String as BumpString;
pub use bumpalo::collections::Vec;
pub use bumpalo::Bump;

// Re-export compact_str::CompactString for convenience
pub use compact_str::format_compact;
pub use compact_str::CompactString;
pub use compact_str::CompactString as String;
pub use compact_str::ToCompactString;

// Re-export bitflags for flag types
pub use bitflags::bitflags;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_map, phf_set, Map as PhfMap, Set as PhfSet};

// Re-export shared utilities
pub use dom_tag_config::*;
pub use general::*;
