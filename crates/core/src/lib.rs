//! Core types for stockpile
//!
//! This crate defines the domain model shared by every layer:
//! - `Counter`: the persisted inventory counter and its business rule
//! - `CounterId` / `Version`: identifier and version-token types
//! - `Error`: the unified error taxonomy
//! - `LockCoordinator`: the trait seam for the external lock service

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod counter;
pub mod error;
pub mod traits;
pub mod types;

pub use counter::Counter;
pub use error::{CoordinatorError, Error, Result};
pub use traits::LockCoordinator;
pub use types::{CounterId, Version};
