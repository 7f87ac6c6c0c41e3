//! # pulsoft-core
//!
//! Collaborator seams for the Pulsoft monitoring core.
//!
//! This crate provides:
//! - The four collaborator traits (`RandomSource`, `AuthProvider`,
//!   `Transport`, `RealtimeDatabase`)
//! - `ObserverHandle`, the scoped handle returned by database observers
//! - Two random sources: `ThreadRandom` for real use and `SequenceRandom`
//!   for reproducible tests and demos
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pulsoft_core::{random::SequenceRandom, traits::RandomSource};
//!
//! let rng = SequenceRandom::constant(0.5);
//! assert_eq!(rng.next_unit(), 0.5);
//! ```

pub mod random;
pub mod traits;

pub use random::{SequenceRandom, ThreadRandom};
pub use traits::{AuthProvider, ObserverHandle, RandomSource, RealtimeDatabase, Transport};
