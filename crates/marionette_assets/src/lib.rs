//! Asset loading for Marionette.
//!
//! Currently limited to recorded landmark sequences, see [`loader`].

pub mod loader;

pub use loader::{load_sequence_from_file, load_sequence_from_slice, load_sequence_from_str};
