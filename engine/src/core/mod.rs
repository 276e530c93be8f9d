//! Core Module
//!
//! Engine plumbing that is not tied to any one subsystem.

pub mod event;

pub use event::{EventChannel, ListenerId};
