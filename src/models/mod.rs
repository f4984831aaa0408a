//! Data models for the celestial map workflow.
//!
//! This module contains the data structures shared by the services:
//! geocoder suggestions, map drafts and requests, the UI state machine
//! and the error taxonomy.

pub mod build;
pub mod error;
pub mod location;
pub mod map;
pub mod state;

pub use build::*;
pub use error::*;
pub use location::*;
pub use map::*;
pub use state::*;
