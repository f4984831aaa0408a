//! Business logic and service layer modules.
//!
//! This module contains the HTTP-facing services (geocoder, map generator),
//! the view-state owners (resolver, presenter, controller) and the session
//! runtime that ties them together.

pub mod controller;
pub mod generator;
pub mod geocoder;
pub mod http_client;
pub mod presenter;
pub mod resolver;
pub mod session;

pub use controller::*;
pub use generator::*;
pub use geocoder::*;
pub use http_client::*;
pub use presenter::*;
pub use resolver::*;
pub use session::*;
