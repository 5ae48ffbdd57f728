//! GeoLens Gateway HTTP API Server
//!
//! Accepts image uploads and relays them to the generative model, the vision
//! search provider and the geocoder.

pub mod analyze;
pub mod error;
pub mod lens;
pub mod server;
pub mod upload;

pub use error::ApiError;
pub use server::{build_router, start_server, GatewayState};
