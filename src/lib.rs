//! Glint: Icon Resolution and Gradient Caching for Dashboard Tiles
//!
//! Resolves a representative icon and a two-color background gradient for
//! each dashboard tile, fetching missing artifacts from the tile's linked
//! website and caching every result so repeat renders stay off the network.

pub mod artifact;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gradient;
pub mod logging;
pub mod metadata;
pub mod resolver;
pub mod store;
pub mod types;
