//! Province map core: recovers territorial regions from a color-indexed
//! raster, derives their adjacency graph, and answers cached path queries
//! over it.

pub mod adjacency;
pub mod catalog;
pub mod color;
pub mod defs;
pub mod error;
pub mod province;
pub mod raster;
pub mod route;
pub mod states;

// Re-export the common types
pub use adjacency::AdjacencyGraph;
pub use catalog::ProvinceCatalog;
pub use color::Color;
pub use defs::{CityCategory, ProvinceDecl, StateDecl};
pub use error::MapError;
pub use province::{Province, Rect, Vec2};
pub use raster::MapRaster;
pub use route::{Connection, ConnectionCache};
pub use states::{State, StateCatalog};
