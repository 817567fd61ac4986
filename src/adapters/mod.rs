// Adapters layer: concrete implementations of the domain ports.

pub mod distance;
pub mod memory;

pub use distance::MatrixDistanceProvider;
pub use memory::{InMemoryFuelPriceStore, InMemoryKeyCache, InMemoryRideStore};
