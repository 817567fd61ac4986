pub mod fuel_price;
pub mod identity;
pub mod ledger;
pub mod ownership;
pub mod pricing;

pub use crate::domain::model::{
    FuelPriceRecord, FuelType, Identity, PlannedRoute, Ride, RideId, RouteId, RouteState,
    SigningKey,
};
pub use crate::domain::ports::{DistanceProvider, FuelPriceStore, KeyCache, RideStore};
