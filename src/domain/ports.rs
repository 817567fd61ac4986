use crate::domain::model::{FuelPriceRecord, Ride, RideId, RouteId, SigningKey};
use crate::utils::error::{PricingError, StoreError};
use async_trait::async_trait;
use std::sync::Arc;

/// Persistence port for rides. The store is the authority for the capacity
/// invariant: `save_ride` and `update_ride` are conditional writes that
/// commit only while the route's booked totals still match what the caller
/// observed, and report `StoreError::Conflict` otherwise.
#[async_trait]
pub trait RideStore: Send + Sync {
    async fn find_rides_by_route(&self, route: RouteId) -> Result<Vec<Ride>, StoreError>;

    /// Insert `ride` only if the total seats currently booked on its route
    /// equal `expected_booked`.
    async fn save_ride(&self, ride: Ride, expected_booked: u32) -> Result<Ride, StoreError>;

    /// Replace the stored ride with the same id only if the total seats
    /// booked by the *other* rides on the route equal `expected_other_booked`.
    async fn update_ride(&self, ride: Ride, expected_other_booked: u32)
        -> Result<Ride, StoreError>;

    async fn delete_ride(&self, ride: RideId) -> Result<(), StoreError>;
}

/// Read-only port over the historical fuel price observations.
#[async_trait]
pub trait FuelPriceStore: Send + Sync {
    async fn find_recent_fuel_prices(&self) -> Result<Vec<FuelPriceRecord>, StoreError>;
}

/// External travel-duration signal keyed by two opaque location identifiers.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    async fn travel_duration_seconds(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<u64, PricingError>;
}

/// Thread-safe cache of provider signing keys, keyed by key id. Keys rotate
/// infrequently, so entries carry no forced expiry; a cache miss is resolved
/// by re-fetching the provider key set.
pub trait KeyCache: Send + Sync {
    fn get(&self, kid: &str) -> Option<SigningKey>;
    fn put(&self, key: SigningKey);
}

#[async_trait]
impl<T: RideStore + ?Sized> RideStore for Arc<T> {
    async fn find_rides_by_route(&self, route: RouteId) -> Result<Vec<Ride>, StoreError> {
        (**self).find_rides_by_route(route).await
    }

    async fn save_ride(&self, ride: Ride, expected_booked: u32) -> Result<Ride, StoreError> {
        (**self).save_ride(ride, expected_booked).await
    }

    async fn update_ride(
        &self,
        ride: Ride,
        expected_other_booked: u32,
    ) -> Result<Ride, StoreError> {
        (**self).update_ride(ride, expected_other_booked).await
    }

    async fn delete_ride(&self, ride: RideId) -> Result<(), StoreError> {
        (**self).delete_ride(ride).await
    }
}

#[async_trait]
impl<T: FuelPriceStore + ?Sized> FuelPriceStore for Arc<T> {
    async fn find_recent_fuel_prices(&self) -> Result<Vec<FuelPriceRecord>, StoreError> {
        (**self).find_recent_fuel_prices().await
    }
}
