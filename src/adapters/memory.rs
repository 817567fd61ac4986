use crate::domain::model::{FuelPriceRecord, Ride, RideId, RouteId, SigningKey};
use crate::domain::ports::{FuelPriceStore, KeyCache, RideStore};
use crate::utils::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::Mutex;

/// In-memory ride store. The whole table sits behind one async mutex, so
/// every conditional write re-reads the route's booked total inside the
/// same critical section it commits in.
#[derive(Default)]
pub struct InMemoryRideStore {
    rides: Mutex<Vec<Ride>>,
}

impl InMemoryRideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn booked_on(rides: &[Ride], route: RouteId, exclude: Option<RideId>) -> u32 {
    rides
        .iter()
        .filter(|r| r.route == route && Some(r.id) != exclude)
        .map(|r| r.seat_count)
        .sum()
}

#[async_trait]
impl RideStore for InMemoryRideStore {
    async fn find_rides_by_route(&self, route: RouteId) -> Result<Vec<Ride>, StoreError> {
        let rides = self.rides.lock().await;
        Ok(rides.iter().filter(|r| r.route == route).cloned().collect())
    }

    async fn save_ride(&self, ride: Ride, expected_booked: u32) -> Result<Ride, StoreError> {
        let mut rides = self.rides.lock().await;
        if booked_on(&rides, ride.route, None) != expected_booked {
            return Err(StoreError::Conflict { route: ride.route });
        }
        rides.push(ride.clone());
        Ok(ride)
    }

    async fn update_ride(
        &self,
        ride: Ride,
        expected_other_booked: u32,
    ) -> Result<Ride, StoreError> {
        let mut rides = self.rides.lock().await;
        let position = rides
            .iter()
            .position(|r| r.id == ride.id)
            .ok_or(StoreError::RideNotFound { ride: ride.id })?;
        if booked_on(&rides, ride.route, Some(ride.id)) != expected_other_booked {
            return Err(StoreError::Conflict { route: ride.route });
        }
        rides[position] = ride.clone();
        Ok(ride)
    }

    async fn delete_ride(&self, ride: RideId) -> Result<(), StoreError> {
        let mut rides = self.rides.lock().await;
        let position = rides
            .iter()
            .position(|r| r.id == ride)
            .ok_or(StoreError::RideNotFound { ride })?;
        rides.remove(position);
        Ok(())
    }
}

/// In-memory append-only fuel price observations.
#[derive(Default)]
pub struct InMemoryFuelPriceStore {
    records: Mutex<Vec<FuelPriceRecord>>,
}

impl InMemoryFuelPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, record: FuelPriceRecord) {
        self.records.lock().await.push(record);
    }
}

#[async_trait]
impl FuelPriceStore for InMemoryFuelPriceStore {
    async fn find_recent_fuel_prices(&self) -> Result<Vec<FuelPriceRecord>, StoreError> {
        Ok(self.records.lock().await.clone())
    }
}

/// Read-mostly signing-key cache. A write never invalidates an in-flight
/// read's key; readers that race a poisoned lock just miss and re-fetch.
#[derive(Default)]
pub struct InMemoryKeyCache {
    keys: RwLock<HashMap<String, SigningKey>>,
}

impl InMemoryKeyCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyCache for InMemoryKeyCache {
    fn get(&self, kid: &str) -> Option<SigningKey> {
        self.keys.read().ok()?.get(kid).cloned()
    }

    fn put(&self, key: SigningKey) {
        if let Ok(mut keys) = self.keys.write() {
            keys.insert(key.kid.clone(), key);
        }
    }
}
