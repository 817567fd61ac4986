use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type RouteId = Uuid;
pub type RideId = Uuid;

/// Verified identity of the current request. Produced fresh per request by
/// the identity verifier, never persisted. The driver linkage fact is
/// attached by the surrounding layer when a driver-scoped check is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub driver_plate: Option<String>,
}

impl Identity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            driver_plate: None,
        }
    }

    pub fn with_driver_plate(mut self, plate: impl Into<String>) -> Self {
        self.driver_plate = Some(plate.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Gasoline,
    Diesel,
    Lpg,
}

/// A driver-published trip offer. Owned by the external persistence
/// collaborator; this core only reads capacity and fuel type, and touches
/// seat totals indirectly through rides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedRoute {
    pub id: RouteId,
    pub origin: String,
    pub destination: String,
    pub departs_at: DateTime<Utc>,
    pub capacity: u32,
    pub driver: String,
    pub driver_fuel_type: FuelType,
}

/// A rider's booking of seats on a planned route. Its seat count is the
/// only input to the capacity invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: RideId,
    pub route: RouteId,
    pub rider: String,
    pub seat_count: u32,
    pub cost: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Ride {
    pub fn new(route: RouteId, rider: impl Into<String>, seat_count: u32, cost: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            route,
            rider: rider.into(),
            seat_count,
            cost,
            created_at: Utc::now(),
        }
    }
}

/// One historical fuel price observation from one price source.
/// Append-only; produced by an external ingestion process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelPriceRecord {
    pub source: String,
    pub fuel_type: FuelType,
    pub observed_at: DateTime<Utc>,
    pub price: Decimal,
}

/// Cached RSA public-key material for one provider signing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKey {
    pub kid: String,
    pub n: String,
    pub e: String,
}

/// Booking state of a route, derived from its committed rides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    Open,
    Full,
}
