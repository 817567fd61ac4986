use crate::core::pricing::PricingEngine;
use crate::domain::model::{Identity, PlannedRoute, Ride, RideId, RouteId, RouteState};
use crate::domain::ports::{DistanceProvider, FuelPriceStore, RideStore};
use crate::utils::error::{BookingError, StoreError};
use rust_decimal::Decimal;

pub const DEFAULT_MAX_BOOKING_ATTEMPTS: u32 = 3;

/// Owns the booking invariant: for every route, the sum of booked seats
/// never exceeds the declared capacity, even under concurrent booking
/// attempts. The durable store's conditional write is the authority; the
/// ledger runs an optimistic read-check-write loop on top of it.
pub struct CapacityLedger<S: RideStore, D: DistanceProvider, F: FuelPriceStore> {
    rides: S,
    pricing: PricingEngine<D, F>,
    max_attempts: u32,
}

impl<S: RideStore, D: DistanceProvider, F: FuelPriceStore> CapacityLedger<S, D, F> {
    pub fn new(rides: S, pricing: PricingEngine<D, F>) -> Self {
        Self::with_max_attempts(rides, pricing, DEFAULT_MAX_BOOKING_ATTEMPTS)
    }

    pub fn with_max_attempts(
        rides: S,
        pricing: PricingEngine<D, F>,
        max_attempts: u32,
    ) -> Self {
        Self {
            rides,
            pricing,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Book `seat_count` seats on `route` for `rider`. The ride is priced
    /// before it is persisted; a booking is never committed without a cost.
    pub async fn book(
        &self,
        route: &PlannedRoute,
        rider: &Identity,
        seat_count: u32,
    ) -> Result<Ride, BookingError> {
        if seat_count == 0 {
            return Err(BookingError::InvalidSeatCount { given: seat_count });
        }

        let mut cost: Option<Decimal> = None;
        for attempt in 1..=self.max_attempts {
            let booked = self.booked_seats(route.id).await?;
            let over = booked
                .checked_add(seat_count)
                .map_or(true, |total| total > route.capacity);
            if over {
                return Err(BookingError::CapacityExceeded {
                    requested: seat_count,
                    available: route.capacity.saturating_sub(booked),
                });
            }

            // Price once; a conflict retry re-checks capacity but does not
            // re-price, cost is a function of the route alone.
            let ride_cost = match cost {
                Some(c) => c,
                None => {
                    let c = self.pricing.price_ride(route).await?;
                    cost = Some(c);
                    c
                }
            };

            let ride = Ride::new(route.id, rider.subject.clone(), seat_count, ride_cost);
            match self.rides.save_ride(ride, booked).await {
                Ok(ride) => {
                    tracing::info!(
                        route = %route.id,
                        ride = %ride.id,
                        seat_count,
                        cost = %ride.cost,
                        "booking committed"
                    );
                    return Ok(ride);
                }
                Err(StoreError::Conflict { .. }) => {
                    tracing::debug!(route = %route.id, attempt, "booking conflict, retrying");
                }
                Err(e) => return Err(Self::map_store_error(e)),
            }
        }

        Err(BookingError::Conflict { route: route.id })
    }

    /// Change the seat count of an existing ride. The new total is validated
    /// against the *other* rides on the route; the cost is kept as booked.
    pub async fn change_seats(
        &self,
        route: &PlannedRoute,
        ride_id: RideId,
        new_seat_count: u32,
    ) -> Result<Ride, BookingError> {
        if new_seat_count == 0 {
            return Err(BookingError::InvalidSeatCount {
                given: new_seat_count,
            });
        }

        for attempt in 1..=self.max_attempts {
            let rides = self
                .rides
                .find_rides_by_route(route.id)
                .await
                .map_err(Self::map_store_error)?;
            let existing = rides
                .iter()
                .find(|r| r.id == ride_id)
                .ok_or(BookingError::RideNotFound { ride: ride_id })?;

            let other_booked: u32 = rides
                .iter()
                .filter(|r| r.id != ride_id)
                .map(|r| r.seat_count)
                .sum();
            let over = other_booked
                .checked_add(new_seat_count)
                .map_or(true, |total| total > route.capacity);
            if over {
                return Err(BookingError::CapacityExceeded {
                    requested: new_seat_count,
                    available: route.capacity.saturating_sub(other_booked),
                });
            }

            let mut updated = existing.clone();
            updated.seat_count = new_seat_count;
            match self.rides.update_ride(updated, other_booked).await {
                Ok(ride) => {
                    tracing::info!(
                        route = %route.id,
                        ride = %ride.id,
                        seat_count = new_seat_count,
                        "seat change committed"
                    );
                    return Ok(ride);
                }
                Err(StoreError::Conflict { .. }) => {
                    tracing::debug!(route = %route.id, attempt, "seat change conflict, retrying");
                }
                Err(e) => return Err(Self::map_store_error(e)),
            }
        }

        Err(BookingError::Conflict { route: route.id })
    }

    /// Cancel a ride, freeing its seats.
    pub async fn cancel(&self, ride_id: RideId) -> Result<(), BookingError> {
        self.rides
            .delete_ride(ride_id)
            .await
            .map_err(Self::map_store_error)
    }

    /// Validate a proposed capacity change against the seats already booked.
    /// Shrinking below the booked total is rejected, never silently truncated.
    pub async fn check_capacity_change(
        &self,
        route_id: RouteId,
        new_capacity: u32,
    ) -> Result<(), BookingError> {
        let booked = self.booked_seats(route_id).await?;
        if new_capacity < booked {
            return Err(BookingError::CapacityBelowBooked {
                requested: new_capacity,
                booked,
            });
        }
        Ok(())
    }

    pub async fn route_state(&self, route: &PlannedRoute) -> Result<RouteState, BookingError> {
        let booked = self.booked_seats(route.id).await?;
        if booked >= route.capacity {
            Ok(RouteState::Full)
        } else {
            Ok(RouteState::Open)
        }
    }

    async fn booked_seats(&self, route_id: RouteId) -> Result<u32, BookingError> {
        let rides = self
            .rides
            .find_rides_by_route(route_id)
            .await
            .map_err(Self::map_store_error)?;
        Ok(rides.iter().map(|r| r.seat_count).sum())
    }

    fn map_store_error(e: StoreError) -> BookingError {
        match e {
            StoreError::RideNotFound { ride } => BookingError::RideNotFound { ride },
            other => BookingError::Store(other),
        }
    }
}
