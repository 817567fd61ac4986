use crate::core::fuel_price::FuelPriceAggregator;
use crate::domain::model::PlannedRoute;
use crate::domain::ports::{DistanceProvider, FuelPriceStore};
use crate::utils::error::PricingError;
use rust_decimal::{Decimal, RoundingStrategy};

/// Computes the monetary cost of a ride on a planned route:
/// travel duration × aggregated fuel price × configured coefficient.
pub struct PricingEngine<D: DistanceProvider, F: FuelPriceStore> {
    distance: D,
    fuel_prices: FuelPriceAggregator<F>,
    coefficient: Decimal,
}

impl<D: DistanceProvider, F: FuelPriceStore> PricingEngine<D, F> {
    pub fn new(distance: D, fuel_prices: FuelPriceAggregator<F>, coefficient: Decimal) -> Self {
        Self {
            distance,
            fuel_prices,
            coefficient,
        }
    }

    /// Exact decimal arithmetic throughout, rounded to 2 dp only at the
    /// final result. A failing upstream propagates as a typed error; a ride
    /// is never silently priced at zero.
    pub async fn price_ride(&self, route: &PlannedRoute) -> Result<Decimal, PricingError> {
        let seconds = self
            .distance
            .travel_duration_seconds(&route.origin, &route.destination)
            .await?;

        let fuel_price = self
            .fuel_prices
            .average_price(route.driver_fuel_type)
            .await
            .map_err(|e| PricingError::UpstreamUnavailable {
                reason: format!("fuel price store: {}", e),
            })?;

        let cost = Decimal::from(seconds) * fuel_price * self.coefficient;

        tracing::debug!(
            route = %route.id,
            seconds,
            %fuel_price,
            cost = %cost,
            "priced ride"
        );

        Ok(cost.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}
