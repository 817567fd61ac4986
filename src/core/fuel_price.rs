use crate::domain::model::{FuelPriceRecord, FuelType};
use crate::domain::ports::FuelPriceStore;
use crate::utils::error::StoreError;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Price to use when no source has reported anything for the requested fuel
/// type. A deliberate, documented business rule, not an error.
pub const FALLBACK_FUEL_PRICE: Decimal = Decimal::ONE;

/// Aggregates the historical fuel price observations into a single current
/// price per fuel type: the mean of the most recent observation per source.
pub struct FuelPriceAggregator<F: FuelPriceStore> {
    store: F,
}

impl<F: FuelPriceStore> FuelPriceAggregator<F> {
    pub fn new(store: F) -> Self {
        Self { store }
    }

    /// Mean of each source's latest observation, filtered to `fuel`.
    /// A source whose latest observation is for a different fuel type does
    /// not contribute. Result is unrounded; callers round at point of use.
    pub async fn average_price(&self, fuel: FuelType) -> Result<Decimal, StoreError> {
        let records = self.store.find_recent_fuel_prices().await?;

        // Latest record per source, across all fuel types. Timestamp ties
        // within a source resolve deterministically via the price ordering.
        let mut latest: BTreeMap<&str, &FuelPriceRecord> = BTreeMap::new();
        for record in &records {
            let newer = match latest.get(record.source.as_str()) {
                Some(current) => {
                    (record.observed_at, record.price) > (current.observed_at, current.price)
                }
                None => true,
            };
            if newer {
                latest.insert(record.source.as_str(), record);
            }
        }

        let prices: Vec<Decimal> = latest
            .values()
            .filter(|r| r.fuel_type == fuel)
            .map(|r| r.price)
            .collect();

        if prices.is_empty() {
            tracing::debug!(?fuel, "no fuel price observations, using fallback");
            return Ok(FALLBACK_FUEL_PRICE);
        }

        Ok(prices.iter().sum::<Decimal>() / Decimal::from(prices.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryFuelPriceStore;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn record(source: &str, fuel: FuelType, age_hours: i64, price: Decimal) -> FuelPriceRecord {
        FuelPriceRecord {
            source: source.to_string(),
            fuel_type: fuel,
            observed_at: Utc::now() - Duration::hours(age_hours),
            price,
        }
    }

    #[tokio::test]
    async fn test_mean_of_latest_record_per_source() {
        let store = InMemoryFuelPriceStore::new();
        for (i, source) in ["mol", "omv", "shell", "lukoil", "orlen"].into_iter().enumerate() {
            // Older observations that must be ignored.
            store
                .push(record(source, FuelType::Gasoline, 48, dec!(9.99)))
                .await;
            store
                .push(record(
                    source,
                    FuelType::Gasoline,
                    1,
                    dec!(3.00) + Decimal::from(i),
                ))
                .await;
        }

        let aggregator = FuelPriceAggregator::new(store);
        let average = aggregator.average_price(FuelType::Gasoline).await.unwrap();

        // (3 + 4 + 5 + 6 + 7) / 5
        assert_eq!(average, dec!(5.00));
    }

    #[tokio::test]
    async fn test_source_with_latest_record_of_other_fuel_does_not_contribute() {
        let store = InMemoryFuelPriceStore::new();
        store
            .push(record("mol", FuelType::Gasoline, 24, dec!(2.00)))
            .await;
        // mol's latest observation is diesel, so mol drops out of the
        // gasoline mean entirely.
        store
            .push(record("mol", FuelType::Diesel, 1, dec!(4.00)))
            .await;
        store
            .push(record("omv", FuelType::Gasoline, 1, dec!(3.50)))
            .await;

        let aggregator = FuelPriceAggregator::new(store);
        let average = aggregator.average_price(FuelType::Gasoline).await.unwrap();

        assert_eq!(average, dec!(3.50));
    }

    #[tokio::test]
    async fn test_fallback_when_no_records_for_fuel_type() {
        let store = InMemoryFuelPriceStore::new();
        store
            .push(record("mol", FuelType::Diesel, 1, dec!(4.00)))
            .await;

        let aggregator = FuelPriceAggregator::new(store);
        let average = aggregator.average_price(FuelType::Lpg).await.unwrap();

        assert_eq!(average, FALLBACK_FUEL_PRICE);
    }

    #[tokio::test]
    async fn test_fallback_when_store_is_empty() {
        let aggregator = FuelPriceAggregator::new(InMemoryFuelPriceStore::new());
        let average = aggregator.average_price(FuelType::Gasoline).await.unwrap();

        assert_eq!(average, dec!(1));
    }

    #[tokio::test]
    async fn test_mean_is_not_rounded_here() {
        let store = InMemoryFuelPriceStore::new();
        store
            .push(record("mol", FuelType::Gasoline, 1, dec!(1.00)))
            .await;
        store
            .push(record("omv", FuelType::Gasoline, 1, dec!(2.00)))
            .await;
        store
            .push(record("shell", FuelType::Gasoline, 1, dec!(2.00)))
            .await;

        let aggregator = FuelPriceAggregator::new(store);
        let average = aggregator.average_price(FuelType::Gasoline).await.unwrap();

        // 5/3 keeps full precision; rounding is the caller's job.
        assert_eq!(average.round_dp(4), dec!(1.6667));
    }
}
