pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::AppConfig;
pub use crate::core::fuel_price::FuelPriceAggregator;
pub use crate::core::identity::{IdentityVerifier, SubjectClaim};
pub use crate::core::ledger::CapacityLedger;
pub use crate::core::ownership::{OwnershipGuard, ResourceOwnerSpec};
pub use crate::core::pricing::PricingEngine;
pub use crate::utils::error::{AuthError, AuthzError, BookingError, PricingError, StoreError};
