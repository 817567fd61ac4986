use thiserror::Error;
use uuid::Uuid;

/// Credential verification failures. All terminal: the request is rejected
/// and never retried by this core.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("credential is missing or malformed: {reason}")]
    Malformed { reason: String },

    #[error("credential signature could not be verified")]
    InvalidSignature,

    #[error("credential expired")]
    Expired { expired_at: i64 },

    #[error("identity provider key endpoint unavailable: {reason}")]
    KeyUnavailable { reason: String },
}

/// Ownership check failures. The attempted/actual identifiers are carried
/// for audit logging only and deliberately kept out of the display text.
#[derive(Error, Debug)]
pub enum AuthzError {
    #[error("identity does not own the target resource")]
    NotOwner { attempted: String, actual: String },

    #[error("identity has no linked driver record")]
    NoSuchDriverLink { subject: String },
}

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("pricing upstream unavailable: {reason}")]
    UpstreamUnavailable { reason: String },
}

/// Failures surfaced by the persistence ports.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("concurrent write conflict on route {route}")]
    Conflict { route: Uuid },

    #[error("ride {ride} not found")]
    RideNotFound { ride: Uuid },

    #[error("persistence backend failure: {message}")]
    Backend { message: String },
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("seat count must be at least 1, got {given}")]
    InvalidSeatCount { given: u32 },

    #[error("capacity exceeded: requested {requested} seats, {available} available")]
    CapacityExceeded { requested: u32, available: u32 },

    #[error("capacity {requested} is below the {booked} seats already booked")]
    CapacityBelowBooked { requested: u32, booked: u32 },

    #[error("booking rejected, ride could not be priced: {0}")]
    PricingFailed(#[from] PricingError),

    #[error("booking conflict on route {route} after retries")]
    Conflict { route: Uuid },

    #[error("ride {ride} not found")]
    RideNotFound { ride: Uuid },

    #[error("persistence failure: {0}")]
    Store(StoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration parse error: {message}")]
    Parse { message: String },

    #[error("missing configuration field: {field}")]
    MissingField { field: String },

    #[error("invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}
