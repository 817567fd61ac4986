use crate::domain::model::Identity;
use crate::utils::error::AuthzError;

/// What the touched resource requires of the caller. The three variants are
/// the three ownership shapes the surrounding system needs: a user id, a
/// user email, and a driver's car plate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOwnerSpec {
    SubjectId(String),
    SubjectEmail(String),
    DriverPlate(String),
}

/// Pure ownership decision: given a verified identity and the resource's
/// owner spec, allow or deny. No I/O, deterministic. Denials are logged
/// with both identifiers for audit; the returned error's display text
/// carries neither.
pub struct OwnershipGuard;

impl OwnershipGuard {
    pub fn authorize(identity: &Identity, required: &ResourceOwnerSpec) -> Result<(), AuthzError> {
        match required {
            ResourceOwnerSpec::SubjectId(owner) | ResourceOwnerSpec::SubjectEmail(owner) => {
                if identity.subject == *owner {
                    Ok(())
                } else {
                    Self::deny(&identity.subject, owner)
                }
            }
            ResourceOwnerSpec::DriverPlate(plate) => match &identity.driver_plate {
                Some(linked) if linked == plate => Ok(()),
                Some(linked) => Self::deny(linked, plate),
                None => {
                    tracing::warn!(
                        subject = %identity.subject,
                        "driver-scoped access without a linked driver"
                    );
                    Err(AuthzError::NoSuchDriverLink {
                        subject: identity.subject.clone(),
                    })
                }
            },
        }
    }

    fn deny(attempted: &str, actual: &str) -> Result<(), AuthzError> {
        tracing::warn!(attempted, actual, "ownership check denied");
        Err(AuthzError::NotOwner {
            attempted: attempted.to_string(),
            actual: actual.to_string(),
        })
    }
}
