//! Ownership gate for catalog mutations.

use crate::error::DenyReason;
use crate::model::Pokemon;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied(DenyReason),
}

/// Decide whether `identity` may update or delete `record`. Pure; call only after the record is known to exist.
pub fn authorize(record: &Pokemon, identity: &str) -> Access {
    match record.owner_id.as_deref() {
        None => Access::Denied(DenyReason::Seeded),
        Some(owner) if owner != identity => Access::Denied(DenyReason::NotOwner),
        Some(_) => Access::Allowed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(owner: Option<&str>) -> Pokemon {
        Pokemon {
            id: 7,
            name: "squirtle".into(),
            height: 5,
            weight: 90,
            image: None,
            owner_id: owner.map(String::from),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn seeded_record_is_denied_for_everyone() {
        assert_eq!(authorize(&record(None), "alice"), Access::Denied(DenyReason::Seeded));
        assert_eq!(authorize(&record(None), ""), Access::Denied(DenyReason::Seeded));
    }

    #[test]
    fn other_identity_is_denied() {
        assert_eq!(authorize(&record(Some("alice")), "bob"), Access::Denied(DenyReason::NotOwner));
    }

    #[test]
    fn owner_is_allowed() {
        assert_eq!(authorize(&record(Some("alice")), "alice"), Access::Allowed);
    }
}
