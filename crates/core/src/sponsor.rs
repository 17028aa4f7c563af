//! Sponsor application statuses, sponsor tiers, and decision validation.
//!
//! An application starts `pending` and is decided exactly once: both
//! `approved` and `rejected` are terminal. Re-submission creates a new
//! record; a decided application is never transitioned again.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Application statuses
// ---------------------------------------------------------------------------

/// Awaiting an admin decision. The only status a new application may start in.
pub const STATUS_PENDING: &str = "pending";
/// Accepted. Terminal; a sponsor record is created as a side effect.
pub const STATUS_APPROVED: &str = "approved";
/// Declined. Terminal.
pub const STATUS_REJECTED: &str = "rejected";

/// All valid application statuses.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED];

/// The decisions an admin may record for a pending application.
pub const VALID_DECISIONS: &[&str] = &[STATUS_APPROVED, STATUS_REJECTED];

// ---------------------------------------------------------------------------
// Sponsor tiers
// ---------------------------------------------------------------------------

/// Top sponsorship tier.
pub const TIER_PREMIUM: &str = "premium";
/// Mid sponsorship tier.
pub const TIER_STANDARD: &str = "standard";
/// Community sponsorship tier.
pub const TIER_COMMUNITY: &str = "community";

/// All valid sponsor tiers.
pub const VALID_TIERS: &[&str] = &[TIER_PREMIUM, TIER_STANDARD, TIER_COMMUNITY];

// ---------------------------------------------------------------------------
// Validation constants
// ---------------------------------------------------------------------------

/// Maximum length for the company name field (characters).
pub const MAX_COMPANY_NAME_LENGTH: usize = 200;

/// Maximum length for the application message field (characters).
pub const MAX_MESSAGE_LENGTH: usize = 5_000;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a decision string is one of the accepted values.
pub fn validate_decision(decision: &str) -> Result<(), CoreError> {
    if VALID_DECISIONS.contains(&decision) {
        Ok(())
    } else {
        Err(CoreError::validation(
            "decision",
            format!("'{decision}' is not one of {VALID_DECISIONS:?}"),
        ))
    }
}

/// Validate that an application in `current` status may still be decided.
///
/// Only `pending` applications accept a decision; both decision outcomes
/// are terminal.
pub fn validate_decidable(current: &str) -> Result<(), CoreError> {
    if current == STATUS_PENDING {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Application has already been decided (status '{current}')"
        )))
    }
}

/// Validate that a tier string is one of the known tiers.
pub fn validate_tier(tier: &str) -> Result<(), CoreError> {
    if VALID_TIERS.contains(&tier) {
        Ok(())
    } else {
        Err(CoreError::validation(
            "tier",
            format!("'{tier}' is not one of {VALID_TIERS:?}"),
        ))
    }
}

/// Validate the required company name: non-empty after trimming, bounded.
pub fn validate_company_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("company_name", "must not be empty"));
    }
    if name.chars().count() > MAX_COMPANY_NAME_LENGTH {
        return Err(CoreError::validation(
            "company_name",
            format!("exceeds maximum length of {MAX_COMPANY_NAME_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Validate the required application message: non-empty after trimming, bounded.
pub fn validate_message(message: &str) -> Result<(), CoreError> {
    if message.trim().is_empty() {
        return Err(CoreError::validation("message", "must not be empty"));
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(CoreError::validation(
            "message",
            format!("exceeds maximum length of {MAX_MESSAGE_LENGTH} characters"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_decisions_accepted() {
        assert!(validate_decision(STATUS_APPROVED).is_ok());
        assert!(validate_decision(STATUS_REJECTED).is_ok());
    }

    #[test]
    fn pending_is_not_a_decision() {
        assert!(validate_decision(STATUS_PENDING).is_err());
        assert!(validate_decision("maybe").is_err());
    }

    #[test]
    fn only_pending_applications_are_decidable() {
        assert!(validate_decidable(STATUS_PENDING).is_ok());
        assert!(validate_decidable(STATUS_APPROVED).is_err());
        assert!(validate_decidable(STATUS_REJECTED).is_err());
    }

    #[test]
    fn all_tiers_are_valid() {
        for t in VALID_TIERS {
            assert!(validate_tier(t).is_ok(), "Tier '{t}' should be valid");
        }
        assert!(validate_tier("platinum").is_err());
    }

    #[test]
    fn company_name_must_be_non_empty_and_bounded() {
        assert!(validate_company_name("").is_err());
        assert!(validate_company_name("  ").is_err());
        assert!(validate_company_name("Acme Toys Ltd").is_ok());
        assert!(validate_company_name(&"a".repeat(MAX_COMPANY_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn message_must_be_non_empty_and_bounded() {
        assert!(validate_message("").is_err());
        assert!(validate_message("We would love to sponsor the channel.").is_ok());
        assert!(validate_message(&"a".repeat(MAX_MESSAGE_LENGTH + 1)).is_err());
    }
}
