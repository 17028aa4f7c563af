//! Submission kinds, moderation statuses, transition rules, and field
//! validation.
//!
//! The moderation lifecycle is `new -> in_progress -> answered -> published`,
//! with `archived` reachable from any non-terminal state and an explicit
//! reversion `answered -> in_progress` for re-review. Publishing additionally
//! requires the submission to be approved for public display.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// A question for the Q&A section.
pub const KIND_QUESTION: &str = "question";
/// General feedback.
pub const KIND_FEEDBACK: &str = "feedback";
/// A suggestion for a future video.
pub const KIND_VIDEO_IDEA: &str = "video_idea";
/// A rated review (the only kind that carries a rating).
pub const KIND_REVIEW: &str = "review";

/// All valid submission kinds.
pub const VALID_KINDS: &[&str] = &[KIND_QUESTION, KIND_FEEDBACK, KIND_VIDEO_IDEA, KIND_REVIEW];

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

/// Initial status for a freshly created submission. The only status a new
/// record may start in.
pub const STATUS_NEW: &str = "new";
/// An admin has picked the submission up for review.
pub const STATUS_IN_PROGRESS: &str = "in_progress";
/// An admin reply has been recorded.
pub const STATUS_ANSWERED: &str = "answered";
/// Publicly visible (requires approval).
pub const STATUS_PUBLISHED: &str = "published";
/// Removed from the workflow. Terminal.
pub const STATUS_ARCHIVED: &str = "archived";

/// All valid submission statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_NEW,
    STATUS_IN_PROGRESS,
    STATUS_ANSWERED,
    STATUS_PUBLISHED,
    STATUS_ARCHIVED,
];

// ---------------------------------------------------------------------------
// Validation constants
// ---------------------------------------------------------------------------

/// Maximum length for the user-provided message field (characters).
pub const MAX_MESSAGE_LENGTH: usize = 5_000;

/// Maximum length for the optional name field (characters).
pub const MAX_NAME_LENGTH: usize = 200;

/// Inclusive rating bounds for review submissions.
pub const MIN_RATING: i32 = 1;
/// Inclusive rating bounds for review submissions.
pub const MAX_RATING: i32 = 5;

/// Valid topic tags.
pub const VALID_TOPICS: &[&str] = &[
    "science",
    "nature",
    "space",
    "history",
    "technology",
    "everyday_life",
    "other",
];

/// Valid child age group tags.
pub const VALID_AGE_GROUPS: &[&str] = &["under_4", "4_6", "7_9", "10_12", "over_12"];

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Returns the set of statuses that `from_status` may transition to.
///
/// Transition rules:
/// - `new`         -> `in_progress`, `archived`
/// - `in_progress` -> `answered`, `archived`
/// - `answered`    -> `published`, `in_progress` (re-review), `archived`
/// - `published`   -> `archived`
/// - `archived`    -> (terminal)
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_NEW => &[STATUS_IN_PROGRESS, STATUS_ARCHIVED],
        STATUS_IN_PROGRESS => &[STATUS_ANSWERED, STATUS_ARCHIVED],
        STATUS_ANSWERED => &[STATUS_PUBLISHED, STATUS_IN_PROGRESS, STATUS_ARCHIVED],
        STATUS_PUBLISHED => &[STATUS_ARCHIVED],
        _ => &[],
    }
}

/// Validate that a status transition from `current` to `next` is allowed.
pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    let allowed = valid_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Cannot transition submission from '{current}' to '{next}'. \
             Allowed transitions: {allowed:?}"
        )))
    }
}

/// Validate that publishing is permitted: the target status may only be
/// `published` when the submission is approved for public display.
pub fn validate_publish_approval(next: &str, is_approved: bool) -> Result<(), CoreError> {
    if next == STATUS_PUBLISHED && !is_approved {
        return Err(CoreError::Conflict(
            "Cannot publish a submission that is not approved for public display".to_string(),
        ));
    }
    Ok(())
}

/// Validate that a status string is one of the known statuses.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::validation(
            "status",
            format!("'{status}' is not one of {VALID_STATUSES:?}"),
        ))
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Validate that a kind string is one of the known kinds.
pub fn validate_kind(kind: &str) -> Result<(), CoreError> {
    if VALID_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(CoreError::validation(
            "kind",
            format!("'{kind}' is not one of {VALID_KINDS:?}"),
        ))
    }
}

/// Validate the required message field: non-empty after trimming, bounded.
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

/// Validate the rating against the submission kind.
///
/// A rating is required and must be in `[1, 5]` for reviews; any other kind
/// must not carry one.
pub fn validate_rating(kind: &str, rating: Option<i32>) -> Result<(), CoreError> {
    match (kind, rating) {
        (KIND_REVIEW, None) => Err(CoreError::validation(
            "rating",
            "is required for review submissions",
        )),
        (KIND_REVIEW, Some(r)) if !(MIN_RATING..=MAX_RATING).contains(&r) => Err(
            CoreError::validation("rating", format!("must be between {MIN_RATING} and {MAX_RATING}, got {r}")),
        ),
        (KIND_REVIEW, Some(_)) => Ok(()),
        (_, Some(_)) => Err(CoreError::validation(
            "rating",
            format!("is only allowed for '{KIND_REVIEW}' submissions"),
        )),
        (_, None) => Ok(()),
    }
}

/// Validate an optional email address against a basic address shape.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    });
    if re.is_match(email) {
        Ok(())
    } else {
        Err(CoreError::validation(
            "email",
            "must be a valid email address",
        ))
    }
}

/// Validate an optional topic tag against the allow-list.
pub fn validate_topic(topic: &str) -> Result<(), CoreError> {
    if VALID_TOPICS.contains(&topic) {
        Ok(())
    } else {
        Err(CoreError::validation(
            "topic",
            format!("'{topic}' is not one of {VALID_TOPICS:?}"),
        ))
    }
}

/// Validate an optional child age group tag against the allow-list.
pub fn validate_age_group(age_group: &str) -> Result<(), CoreError> {
    if VALID_AGE_GROUPS.contains(&age_group) {
        Ok(())
    } else {
        Err(CoreError::validation(
            "child_age_group",
            format!("'{age_group}' is not one of {VALID_AGE_GROUPS:?}"),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_statuses_are_valid() {
        for s in VALID_STATUSES {
            assert!(validate_status(s).is_ok(), "Status '{s}' should be valid");
        }
    }

    #[test]
    fn unknown_status_is_invalid() {
        assert!(validate_status("unknown").is_err());
        assert!(validate_status("").is_err());
    }

    #[test]
    fn new_can_transition_to_in_progress_or_archived() {
        assert!(validate_transition(STATUS_NEW, STATUS_IN_PROGRESS).is_ok());
        assert!(validate_transition(STATUS_NEW, STATUS_ARCHIVED).is_ok());
        assert!(validate_transition(STATUS_NEW, STATUS_ANSWERED).is_err());
    }

    #[test]
    fn new_cannot_skip_to_published() {
        assert!(validate_transition(STATUS_NEW, STATUS_PUBLISHED).is_err());
    }

    #[test]
    fn answered_can_revert_to_in_progress() {
        assert!(validate_transition(STATUS_ANSWERED, STATUS_IN_PROGRESS).is_ok());
    }

    #[test]
    fn published_is_only_reachable_from_answered() {
        for from in VALID_STATUSES {
            let allowed = valid_transitions(from).contains(&STATUS_PUBLISHED);
            assert_eq!(allowed, *from == STATUS_ANSWERED, "from '{from}'");
        }
    }

    #[test]
    fn archived_is_terminal() {
        assert!(valid_transitions(STATUS_ARCHIVED).is_empty());
    }

    #[test]
    fn archived_is_reachable_from_every_non_terminal_state() {
        for from in [STATUS_NEW, STATUS_IN_PROGRESS, STATUS_ANSWERED, STATUS_PUBLISHED] {
            assert!(
                valid_transitions(from).contains(&STATUS_ARCHIVED),
                "from '{from}'"
            );
        }
    }

    #[test]
    fn publish_requires_approval() {
        assert!(validate_publish_approval(STATUS_PUBLISHED, false).is_err());
        assert!(validate_publish_approval(STATUS_PUBLISHED, true).is_ok());
        // Approval is only checked when publishing.
        assert!(validate_publish_approval(STATUS_ANSWERED, false).is_ok());
    }

    #[test]
    fn message_must_be_non_empty() {
        assert!(validate_message("").is_err());
        assert!(validate_message("   ").is_err());
        assert!(validate_message("Why is the sky blue?").is_ok());
    }

    #[test]
    fn message_over_limit_is_invalid() {
        let msg = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(validate_message(&msg).is_err());
        let msg = "a".repeat(MAX_MESSAGE_LENGTH);
        assert!(validate_message(&msg).is_ok());
    }

    #[test]
    fn rating_required_for_reviews_only() {
        assert!(validate_rating(KIND_REVIEW, None).is_err());
        assert!(validate_rating(KIND_REVIEW, Some(5)).is_ok());
        assert!(validate_rating(KIND_QUESTION, Some(3)).is_err());
        assert!(validate_rating(KIND_QUESTION, None).is_ok());
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(validate_rating(KIND_REVIEW, Some(0)).is_err());
        assert!(validate_rating(KIND_REVIEW, Some(1)).is_ok());
        assert!(validate_rating(KIND_REVIEW, Some(5)).is_ok());
        assert!(validate_rating(KIND_REVIEW, Some(6)).is_err());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(validate_email("kid@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a b@example.com").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn topic_and_age_group_allow_lists() {
        assert!(validate_topic("space").is_ok());
        assert!(validate_topic("astrology").is_err());
        assert!(validate_age_group("4_6").is_ok());
        assert!(validate_age_group("adult").is_err());
    }

    #[test]
    fn unknown_kind_is_invalid() {
        assert!(validate_kind("complaint").is_err());
        for k in VALID_KINDS {
            assert!(validate_kind(k).is_ok());
        }
    }
}
