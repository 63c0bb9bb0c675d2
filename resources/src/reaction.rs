//! The like/dislike reconciliation engine.
//!
//! A user's stance on a resource is tri-state: liked, disliked, or neutral.
//! Neutral is modeled as the ABSENCE of a vote (`Option::<Reaction>::None`),
//! which makes the "never store a neutral sentinel" invariant hold by
//! construction: reverting to neutral deletes the persisted row.
//!
//! [`apply_reaction`] is the complete transition function. Given the current
//! stance and the button the user pressed, it returns the next stance and a
//! signed delta for the resource's shared counter:
//!
//! | current  | pressed  | next     | delta |
//! |----------|----------|----------|-------|
//! | neutral  | liked    | liked    | +1    |
//! | neutral  | disliked | disliked | −1    |
//! | liked    | liked    | neutral  | −1    |
//! | liked    | disliked | disliked | −2    |
//! | disliked | disliked | neutral  | +1    |
//! | disliked | liked    | liked    | +2    |
//!
//! The table is symmetric under swapping liked↔disliked and negating the
//! delta. The ±2 rows are the "double swing" of switching polarity directly;
//! the delta must be applied as a single atomic adjustment, never as two
//! independent ±1 steps.

use crate::error::{ResourceError, Result};
use serde::{Deserialize, Serialize};

/// A stored vote on a resource.
///
/// There is no `None` variant on purpose: neutral is the absence of a vote,
/// carried as `Option<Reaction>` everywhere a tri-state is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    /// Upvote.
    Liked,
    /// Downvote.
    Disliked,
}

impl Reaction {
    /// Storage name of the vote.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Liked => "liked",
            Self::Disliked => "disliked",
        }
    }

    /// Parse a stored vote.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Internal`] for any value other than the two
    /// storable votes; a persisted "none" would violate the schema invariant.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "liked" => Ok(Self::Liked),
            "disliked" => Ok(Self::Disliked),
            other => Err(ResourceError::Internal(format!(
                "unknown reaction value: {other}"
            ))),
        }
    }

    /// Contribution of this vote to the shared counter.
    #[must_use]
    pub const fn weight(self) -> i64 {
        match self {
            Self::Liked => 1,
            Self::Disliked => -1,
        }
    }

    /// The vote of opposite polarity.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Liked => Self::Disliked,
            Self::Disliked => Self::Liked,
        }
    }
}

/// Reconcile a button press against the current stance.
///
/// Returns the next stance and the signed delta to apply to the resource's
/// aggregate counter. This is the complete transition function; see the
/// module docs for the full table.
///
/// # Examples
///
/// ```
/// use optimal_resources::{Reaction, apply_reaction};
///
/// // First like
/// assert_eq!(apply_reaction(None, Reaction::Liked), (Some(Reaction::Liked), 1));
///
/// // Switching polarity swings the counter by two
/// assert_eq!(
///     apply_reaction(Some(Reaction::Liked), Reaction::Disliked),
///     (Some(Reaction::Disliked), -2)
/// );
/// ```
#[must_use]
pub fn apply_reaction(current: Option<Reaction>, requested: Reaction) -> (Option<Reaction>, i64) {
    match current {
        // First vote
        None => (Some(requested), requested.weight()),
        // Pressing the active button toggles back to neutral
        Some(previous) if previous == requested => (None, -requested.weight()),
        // Direct polarity switch: remove the old vote, add the new one
        Some(previous) => (Some(requested), requested.weight() - previous.weight()),
    }
}

/// Render the aggregate counter for display.
///
/// Exactly zero renders as the literal word "Like"; every other value,
/// negatives included, renders as the number itself. Presentation only —
/// the stored integer may be zero or negative and both are valid.
#[must_use]
pub fn likes_label(likes: i64) -> String {
    if likes == 0 {
        "Like".to_string()
    } else {
        likes.to_string()
    }
}
