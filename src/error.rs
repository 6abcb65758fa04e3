//! Error taxonomy and non-fatal diagnostic counters.
//!
//! Nothing in the core engine is fatal for a single event: a dropped cast, an
//! unresolved buff source, or a conflicting exclusive-group selection is
//! logged (via `tracing`) and folded into the [`Counters`] returned alongside
//! the [`crate::table::FightTable`]. This lets callers tell "no data" apart
//! from "malformed data" without scraping the log stream.
use getset::CopyGetters;
use thiserror::Error;

/// A single non-fatal condition raised while building the fight table.
///
/// Every variant corresponds to one row of the error taxonomy in the design
/// document. None of them abort processing; they are always paired with a
/// `tracing` event at the severity noted on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineDiagnostic {
    /// A cast could not be resolved to a job or a base recast time and was
    /// dropped from cooldown bookkeeping. Logged at warn/debug.
    #[error("data missing for {player}/{ability}: {reason}")]
    DataMissing {
        player: String,
        ability: String,
        reason: String,
    },

    /// A cooldown window or stack count was out of its invariant range and
    /// was auto-corrected. Logged at warn.
    #[error("invariant violation for {player}/{ability}: {reason}")]
    InvariantViolation {
        player: String,
        ability: String,
        reason: String,
    },

    /// A buff on a damage event had no covering interval and lookback
    /// failed. Logged at warn, unless the buff is a known vulnerability (then
    /// debug-only).
    #[error("attribution gap for buff {buff} at {timestamp}")]
    AttributionGap { buff: String, timestamp: i64 },

    /// Two variants of the same mutually-exclusive group were observed in
    /// one fight. Logged at error, once per group per fight.
    #[error("mutual exclusion conflict in group {group_id}: {first} vs {second}")]
    MutualExclusionConflict {
        group_id: String,
        first: String,
        second: String,
    },

    /// A Paladin oath-consuming cast was recorded with the gauge already
    /// below the cost. Logged at warn; the cast still records its cooldown
    /// and lock.
    #[error("resource underflow for {player}: gauge {gauge} below cost {cost}")]
    ResourceUnderflow { player: String, gauge: u8, cost: u8 },
}

/// Counters mirroring [`EngineDiagnostic`], returned alongside every
/// [`crate::table::FightTable`] so a caller can distinguish "the log was
/// simply empty" from "the log was malformed in N places" without parsing
/// log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, CopyGetters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[getset(get_copy = "pub")]
pub struct Counters {
    data_missing: u32,
    invariant_violations: u32,
    attribution_gaps: u32,
    mutual_exclusion_conflicts: u32,
    resource_underflows: u32,
}

impl Counters {
    pub(crate) fn record(&mut self, diagnostic: &EngineDiagnostic) {
        match diagnostic {
            EngineDiagnostic::DataMissing { player, ability, reason } => {
                self.data_missing += 1;
                tracing::debug!(player = %player, ability = %ability, reason = %reason, "data missing");
            }
            EngineDiagnostic::InvariantViolation { player, ability, reason } => {
                self.invariant_violations += 1;
                tracing::warn!(player = %player, ability = %ability, reason = %reason, "invariant violation auto-corrected");
            }
            EngineDiagnostic::AttributionGap { buff, timestamp } => {
                self.attribution_gaps += 1;
                tracing::warn!(buff = %buff, timestamp = %timestamp, "buff attribution gap");
            }
            EngineDiagnostic::MutualExclusionConflict { group_id, first, second } => {
                self.mutual_exclusion_conflicts += 1;
                tracing::error!(group_id = %group_id, first = %first, second = %second, "mutual exclusion conflict");
            }
            EngineDiagnostic::ResourceUnderflow { player, gauge, cost } => {
                self.resource_underflows += 1;
                tracing::warn!(player = %player, gauge = %gauge, cost = %cost, "resource underflow");
            }
        }
    }

    /// Same as [`record`][Self::record], but the attribution gap is known to
    /// be on a recognized vulnerability, so it is only debug-logged and not
    /// counted as a gap.
    pub(crate) fn record_vulnerability_gap(&mut self, buff: &str, timestamp: i64) {
        tracing::debug!(buff = %buff, timestamp = %timestamp, "vulnerability without covering interval");
    }

    /// True if no diagnostic has been recorded at all.
    pub fn is_clean(&self) -> bool {
        *self == Counters::default()
    }
}

/// Error returned when a string cannot be parsed into a [`crate::actor::Role`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("invalid role identifier: {0}")]
pub struct ParseRoleError(pub String);
