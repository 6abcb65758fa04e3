//! Event definitions.
//!
//! This module contains the high-level event stream that the rest of the
//! engine consumes. Events arrive already parsed and tagged by the caller
//! Network fetch and wire-format parsing are external collaborators; there
//! is no raw-bytes decoding step in this crate at all.
use getset::{CopyGetters, Getters};

/// What kind of cast this is.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    Cast,
    AutoAttack,
}

/// What happened to a buff/debuff at this timestamp.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusChangeKind {
    Apply,
    ApplyStack,
    RemoveStack,
    Remove,
    Refresh,
}

/// The broad damage category of a [`EventKind::DamageTaken`] event.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageType {
    Physical,
    Magical,
    /// Present but not one of the three known type codes. Carries no
    /// conditional filter in mitigation arithmetic.
    Unique,
    /// No ability-type entry could be found at all.
    Unknown,
}

/// Whether a damage event is the final packet or the informational
/// "calculated damage" packet used to detect botched mitigation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageEventKind {
    Damage,
    CalculatedDamage,
}

/// A single entry in the chronologically sorted event stream.
///
/// Timestamps are relative to encounter start, in integer milliseconds.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Cast {
        timestamp: i64,
        source: String,
        target: Option<String>,
        ability_id: u32,
        ability_name: String,
        kind: CastKind,
    },
    BuffChange {
        timestamp: i64,
        source: String,
        target: String,
        ability_id: u32,
        ability_name: String,
        stacks: Option<u32>,
        kind: StatusChangeKind,
    },
    DebuffChange {
        timestamp: i64,
        source: String,
        target: String,
        ability_id: u32,
        ability_name: String,
        stacks: Option<u32>,
        kind: StatusChangeKind,
    },
    DamageTaken {
        timestamp: i64,
        source: String,
        actor: String,
        ability_name: String,
        amount: i64,
        absorbed: i64,
        unmitigated: i64,
        damage_type: DamageType,
        active_buffs: Vec<String>,
        event_kind: DamageEventKind,
    },
    Death {
        timestamp: i64,
        actor: String,
        source: Option<String>,
        ability_name: Option<String>,
    },
}

impl Event {
    /// The timestamp carried by every event variant.
    pub fn timestamp(&self) -> i64 {
        match self {
            Event::Cast { timestamp, .. }
            | Event::BuffChange { timestamp, .. }
            | Event::DebuffChange { timestamp, .. }
            | Event::DamageTaken { timestamp, .. }
            | Event::Death { timestamp, .. } => *timestamp,
        }
    }

    /// A stable secondary sort key used to break timestamp ties, reflecting
    /// original emission order for casts.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Event::Cast { source, .. }
            | Event::BuffChange { source, .. }
            | Event::DebuffChange { source, .. }
            | Event::DamageTaken { source, .. } => Some(source),
            Event::Death { actor, .. } => Some(actor),
        }
    }
}

/// A single closed-or-open interval produced by the status interval builder.
///
/// `end = SENTINEL_OPEN` (see [`crate::cooldown::SENTINEL_OPEN`]) marks an
/// interval unresolved at encounter end.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct StatusInterval {
    #[get = "pub"]
    source: String,
    #[get = "pub"]
    buff_name: String,
    #[get_copy = "pub"]
    start: i64,
    #[get_copy = "pub"]
    end: i64,
    #[get_copy = "pub"]
    stacks: u32,
    #[get = "pub"]
    targets: std::collections::BTreeSet<String>,
}

impl StatusInterval {
    pub fn new(
        source: impl Into<String>,
        buff_name: impl Into<String>,
        start: i64,
        end: i64,
        stacks: u32,
        targets: std::collections::BTreeSet<String>,
    ) -> Self {
        debug_assert!(start <= end, "StatusInterval must satisfy start <= end");
        StatusInterval {
            source: source.into(),
            buff_name: buff_name.into(),
            start,
            end,
            stacks,
            targets,
        }
    }

    /// Whether this interval covers the given timestamp.
    pub fn covers(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }

    pub fn is_open(&self) -> bool {
        self.end == crate::cooldown::SENTINEL_OPEN
    }
}
