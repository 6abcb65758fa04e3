//! Caller-supplied, immutable configuration inputs.
//!
//! None of these types are produced by the engine; they model the external
//! collaborators this engine never produces itself (job definitions, mitigation
//! dataset, linked-ability table, dependency map, known-buff-job map). The
//! engine treats all of them as read-only for the lifetime of one encounter.
use std::collections::{HashMap, HashSet};

/// A single action entry inside a [`JobConfig`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ActionConfig {
    pub recast_seconds: f64,
    pub max_charges: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<String>,
}

/// All configured actions for a single job.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobConfig {
    pub actions: HashMap<String, ActionConfig>,
}

/// `job name -> job config`.
pub type JobConfigs = HashMap<String, JobConfig>;

/// The damage-relation filter an entry in the mitigation dataset applies to.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MitigationRelation {
    SelfMit,
    Ally,
}

/// The kind of mitigation effect an entry represents.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MitigationKind {
    Reduction,
    Debuff,
    Shield,
    Special,
}

/// A damage-type condition a mitigation entry is restricted to.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MitigationCondition {
    Physical,
    Magical,
}

/// One row of the mitigation dataset, grouped by job.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MitigationEntry {
    pub name: String,
    pub kind: MitigationKind,
    pub relation: MitigationRelation,
    pub amount_pct: f64,
    pub condition: Option<MitigationCondition>,
    pub granted_by: Option<String>,
    pub parent_ability: String,
    /// The job this entry belongs to. Entries apply to damage taken by
    /// members of this job ([`MitigationRelation::SelfMit`]) or to any ally
    /// ([`MitigationRelation::Ally`]).
    pub job: String,
}

/// `job name -> mitigation entries for that job`.
pub type MitigationDataset = HashMap<String, Vec<MitigationEntry>>;

/// A mutually-exclusive ability group, e.g. Sheltron vs. Holy Sheltron.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusiveGroup {
    pub job: String,
    pub group_id: String,
    pub abilities: Vec<String>,
}

pub type ExclusiveGroups = Vec<ExclusiveGroup>;

/// The built-in cooldown-engine handler a [`DependencyEntry`] selects.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Default,
    MutualExclusivePair,
    CardDependency,
    ChargedCooldown,
    PaladinOathAbility,
    PaladinAutoAttack,
    PaladinDeathLock,
}

/// The job scope a [`DependencyEntry`] applies to.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobScope {
    Any,
    Job(String),
}

/// One row of the dependency map, dispatching a trigger
/// ability to the handler that should process its casts.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub scope: JobScope,
    pub trigger: String,
    pub handler: HandlerKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub affects: Vec<String>,
    pub max_charges: Option<u32>,
}

pub type DependencyMap = Vec<DependencyEntry>;

/// `buff name -> job names known to grant it`, used as an attribution
/// fallback.
pub type KnownBuffJobs = HashMap<String, Vec<String>>;

/// `buff name -> ability name`, a hardcoded escape hatch for buffs whose
/// display name never matches the granting action.
pub type BuffOverrides = HashMap<String, String>;

/// `ability -> abilities sharing a conceptual identity`, an undirected
/// multigraph stored as an adjacency list.
pub type LinkedAbilities = HashMap<String, Vec<String>>;

pub type IgnoredBuffs = HashSet<String>;

pub type AutoAttackNames = HashSet<String>;

/// Which numeric ability-type code maps to which [`crate::event::DamageType`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityTypeEntry {
    Magical32,
    Physical128,
    Magical1024,
    Other(u32),
}

impl AbilityTypeEntry {
    pub fn to_damage_type(self) -> crate::event::DamageType {
        use crate::event::DamageType;
        match self {
            AbilityTypeEntry::Magical32 | AbilityTypeEntry::Magical1024 => DamageType::Magical,
            AbilityTypeEntry::Physical128 => DamageType::Physical,
            AbilityTypeEntry::Other(_) => DamageType::Unique,
        }
    }

    /// Classify a raw ability-type code
    pub fn from_code(code: u32) -> AbilityTypeEntry {
        match code {
            32 => AbilityTypeEntry::Magical32,
            128 => AbilityTypeEntry::Physical128,
            1024 => AbilityTypeEntry::Magical1024,
            other => AbilityTypeEntry::Other(other),
        }
    }
}

/// `ability_id -> ability-type entry`.
pub type AbilityTypeCatalog = HashMap<u32, AbilityTypeEntry>;

/// The engine's tunable constants, with their defaults.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub lookback_window_ms: i64,
    pub early_remove_threshold_ms: i64,
    pub oath_cost: u8,
    pub oath_gain_per_auto: u8,
    pub oath_max: u8,
    pub starting_oath: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            lookback_window_ms: 30_000,
            early_remove_threshold_ms: 30_000,
            oath_cost: 50,
            oath_gain_per_auto: 5,
            oath_max: 100,
            starting_oath: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ability_type_classification_matches_spec_codes() {
        assert_eq!(
            AbilityTypeEntry::from_code(32).to_damage_type(),
            crate::event::DamageType::Magical
        );
        assert_eq!(
            AbilityTypeEntry::from_code(128).to_damage_type(),
            crate::event::DamageType::Physical
        );
        assert_eq!(
            AbilityTypeEntry::from_code(1024).to_damage_type(),
            crate::event::DamageType::Magical
        );
        assert_eq!(
            AbilityTypeEntry::from_code(7).to_damage_type(),
            crate::event::DamageType::Unique
        );
    }

    #[test]
    fn engine_config_default_matches_spec_constants() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.lookback_window_ms, 30_000);
        assert_eq!(cfg.oath_cost, 50);
        assert_eq!(cfg.oath_gain_per_auto, 5);
        assert_eq!(cfg.oath_max, 100);
        assert_eq!(cfg.starting_oath, 100);
    }
}
