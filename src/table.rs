//! Output data types: one [`Row`] per damage event, collected
//! into a [`FightTable`] by the Encounter Assembler.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use getset::{CopyGetters, Getters};

use crate::cooldown::Tracker;
use crate::event::DamageType;

/// One damage event, fully annotated with attribution and availability data.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Row {
    #[get_copy = "pub"]
    timestamp: i64,
    #[get = "pub"]
    source: String,
    #[get = "pub"]
    actor: String,
    #[get = "pub"]
    ability: String,
    #[get_copy = "pub"]
    amount: i64,
    #[get_copy = "pub"]
    absorbed: i64,
    #[get_copy = "pub"]
    unmitigated: i64,
    #[get_copy = "pub"]
    mitigated: i64,
    #[get_copy = "pub"]
    mitigation_pct: u32,
    #[get_copy = "pub"]
    intended_mit_pct: u32,
    #[get_copy = "pub"]
    damage_type: DamageType,
    #[get = "pub"]
    buffs: BTreeMap<String, Vec<String>>,
    #[get = "pub"]
    vulns: BTreeSet<String>,
    #[get = "pub"]
    deaths: Vec<String>,
    #[get = "pub"]
    available_mitigations_by_player: BTreeMap<String, Vec<String>>,
}

#[allow(clippy::too_many_arguments)]
impl Row {
    pub fn new(
        timestamp: i64,
        source: impl Into<String>,
        actor: impl Into<String>,
        ability: impl Into<String>,
        amount: i64,
        absorbed: i64,
        unmitigated: i64,
        damage_type: DamageType,
        buffs: BTreeMap<String, Vec<String>>,
        vulns: BTreeSet<String>,
        deaths: Vec<String>,
        available_mitigations_by_player: BTreeMap<String, Vec<String>>,
    ) -> Self {
        let mitigated = (unmitigated - amount).max(0);
        let mitigation_pct = if unmitigated > 0 {
            ((mitigated as f64 / unmitigated as f64) * 100.0).round() as u32
        } else {
            0
        };
        Row {
            timestamp,
            source: source.into(),
            actor: actor.into(),
            ability: ability.into(),
            amount,
            absorbed,
            unmitigated,
            mitigated,
            mitigation_pct,
            intended_mit_pct: 0,
            damage_type,
            buffs,
            vulns,
            deaths,
            available_mitigations_by_player,
        }
    }

    /// Set once the Mitigation Arithmetic component has resolved the
    /// row's buffs against the mitigation dataset.
    pub fn set_intended_mit_pct(&mut self, pct: u32) {
        self.intended_mit_pct = pct;
    }

    pub fn is_botched(&self) -> bool {
        crate::mitigation::is_botched(self.intended_mit_pct, self.mitigation_pct)
    }
}

/// The final, per-encounter output.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Getters)]
pub struct FightTable {
    #[get = "pub"]
    fight_id: String,
    #[get = "pub"]
    encounter_id: String,
    #[get = "pub"]
    name: String,
    #[get = "pub"]
    friendly_player_ids: Vec<String>,
    #[get = "pub"]
    rows: Vec<Row>,
    #[cfg_attr(feature = "serde", serde(skip))]
    #[get = "pub"]
    trackers: HashMap<(String, String), Tracker>,
    #[get = "pub"]
    exclusive_selections: HashMap<String, String>,
}

impl FightTable {
    pub fn new(
        fight_id: impl Into<String>,
        encounter_id: impl Into<String>,
        name: impl Into<String>,
        friendly_player_ids: Vec<String>,
        mut rows: Vec<Row>,
        trackers: HashMap<(String, String), Tracker>,
        exclusive_selections: HashMap<String, String>,
    ) -> Self {
        rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.actor.cmp(&b.actor)));
        FightTable {
            fight_id: fight_id.into(),
            encounter_id: encounter_id.into(),
            name: name.into(),
            friendly_player_ids,
            rows,
            trackers,
            exclusive_selections,
        }
    }
}
