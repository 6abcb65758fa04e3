//! Mitigation Arithmetic.
//!
//! Computes the multiplicative "intended" mitigation percentage for a set of
//! active buffs, and flags rows where the damage actually dealt implies less
//! mitigation was applied than the active buffs should have produced.
use std::collections::HashSet;

use crate::config::{MitigationCondition, MitigationDataset, MitigationRelation};
use crate::event::DamageType;

fn condition_matches(condition: Option<MitigationCondition>, damage_type: DamageType) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    match damage_type {
        DamageType::Physical => condition == MitigationCondition::Physical,
        DamageType::Magical => condition == MitigationCondition::Magical,
        // Condition filtering only applies to physical/magical damage;
        // other damage types ignore it.
        DamageType::Unique | DamageType::Unknown => true,
    }
}

fn relation_matches(relation: MitigationRelation, entry_job: &str, target_job: &str) -> bool {
    match relation {
        MitigationRelation::SelfMit => entry_job == target_job,
        MitigationRelation::Ally => entry_job != target_job,
    }
}

/// The reduction fraction `a_i ∈ [0,1]` contributed by a single buff, or
/// `0.0` if the buff isn't in the mitigation dataset at all.
fn resolve_amount(buff_name: &str, damage_type: DamageType, target_job: &str, dataset: &MitigationDataset) -> f64 {
    let normalized = buff_name.to_lowercase();
    let mut jobs: Vec<&String> = dataset.keys().collect();
    jobs.sort();

    let mut candidates = Vec::new();
    for job in jobs {
        for entry in &dataset[job] {
            if entry.name.to_lowercase() == normalized
                && condition_matches(entry.condition, damage_type)
                && relation_matches(entry.relation, &entry.job, target_job)
            {
                candidates.push(entry);
            }
        }
    }

    if candidates.is_empty() {
        return 0.0;
    }

    let first_amount = candidates[0].amount_pct;
    if candidates.iter().any(|c| c.amount_pct != first_amount) {
        tracing::warn!(buff = buff_name, "conflicting mitigation amounts, using first match");
    }

    (first_amount / 100.0).clamp(0.0, 1.0)
}

/// `round(100 * (1 - product(1 - a_i)))` for the given active buffs.
pub fn intended_mit_pct(buffs: &[String], damage_type: DamageType, target_job: &str, dataset: &MitigationDataset) -> u32 {
    let product: f64 = buffs
        .iter()
        .map(|buff| 1.0 - resolve_amount(buff, damage_type, target_job, dataset))
        .product();
    ((1.0 - product) * 100.0).round() as u32
}

/// A row is botched when the intended mitigation exceeds what was actually
/// applied.
pub fn is_botched(intended_mit_pct: u32, mitigation_pct: u32) -> bool {
    intended_mit_pct > mitigation_pct
}

/// Buffs present on the final damage packet but absent from the paired
/// calculated-damage packet, compared case-insensitively and deduplicated.
/// These are the buffs whose mitigation failed to register as expected.
pub fn potentially_botched_buffs(final_buffs: &[String], calculated_buffs: &[String]) -> Vec<String> {
    let calculated_lower: HashSet<String> = calculated_buffs.iter().map(|b| b.to_lowercase()).collect();
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for buff in final_buffs {
        let lower = buff.to_lowercase();
        if !calculated_lower.contains(&lower) && seen.insert(lower) {
            result.push(buff.clone());
        }
    }
    result
}
