//! Ability Catalog.
//!
//! Normalizes ability names, resolves base recast/max-charge counts from job
//! configs, and derives each job's baseline mitigation list while filtering
//! mutually-exclusive groups on a first-observed-wins basis.
use std::collections::HashMap;

use crate::config::{ActionConfig, ExclusiveGroups, JobConfigs};
use crate::error::{Counters, EngineDiagnostic};

/// Normalize an ability name: trim and lowercase. Idempotent and stable
/// across calls.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Resolved cooldown information for one ability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooldownInfo {
    pub recast_ms: i64,
    pub max_charges: Option<u32>,
}

/// The exclusive group an ability belongs to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusiveGroupInfo {
    pub group_id: String,
    pub job: String,
}

/// Read-only view over the caller-supplied job configs and exclusive groups.
///
/// Data-driven instead of a closed enum: job/ability names come from the
/// caller's configuration rather than being baked in as fixed IDs.
pub struct AbilityCatalog<'a> {
    jobs: &'a JobConfigs,
    exclusive_groups: &'a ExclusiveGroups,
    /// normalized ability name -> exclusive group info, built once.
    group_index: HashMap<String, ExclusiveGroupInfo>,
}

impl<'a> AbilityCatalog<'a> {
    pub fn new(jobs: &'a JobConfigs, exclusive_groups: &'a ExclusiveGroups) -> Self {
        let mut group_index = HashMap::new();
        for group in exclusive_groups {
            for ability in &group.abilities {
                group_index.insert(
                    normalize(ability),
                    ExclusiveGroupInfo {
                        group_id: group.group_id.clone(),
                        job: group.job.clone(),
                    },
                );
            }
        }
        AbilityCatalog {
            jobs,
            exclusive_groups,
            group_index,
        }
    }

    fn find_action(&self, job: &str, ability: &str) -> Option<&ActionConfig> {
        let job_config = self.jobs.get(job)?;
        let normalized = normalize(ability);
        job_config
            .actions
            .iter()
            .find(|(name, _)| normalize(name) == normalized)
            .map(|(_, action)| action)
    }

    /// Resolve the base recast and max-charge count for `ability` on `job`.
    pub fn resolve_cooldown(&self, job: &str, ability: &str) -> Option<CooldownInfo> {
        let action = self.find_action(job, ability)?;
        Some(CooldownInfo {
            recast_ms: (action.recast_seconds * 1000.0).round() as i64,
            max_charges: action.max_charges,
        })
    }

    /// The exclusive group `ability` belongs to, if any.
    pub fn exclusive_group_of(&self, ability: &str) -> Option<&ExclusiveGroupInfo> {
        self.group_index.get(&normalize(ability))
    }

    /// Every ability configured for `job`, in configuration order.
    pub fn job_actions(&self, job: &str) -> Vec<&str> {
        self.jobs
            .get(job)
            .map(|cfg| cfg.actions.keys().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// The job's baseline mitigation ability list, filtered so that only the
    /// first-observed variant of each mutually-exclusive group survives.
    ///
    /// `exclusive_selections` maps `group_id -> ability_name` as recorded by
    /// the cooldown engine while processing casts in chronological order; any
    /// group with no recorded selection yet keeps all of its variants (no
    /// cast of any variant has been observed, so nothing can be excluded).
    pub fn mitigation_list(
        &self,
        job: &str,
        all_mitigation_abilities: &[String],
        exclusive_selections: &HashMap<String, String>,
    ) -> Vec<String> {
        let job_actions: std::collections::HashSet<String> = self
            .job_actions(job)
            .into_iter()
            .map(normalize)
            .collect();

        all_mitigation_abilities
            .iter()
            .filter(|ability| job_actions.contains(&normalize(ability)))
            .filter(|ability| match self.exclusive_group_of(ability) {
                None => true,
                Some(info) => match exclusive_selections.get(&info.group_id) {
                    None => true,
                    Some(selected) => normalize(selected) == normalize(ability),
                },
            })
            .cloned()
            .collect()
    }

    /// All configured exclusive groups, for iteration by callers that need to
    /// seed `exclusive_selections` (e.g. the assembler's conflict reporting).
    pub fn exclusive_groups(&self) -> &'a ExclusiveGroups {
        self.exclusive_groups
    }
}

/// Records the first-observed variant of a mutually-exclusive group into
/// `exclusive_selections`, reporting (non-fatally) any later variant that
/// conflicts with it. Called by the Cooldown Engine once per cast whose
/// ability belongs to a group.
pub fn record_exclusive_usage(
    catalog: &AbilityCatalog,
    ability: &str,
    exclusive_selections: &mut HashMap<String, String>,
    counters: &mut Counters,
) {
    let Some(info) = catalog.exclusive_group_of(ability) else {
        return;
    };
    match exclusive_selections.get(&info.group_id) {
        None => {
            exclusive_selections.insert(info.group_id.clone(), ability.to_string());
        }
        Some(existing) if normalize(existing) != normalize(ability) => {
            counters.record(&EngineDiagnostic::MutualExclusionConflict {
                group_id: info.group_id.clone(),
                first: existing.clone(),
                second: ability.to_string(),
            });
        }
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ActionConfig, JobConfig};

    fn sample_catalog() -> (JobConfigs, ExclusiveGroups) {
        let mut jobs = JobConfigs::new();
        let mut actions = HashMap::new();
        actions.insert(
            "Sheltron".to_string(),
            ActionConfig {
                recast_seconds: 25.0,
                max_charges: None,
                effects: vec![],
            },
        );
        actions.insert(
            "Holy Sheltron".to_string(),
            ActionConfig {
                recast_seconds: 25.0,
                max_charges: None,
                effects: vec![],
            },
        );
        jobs.insert(
            "Paladin".to_string(),
            JobConfig { actions },
        );
        let groups = vec![crate::config::ExclusiveGroup {
            job: "Paladin".to_string(),
            group_id: "sheltron-variant".to_string(),
            abilities: vec!["Sheltron".to_string(), "Holy Sheltron".to_string()],
        }];
        (jobs, groups)
    }

    #[test]
    fn normalize_is_idempotent() {
        assert_eq!(normalize("  Holy Sheltron  "), normalize(&normalize("  Holy Sheltron  ")));
        assert_eq!(normalize("  Holy Sheltron  "), "holy sheltron");
    }

    #[test]
    fn resolve_cooldown_converts_seconds_to_ms() {
        let (jobs, groups) = sample_catalog();
        let catalog = AbilityCatalog::new(&jobs, &groups);
        let info = catalog.resolve_cooldown("Paladin", "Sheltron").unwrap();
        assert_eq!(info.recast_ms, 25_000);
    }

    #[test]
    fn mitigation_list_keeps_first_observed_exclusive_variant() {
        let (jobs, groups) = sample_catalog();
        let catalog = AbilityCatalog::new(&jobs, &groups);
        let all = vec!["Sheltron".to_string(), "Holy Sheltron".to_string()];
        let mut selections = HashMap::new();
        selections.insert("sheltron-variant".to_string(), "Holy Sheltron".to_string());
        let list = catalog.mitigation_list("Paladin", &all, &selections);
        assert_eq!(list, vec!["Holy Sheltron".to_string()]);
    }

    #[test]
    fn mitigation_list_keeps_both_when_no_selection_recorded() {
        let (jobs, groups) = sample_catalog();
        let catalog = AbilityCatalog::new(&jobs, &groups);
        let all = vec!["Sheltron".to_string(), "Holy Sheltron".to_string()];
        let list = catalog.mitigation_list("Paladin", &all, &HashMap::new());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn record_exclusive_usage_reports_conflict() {
        let (jobs, groups) = sample_catalog();
        let catalog = AbilityCatalog::new(&jobs, &groups);
        let mut selections = HashMap::new();
        let mut counters = Counters::default();
        record_exclusive_usage(&catalog, "Sheltron", &mut selections, &mut counters);
        record_exclusive_usage(&catalog, "Holy Sheltron", &mut selections, &mut counters);
        assert_eq!(selections.get("sheltron-variant").unwrap(), "Sheltron");
        assert_eq!(counters.mutual_exclusion_conflicts(), 1);
    }
}
