//! Buff→Ability Resolver.
//!
//! Collapses side-effect buff names down to the ability that granted them,
//! so the Availability Index and Mitigation Arithmetic can reason about
//! abilities rather than the dozens of buff icons they can produce.
//! Background resolution is modeled as an explicit queue the caller drains
//! before treating the map as settled — there is no real concurrency in
//! this engine.
use std::collections::{HashMap, HashSet};

use crate::catalog::normalize;
use crate::config::{BuffOverrides, JobConfigs, KnownBuffJobs, LinkedAbilities};

/// One buff's resolution state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceState {
    /// The buff name is itself a configured action name.
    Direct(String),
    /// Queued for background resolution; not yet settled.
    Pending,
    /// Background resolution found no candidate action.
    Unresolved,
    /// Resolved to an ability via override or fuzzy effect-text match.
    Mapped(String),
}

/// Per-encounter map from normalized buff name to resolution state, plus the
/// queue of buffs still awaiting background resolution.
#[derive(Debug, Default)]
pub struct BuffSourceMap {
    entries: HashMap<String, SourceState>,
    pending: Vec<(String, String)>,
}

impl BuffSourceMap {
    pub fn new() -> Self {
        BuffSourceMap::default()
    }

    /// Resolve `buff` for a caster on `job`. A buff that matches neither a
    /// direct action name nor a hardcoded
    /// override is marked [`SourceState::Pending`] and queued for
    /// [`BuffSourceMap::drain_pending`].
    pub fn resolve(&mut self, buff: &str, job: &str, job_configs: &JobConfigs, overrides: &BuffOverrides) {
        if self.entries.contains_key(buff) {
            return;
        }

        if let Some(cfg) = job_configs.get(job) {
            if cfg.actions.keys().any(|name| normalize(name) == normalize(buff)) {
                self.entries.insert(buff.to_string(), SourceState::Direct(buff.to_string()));
                return;
            }
        }

        if let Some(target) = overrides.get(buff) {
            self.entries.insert(buff.to_string(), SourceState::Mapped(target.clone()));
            return;
        }

        self.entries.insert(buff.to_string(), SourceState::Pending);
        self.pending.push((buff.to_string(), job.to_string()));
    }

    /// Drains the pending queue, resolving each entry via the known-buff-job
    /// table first, then a fuzzy substring scan of job action effect text.
    pub fn drain_pending(&mut self, job_configs: &JobConfigs, known_buff_jobs: &KnownBuffJobs) {
        let queue = std::mem::take(&mut self.pending);
        for (buff, job) in queue {
            let needle = buff.to_lowercase();
            let candidate = known_buff_jobs
                .get(&buff)
                .and_then(|jobs| fuzzy_match_in_jobs(&needle, jobs.iter().map(String::as_str), job_configs))
                .or_else(|| fuzzy_match_in_jobs(&needle, std::iter::once(job.as_str()), job_configs));

            let state = match candidate {
                Some(ability) => SourceState::Mapped(ability),
                None => SourceState::Unresolved,
            };
            self.entries.insert(buff, state);
        }
    }

    /// Whether every queued buff has transitioned out of `Pending`.
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn state_of(&self, buff: &str) -> Option<&SourceState> {
        self.entries.get(buff)
    }
}

fn fuzzy_match_in_jobs<'a>(needle: &str, jobs: impl Iterator<Item = &'a str>, job_configs: &JobConfigs) -> Option<String> {
    for job in jobs {
        if let Some(cfg) = job_configs.get(job) {
            for (action_name, action) in &cfg.actions {
                if action.effects.iter().any(|effect| effect.to_lowercase().contains(needle)) {
                    return Some(action_name.clone());
                }
            }
        }
    }
    None
}

/// The set of abilities reachable from `start` through the undirected
/// linked-ability graph, including `start` itself.
fn linked_closure(start: &str, linked: &LinkedAbilities) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut stack = vec![start.to_string()];
    while let Some(node) = stack.pop() {
        if !seen.insert(node.clone()) {
            continue;
        }
        for neighbor in linked.get(&node).into_iter().flatten() {
            if !seen.contains(neighbor) {
                stack.push(neighbor.clone());
            }
        }
        for (key, neighbors) in linked {
            if neighbors.contains(&node) && !seen.contains(key) {
                stack.push(key.clone());
            }
        }
    }
    seen
}

/// Resolves a single buff against the rest of `buff_list` (needed for the
/// "prefer an already-present linked member" rule), without deduplicating.
pub fn resolve_one(buff: &str, buff_list: &[String], map: &BuffSourceMap, linked: &LinkedAbilities) -> String {
    match map.state_of(buff) {
        Some(SourceState::Direct(name)) | Some(SourceState::Mapped(name)) => {
            let closure = linked_closure(name, linked);
            buff_list
                .iter()
                .find(|candidate| closure.contains(*candidate))
                .cloned()
                .unwrap_or_else(|| name.clone())
        }
        _ => buff.to_string(),
    }
}

/// Resolves a damage event's buff list down to ability names, running each
/// through the linked-ability disambiguation pass, deduplicating while
/// preserving first-occurrence order.
pub fn resolve_buff_list(buff_list: &[String], map: &BuffSourceMap, linked: &LinkedAbilities) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for buff in buff_list {
        let resolved = resolve_one(buff, buff_list, map, linked);
        if seen.insert(resolved.clone()) {
            result.push(resolved);
        }
    }

    result
}
