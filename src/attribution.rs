//! Buff Attribution.
//!
//! For each damage event's active buff list, credits the caster(s) who
//! applied it using interval coverage, a lookback fallback, and finally a
//! known-job or recipient fallback when no caster can be found at all.
use std::collections::{BTreeMap, BTreeSet};

use crate::actor::{player_names, ActorCatalog};
use crate::config::KnownBuffJobs;
use crate::error::{Counters, EngineDiagnostic};
use crate::event::StatusInterval;

/// Read-only collaborators the attribution pass needs for one encounter.
pub struct AttributionContext<'a> {
    pub buff_intervals: &'a [StatusInterval],
    pub vuln_intervals: &'a [StatusInterval],
    pub death_intervals: &'a [StatusInterval],
    pub known_buff_jobs: &'a KnownBuffJobs,
    pub actors: &'a ActorCatalog,
    pub lookback_window_ms: i64,
}

impl<'a> AttributionContext<'a> {
    fn is_vulnerability_name(&self, buff: &str) -> bool {
        self.vuln_intervals.iter().any(|iv| iv.buff_name() == buff)
    }

    /// Credits the alphabetically-first player whose job is in `jobs`.
    ///
    /// `self.actors` is a `HashMap`, so its iteration order is randomized per
    /// process; picking by name from the already-sorted roster keeps "first
    /// matching player" deterministic across runs.
    fn friendly_job_holder(&self, jobs: &[String]) -> Option<String> {
        player_names(self.actors).into_iter().find(|name| {
            self.actors
                .values()
                .any(|a| a.name() == name && a.job().as_deref().is_some_and(|j| jobs.iter().any(|want| want == j)))
        })
    }
}

/// Attributes one damage event's active buffs to their casters.
///
/// Returns `buff_name -> [applier_name]`, already sorted and deduplicated
/// per buff.
pub fn attribute_buffs(
    ev_ts: i64,
    actor: &str,
    active_buffs: &[String],
    ctx: &AttributionContext,
    counters: &mut Counters,
) -> BTreeMap<String, Vec<String>> {
    let mut result: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for buff in active_buffs {
        let covering: Vec<&str> = ctx
            .buff_intervals
            .iter()
            .filter(|iv| iv.buff_name() == buff && iv.covers(ev_ts))
            .map(|iv| iv.source().as_str())
            .collect();

        if !covering.is_empty() {
            let entry = result.entry(buff.clone()).or_default();
            entry.extend(covering.into_iter().map(str::to_string));
            continue;
        }

        let lookback = ctx
            .buff_intervals
            .iter()
            .filter(|iv| {
                iv.buff_name() == buff
                    && !iv.is_open()
                    && iv.start() <= ev_ts
                    && ev_ts - iv.end() <= ctx.lookback_window_ms
                    && iv.end() <= ev_ts
            })
            .max_by_key(|iv| iv.end());

        if let Some(iv) = lookback {
            result.entry(buff.clone()).or_default().insert(iv.source().to_string());
            continue;
        }

        if ctx.is_vulnerability_name(buff) {
            counters.record_vulnerability_gap(buff, ev_ts);
        } else {
            tracing::warn!(buff, actor, ev_ts, "no applier found for buff");
            counters.record(&EngineDiagnostic::AttributionGap {
                buff: buff.clone(),
                timestamp: ev_ts,
            });
        }
        result.entry(buff.clone()).or_default();
    }

    // Missing-source sweep: buffs with no credit fall back to a known job
    // holder in the friendly roster, then to the damage recipient.
    for (buff, appliers) in result.iter_mut() {
        if !appliers.is_empty() {
            continue;
        }
        if ctx.is_vulnerability_name(buff) {
            continue;
        }
        if let Some(jobs) = ctx.known_buff_jobs.get(buff) {
            if let Some(holder) = ctx.friendly_job_holder(jobs) {
                appliers.insert(holder);
                continue;
            }
        }
        appliers.insert(actor.to_string());
    }

    result
        .into_iter()
        .map(|(buff, appliers)| (buff, appliers.into_iter().collect()))
        .collect()
}

/// Vulnerability names whose interval covers `(actor, ev_ts)`.
pub fn attribute_vulns(ev_ts: i64, actor: &str, ctx: &AttributionContext) -> BTreeSet<String> {
    ctx.vuln_intervals
        .iter()
        .filter(|iv| iv.source() == actor && iv.covers(ev_ts))
        .map(|iv| iv.buff_name().to_string())
        .collect()
}

/// Every actor whose death interval covers `ev_ts`, sorted.
pub fn attribute_deaths(ev_ts: i64, ctx: &AttributionContext) -> Vec<String> {
    let mut deaths: Vec<String> = ctx
        .death_intervals
        .iter()
        .filter(|iv| iv.covers(ev_ts))
        .map(|iv| iv.source().to_string())
        .collect();
    deaths.sort();
    deaths.dedup();
    deaths
}
