//! Status Interval Builder.
//!
//! Turns a stream of apply/apply-stack/remove-stack/remove/refresh events
//! into closed `{source, buff, start, end, stacks, targets}` intervals. The
//! same state machine is reused for buffs, vulnerabilities (keyed by
//! `(target, buff)` instead of `(source, buff)`), and deaths (one interval
//! per actor, closed by the next death or encounter end).
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::cooldown::SENTINEL_OPEN;
use crate::error::{Counters, EngineDiagnostic};
use crate::event::{Event, StatusChangeKind, StatusInterval};

/// A normalized view over a `BuffChange`/`DebuffChange` event, used so the
/// same state machine can drive both.
struct StatusChangeEvent<'a> {
    timestamp: i64,
    source: &'a str,
    target: &'a str,
    buff_name: &'a str,
    stacks: Option<u32>,
    kind: StatusChangeKind,
}

fn as_status_change_events(events: &[Event], want_debuff: bool) -> Vec<StatusChangeEvent<'_>> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::BuffChange {
                timestamp,
                source,
                target,
                ability_name,
                stacks,
                kind,
                ..
            } if !want_debuff => Some(StatusChangeEvent {
                timestamp: *timestamp,
                source,
                target,
                buff_name: ability_name,
                stacks: *stacks,
                kind: *kind,
            }),
            Event::DebuffChange {
                timestamp,
                source,
                target,
                ability_name,
                stacks,
                kind,
                ..
            } if want_debuff => Some(StatusChangeEvent {
                timestamp: *timestamp,
                source,
                target,
                buff_name: ability_name,
                stacks: *stacks,
                kind: *kind,
            }),
            _ => None,
        })
        .collect()
}

/// One in-progress interval, tracked per key while it stays open.
struct OpenInterval {
    start: i64,
    stacks: u32,
    targets: BTreeSet<String>,
}

/// Builds intervals for buffs (keyed by `(source, buff)`) or vulnerabilities
/// (keyed by `(target, buff)`, with the interval's `source` field set to the
/// target itself, since a vulnerability has no meaningful caster).
///
/// `encounter_end` closes any interval still open when the stream runs out,
/// marking it with [`SENTINEL_OPEN`].
pub fn build_status_intervals(
    events: &[Event],
    is_vulnerability: bool,
    early_remove_threshold_ms: i64,
    counters: &mut Counters,
) -> Vec<StatusInterval> {
    let changes = as_status_change_events(events, is_vulnerability);

    let mut open: HashMap<(String, String), OpenInterval> = HashMap::new();
    let mut closed: Vec<StatusInterval> = Vec::new();

    for change in &changes {
        let key_owner = if is_vulnerability {
            change.target
        } else {
            change.source
        };
        let key = (key_owner.to_string(), change.buff_name.to_string());

        match change.kind {
            StatusChangeKind::Apply => {
                let entry = open.entry(key).or_insert_with(|| OpenInterval {
                    start: change.timestamp,
                    stacks: change.stacks.unwrap_or(1),
                    targets: BTreeSet::new(),
                });
                entry.targets.insert(change.target.to_string());
            }
            StatusChangeKind::ApplyStack => {
                let entry = open.entry(key).or_insert_with(|| OpenInterval {
                    start: change.timestamp,
                    stacks: change.stacks.unwrap_or(1),
                    targets: BTreeSet::new(),
                });
                entry.stacks = change.stacks.unwrap_or(entry.stacks);
                entry.targets.insert(change.target.to_string());
            }
            StatusChangeKind::RemoveStack => {
                if let Some(entry) = open.get_mut(&key) {
                    if entry.stacks == 0 {
                        counters.record(&EngineDiagnostic::InvariantViolation {
                            player: change.target.to_string(),
                            ability: change.buff_name.to_string(),
                            reason: "remove_stack on a buff already at zero stacks".to_string(),
                        });
                    }
                    entry.stacks = entry.stacks.saturating_sub(1);
                }
            }
            StatusChangeKind::Remove => {
                if let Some(entry) = open.get_mut(&key) {
                    entry.targets.remove(change.target);
                    if entry.targets.is_empty() {
                        let entry = open.remove(&key).unwrap();
                        closed.push(StatusInterval::new(
                            key_owner,
                            change.buff_name,
                            entry.start,
                            change.timestamp,
                            entry.stacks,
                            {
                                let mut targets = BTreeSet::new();
                                targets.insert(change.target.to_string());
                                targets
                            },
                        ));
                    }
                } else if change.timestamp <= early_remove_threshold_ms {
                    tracing::debug!(
                        buff = change.buff_name,
                        target = change.target,
                        "synthesizing early-remove interval assumed present at pull"
                    );
                    let mut targets = BTreeSet::new();
                    targets.insert(change.target.to_string());
                    closed.push(StatusInterval::new(
                        key_owner,
                        change.buff_name,
                        0,
                        change.timestamp,
                        1,
                        targets,
                    ));
                } else {
                    tracing::debug!(
                        buff = change.buff_name,
                        target = change.target,
                        timestamp = change.timestamp,
                        "remove with no open interval, discarding"
                    );
                }
            }
            StatusChangeKind::Refresh => {}
        }
    }

    for ((owner, buff_name), entry) in open {
        closed.push(StatusInterval::new(
            owner,
            buff_name,
            entry.start,
            SENTINEL_OPEN,
            entry.stacks,
            entry.targets,
        ));
    }

    closed.sort_by_key(|interval| interval.start());
    closed
}

/// Builds one death interval per actor: `{actor, start, end}` where `end` is
/// the timestamp of the next death for that actor (implying a revive
/// happened in between) or encounter end if this is the actor's last death.
pub fn build_death_intervals(events: &[Event], encounter_end: i64) -> Vec<StatusInterval> {
    let mut by_actor: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for event in events {
        if let Event::Death { actor, timestamp, .. } = event {
            by_actor.entry(actor.clone()).or_default().push(*timestamp);
        }
    }

    let mut intervals = Vec::new();
    for (actor, mut timestamps) in by_actor {
        timestamps.sort_unstable();
        for (idx, &start) in timestamps.iter().enumerate() {
            let end = timestamps.get(idx + 1).copied().unwrap_or(encounter_end);
            let mut targets = BTreeSet::new();
            targets.insert(actor.clone());
            intervals.push(StatusInterval::new(actor.clone(), "death", start, end, 1, targets));
        }
    }

    intervals.sort_by_key(|interval| interval.start());
    intervals
}
