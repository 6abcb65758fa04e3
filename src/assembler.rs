//! Encounter Assembler.
//!
//! Wires every other component together into the single entry point callers
//! use: [`assemble`]. Owns the per-encounter mutable state — the Cooldown
//! Engine's trackers/oath/exclusive-selections and the Buff→Ability
//! Resolver's `BuffSourceMap` — for exactly the lifetime of one call.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::actor::{player_names, ActorCatalog};
use crate::attribution::{attribute_buffs, attribute_deaths, attribute_vulns, AttributionContext};
use crate::availability::AvailabilityIndex;
use crate::catalog::AbilityCatalog;
use crate::config::{
    AutoAttackNames, BuffOverrides, DependencyMap, EngineConfig, ExclusiveGroups, IgnoredBuffs, JobConfigs,
    KnownBuffJobs, LinkedAbilities, MitigationDataset,
};
use crate::cooldown::{death_timeline, CastInput, CooldownEngine};
use crate::error::Counters;
use crate::event::{CastKind, DamageEventKind, Event};
use crate::mitigation::intended_mit_pct;
use crate::resolver::{resolve_one, BuffSourceMap};
use crate::table::{FightTable, Row};

/// Everything the assembler needs for one encounter. All fields are
/// immutable inputs except `events`, which is consumed by value.
pub struct EncounterInput<'a> {
    pub fight_id: String,
    pub encounter_id: String,
    pub name: String,
    pub events: Vec<Event>,
    pub actors: &'a ActorCatalog,
    pub job_configs: &'a JobConfigs,
    pub mitigation_dataset: &'a MitigationDataset,
    pub exclusive_groups: &'a ExclusiveGroups,
    pub dependency_map: &'a DependencyMap,
    pub known_buff_jobs: &'a KnownBuffJobs,
    pub buff_overrides: &'a BuffOverrides,
    pub linked_abilities: &'a LinkedAbilities,
    pub ignored_buffs: &'a IgnoredBuffs,
    pub auto_attack_names: &'a AutoAttackNames,
    pub engine_config: EngineConfig,
}

fn mitigation_ability_names(job: &str, dataset: &MitigationDataset) -> Vec<String> {
    let mut names: Vec<String> = dataset
        .values()
        .flatten()
        .filter(|entry| entry.job == job)
        .map(|entry| entry.parent_ability.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Normalizes a cast-like event into a [`CastInput`], merging native casts
/// with auto-attacks synthesized from calculated-damage packets.
fn build_cast_timeline<'a>(events: &'a [Event], auto_attack_names: &AutoAttackNames) -> Vec<CastInput<'a>> {
    let mut casts: Vec<CastInput<'a>> = events
        .iter()
        .filter_map(|e| match e {
            Event::Cast { timestamp, source, ability_id, ability_name, kind, .. } => Some(CastInput {
                timestamp: *timestamp,
                player: source,
                ability_id: *ability_id,
                ability_name,
                kind: *kind,
            }),
            Event::DamageTaken { timestamp, source, ability_name, event_kind: DamageEventKind::CalculatedDamage, .. }
                if auto_attack_names.contains(ability_name) =>
            {
                Some(CastInput {
                    timestamp: *timestamp,
                    player: source,
                    ability_id: 0,
                    ability_name,
                    kind: CastKind::AutoAttack,
                })
            }
            _ => None,
        })
        .collect();

    casts.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.player.cmp(b.player)));
    casts
}

fn filter_ignored(buffs: &[String], ignored: &IgnoredBuffs) -> Vec<String> {
    buffs.iter().filter(|b| !ignored.contains(*b)).cloned().collect()
}

/// Runs the full pipeline and returns the resulting table plus diagnostic
/// counters: callers use the counters to distinguish "no data" from
/// "malformed data".
pub fn assemble(input: EncounterInput) -> (FightTable, Counters) {
    let mut counters = Counters::default();
    let config = input.engine_config;

    let encounter_end = input.events.iter().map(Event::timestamp).max().unwrap_or(0);

    let buff_intervals =
        crate::status::build_status_intervals(&input.events, false, config.early_remove_threshold_ms, &mut counters);
    let vuln_intervals =
        crate::status::build_status_intervals(&input.events, true, config.early_remove_threshold_ms, &mut counters);
    let death_intervals = crate::status::build_death_intervals(&input.events, encounter_end);

    let catalog = AbilityCatalog::new(input.job_configs, input.exclusive_groups);

    let mut buff_source_map = BuffSourceMap::new();
    for interval in &buff_intervals {
        if let Some(job) = input
            .actors
            .values()
            .find(|a| a.name() == interval.source())
            .and_then(|a| a.job().clone())
        {
            buff_source_map.resolve(interval.buff_name(), &job, input.job_configs, input.buff_overrides);
        }
    }
    buff_source_map.drain_pending(input.job_configs, input.known_buff_jobs);

    let deaths = death_timeline(&input.events);
    let cast_timeline = build_cast_timeline(&input.events, input.auto_attack_names);

    let mut engine = CooldownEngine::new();
    for cast in &cast_timeline {
        engine.process_cast(cast, &deaths, input.actors, &catalog, input.dependency_map, &config, &mut counters);
    }

    let players = player_names(input.actors);
    let mut baseline: HashMap<String, Vec<String>> = HashMap::new();
    for player in &players {
        if let Some(job) = input.actors.values().find(|a| *a.name() == *player).and_then(|a| a.job().clone()) {
            let mitigations = mitigation_ability_names(&job, input.mitigation_dataset);
            baseline.insert(player.clone(), catalog.mitigation_list(&job, &mitigations, engine.exclusive_selections()));
        }
    }

    let mut damage_timestamps: Vec<i64> = input
        .events
        .iter()
        .filter_map(|e| match e {
            Event::DamageTaken { timestamp, .. } => Some(*timestamp),
            _ => None,
        })
        .collect();
    damage_timestamps.sort_unstable();
    damage_timestamps.dedup();

    let availability = AvailabilityIndex::build(&damage_timestamps, engine.trackers(), &baseline, &catalog);

    let attribution_ctx = AttributionContext {
        buff_intervals: &buff_intervals,
        vuln_intervals: &vuln_intervals,
        death_intervals: &death_intervals,
        known_buff_jobs: input.known_buff_jobs,
        actors: input.actors,
        lookback_window_ms: config.lookback_window_ms,
    };

    let mut rows = Vec::new();
    for event in &input.events {
        let Event::DamageTaken {
            timestamp,
            source,
            actor,
            ability_name,
            amount,
            absorbed,
            unmitigated,
            damage_type,
            active_buffs,
            event_kind: DamageEventKind::Damage,
        } = event
        else {
            continue;
        };

        let raw_buffs = filter_ignored(active_buffs, input.ignored_buffs);

        let raw_credit = attribute_buffs(*timestamp, actor, &raw_buffs, &attribution_ctx, &mut counters);
        let mut resolved_buffs: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (raw_buff, appliers) in raw_credit {
            let resolved_name = resolve_one(&raw_buff, &raw_buffs, &buff_source_map, input.linked_abilities);
            let entry = resolved_buffs.entry(resolved_name).or_default();
            for applier in appliers {
                if !entry.contains(&applier) {
                    entry.push(applier);
                }
            }
        }
        for appliers in resolved_buffs.values_mut() {
            appliers.sort();
        }

        let vulns: BTreeSet<String> = attribute_vulns(*timestamp, actor, &attribution_ctx);
        let deaths_here = attribute_deaths(*timestamp, &attribution_ctx);

        let mut available_by_player = BTreeMap::new();
        for player in &players {
            available_by_player.insert(player.clone(), availability.available_at(*timestamp, player));
        }

        let target_job = input.actors.values().find(|a| *a.name() == *actor).and_then(|a| a.job().clone());
        let intended = target_job
            .as_deref()
            .map(|job| intended_mit_pct(&raw_buffs, *damage_type, job, input.mitigation_dataset))
            .unwrap_or(0);

        let mut row = Row::new(
            *timestamp,
            source.clone(),
            actor.clone(),
            ability_name.clone(),
            *amount,
            *absorbed,
            *unmitigated,
            *damage_type,
            resolved_buffs,
            vulns,
            deaths_here,
            available_by_player,
        );
        row.set_intended_mit_pct(intended);
        rows.push(row);
    }

    let exclusive_selections = engine.exclusive_selections().clone();
    let table = FightTable::new(
        input.fight_id,
        input.encounter_id,
        input.name,
        players,
        rows,
        engine.into_trackers(),
        exclusive_selections,
    );

    (table, counters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, Role};
    use crate::config::{ActionConfig, JobConfig, MitigationEntry, MitigationKind, MitigationRelation};
    use crate::event::{CastKind, DamageType, StatusChangeKind};

    fn paladin_setup() -> (ActorCatalog, JobConfigs, MitigationDataset) {
        let mut actors = ActorCatalog::new();
        actors.insert("1".into(), Actor::new("1", "Alice", Some("Paladin".into()), Role::Player));
        actors.insert("2".into(), Actor::new("2", "Boss", None, Role::Npc));

        let mut jobs = JobConfigs::new();
        let mut actions = HashMap::new();
        actions.insert("Sheltron".to_string(), ActionConfig { recast_seconds: 25.0, max_charges: None, effects: vec![] });
        jobs.insert("Paladin".to_string(), JobConfig { actions });

        let mut dataset = MitigationDataset::new();
        dataset.insert(
            "Paladin".to_string(),
            vec![MitigationEntry {
                name: "Sheltron".to_string(),
                kind: MitigationKind::Reduction,
                relation: MitigationRelation::SelfMit,
                amount_pct: 40.0,
                condition: None,
                granted_by: None,
                parent_ability: "Sheltron".to_string(),
                job: "Paladin".to_string(),
            }],
        );

        (actors, jobs, dataset)
    }

    #[test]
    fn end_to_end_produces_sorted_rows_with_attribution() {
        let (actors, jobs, dataset) = paladin_setup();
        let groups = ExclusiveGroups::new();
        let dependency_map = DependencyMap::new();
        let known_buff_jobs = KnownBuffJobs::new();
        let overrides = BuffOverrides::new();
        let linked = LinkedAbilities::new();
        let ignored = IgnoredBuffs::new();
        let auto_attack_names = AutoAttackNames::new();

        let events = vec![
            Event::Cast {
                timestamp: 0,
                source: "Alice".to_string(),
                target: None,
                ability_id: 1,
                ability_name: "Sheltron".to_string(),
                kind: CastKind::Cast,
            },
            Event::BuffChange {
                timestamp: 0,
                source: "Alice".to_string(),
                target: "Alice".to_string(),
                ability_id: 1,
                ability_name: "Sheltron".to_string(),
                stacks: None,
                kind: StatusChangeKind::Apply,
            },
            Event::BuffChange {
                timestamp: 25_000,
                source: "Alice".to_string(),
                target: "Alice".to_string(),
                ability_id: 1,
                ability_name: "Sheltron".to_string(),
                stacks: None,
                kind: StatusChangeKind::Remove,
            },
            Event::DamageTaken {
                timestamp: 5000,
                source: "Boss".to_string(),
                actor: "Alice".to_string(),
                ability_name: "Tail Sweep".to_string(),
                amount: 600,
                absorbed: 0,
                unmitigated: 1000,
                damage_type: DamageType::Physical,
                active_buffs: vec!["Sheltron".to_string()],
                event_kind: DamageEventKind::Damage,
            },
        ];

        let input = EncounterInput {
            fight_id: "f1".to_string(),
            encounter_id: "e1".to_string(),
            name: "Training Dummy".to_string(),
            events,
            actors: &actors,
            job_configs: &jobs,
            mitigation_dataset: &dataset,
            exclusive_groups: &groups,
            dependency_map: &dependency_map,
            known_buff_jobs: &known_buff_jobs,
            buff_overrides: &overrides,
            linked_abilities: &linked,
            ignored_buffs: &ignored,
            auto_attack_names: &auto_attack_names,
            engine_config: EngineConfig::default(),
        };

        let (table, _counters) = assemble(input);
        assert_eq!(table.rows().len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.buffs().get("Sheltron").unwrap(), &vec!["Alice".to_string()]);
        assert_eq!(row.intended_mit_pct(), 40);
        assert_eq!(row.mitigated(), 400);
    }

    #[test]
    fn empty_event_stream_produces_empty_table() {
        let actors = ActorCatalog::new();
        let jobs = JobConfigs::new();
        let dataset = MitigationDataset::new();
        let groups = ExclusiveGroups::new();
        let dependency_map = DependencyMap::new();
        let known_buff_jobs = KnownBuffJobs::new();
        let overrides = BuffOverrides::new();
        let linked = LinkedAbilities::new();
        let ignored = IgnoredBuffs::new();
        let auto_attack_names = AutoAttackNames::new();

        let input = EncounterInput {
            fight_id: "f1".to_string(),
            encounter_id: "e1".to_string(),
            name: "Empty".to_string(),
            events: vec![],
            actors: &actors,
            job_configs: &jobs,
            mitigation_dataset: &dataset,
            exclusive_groups: &groups,
            dependency_map: &dependency_map,
            known_buff_jobs: &known_buff_jobs,
            buff_overrides: &overrides,
            linked_abilities: &linked,
            ignored_buffs: &ignored,
            auto_attack_names: &auto_attack_names,
            engine_config: EngineConfig::default(),
        };

        let (table, counters) = assemble(input);
        assert!(table.rows().is_empty());
        assert!(counters.is_clean());
    }
}
