//! Assembles a small synthetic Paladin encounter and prints the resulting
//! fight table. Run with `cargo run --example summary`.
use std::collections::HashMap;

use mitreport_core::actor::{Actor, ActorCatalog, Role};
use mitreport_core::assembler::{assemble, EncounterInput};
use mitreport_core::config::{
    ActionConfig, AutoAttackNames, BuffOverrides, DependencyMap, EngineConfig, ExclusiveGroups, IgnoredBuffs,
    JobConfig, JobConfigs, KnownBuffJobs, LinkedAbilities, MitigationDataset, MitigationEntry, MitigationKind,
    MitigationRelation,
};
use mitreport_core::event::{CastKind, DamageEventKind, DamageType, Event, StatusChangeKind};

fn main() {
    tracing_subscriber::fmt::init();

    let mut actors = ActorCatalog::new();
    actors.insert("1".into(), Actor::new("1", "Alice", Some("Paladin".into()), Role::Player));
    actors.insert("2".into(), Actor::new("2", "Training Dummy", None, Role::Npc));

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
            source: "Training Dummy".to_string(),
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
        fight_id: "demo-fight".to_string(),
        encounter_id: "demo-encounter".to_string(),
        name: "Training Dummy".to_string(),
        events,
        actors: &actors,
        job_configs: &jobs,
        mitigation_dataset: &dataset,
        exclusive_groups: &ExclusiveGroups::new(),
        dependency_map: &DependencyMap::new(),
        known_buff_jobs: &KnownBuffJobs::new(),
        buff_overrides: &BuffOverrides::new(),
        linked_abilities: &LinkedAbilities::new(),
        ignored_buffs: &IgnoredBuffs::new(),
        auto_attack_names: &AutoAttackNames::new(),
        engine_config: EngineConfig::default(),
    };

    let (table, counters) = assemble(input);

    println!("{} ({} rows)", table.name(), table.rows().len());
    for row in table.rows() {
        println!(
            "{:>6}ms {:<10} took {:>5} (of {:>5} unmitigated, {:>3}% mitigated, {:>3}% intended) from {}",
            row.timestamp(),
            row.actor(),
            row.amount(),
            row.unmitigated(),
            row.mitigation_pct(),
            row.intended_mit_pct(),
            row.ability(),
        );
        if row.is_botched() {
            println!("  -> botched: intended mitigation wasn't fully applied");
        }
    }

    if !counters.is_clean() {
        println!("diagnostics: {counters:?}");
    }
}
