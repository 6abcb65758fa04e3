//! Cooldown Engine.
//!
//! Processes casts in strict chronological order, maintaining one [`Tracker`]
//! per `(player, ability)` pair and dispatching job-specific handlers wired
//! up through the caller-supplied [`DependencyMap`].
use std::collections::HashMap;

use getset::{CopyGetters, Getters};

use crate::actor::ActorCatalog;
use crate::catalog::{record_exclusive_usage, AbilityCatalog};
use crate::config::{DependencyEntry, DependencyMap, EngineConfig, HandlerKind, JobScope};
use crate::error::{Counters, EngineDiagnostic};
use crate::event::{CastKind, Event};
use crate::oath::OathGauge;

/// Sentinel end value meaning "unresolved, indefinitely on cooldown". Shared
/// across [`crate::event::StatusInterval`] (open intervals) and [`CooldownWindow`]
/// (open locks / draw-pair placeholders).
pub const SENTINEL_OPEN: i64 = i64::MAX;

/// A single cooldown window, half-open on the conceptual timeline but stored
/// as an inclusive `[start, end]` pair.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
pub struct CooldownWindow {
    #[get_copy = "pub"]
    start: i64,
    #[get_copy = "pub"]
    end: i64,
}

impl CooldownWindow {
    pub fn new(start: i64, end: i64) -> Self {
        CooldownWindow { start, end }
    }

    pub fn is_open(&self) -> bool {
        self.end == SENTINEL_OPEN
    }

    pub fn covers(&self, ts: i64) -> bool {
        self.start <= ts && ts < self.end
    }
}

/// Per-tracker state for the Charged-Cooldown handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargedState {
    pub max_charges: u32,
    pub charges: u32,
    pub remainder_ms: i64,
    pub last_ts: Option<i64>,
}

/// One ability's cooldown history for one player.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Tracker {
    #[get = "pub"]
    player: String,
    #[get = "pub"]
    ability: String,
    #[get = "pub"]
    job: String,
    #[get_copy = "pub"]
    base_recast_ms: i64,
    #[get = "pub"]
    windows: Vec<CooldownWindow>,
    #[cfg_attr(feature = "serde", serde(skip))]
    charged: Option<ChargedState>,
}

impl Tracker {
    fn new(player: impl Into<String>, ability: impl Into<String>, job: impl Into<String>, base_recast_ms: i64) -> Self {
        Tracker {
            player: player.into(),
            ability: ability.into(),
            job: job.into(),
            base_recast_ms,
            windows: Vec::new(),
            charged: None,
        }
    }

    fn last_window_mut(&mut self) -> Option<&mut CooldownWindow> {
        self.windows.last_mut()
    }

    fn has_open_window_at(&self, start: i64) -> bool {
        self.windows.iter().any(|w| w.start == start && w.is_open())
    }

    fn ensure_lock(&mut self, start: i64) {
        if !self.has_open_window_at(start) {
            self.windows.push(CooldownWindow::new(start, SENTINEL_OPEN));
        }
    }

    fn resolve_open_end(&mut self, new_end: i64) {
        if let Some(window) = self.last_window_mut() {
            if window.is_open() {
                window.end = new_end;
            }
        }
    }
}

fn resolved_end(start: i64, candidate_end: i64) -> i64 {
    if candidate_end <= start {
        start + 1
    } else {
        candidate_end
    }
}

fn trio_abilities<'a>(dependency_map: &'a DependencyMap, job: &str) -> Vec<String> {
    dependency_map
        .iter()
        .find(|entry| {
            matches!(entry.handler, HandlerKind::PaladinAutoAttack | HandlerKind::PaladinDeathLock)
                && scope_matches(&entry.scope, job)
        })
        .map(|entry| entry.affects.clone())
        .unwrap_or_default()
}

fn scope_matches(scope: &JobScope, job: &str) -> bool {
    match scope {
        JobScope::Any => true,
        JobScope::Job(j) => j == job,
    }
}

/// A single cast, normalized for the engine's consumption (the assembler
/// extracts this from [`Event::Cast`]).
pub struct CastInput<'a> {
    pub timestamp: i64,
    pub player: &'a str,
    pub ability_id: u32,
    pub ability_name: &'a str,
    pub kind: CastKind,
}

/// The Cooldown Engine's accumulated state for one encounter.
pub struct CooldownEngine {
    trackers: HashMap<(String, String), Tracker>,
    oath: HashMap<String, OathGauge>,
    exclusive_selections: HashMap<String, String>,
    death_ptr: usize,
}

impl CooldownEngine {
    pub fn new() -> Self {
        CooldownEngine {
            trackers: HashMap::new(),
            oath: HashMap::new(),
            exclusive_selections: HashMap::new(),
            death_ptr: 0,
        }
    }

    pub fn trackers(&self) -> &HashMap<(String, String), Tracker> {
        &self.trackers
    }

    pub fn into_trackers(self) -> HashMap<(String, String), Tracker> {
        self.trackers
    }

    pub fn exclusive_selections(&self) -> &HashMap<String, String> {
        &self.exclusive_selections
    }

    pub fn oath_gauges(&self) -> &HashMap<String, OathGauge> {
        &self.oath
    }

    fn oath_mut(&mut self, player: &str, config: &EngineConfig) -> &mut OathGauge {
        self.oath
            .entry(player.to_string())
            .or_insert_with(|| OathGauge::new(config.starting_oath, config.oath_max))
    }

    /// Advance death settlement, locking any paladin tracker that dies before
    /// `cast_ts`. Must be called with deaths in non-decreasing timestamp
    /// order and `cast_ts` non-decreasing across calls.
    fn settle_deaths(
        &mut self,
        deaths: &[(i64, String)],
        cast_ts: i64,
        actors: &ActorCatalog,
        dependency_map: &DependencyMap,
        config: &EngineConfig,
    ) {
        while self.death_ptr < deaths.len() && deaths[self.death_ptr].0 < cast_ts {
            let (death_ts, actor_name) = deaths[self.death_ptr].clone();
            self.death_ptr += 1;
            let job = actors
                .values()
                .find(|a| *a.name() == actor_name)
                .and_then(|a| a.job().clone());
            if let Some(job) = job {
                if job == "Paladin" {
                    self.oath_mut(&actor_name, config).kill();
                    for ability in trio_abilities(dependency_map, &job) {
                        let key = (actor_name.clone(), crate::catalog::normalize(&ability));
                        let tracker = self
                            .trackers
                            .entry(key)
                            .or_insert_with(|| Tracker::new(actor_name.clone(), ability.clone(), job.clone(), 0));
                        tracker.ensure_lock(death_ts);
                    }
                }
            }
        }
    }

    /// Process one cast
    #[allow(clippy::too_many_arguments)]
    pub fn process_cast(
        &mut self,
        cast: &CastInput,
        deaths: &[(i64, String)],
        actors: &ActorCatalog,
        catalog: &AbilityCatalog,
        dependency_map: &DependencyMap,
        config: &EngineConfig,
        counters: &mut Counters,
    ) {
        self.settle_deaths(deaths, cast.timestamp, actors, dependency_map, config);

        let Some(job) = actors.values().find(|a| a.name() == cast.player).and_then(|a| a.job().clone()) else {
            counters.record(&EngineDiagnostic::DataMissing {
                player: cast.player.to_string(),
                ability: cast.ability_name.to_string(),
                reason: "actor job unknown".to_string(),
            });
            return;
        };

        record_exclusive_usage(
            catalog,
            cast.ability_name,
            &mut self.exclusive_selections,
            counters,
        );

        let Some(cooldown_info) = catalog.resolve_cooldown(&job, cast.ability_name) else {
            counters.record(&EngineDiagnostic::DataMissing {
                player: cast.player.to_string(),
                ability: cast.ability_name.to_string(),
                reason: "no recast configured for job".to_string(),
            });
            return;
        };

        let ability_norm = crate::catalog::normalize(cast.ability_name);
        let key = (cast.player.to_string(), ability_norm);
        self.trackers
            .entry(key.clone())
            .and_modify(|t| t.base_recast_ms = cooldown_info.recast_ms)
            .or_insert_with(|| {
                Tracker::new(cast.player, cast.ability_name, job.clone(), cooldown_info.recast_ms)
            });

        let matches: Vec<DependencyEntry> = dependency_map
            .iter()
            .filter(|entry| {
                scope_matches(&entry.scope, &job)
                    && crate::catalog::normalize(&entry.trigger) == crate::catalog::normalize(cast.ability_name)
            })
            .cloned()
            .collect();

        let mut default_called = false;

        if matches.is_empty() {
            self.default_add_cooldown(&key, cast.timestamp, cooldown_info.recast_ms, &mut default_called);
        } else {
            for entry in &matches {
                self.dispatch_handler(entry, cast, &key, cooldown_info.recast_ms, &job, config, &mut default_called, counters);
            }
        }

        if job == "Paladin" {
            self.ensure_oath_lock(cast.player, cast.timestamp, &job, dependency_map, config);
        }
    }

    fn default_add_cooldown(&mut self, key: &(String, String), ts: i64, recast_ms: i64, default_called: &mut bool) {
        if *default_called {
            return;
        }
        if let Some(tracker) = self.trackers.get_mut(key) {
            tracker.windows.push(CooldownWindow::new(ts, ts + recast_ms));
        }
        *default_called = true;
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch_handler(
        &mut self,
        entry: &DependencyEntry,
        cast: &CastInput,
        key: &(String, String),
        recast_ms: i64,
        _job: &str,
        config: &EngineConfig,
        default_called: &mut bool,
        counters: &mut Counters,
    ) {
        match entry.handler {
            HandlerKind::Default => self.default_add_cooldown(key, cast.timestamp, recast_ms, default_called),
            HandlerKind::MutualExclusivePair => {
                if let Some(tracker) = self.trackers.get_mut(key) {
                    tracker.windows.push(CooldownWindow::new(cast.timestamp, SENTINEL_OPEN));
                }
                *default_called = true;
                for affected in &entry.affects {
                    let affected_key = (cast.player.to_string(), crate::catalog::normalize(affected));
                    if let Some(tracker) = self.trackers.get_mut(&affected_key) {
                        if let Some(window) = tracker.last_window_mut() {
                            if window.is_open() {
                                window.end = window.start + recast_ms;
                            }
                        }
                    }
                }
            }
            HandlerKind::CardDependency => {
                let is_card_cast = entry
                    .affects
                    .iter()
                    .any(|a| crate::catalog::normalize(a) == crate::catalog::normalize(cast.ability_name));
                if is_card_cast {
                    if let Some(tracker) = self.trackers.get_mut(key) {
                        tracker.windows.push(CooldownWindow::new(cast.timestamp, SENTINEL_OPEN));
                    }
                    *default_called = true;
                } else {
                    for affected in &entry.affects {
                        let affected_key = (cast.player.to_string(), crate::catalog::normalize(affected));
                        if let Some(tracker) = self.trackers.get_mut(&affected_key) {
                            if let Some(window) = tracker.last_window_mut() {
                                if window.is_open() {
                                    if cast.timestamp <= window.start {
                                        counters.record(&EngineDiagnostic::InvariantViolation {
                                            player: cast.player.to_string(),
                                            ability: affected.clone(),
                                            reason: "card resolution timestamp at or before its window start".to_string(),
                                        });
                                    }
                                    window.end = resolved_end(window.start, cast.timestamp);
                                }
                            }
                        }
                    }
                    *default_called = true;
                }
            }
            HandlerKind::ChargedCooldown => {
                self.run_charged_cooldown(entry, cast, key, recast_ms);
                *default_called = true;
            }
            HandlerKind::PaladinOathAbility => {
                self.default_add_cooldown(key, cast.timestamp, recast_ms, default_called);
                let gauge = self.oath_mut(cast.player, config);
                if !gauge.can_afford(config.oath_cost) {
                    tracing::warn!(player = cast.player, ability = cast.ability_name, "oath gauge insufficient, debiting anyway");
                    counters.record(&EngineDiagnostic::ResourceUnderflow {
                        player: cast.player.to_string(),
                        gauge: gauge.value(),
                        cost: config.oath_cost,
                    });
                }
                gauge.spend(config.oath_cost);
            }
            HandlerKind::PaladinAutoAttack => {
                let gauge = self.oath_mut(cast.player, config);
                gauge.gain(config.oath_gain_per_auto);
                let unlocked = gauge.value() >= config.oath_cost;
                *default_called = true;
                if unlocked {
                    for ability in &entry.affects {
                        let affected_key = (cast.player.to_string(), crate::catalog::normalize(ability));
                        if let Some(tracker) = self.trackers.get_mut(&affected_key) {
                            for window in tracker.windows.iter_mut() {
                                if window.is_open() {
                                    window.end = window.start.max(cast.timestamp - 1) + 1;
                                }
                            }
                        }
                    }
                }
            }
            HandlerKind::PaladinDeathLock => {
                // Invoked only via death settlement, never as a cast dispatch.
                *default_called = true;
            }
        }
    }

    fn run_charged_cooldown(&mut self, entry: &DependencyEntry, cast: &CastInput, key: &(String, String), recast_ms: i64) {
        let max_charges = entry
            .max_charges
            .or_else(|| self.trackers.get(key).and_then(|t| t.charged.map(|c| c.max_charges)))
            .unwrap_or(1);

        let tracker = self.trackers.get_mut(key).expect("tracker created before dispatch");
        let state = tracker.charged.get_or_insert(ChargedState {
            max_charges,
            charges: max_charges,
            remainder_ms: 0,
            last_ts: None,
        });

        let elapsed = state.last_ts.map(|last| cast.timestamp - last).unwrap_or(0);
        let total = elapsed + state.remainder_ms;

        let remainder_before_cast;
        if state.charges >= state.max_charges {
            state.remainder_ms = 0;
            state.last_ts = Some(cast.timestamp);
            remainder_before_cast = 0;
        } else {
            let gained = (total / recast_ms) as u32;
            state.charges = (state.charges + gained).min(state.max_charges);
            state.remainder_ms = if state.charges == state.max_charges { 0 } else { total % recast_ms };
            state.last_ts = Some(cast.timestamp);
            remainder_before_cast = state.remainder_ms;
        }

        state.charges = state.charges.saturating_sub(1);

        if state.charges == 0 {
            let window_len = if remainder_before_cast > 0 && remainder_before_cast < recast_ms {
                recast_ms - remainder_before_cast
            } else {
                recast_ms
            };
            tracker.windows.push(CooldownWindow::new(cast.timestamp, cast.timestamp + window_len));
        }
    }

    fn ensure_oath_lock(&mut self, player: &str, ts: i64, job: &str, dependency_map: &DependencyMap, config: &EngineConfig) {
        let gauge_value = self.oath.get(player).map(|g| g.value()).unwrap_or(config.starting_oath);
        if gauge_value >= config.oath_cost {
            return;
        }
        for ability in trio_abilities(dependency_map, job) {
            let key = (player.to_string(), crate::catalog::normalize(&ability));
            let tracker = self
                .trackers
                .entry(key)
                .or_insert_with(|| Tracker::new(player, ability.clone(), job.to_string(), 0));
            tracker.ensure_lock(ts);
        }
    }
}

impl Default for CooldownEngine {
    fn default() -> Self {
        CooldownEngine::new()
    }
}

/// Extracts `(timestamp, actor)` pairs for every [`Event::Death`], sorted
/// ascending, for feeding [`CooldownEngine::process_cast`]'s death
/// settlement step.
pub fn death_timeline(events: &[Event]) -> Vec<(i64, String)> {
    let mut deaths: Vec<(i64, String)> = events
        .iter()
        .filter_map(|e| match e {
            Event::Death { timestamp, actor, .. } => Some((*timestamp, actor.clone())),
            _ => None,
        })
        .collect();
    deaths.sort_by_key(|(ts, _)| *ts);
    deaths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, Role};
    use crate::config::{ActionConfig, ExclusiveGroups, JobConfig, JobConfigs};

    fn paladin_actors() -> ActorCatalog {
        let mut actors = ActorCatalog::new();
        actors.insert(
            "1".into(),
            Actor::new("1", "Alice", Some("Paladin".into()), Role::Player),
        );
        actors
    }

    fn paladin_jobs() -> JobConfigs {
        let mut jobs = JobConfigs::new();
        let mut actions = HashMap::new();
        actions.insert(
            "Sheltron".to_string(),
            ActionConfig { recast_seconds: 25.0, max_charges: None, effects: vec![] },
        );
        actions.insert(
            "Fast Blade".to_string(),
            ActionConfig { recast_seconds: 2.5, max_charges: None, effects: vec![] },
        );
        jobs.insert("Paladin".to_string(), JobConfig { actions });
        jobs
    }

    #[test]
    fn default_handler_appends_window() {
        let actors = paladin_actors();
        let jobs = paladin_jobs();
        let groups: ExclusiveGroups = vec![];
        let catalog = AbilityCatalog::new(&jobs, &groups);
        let dependency_map: DependencyMap = vec![];
        let config = EngineConfig::default();
        let mut counters = Counters::default();
        let mut engine = CooldownEngine::new();

        let cast = CastInput { timestamp: 0, player: "Alice", ability_id: 1, ability_name: "Fast Blade", kind: CastKind::Cast };
        engine.process_cast(&cast, &[], &actors, &catalog, &dependency_map, &config, &mut counters);

        let tracker = engine.trackers().get(&("Alice".to_string(), "fast blade".to_string())).unwrap();
        assert_eq!(tracker.windows().len(), 1);
        assert_eq!(tracker.windows()[0].start(), 0);
        assert_eq!(tracker.windows()[0].end(), 2500);
    }

    #[test]
    fn missing_job_drops_cast_without_panicking() {
        let actors = ActorCatalog::new();
        let jobs = paladin_jobs();
        let groups: ExclusiveGroups = vec![];
        let catalog = AbilityCatalog::new(&jobs, &groups);
        let dependency_map: DependencyMap = vec![];
        let config = EngineConfig::default();
        let mut counters = Counters::default();
        let mut engine = CooldownEngine::new();

        let cast = CastInput { timestamp: 0, player: "Ghost", ability_id: 1, ability_name: "Fast Blade", kind: CastKind::Cast };
        engine.process_cast(&cast, &[], &actors, &catalog, &dependency_map, &config, &mut counters);

        assert!(engine.trackers().is_empty());
        assert_eq!(counters.data_missing(), 1);
    }

    #[test]
    fn oath_ability_debits_gauge_and_locks_when_insufficient() {
        let actors = paladin_actors();
        let jobs = paladin_jobs();
        let groups: ExclusiveGroups = vec![];
        let catalog = AbilityCatalog::new(&jobs, &groups);
        let dependency_map: DependencyMap = vec![
            DependencyEntry {
                scope: JobScope::Job("Paladin".to_string()),
                trigger: "Sheltron".to_string(),
                handler: HandlerKind::PaladinOathAbility,
                affects: vec![],
                max_charges: None,
            },
            DependencyEntry {
                scope: JobScope::Job("Paladin".to_string()),
                trigger: "Auto-attack".to_string(),
                handler: HandlerKind::PaladinAutoAttack,
                affects: vec!["Intervention".to_string(), "Sheltron".to_string(), "Holy Sheltron".to_string()],
                max_charges: None,
            },
        ];
        let config = EngineConfig { starting_oath: 40, ..EngineConfig::default() };
        let mut counters = Counters::default();
        let mut engine = CooldownEngine::new();

        let cast = CastInput { timestamp: 0, player: "Alice", ability_id: 1, ability_name: "Sheltron", kind: CastKind::Cast };
        engine.process_cast(&cast, &[], &actors, &catalog, &dependency_map, &config, &mut counters);

        assert_eq!(engine.oath_gauges().get("Alice").unwrap().value(), 0);
        assert_eq!(counters.resource_underflows(), 1);
        let tracker = engine.trackers().get(&("Alice".to_string(), "sheltron".to_string())).unwrap();
        assert!(tracker.windows().iter().any(|w| w.is_open()));
    }

    fn astrologian_actors() -> ActorCatalog {
        let mut actors = ActorCatalog::new();
        actors.insert("1".into(), Actor::new("1", "Casper", Some("Astrologian".into()), Role::Player));
        actors
    }

    fn astrologian_jobs() -> JobConfigs {
        let mut jobs = JobConfigs::new();
        let mut actions = HashMap::new();
        actions.insert("The Bole".to_string(), ActionConfig { recast_seconds: 30.0, max_charges: None, effects: vec![] });
        actions.insert("Umbral Draw".to_string(), ActionConfig { recast_seconds: 55.0, max_charges: None, effects: vec![] });
        jobs.insert("Astrologian".to_string(), JobConfig { actions });
        jobs
    }

    #[test]
    fn card_dependency_placeholder_resolves_on_the_matching_draw() {
        let actors = astrologian_actors();
        let jobs = astrologian_jobs();
        let groups: ExclusiveGroups = vec![];
        let catalog = AbilityCatalog::new(&jobs, &groups);
        let dependency_map: DependencyMap = vec![
            DependencyEntry {
                scope: JobScope::Job("Astrologian".to_string()),
                trigger: "The Bole".to_string(),
                handler: HandlerKind::CardDependency,
                affects: vec!["The Bole".to_string()],
                max_charges: None,
            },
            DependencyEntry {
                scope: JobScope::Job("Astrologian".to_string()),
                trigger: "Umbral Draw".to_string(),
                handler: HandlerKind::CardDependency,
                affects: vec!["The Bole".to_string()],
                max_charges: None,
            },
        ];
        let config = EngineConfig::default();
        let mut counters = Counters::default();
        let mut engine = CooldownEngine::new();

        let bole = CastInput { timestamp: 1200, player: "Casper", ability_id: 1, ability_name: "The Bole", kind: CastKind::Cast };
        engine.process_cast(&bole, &[], &actors, &catalog, &dependency_map, &config, &mut counters);

        let bole_key = ("Casper".to_string(), "the bole".to_string());
        let tracker = engine.trackers().get(&bole_key).unwrap();
        assert_eq!(tracker.windows().len(), 1);
        assert_eq!(tracker.windows()[0].start(), 1200);
        assert!(tracker.windows()[0].is_open());

        let draw = CastInput { timestamp: 120_000, player: "Casper", ability_id: 2, ability_name: "Umbral Draw", kind: CastKind::Cast };
        engine.process_cast(&draw, &[], &actors, &catalog, &dependency_map, &config, &mut counters);

        let tracker = engine.trackers().get(&bole_key).unwrap();
        assert_eq!(tracker.windows().len(), 1);
        assert_eq!(tracker.windows()[0].start(), 1200);
        assert_eq!(tracker.windows()[0].end(), 120_000);
        assert!(!tracker.windows()[0].is_open());

        let draw_key = ("Casper".to_string(), "umbral draw".to_string());
        assert!(engine.trackers().get(&draw_key).unwrap().windows().is_empty());
    }

    fn charged_jobs() -> JobConfigs {
        let mut jobs = JobConfigs::new();
        let mut actions = HashMap::new();
        actions.insert("Divine Veil".to_string(), ActionConfig { recast_seconds: 60.0, max_charges: Some(2), effects: vec![] });
        jobs.insert("Paladin".to_string(), JobConfig { actions });
        jobs
    }

    #[test]
    fn charged_cooldown_accumulates_and_regenerates_a_partial_charge() {
        let actors = paladin_actors();
        let jobs = charged_jobs();
        let groups: ExclusiveGroups = vec![];
        let catalog = AbilityCatalog::new(&jobs, &groups);
        let dependency_map: DependencyMap = vec![DependencyEntry {
            scope: JobScope::Job("Paladin".to_string()),
            trigger: "Divine Veil".to_string(),
            handler: HandlerKind::ChargedCooldown,
            affects: vec![],
            max_charges: Some(2),
        }];
        let config = EngineConfig::default();
        let mut counters = Counters::default();
        let mut engine = CooldownEngine::new();
        let key = ("Alice".to_string(), "divine veil".to_string());

        let first = CastInput { timestamp: 1000, player: "Alice", ability_id: 1, ability_name: "Divine Veil", kind: CastKind::Cast };
        engine.process_cast(&first, &[], &actors, &catalog, &dependency_map, &config, &mut counters);
        assert!(engine.trackers().get(&key).unwrap().windows().is_empty());

        let second = CastInput { timestamp: 6000, player: "Alice", ability_id: 1, ability_name: "Divine Veil", kind: CastKind::Cast };
        engine.process_cast(&second, &[], &actors, &catalog, &dependency_map, &config, &mut counters);
        let tracker = engine.trackers().get(&key).unwrap();
        assert_eq!(tracker.windows().len(), 1);
        assert_eq!(tracker.windows()[0].start(), 6000);
        assert_eq!(tracker.windows()[0].end(), 61_000);

        let third = CastInput { timestamp: 61_000, player: "Alice", ability_id: 1, ability_name: "Divine Veil", kind: CastKind::Cast };
        engine.process_cast(&third, &[], &actors, &catalog, &dependency_map, &config, &mut counters);
        let tracker = engine.trackers().get(&key).unwrap();
        assert_eq!(tracker.windows().len(), 2);
        assert_eq!(tracker.windows()[1].start(), 61_000);
        assert_eq!(tracker.windows()[1].end(), 121_000);
    }

    #[test]
    fn death_lock_forces_gauge_to_zero_and_locks_trio() {
        let actors = paladin_actors();
        let jobs = paladin_jobs();
        let groups: ExclusiveGroups = vec![];
        let catalog = AbilityCatalog::new(&jobs, &groups);
        let dependency_map: DependencyMap = vec![DependencyEntry {
            scope: JobScope::Job("Paladin".to_string()),
            trigger: "Auto-attack".to_string(),
            handler: HandlerKind::PaladinAutoAttack,
            affects: vec!["Intervention".to_string(), "Sheltron".to_string(), "Holy Sheltron".to_string()],
            max_charges: None,
        }];
        let config = EngineConfig::default();
        let mut counters = Counters::default();
        let mut engine = CooldownEngine::new();

        let deaths = vec![(500, "Alice".to_string())];
        let cast = CastInput { timestamp: 1000, player: "Alice", ability_id: 1, ability_name: "Fast Blade", kind: CastKind::Cast };
        engine.process_cast(&cast, &deaths, &actors, &catalog, &dependency_map, &config, &mut counters);

        assert_eq!(engine.oath_gauges().get("Alice").unwrap().value(), 0);
        let tracker = engine.trackers().get(&("Alice".to_string(), "sheltron".to_string())).unwrap();
        assert!(tracker.windows().iter().any(|w| w.start() == 500 && w.is_open()));
    }
}
