//! Availability Index.
//!
//! Answers "which mitigation abilities are off cooldown for player P at time
//! t?" for every row timestamp, by walking a monotone pointer over each
//! tracker's cooldown windows as the timestamp advances.
use std::collections::HashMap;

use crate::catalog::{normalize, AbilityCatalog};
use crate::cooldown::Tracker;

/// A monotone cursor over one tracker's windows.
struct Cursor<'a> {
    tracker: &'a Tracker,
    idx: usize,
}

impl<'a> Cursor<'a> {
    fn new(tracker: &'a Tracker) -> Self {
        Cursor { tracker, idx: 0 }
    }

    /// Advance past windows that have fully elapsed by `t`, then report
    /// whether `t` still falls inside the current window.
    fn on_cooldown_at(&mut self, t: i64) -> bool {
        let windows = self.tracker.windows();
        while self.idx < windows.len() && !windows[self.idx].is_open() && windows[self.idx].end() <= t {
            self.idx += 1;
        }
        windows
            .get(self.idx)
            .map(|w| w.start() <= t && (w.is_open() || t < w.end()))
            .unwrap_or(false)
    }
}

/// Precomputed per-player, per-timestamp availability answers.
///
/// Built once over the sorted unique damage timestamps `T`; each
/// `(player, t)` lookup afterwards is `O(1)`.
pub struct AvailabilityIndex {
    /// `(player, timestamp) -> available ability names`.
    answers: HashMap<(String, i64), Vec<String>>,
}

impl AvailabilityIndex {
    /// Build the index. `timestamps` must be sorted ascending and
    /// deduplicated; `baseline` gives each player's mitigation list, already
    /// reconciled with exclusive selections.
    pub fn build(
        timestamps: &[i64],
        trackers: &HashMap<(String, String), Tracker>,
        baseline: &HashMap<String, Vec<String>>,
        catalog: &AbilityCatalog,
    ) -> Self {
        let _ = catalog;
        let mut by_player: HashMap<&str, Vec<&Tracker>> = HashMap::new();
        for tracker in trackers.values() {
            by_player.entry(tracker.player()).or_default().push(tracker);
        }

        let mut cursors: HashMap<(&str, String), Cursor> = HashMap::new();
        for (player, player_trackers) in &by_player {
            for tracker in player_trackers {
                cursors.insert((*player, normalize(tracker.ability())), Cursor::new(tracker));
            }
        }

        let mut answers = HashMap::new();
        for &t in timestamps {
            for (player, list) in baseline {
                let available: Vec<String> = list
                    .iter()
                    .filter(|ability| {
                        let key = (player.as_str(), normalize(ability));
                        match cursors.get_mut(&key) {
                            Some(cursor) => !cursor.on_cooldown_at(t),
                            None => true,
                        }
                    })
                    .cloned()
                    .collect();
                answers.insert((player.clone(), t), available);
            }
        }

        AvailabilityIndex { answers }
    }

    /// Which of `player`'s baseline mitigations are off cooldown at `t`.
    /// Returns an empty vector for players with no baseline list or `t` not
    /// in the built timestamp set.
    pub fn available_at(&self, t: i64, player: &str) -> Vec<String> {
        self.answers
            .get(&(player.to_string(), t))
            .cloned()
            .unwrap_or_default()
    }
}
