//! Oath Gauge.
//!
//! A per-player `u8` counter in `[0, 100]`: starts full on first observation,
//! drops by a fixed cost when the player casts their oath ability, rises by a
//! fixed amount on auto-attacks, and is forced to zero on death.
use getset::CopyGetters;

/// One player's Oath Gauge state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
pub struct OathGauge {
    #[get_copy = "pub"]
    value: u8,
    max: u8,
}

impl OathGauge {
    /// A fresh gauge, starting at `starting_oath`.
    pub fn new(starting_oath: u8, max: u8) -> Self {
        OathGauge {
            value: starting_oath.min(max),
            max,
        }
    }

    /// Spend `cost` on an oath-ability cast. Clamps at zero; never goes
    /// negative even if called on an already-empty gauge.
    pub fn spend(&mut self, cost: u8) {
        self.value = self.value.saturating_sub(cost);
    }

    /// Gain `amount` from an auto-attack, clamped at `max`.
    pub fn gain(&mut self, amount: u8) {
        self.value = self.value.saturating_add(amount).min(self.max);
    }

    /// Force the gauge to zero on death.
    pub fn kill(&mut self) {
        self.value = 0;
    }

    /// Whether the gauge has at least `cost` available.
    pub fn can_afford(&self, cost: u8) -> bool {
        self.value >= cost
    }
}
