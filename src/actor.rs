//! Actors participating in the encounter.
//!
//! Only [`Role::Player`] actors participate in mitigation calculations; NPCs,
//! pets, and limit breaks are retained in the roster so that events
//! referencing them resolve, but they never gain tracker state.
use std::collections::HashMap;
use std::str::FromStr;

use getset::{CopyGetters, Getters};

use crate::error::ParseRoleError;

/// The kind of entity an [`Actor`] represents.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// A real player character. The only role that takes part in mitigation
    /// bookkeeping.
    Player,
    /// A non-player character, usually the boss or an add.
    Npc,
    /// A summoned pet.
    Pet,
    /// The shared limit break "actor".
    LimitBreak,
}

impl Role {
    /// Whether this role participates in cooldown/mitigation tracking.
    pub fn is_player(self) -> bool {
        matches!(self, Role::Player)
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &s.to_lowercase() as &str {
            "player" => Ok(Role::Player),
            "npc" => Ok(Role::Npc),
            "pet" => Ok(Role::Pet),
            "limit_break" | "limitbreak" => Ok(Role::LimitBreak),
            _ => Err(ParseRoleError(s.to_owned())),
        }
    }
}

/// A participant in the encounter.
///
/// `id` is the caller-supplied stable identifier (matching whatever key the
/// raw event stream uses); `name` is what shows up in [`crate::table::Row`]
/// fields and in buff/vuln/death attribution.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Actor {
    #[get = "pub"]
    id: String,
    #[get = "pub"]
    name: String,
    /// `None` when the job could not be resolved for this actor, e.g. an add
    /// without a configured job.
    #[get = "pub"]
    job: Option<String>,
    #[get_copy = "pub"]
    role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, job: Option<String>, role: Role) -> Self {
        Actor {
            id: id.into(),
            name: name.into(),
            job,
            role,
        }
    }
}

/// The full actor catalog for an encounter, keyed by the caller-supplied id.
pub type ActorCatalog = HashMap<String, Actor>;

/// Returns the names of every friendly player in the catalog.
///
/// "Friendly" here just means `Role::Player`; the distinction between
/// friendly and hostile players (e.g. in PvP-adjacent content) is left to the
/// caller, who is expected to only hand player actors that belong to the
/// raid/party into the catalog in the first place.
pub fn player_names(catalog: &ActorCatalog) -> Vec<String> {
    let mut names: Vec<String> = catalog
        .values()
        .filter(|a| a.role().is_player())
        .map(|a| a.name().to_owned())
        .collect();
    names.sort();
    names.dedup();
    names
}
