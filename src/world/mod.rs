//! World model and mutation library.
//!
//! Contains the closed faction/territory/leader/card sets, the world-state
//! snapshot, and the `Result`-returning mutation operations the battle core
//! goes through to change shared state.

pub mod card;
pub mod faction;
pub mod forces;
pub mod leader;
pub mod ops;
pub mod state;
pub mod territory;

pub use card::{
    CardId, CardInfo, CardKind, DefenseKind, TraitorCard, WeaponKind, ALL_CARDS, CARD_COUNT,
    CARD_INFO,
};
pub use faction::{Ability, Faction, ALL_FACTIONS, FACTION_COUNT};
pub use forces::{ForceKind, ForceStack, ELITE_MULTIPLIER, MAX_STACK};
pub use leader::{
    LeaderId, LeaderInfo, LeaderState, ALL_LEADERS, LEADER_COUNT, LEADER_INFO,
};
pub use ops::{Breach, OpError};
pub use state::{EscortState, WorldState, STARTING_POOL};
pub use territory::{Territory, ALL_TERRITORIES, TERRITORY_COUNT};
