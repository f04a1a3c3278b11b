//! The battle core.
//!
//! Locates battles, drives each engagement through its sub-phases, resolves
//! the revealed plans deterministically, and applies the consequences
//! through the world mutation library.

pub mod betrayal;
pub mod combat;
pub mod consequence;
pub mod controller;
pub mod engagement;
pub mod locate;
pub mod plan;

pub use combat::{
    resolve, resolve_normal, Outcome, Payout, SideInput, SideOutcome, AGGRESSOR_WINS_TIES,
    ESCORT_BONUS,
};
pub use consequence::CAPTURE_REWARD;
pub use controller::BattleRound;
pub use engagement::{
    BetrayalCall, CardConstraint, Commitment, CompulsionCommand, Engagement, QueryCategory,
    Side, SubPhase, ALL_QUERY_CATEGORIES,
};
pub use locate::{locate_battles, BattleSite};
pub use plan::{validate_plan, Plan, PlanViolation};
