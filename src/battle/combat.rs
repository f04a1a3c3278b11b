//! Pure combat resolution.
//!
//! Turns two finalized plans, a betrayal classification, and the current
//! force state into an [`Outcome`]. No world mutation happens here and no
//! randomness is involved: identical inputs always produce identical
//! outcomes. Mutual betrayal has its own entry point because its result is
//! a different branch from either side's single-betrayal win.

use serde::{Deserialize, Serialize};

use crate::world::card::{CardId, WeaponKind};
use crate::world::faction::Faction;
use crate::world::forces::{ForceStack, ELITE_MULTIPLIER};
use crate::world::state::WorldState;
use crate::world::territory::Territory;

use super::engagement::{BetrayalCall, Engagement, Side};
use super::plan::Plan;

/// Strength added by the deployed escort token while its leader lives.
pub const ESCORT_BONUS: u32 = 2;

/// Tie-break policy. Rule-table data: flip to hand ties to the defender.
pub const AGGRESSOR_WINS_TIES: bool = true;

/// What happened to one side of a resolved battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideOutcome {
    pub faction: Faction,
    pub leader_killed: Option<crate::world::leader::LeaderId>,
    pub regulars_lost: u8,
    pub elites_lost: u8,
    pub envoys_lost: u8,
    /// Played cards that must go to the discard pile.
    pub cards_to_discard: Vec<CardId>,
    /// Played cards the side retains, pending the winner's choice.
    pub cards_to_keep: Vec<CardId>,
}

/// A resource settlement produced by resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payout {
    /// Committed resource paid into the common pool.
    ToPool { faction: Faction, amount: u32 },
    /// Committed resource kept by a betraying winner.
    Retained { faction: Faction, amount: u32 },
}

/// The full result of one resolved engagement.
///
/// `mutual_destruction` excludes a winner: when it is set, every field
/// describing a winner is meaningless and both sides lose everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub territory: Territory,
    pub mutual_destruction: bool,
    pub winner: Option<Side>,
    /// Total strengths in side order: aggressor, defender.
    pub strengths: [u32; 2],
    /// Per-side outcomes in side order: aggressor, defender.
    pub sides: [SideOutcome; 2],
    pub payouts: Vec<Payout>,
}

impl Outcome {
    /// Returns the per-side outcome for a side.
    pub fn side(&self, side: Side) -> &SideOutcome {
        &self.sides[side.index()]
    }

    /// Returns the winning faction, if a winner exists.
    pub fn winning_faction(&self) -> Option<Faction> {
        self.winner.map(|s| self.sides[s.index()].faction)
    }

    /// Returns the losing faction, if a winner exists.
    pub fn losing_faction(&self) -> Option<Faction> {
        self.winner.map(|s| self.sides[s.opponent().index()].faction)
    }
}

/// Dispatches on the betrayal classification recorded in the engagement.
pub fn resolve(world: &WorldState, eng: &Engagement) -> Outcome {
    let aggressor = side_input(eng, Side::Aggressor);
    let defender = side_input(eng, Side::Defender);
    match eng.betrayal {
        BetrayalCall::None => resolve_normal(world, eng.territory, &aggressor, &defender),
        BetrayalCall::Single { side, .. } => {
            resolve_single_betrayal(world, eng.territory, &aggressor, &defender, side)
        }
        BetrayalCall::Mutual => {
            resolve_mutual_betrayal(world, eng.territory, &aggressor, &defender)
        }
    }
}

/// One side's inputs to resolution.
#[derive(Debug, Clone)]
pub struct SideInput {
    pub faction: Faction,
    pub plan: Plan,
}

fn side_input(eng: &Engagement, side: Side) -> SideInput {
    SideInput {
        faction: eng.faction(side),
        plan: eng.plan(side).copied().unwrap_or(Plan::fallback()),
    }
}

/// Resolution with no betrayal declared.
pub fn resolve_normal(
    world: &WorldState,
    territory: Territory,
    aggressor: &SideInput,
    defender: &SideInput,
) -> Outcome {
    if uncontained_detonation(&aggressor.plan, &defender.plan) {
        return catastrophic_outcome(world, territory, aggressor, defender);
    }

    let a_leader_dies = leader_dies(&aggressor.plan, &defender.plan);
    let d_leader_dies = leader_dies(&defender.plan, &aggressor.plan);
    let a_strength = side_strength(aggressor, !a_leader_dies);
    let d_strength = side_strength(defender, !d_leader_dies);

    let winner = if a_strength > d_strength {
        Side::Aggressor
    } else if d_strength > a_strength {
        Side::Defender
    } else if AGGRESSOR_WINS_TIES {
        Side::Aggressor
    } else {
        Side::Defender
    };

    let mut sides = [
        contested_side(world, territory, aggressor, a_leader_dies, winner == Side::Aggressor),
        contested_side(world, territory, defender, d_leader_dies, winner == Side::Defender),
    ];
    // The loser's fielded leader dies even if no weapon reached it.
    let loser = &mut sides[winner.opponent().index()];
    if loser.leader_killed.is_none() {
        loser.leader_killed = loser_plan(aggressor, defender, winner).leader;
    }

    Outcome {
        territory,
        mutual_destruction: false,
        winner: Some(winner),
        strengths: [a_strength, d_strength],
        sides,
        payouts: vec![
            Payout::ToPool { faction: aggressor.faction, amount: aggressor.plan.resource_committed },
            Payout::ToPool { faction: defender.faction, amount: defender.plan.resource_committed },
        ],
    }
}

/// Resolution when exactly one side declared betrayal: that side wins
/// outright regardless of totals and keeps its committed resource, but
/// still pays its own dial like any other winner.
pub fn resolve_single_betrayal(
    world: &WorldState,
    territory: Territory,
    aggressor: &SideInput,
    defender: &SideInput,
    winner: Side,
) -> Outcome {
    let a_strength = side_strength(aggressor, true);
    let d_strength = side_strength(defender, true);

    let (winning, losing) = match winner {
        Side::Aggressor => (aggressor, defender),
        Side::Defender => (defender, aggressor),
    };

    let winner_presence = *world.stack(territory, winning.faction);
    let (regulars_lost, elites_lost) =
        winner_attrition(winner_presence, winning.plan.forces_committed());
    let winner_outcome = SideOutcome {
        faction: winning.faction,
        leader_killed: None,
        regulars_lost,
        elites_lost,
        envoys_lost: 0,
        cards_to_discard: always_discards(&winning.plan),
        cards_to_keep: keep_candidates(&winning.plan),
    };
    let loser_presence = *world.stack(territory, losing.faction);
    let loser_outcome = SideOutcome {
        faction: losing.faction,
        leader_killed: losing.plan.leader,
        regulars_lost: loser_presence.regular,
        elites_lost: loser_presence.elite,
        envoys_lost: loser_presence.envoy,
        cards_to_discard: losing.plan.played_cards().collect(),
        cards_to_keep: Vec::new(),
    };

    let mut sides = [winner_outcome, loser_outcome];
    if winner == Side::Defender {
        sides.swap(0, 1);
    }

    Outcome {
        territory,
        mutual_destruction: false,
        winner: Some(winner),
        strengths: [a_strength, d_strength],
        sides,
        payouts: vec![
            Payout::Retained { faction: winning.faction, amount: winning.plan.resource_committed },
            Payout::ToPool { faction: losing.faction, amount: losing.plan.resource_committed },
        ],
    }
}

/// Resolution when both sides declared betrayal: both fielded leaders die
/// and neither side wins by treachery; forces alone decide the battle.
pub fn resolve_mutual_betrayal(
    world: &WorldState,
    territory: Territory,
    aggressor: &SideInput,
    defender: &SideInput,
) -> Outcome {
    let a_strength = forces_strength(aggressor);
    let d_strength = forces_strength(defender);

    let winner = if a_strength > d_strength {
        Side::Aggressor
    } else if d_strength > a_strength {
        Side::Defender
    } else if AGGRESSOR_WINS_TIES {
        Side::Aggressor
    } else {
        Side::Defender
    };

    let sides = [
        contested_side(world, territory, aggressor, true, winner == Side::Aggressor),
        contested_side(world, territory, defender, true, winner == Side::Defender),
    ];

    Outcome {
        territory,
        mutual_destruction: false,
        winner: Some(winner),
        strengths: [a_strength, d_strength],
        sides,
        payouts: vec![
            Payout::ToPool { faction: aggressor.faction, amount: aggressor.plan.resource_committed },
            Payout::ToPool { faction: defender.faction, amount: defender.plan.resource_committed },
        ],
    }
}

/// A beam weapon revealed alongside any barrier detonates uncontained.
fn uncontained_detonation(a: &Plan, b: &Plan) -> bool {
    let beam = [a, b]
        .iter()
        .any(|p| p.offensive_card.and_then(CardId::weapon) == Some(WeaponKind::Beam));
    let barrier = [a, b].iter().any(|p| {
        p.defensive_card.and_then(CardId::defense)
            == Some(crate::world::card::DefenseKind::Barrier)
    });
    beam && barrier
}

fn catastrophic_outcome(
    world: &WorldState,
    territory: Territory,
    aggressor: &SideInput,
    defender: &SideInput,
) -> Outcome {
    let sides = [aggressor, defender].map(|input| {
        let presence = *world.stack(territory, input.faction);
        SideOutcome {
            faction: input.faction,
            leader_killed: input.plan.leader,
            regulars_lost: presence.regular,
            elites_lost: presence.elite,
            envoys_lost: presence.envoy,
            cards_to_discard: input.plan.played_cards().collect(),
            cards_to_keep: Vec::new(),
        }
    });
    Outcome {
        territory,
        mutual_destruction: true,
        winner: None,
        strengths: [0, 0],
        sides,
        payouts: Vec::new(),
    }
}

/// Does this side's leader die to the opponent's weapon?
fn leader_dies(own: &Plan, enemy: &Plan) -> bool {
    if own.leader.is_none() {
        return false;
    }
    let Some(weapon) = enemy.offensive_card.and_then(CardId::weapon) else {
        return false;
    };
    match own.defensive_card.and_then(CardId::defense) {
        Some(defense) => !defense.stops(weapon),
        None => true,
    }
}

/// Total strength: dialed forces plus the surviving leader and escort.
fn side_strength(input: &SideInput, leader_alive: bool) -> u32 {
    let mut total = forces_strength(input);
    if leader_alive {
        if let Some(leader) = input.plan.leader {
            total += leader.strength();
            if input.plan.use_escort {
                total += ESCORT_BONUS;
            }
        }
    }
    total
}

fn forces_strength(input: &SideInput) -> u32 {
    u32::from(input.plan.regulars_committed)
        + u32::from(input.plan.elites_committed) * ELITE_MULTIPLIER
}

/// Builds a side outcome for a contested (non-betrayal) resolution branch.
fn contested_side(
    world: &WorldState,
    territory: Territory,
    input: &SideInput,
    leader_dies: bool,
    is_winner: bool,
) -> SideOutcome {
    let presence = *world.stack(territory, input.faction);
    let (regulars_lost, elites_lost, envoys_lost) = if is_winner {
        let (r, e) = winner_attrition(presence, input.plan.forces_committed());
        (r, e, 0)
    } else {
        (presence.regular, presence.elite, presence.envoy)
    };
    let (cards_to_discard, cards_to_keep) = if is_winner {
        (always_discards(&input.plan), keep_candidates(&input.plan))
    } else {
        (input.plan.played_cards().collect(), Vec::new())
    };
    SideOutcome {
        faction: input.faction,
        leader_killed: if leader_dies { input.plan.leader } else { None },
        regulars_lost,
        elites_lost,
        envoys_lost,
        cards_to_discard,
        cards_to_keep,
    }
}

/// The winner pays its own dial, drawn from regulars before elites.
fn winner_attrition(presence: ForceStack, dial: u8) -> (u8, u8) {
    let regulars = dial.min(presence.regular);
    let elites = (dial - regulars).min(presence.elite);
    (regulars, elites)
}

fn always_discards(plan: &Plan) -> Vec<CardId> {
    plan.played_cards().filter(|c| c.always_discard()).collect()
}

fn keep_candidates(plan: &Plan) -> Vec<CardId> {
    plan.played_cards().filter(|c| !c.always_discard()).collect()
}

fn loser_plan<'a>(aggressor: &'a SideInput, defender: &'a SideInput, winner: Side) -> &'a Plan {
    match winner {
        Side::Aggressor => &defender.plan,
        Side::Defender => &aggressor.plan,
    }
}
