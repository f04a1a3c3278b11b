//! Sealed battle plans: validation and default substitution.
//!
//! A submitted plan either passes every resource, commitment, and holding
//! check or is replaced wholesale by the deterministic default plan. The
//! violation is a typed error so substitution is an explicit, tested code
//! path, never an implicit fallthrough.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::card::{CardId, CardKind};
use crate::world::faction::Faction;
use crate::world::leader::LeaderId;
use crate::world::state::WorldState;
use crate::world::territory::Territory;

use super::engagement::{CardConstraint, Commitment, CompulsionCommand, QueryCategory};

/// A sealed declaration of what one combatant commits to an engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub leader: Option<LeaderId>,
    /// Required when `leader` is `None`: an explicit statement that the
    /// faction has no eligible leader to field.
    pub no_leader_declared: bool,
    pub regulars_committed: u8,
    pub elites_committed: u8,
    pub resource_committed: u32,
    pub offensive_card: Option<CardId>,
    pub defensive_card: Option<CardId>,
    /// Deploy the one-time escort token alongside the leader.
    pub use_escort: bool,
}

impl Plan {
    /// The deterministic substitute for an invalid or missing submission:
    /// no leader, no forces, no resource, no cards.
    pub const fn fallback() -> Plan {
        Plan {
            leader: None,
            no_leader_declared: true,
            regulars_committed: 0,
            elites_committed: 0,
            resource_committed: 0,
            offensive_card: None,
            defensive_card: None,
            use_escort: false,
        }
    }

    /// Returns the total forces dialed, regulars and elites together.
    pub const fn forces_committed(&self) -> u8 {
        self.regulars_committed + self.elites_committed
    }

    /// Returns the cards this plan plays.
    pub fn played_cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.offensive_card.into_iter().chain(self.defensive_card)
    }
}

/// Why a submitted plan was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanViolation {
    #[error("committed {committed} {kind} forces but only {present} present")]
    ForceOvercommit { kind: &'static str, committed: u8, present: u8 },

    #[error("committed {committed} resource but balance is {balance}")]
    ResourceOvercommit { committed: u32, balance: u32 },

    #[error("leader {0:?} is not eligible for this faction")]
    LeaderIneligible(LeaderId),

    #[error("no leader fielded without declaring the absence")]
    MissingNoLeaderDeclaration,

    #[error("card {0:?} is not in hand")]
    CardNotHeld(CardId),

    #[error("card {0:?} played in the wrong slot")]
    WrongSlot(CardId),

    #[error("escort token is not available to this plan")]
    EscortUnavailable,

    #[error("plan contradicts the declared {0:?} commitment")]
    CommitmentMismatch(QueryCategory),
}

/// Validates a submitted plan against the world and any query commitment
/// binding this faction. Returns the violation that forces default
/// substitution, if any.
pub fn validate_plan(
    world: &WorldState,
    faction: Faction,
    territory: Territory,
    plan: &Plan,
    commitment: Option<&Commitment>,
) -> Result<(), PlanViolation> {
    let stack = world.stack(territory, faction);
    if plan.regulars_committed > stack.regular {
        return Err(PlanViolation::ForceOvercommit {
            kind: "regular",
            committed: plan.regulars_committed,
            present: stack.regular,
        });
    }
    if plan.elites_committed > stack.elite {
        return Err(PlanViolation::ForceOvercommit {
            kind: "elite",
            committed: plan.elites_committed,
            present: stack.elite,
        });
    }

    let balance = world.resources[faction as usize];
    if plan.resource_committed > balance {
        return Err(PlanViolation::ResourceOvercommit {
            committed: plan.resource_committed,
            balance,
        });
    }

    let eligible = world.eligible_leaders(faction);
    match plan.leader {
        Some(leader) => {
            if !eligible.contains(&leader) {
                return Err(PlanViolation::LeaderIneligible(leader));
            }
        }
        None => {
            if !plan.no_leader_declared {
                return Err(PlanViolation::MissingNoLeaderDeclaration);
            }
        }
    }

    if let Some(card) = plan.offensive_card {
        if !matches!(card.kind(), CardKind::Weapon(_)) {
            return Err(PlanViolation::WrongSlot(card));
        }
        if !world.holds_card(faction, card) {
            return Err(PlanViolation::CardNotHeld(card));
        }
    }
    if let Some(card) = plan.defensive_card {
        if !matches!(card.kind(), CardKind::Defense(_)) {
            return Err(PlanViolation::WrongSlot(card));
        }
        if !world.holds_card(faction, card) {
            return Err(PlanViolation::CardNotHeld(card));
        }
    }

    if plan.use_escort {
        let escort = &world.escort;
        if escort.owner != faction || !escort.available || escort.destroyed {
            return Err(PlanViolation::EscortUnavailable);
        }
        if plan.leader.is_none() {
            return Err(PlanViolation::EscortUnavailable);
        }
    }

    if let Some(commitment) = commitment {
        check_commitment(plan, commitment)?;
    }

    Ok(())
}

/// A declared element binds exactly: the same leader or card, or none at
/// all when "none" was declared.
fn check_commitment(plan: &Plan, commitment: &Commitment) -> Result<(), PlanViolation> {
    let honored = match *commitment {
        Commitment::Leader(declared) => plan.leader == declared,
        Commitment::OffensiveCard(declared) => plan.offensive_card == declared,
        Commitment::DefensiveCard(declared) => plan.defensive_card == declared,
        Commitment::CommittedStrength { forces, resource } => {
            plan.forces_committed() == forces && plan.resource_committed == resource
        }
    };
    if honored {
        Ok(())
    } else {
        Err(PlanViolation::CommitmentMismatch(commitment.category()))
    }
}

/// Checks a revealed plan against a compulsion command. Non-compliance is
/// reported to the caller for logging; it never rejects the plan.
pub fn complies_with(plan: &Plan, command: &CompulsionCommand) -> bool {
    let played = match command.constraint {
        CardConstraint::Weapon(kind) => {
            plan.offensive_card.and_then(CardId::weapon) == Some(kind)
        }
        CardConstraint::Defense(kind) => {
            plan.defensive_card.and_then(CardId::defense) == Some(kind)
        }
    };
    if command.must {
        played
    } else {
        !played
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::card::{DefenseKind, WeaponKind};
    use crate::world::forces::ForceKind;
    use crate::world::leader::LeaderState;
    use crate::world::territory::Territory;

    const T: Territory = Territory::Ridge;

    fn world() -> WorldState {
        let mut world = WorldState::empty();
        world.place_forces(T, Faction::Cartel, ForceKind::Regular, 4);
        world.place_forces(T, Faction::Cartel, ForceKind::Elite, 1);
        world.set_resource(Faction::Cartel, 5);
        world.give_card(Faction::Cartel, CardId::Slugthrower);
        world.give_card(Faction::Cartel, CardId::AegisField);
        world
    }

    fn plan() -> Plan {
        Plan {
            leader: Some(LeaderId::Soren),
            no_leader_declared: false,
            regulars_committed: 3,
            elites_committed: 0,
            resource_committed: 2,
            offensive_card: None,
            defensive_card: None,
            use_escort: false,
        }
    }

    #[test]
    fn valid_plan_accepted() {
        assert!(validate_plan(&world(), Faction::Cartel, T, &plan(), None).is_ok());
    }

    #[test]
    fn force_overcommit_rejected() {
        let mut p = plan();
        p.regulars_committed = 5;
        let err = validate_plan(&world(), Faction::Cartel, T, &p, None);
        assert!(matches!(err, Err(PlanViolation::ForceOvercommit { .. })));

        p = plan();
        p.elites_committed = 2;
        let err = validate_plan(&world(), Faction::Cartel, T, &p, None);
        assert!(matches!(err, Err(PlanViolation::ForceOvercommit { .. })));
    }

    #[test]
    fn resource_overcommit_rejected() {
        let mut p = plan();
        p.resource_committed = 6;
        let err = validate_plan(&world(), Faction::Cartel, T, &p, None);
        assert!(matches!(err, Err(PlanViolation::ResourceOvercommit { .. })));
    }

    #[test]
    fn foreign_leader_rejected() {
        let mut p = plan();
        p.leader = Some(LeaderId::Veyra);
        let err = validate_plan(&world(), Faction::Cartel, T, &p, None);
        assert_eq!(err, Err(PlanViolation::LeaderIneligible(LeaderId::Veyra)));
    }

    #[test]
    fn captive_leader_accepted_for_captor() {
        let mut w = world();
        w.leaders[LeaderId::Caius as usize] = LeaderState::Captured { by: Faction::Cartel };
        let mut p = plan();
        p.leader = Some(LeaderId::Caius);
        assert!(validate_plan(&w, Faction::Cartel, T, &p, None).is_ok());
    }

    #[test]
    fn declared_no_leader_accepted_even_with_leaders_left() {
        let mut p = plan();
        p.leader = None;
        p.no_leader_declared = true;
        assert!(validate_plan(&world(), Faction::Cartel, T, &p, None).is_ok());
    }

    #[test]
    fn leaderless_faction_must_declare() {
        let mut w = world();
        for leader in LeaderId::roster(Faction::Cartel) {
            w.leaders[leader as usize] = LeaderState::Dead;
        }
        let mut p = plan();
        p.leader = None;
        p.no_leader_declared = false;
        let err = validate_plan(&w, Faction::Cartel, T, &p, None);
        assert_eq!(err, Err(PlanViolation::MissingNoLeaderDeclaration));

        p.no_leader_declared = true;
        assert!(validate_plan(&w, Faction::Cartel, T, &p, None).is_ok());
    }

    #[test]
    fn unheld_card_rejected() {
        let mut p = plan();
        p.offensive_card = Some(CardId::Arclance);
        let err = validate_plan(&world(), Faction::Cartel, T, &p, None);
        assert_eq!(err, Err(PlanViolation::CardNotHeld(CardId::Arclance)));
    }

    #[test]
    fn wrong_slot_rejected() {
        let mut p = plan();
        p.offensive_card = Some(CardId::AegisField);
        let err = validate_plan(&world(), Faction::Cartel, T, &p, None);
        assert_eq!(err, Err(PlanViolation::WrongSlot(CardId::AegisField)));

        p = plan();
        p.defensive_card = Some(CardId::Slugthrower);
        let err = validate_plan(&world(), Faction::Cartel, T, &p, None);
        assert_eq!(err, Err(PlanViolation::WrongSlot(CardId::Slugthrower)));
    }

    #[test]
    fn escort_restricted_to_owner() {
        let mut p = plan();
        p.use_escort = true;
        let err = validate_plan(&world(), Faction::Cartel, T, &p, None);
        assert_eq!(err, Err(PlanViolation::EscortUnavailable));
    }

    #[test]
    fn commitment_must_match_exactly() {
        let p = plan();
        let ok = Commitment::Leader(Some(LeaderId::Soren));
        assert!(validate_plan(&world(), Faction::Cartel, T, &p, Some(&ok)).is_ok());

        let wrong = Commitment::Leader(Some(LeaderId::Edda));
        let err = validate_plan(&world(), Faction::Cartel, T, &p, Some(&wrong));
        assert_eq!(err, Err(PlanViolation::CommitmentMismatch(QueryCategory::Leader)));
    }

    #[test]
    fn declared_none_forecloses_the_category() {
        let mut p = plan();
        p.defensive_card = Some(CardId::AegisField);
        let none = Commitment::DefensiveCard(None);
        let err = validate_plan(&world(), Faction::Cartel, T, &p, Some(&none));
        assert_eq!(
            err,
            Err(PlanViolation::CommitmentMismatch(QueryCategory::DefensiveCard))
        );

        p.defensive_card = None;
        assert!(validate_plan(&world(), Faction::Cartel, T, &p, Some(&none)).is_ok());
    }

    #[test]
    fn strength_commitment_binds_both_numbers() {
        let p = plan();
        let ok = Commitment::CommittedStrength { forces: 3, resource: 2 };
        assert!(validate_plan(&world(), Faction::Cartel, T, &p, Some(&ok)).is_ok());

        let wrong = Commitment::CommittedStrength { forces: 3, resource: 1 };
        let err = validate_plan(&world(), Faction::Cartel, T, &p, Some(&wrong));
        assert!(matches!(err, Err(PlanViolation::CommitmentMismatch(_))));
    }

    #[test]
    fn fallback_plan_is_inert() {
        let p = Plan::fallback();
        assert_eq!(p.forces_committed(), 0);
        assert_eq!(p.resource_committed, 0);
        assert!(p.leader.is_none());
        assert!(p.no_leader_declared);
        assert_eq!(p.played_cards().count(), 0);
    }

    #[test]
    fn compulsion_compliance() {
        let mut p = plan();
        p.offensive_card = Some(CardId::Slugthrower);
        let must_kinetic = CompulsionCommand {
            by: Faction::Covenant,
            target: Faction::Cartel,
            must: true,
            constraint: CardConstraint::Weapon(WeaponKind::Kinetic),
        };
        assert!(complies_with(&p, &must_kinetic));

        let must_not = CompulsionCommand { must: false, ..must_kinetic };
        assert!(!complies_with(&p, &must_not));

        let must_barrier = CompulsionCommand {
            must: true,
            constraint: CardConstraint::Defense(DefenseKind::Barrier),
            ..must_kinetic
        };
        assert!(!complies_with(&p, &must_barrier));
    }
}
