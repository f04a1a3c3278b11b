//! The per-engagement record and its sub-phase machine.
//!
//! One engagement is one battle between exactly two factions at one
//! territory. The record is an owned value threaded through the battle
//! loop, created when an aggressor commits to an opponent and dropped when
//! consequence application completes. The sub-phase is a single sum type so
//! the controller's handling is exhaustive by construction.

use serde::{Deserialize, Serialize};

use crate::world::card::CardId;
use crate::world::faction::Faction;
use crate::world::leader::LeaderId;
use crate::world::territory::Territory;

use super::combat::Outcome;
use super::plan::Plan;

/// One of the two sides of an engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Aggressor,
    Defender,
}

impl Side {
    /// Returns the opposite side.
    pub const fn opponent(self) -> Side {
        match self {
            Side::Aggressor => Side::Defender,
            Side::Defender => Side::Aggressor,
        }
    }

    /// Returns the array index for per-side storage.
    pub const fn index(self) -> usize {
        match self {
            Side::Aggressor => 0,
            Side::Defender => 1,
        }
    }
}

/// The plan category a foresight query may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryCategory {
    Leader,
    OffensiveCard,
    DefensiveCard,
    CommittedStrength,
}

/// All query categories.
pub const ALL_QUERY_CATEGORIES: [QueryCategory; 4] = [
    QueryCategory::Leader,
    QueryCategory::OffensiveCard,
    QueryCategory::DefensiveCard,
    QueryCategory::CommittedStrength,
];

/// A hard pre-commitment declared by the queried faction.
///
/// `None` inside a variant means "will not field one", and that
/// declaration forecloses playing *any* element of the category later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Commitment {
    Leader(Option<LeaderId>),
    OffensiveCard(Option<CardId>),
    DefensiveCard(Option<CardId>),
    CommittedStrength { forces: u8, resource: u32 },
}

impl Commitment {
    /// Returns the category this commitment answers.
    pub const fn category(&self) -> QueryCategory {
        match self {
            Commitment::Leader(_) => QueryCategory::Leader,
            Commitment::OffensiveCard(_) => QueryCategory::OffensiveCard,
            Commitment::DefensiveCard(_) => QueryCategory::DefensiveCard,
            Commitment::CommittedStrength { .. } => QueryCategory::CommittedStrength,
        }
    }

    /// The commitment substituted when the queried faction does not answer:
    /// "none of that category", which binds like any other declaration.
    pub const fn default_for(category: QueryCategory) -> Commitment {
        match category {
            QueryCategory::Leader => Commitment::Leader(None),
            QueryCategory::OffensiveCard => Commitment::OffensiveCard(None),
            QueryCategory::DefensiveCard => Commitment::DefensiveCard(None),
            QueryCategory::CommittedStrength => {
                Commitment::CommittedStrength { forces: 0, resource: 0 }
            }
        }
    }
}

/// The card category a compulsion command constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardConstraint {
    Weapon(crate::world::card::WeaponKind),
    Defense(crate::world::card::DefenseKind),
}

/// A compulsion command issued against one combatant's plan.
///
/// Compliance is checked only after plans reveal, and non-compliance is a
/// recorded rule violation, not a mechanical block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompulsionCommand {
    pub by: Faction,
    pub target: Faction,
    /// True: the target must play a card of the constrained category.
    /// False: the target must not.
    pub must: bool,
    pub constraint: CardConstraint,
}

/// Betrayal classification after declarations close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetrayalCall {
    None,
    /// One side declared. `declarer` may be the combatant itself or its
    /// non-combatant ally holding the matching card.
    Single { side: Side, declarer: Faction },
    /// Both sides declared. A distinct resolution branch from single.
    Mutual,
}

/// Which sub-phase an engagement is suspended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubPhase {
    /// Offering the compulsion ability, if anyone holds it here.
    Compulsion,
    /// Offering the foresight query, if anyone holds it here.
    Query,
    /// The queried faction pre-declares one element of its plan.
    Reveal,
    /// Both combatants build sealed plans simultaneously.
    Planning,
    /// Eligible card holders declare or pass on betrayal.
    Betrayal,
    /// Plans are closed; resolve and apply consequences.
    Resolve,
    /// The winner chooses which of its played cards to discard.
    DiscardChoice,
    /// The capture-capable winner decides the captured leader's fate.
    CaptureChoice,
    /// All consequences applied; the record is ready to be retired.
    Done,
}

/// One battle in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub territory: Territory,
    pub aggressor: Faction,
    pub defender: Faction,
    pub sub_phase: SubPhase,

    pub aggressor_plan: Option<Plan>,
    pub defender_plan: Option<Plan>,

    pub query_used: bool,
    pub query_owner: Option<Faction>,
    pub query_target: Option<Faction>,
    pub query_category: Option<QueryCategory>,
    pub commitment: Option<Commitment>,

    pub compulsion: Option<CompulsionCommand>,

    pub betrayal: BetrayalCall,

    pub outcome: Option<Outcome>,
    /// Winner's played cards still awaiting the keep-or-discard choice.
    pub discard_candidates: Vec<CardId>,
    /// The leader offered to a capture-capable winner.
    pub capture_target: Option<LeaderId>,
}

impl Engagement {
    /// Creates a fresh engagement at the first sub-phase.
    pub fn new(territory: Territory, aggressor: Faction, defender: Faction) -> Self {
        Engagement {
            territory,
            aggressor,
            defender,
            sub_phase: SubPhase::Compulsion,
            aggressor_plan: None,
            defender_plan: None,
            query_used: false,
            query_owner: None,
            query_target: None,
            query_category: None,
            commitment: None,
            compulsion: None,
            betrayal: BetrayalCall::None,
            outcome: None,
            discard_candidates: Vec::new(),
            capture_target: None,
        }
    }

    /// Returns the faction fighting on a side.
    pub const fn faction(&self, side: Side) -> Faction {
        match side {
            Side::Aggressor => self.aggressor,
            Side::Defender => self.defender,
        }
    }

    /// Returns the side a combatant fights on, if it is a combatant.
    pub fn side_of(&self, faction: Faction) -> Option<Side> {
        if faction == self.aggressor {
            Some(Side::Aggressor)
        } else if faction == self.defender {
            Some(Side::Defender)
        } else {
            None
        }
    }

    /// Returns the finalized plan for a side, if submitted.
    pub const fn plan(&self, side: Side) -> Option<&Plan> {
        match side {
            Side::Aggressor => self.aggressor_plan.as_ref(),
            Side::Defender => self.defender_plan.as_ref(),
        }
    }

    /// Stores the finalized plan for a side.
    pub fn set_plan(&mut self, side: Side, plan: Plan) {
        match side {
            Side::Aggressor => self.aggressor_plan = Some(plan),
            Side::Defender => self.defender_plan = Some(plan),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_helpers() {
        assert_eq!(Side::Aggressor.opponent(), Side::Defender);
        assert_eq!(Side::Defender.opponent(), Side::Aggressor);
        assert_ne!(Side::Aggressor.index(), Side::Defender.index());
    }

    #[test]
    fn new_engagement_starts_at_compulsion() {
        let eng = Engagement::new(Territory::Oasis, Faction::Nomads, Faction::Imperium);
        assert_eq!(eng.sub_phase, SubPhase::Compulsion);
        assert_eq!(eng.faction(Side::Aggressor), Faction::Nomads);
        assert_eq!(eng.faction(Side::Defender), Faction::Imperium);
        assert_eq!(eng.side_of(Faction::Imperium), Some(Side::Defender));
        assert_eq!(eng.side_of(Faction::Cartel), None);
        assert_eq!(eng.betrayal, BetrayalCall::None);
    }

    #[test]
    fn default_commitments_decline_the_category() {
        assert_eq!(
            Commitment::default_for(QueryCategory::Leader),
            Commitment::Leader(None)
        );
        assert_eq!(
            Commitment::default_for(QueryCategory::CommittedStrength),
            Commitment::CommittedStrength { forces: 0, resource: 0 }
        );
    }

    #[test]
    fn commitment_category_roundtrip() {
        for cat in ALL_QUERY_CATEGORIES {
            assert_eq!(Commitment::default_for(cat).category(), cat);
        }
    }
}
