//! Audit events emitted by the battle core.
//!
//! Events are the log boundary: external collaborators consume them, the
//! core never interprets them. Everything is serializable so a host can
//! persist or forward the stream however it wants.

use serde::{Deserialize, Serialize};

use crate::battle::engagement::{Commitment, CompulsionCommand, QueryCategory};
use crate::world::card::CardId;
use crate::world::faction::Faction;
use crate::world::leader::LeaderId;
use crate::world::territory::Territory;

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    EngagementStarted {
        territory: Territory,
        aggressor: Faction,
        defender: Faction,
    },
    EngagementEnded {
        territory: Territory,
    },
    PlanSubmitted {
        faction: Faction,
        accepted: bool,
        /// The violation that forced default substitution, if any.
        violation: Option<String>,
    },
    QueryUsed {
        by: Faction,
        target: Faction,
        category: QueryCategory,
    },
    QueryRevealed {
        faction: Faction,
        commitment: Commitment,
    },
    CompulsionUsed {
        command: CompulsionCommand,
    },
    /// Recorded rule violation; never mechanically enforced.
    CompulsionViolated {
        faction: Faction,
        command: CompulsionCommand,
    },
    BetrayalRevealed {
        declarer: Faction,
        leader: LeaderId,
    },
    MutualBetrayal {
        territory: Territory,
    },
    Resolved {
        territory: Territory,
        winner: Option<Faction>,
        aggressor_strength: u32,
        defender_strength: u32,
    },
    CatastrophicDestruction {
        territory: Territory,
    },
    ForcesDestroyed {
        territory: Territory,
        faction: Faction,
        regulars: u8,
        elites: u8,
        envoys: u8,
    },
    LeaderKilled {
        leader: LeaderId,
    },
    LeaderCaptured {
        leader: LeaderId,
        by: Faction,
    },
    LeaderReturned {
        leader: LeaderId,
        to: Faction,
    },
    CardDiscarded {
        faction: Faction,
        card: CardId,
    },
    CardKept {
        faction: Faction,
        card: CardId,
    },
    ResourcePaid {
        faction: Faction,
        amount: u32,
    },
    ResourceRetained {
        faction: Faction,
        amount: u32,
    },
    CaptureReward {
        faction: Faction,
        amount: u32,
    },
    EscortConsumed,
    EscortDestroyed,
    /// A mutation batch violated a world invariant and was rolled back.
    InvariantBreach {
        detail: String,
    },
}
