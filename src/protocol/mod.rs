//! Agent-facing protocol types.
//!
//! The engine is a synchronous step function: it emits typed requests,
//! suspends by returning them, and resumes when the caller re-invokes with
//! responses. These types are the whole data contract; the transport that
//! carries them is the host's business.

pub mod event;

pub use event::Event;

use serde::{Deserialize, Serialize};

use crate::battle::engagement::{Commitment, CompulsionCommand, QueryCategory, Side};
use crate::battle::plan::Plan;
use crate::world::card::CardId;
use crate::world::faction::Faction;
use crate::world::leader::LeaderId;
use crate::world::territory::Territory;

/// The kinds of decision the engine can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    ChooseEngagement,
    UseCompulsion,
    UseQuery,
    RevealQueryElement,
    CreatePlan,
    DeclareBetrayal,
    ChooseCardsToDiscard,
    CaptureChoice,
}

/// One selectable engagement for a choose-engagement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementOption {
    pub territory: Territory,
    pub opponent: Faction,
}

/// Request-specific context and available actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestContext {
    ChooseEngagement {
        options: Vec<EngagementOption>,
    },
    UseCompulsion {
        target: Faction,
    },
    UseQuery {
        target: Faction,
        categories: Vec<QueryCategory>,
    },
    RevealQueryElement {
        category: QueryCategory,
    },
    CreatePlan {
        territory: Territory,
        opponent: Faction,
        /// A compulsion command directed at this faction, if any.
        compulsion: Option<CompulsionCommand>,
        /// The commitment binding this faction's own plan, if queried.
        commitment: Option<Commitment>,
        /// What the foresight query exposed about the opponent, if this
        /// faction asked.
        revealed: Option<Commitment>,
    },
    DeclareBetrayal {
        territory: Territory,
        /// The combatant side that would win by this declaration.
        side: Side,
        /// The opponent leader the held card matches.
        leader: LeaderId,
    },
    ChooseCardsToDiscard {
        candidates: Vec<CardId>,
    },
    CaptureChoice {
        leader: LeaderId,
        reward: u32,
    },
}

impl RequestContext {
    /// Returns the request kind this context belongs to.
    pub const fn kind(&self) -> RequestKind {
        match self {
            RequestContext::ChooseEngagement { .. } => RequestKind::ChooseEngagement,
            RequestContext::UseCompulsion { .. } => RequestKind::UseCompulsion,
            RequestContext::UseQuery { .. } => RequestKind::UseQuery,
            RequestContext::RevealQueryElement { .. } => RequestKind::RevealQueryElement,
            RequestContext::CreatePlan { .. } => RequestKind::CreatePlan,
            RequestContext::DeclareBetrayal { .. } => RequestKind::DeclareBetrayal,
            RequestContext::ChooseCardsToDiscard { .. } => RequestKind::ChooseCardsToDiscard,
            RequestContext::CaptureChoice { .. } => RequestKind::CaptureChoice,
        }
    }
}

/// A decision request addressed to one faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub faction: Faction,
    pub context: RequestContext,
}

impl Request {
    /// Returns the kind of decision being requested.
    pub const fn kind(&self) -> RequestKind {
        self.context.kind()
    }
}

/// The typed payload of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponseData {
    ChooseEngagement {
        territory: Territory,
        opponent: Faction,
    },
    UseCompulsion {
        must: bool,
        constraint: crate::battle::engagement::CardConstraint,
    },
    UseQuery {
        category: QueryCategory,
    },
    Reveal {
        commitment: Commitment,
    },
    Plan {
        plan: Plan,
    },
    Betray,
    Discard {
        cards: Vec<CardId>,
    },
    Capture {
        destroy: bool,
    },
}

/// One faction's answer to a pending request.
///
/// A `passed` response, a missing response, or a payload of the wrong
/// shape all degrade to the same thing: pass for choices, the default
/// plan for plan creation. Nothing here is ever a hard error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub faction: Faction,
    pub passed: bool,
    pub data: Option<ResponseData>,
}

impl Response {
    /// Builds an explicit pass.
    pub const fn pass(faction: Faction) -> Response {
        Response { faction, passed: true, data: None }
    }

    /// Builds an answering response.
    pub const fn answer(faction: Faction, data: ResponseData) -> Response {
        Response { faction, passed: false, data: Some(data) }
    }
}

/// Game phases as the scheduler sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseId {
    Setup,
    Storm,
    Movement,
    Battle,
    Collection,
}

/// What one call to `advance` produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Requests the caller must answer before the engine moves again.
    pub pending: Vec<Request>,
    /// True when the pending requests form a sealed simultaneous set:
    /// no request's answer may be revealed to the other responder.
    pub simultaneous: bool,
    pub events: Vec<Event>,
    /// True when the battle phase has fully resolved.
    pub complete: bool,
    /// Set alongside `complete`: the phase the scheduler should run next.
    pub next_phase: Option<PhaseId>,
}
