//! Leader roster and lifecycle.
//!
//! All thirty leaders are enumerated, five per faction, with strength and
//! ownership stored in a compile-time lookup table indexed by the enum
//! discriminant. A leader's *original* faction never changes; custody can,
//! through capture.

use serde::{Deserialize, Serialize};

use super::faction::Faction;

/// The number of leaders in the game.
pub const LEADER_COUNT: usize = 30;

/// A named leader.
///
/// Variants are grouped by faction in index order. The `#[repr(u8)]`
/// attribute enables use as an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LeaderId {
    // Seers
    Veyra = 0,
    Odric = 1,
    Sable = 2,
    Tamsin = 3,
    Ilo = 4,
    // Covenant
    Maren = 5,
    Sefa = 6,
    Liss = 7,
    Anouk = 8,
    Petra = 9,
    // Syndicate
    Varko = 10,
    Drax = 11,
    Hollis = 12,
    Mott = 13,
    Grell = 14,
    // Nomads
    Asha = 15,
    Kiva = 16,
    Rook = 17,
    Senna = 18,
    Jarl = 19,
    // Imperium
    Caius = 20,
    Livia = 21,
    Marcen = 22,
    Tullia = 23,
    Bren = 24,
    // Cartel
    Soren = 25,
    Edda = 26,
    Vance = 27,
    Nyla = 28,
    Pike = 29,
}

/// All leaders in index order.
pub const ALL_LEADERS: [LeaderId; LEADER_COUNT] = [
    LeaderId::Veyra,
    LeaderId::Odric,
    LeaderId::Sable,
    LeaderId::Tamsin,
    LeaderId::Ilo,
    LeaderId::Maren,
    LeaderId::Sefa,
    LeaderId::Liss,
    LeaderId::Anouk,
    LeaderId::Petra,
    LeaderId::Varko,
    LeaderId::Drax,
    LeaderId::Hollis,
    LeaderId::Mott,
    LeaderId::Grell,
    LeaderId::Asha,
    LeaderId::Kiva,
    LeaderId::Rook,
    LeaderId::Senna,
    LeaderId::Jarl,
    LeaderId::Caius,
    LeaderId::Livia,
    LeaderId::Marcen,
    LeaderId::Tullia,
    LeaderId::Bren,
    LeaderId::Soren,
    LeaderId::Edda,
    LeaderId::Vance,
    LeaderId::Nyla,
    LeaderId::Pike,
];

/// Static metadata for one leader.
#[derive(Debug, Clone, Copy)]
pub struct LeaderInfo {
    pub faction: Faction,
    pub strength: u32,
}

/// Lookup table indexed by `LeaderId as usize`.
pub const LEADER_INFO: [LeaderInfo; LEADER_COUNT] = [
    LeaderInfo { faction: Faction::Seers, strength: 7 },
    LeaderInfo { faction: Faction::Seers, strength: 6 },
    LeaderInfo { faction: Faction::Seers, strength: 4 },
    LeaderInfo { faction: Faction::Seers, strength: 3 },
    LeaderInfo { faction: Faction::Seers, strength: 2 },
    LeaderInfo { faction: Faction::Covenant, strength: 6 },
    LeaderInfo { faction: Faction::Covenant, strength: 5 },
    LeaderInfo { faction: Faction::Covenant, strength: 4 },
    LeaderInfo { faction: Faction::Covenant, strength: 3 },
    LeaderInfo { faction: Faction::Covenant, strength: 2 },
    LeaderInfo { faction: Faction::Syndicate, strength: 6 },
    LeaderInfo { faction: Faction::Syndicate, strength: 5 },
    LeaderInfo { faction: Faction::Syndicate, strength: 4 },
    LeaderInfo { faction: Faction::Syndicate, strength: 3 },
    LeaderInfo { faction: Faction::Syndicate, strength: 1 },
    LeaderInfo { faction: Faction::Nomads, strength: 7 },
    LeaderInfo { faction: Faction::Nomads, strength: 5 },
    LeaderInfo { faction: Faction::Nomads, strength: 4 },
    LeaderInfo { faction: Faction::Nomads, strength: 2 },
    LeaderInfo { faction: Faction::Nomads, strength: 2 },
    LeaderInfo { faction: Faction::Imperium, strength: 6 },
    LeaderInfo { faction: Faction::Imperium, strength: 5 },
    LeaderInfo { faction: Faction::Imperium, strength: 4 },
    LeaderInfo { faction: Faction::Imperium, strength: 3 },
    LeaderInfo { faction: Faction::Imperium, strength: 2 },
    LeaderInfo { faction: Faction::Cartel, strength: 6 },
    LeaderInfo { faction: Faction::Cartel, strength: 5 },
    LeaderInfo { faction: Faction::Cartel, strength: 4 },
    LeaderInfo { faction: Faction::Cartel, strength: 2 },
    LeaderInfo { faction: Faction::Cartel, strength: 1 },
];

impl LeaderId {
    /// Returns the faction this leader originally belongs to.
    pub const fn faction(self) -> Faction {
        LEADER_INFO[self as usize].faction
    }

    /// Returns the battle strength of this leader.
    pub const fn strength(self) -> u32 {
        LEADER_INFO[self as usize].strength
    }

    /// Returns all leaders originally belonging to a faction.
    pub fn roster(faction: Faction) -> impl Iterator<Item = LeaderId> {
        ALL_LEADERS.into_iter().filter(move |l| l.faction() == faction)
    }
}

/// The lifecycle state of a leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderState {
    /// In its controller's pool, free to be committed to a battle.
    Available,
    /// Committed to a battle this round; ineligible until the round resets.
    Used,
    /// Held in another faction's custody after capture.
    Captured { by: Faction },
    /// Dead. Killed leaders return to their original faction's tanks.
    Dead,
}

impl LeaderState {
    /// Returns true if the leader is alive and not in enemy custody.
    pub const fn alive_free(self) -> bool {
        matches!(self, LeaderState::Available | LeaderState::Used)
    }
}
