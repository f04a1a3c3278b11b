//! Combat cards and traitor-matching cards.
//!
//! Card metadata lives in a compile-time lookup table indexed by the enum
//! discriminant. Weapon and defense kinds pair off: a barrier stops a
//! kinetic weapon, an antidote stops a toxin. A beam weapon has no counter,
//! and a beam revealed in the same engagement as any barrier detonates into
//! mutual destruction instead of resolving normally.

use serde::{Deserialize, Serialize};

use super::faction::Faction;
use super::leader::LeaderId;

/// The number of distinct combat card types.
pub const CARD_COUNT: usize = 10;

/// A combat card type. The same type may exist in several hands at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CardId {
    Slugthrower = 0,
    Flechette = 1,
    VenomNeedle = 2,
    Duskpowder = 3,
    Arclance = 4,
    Mirage = 5,
    AegisField = 6,
    DeflectorWeb = 7,
    Counteragent = 8,
    Philter = 9,
}

/// All card types in index order.
pub const ALL_CARDS: [CardId; CARD_COUNT] = [
    CardId::Slugthrower,
    CardId::Flechette,
    CardId::VenomNeedle,
    CardId::Duskpowder,
    CardId::Arclance,
    CardId::Mirage,
    CardId::AegisField,
    CardId::DeflectorWeb,
    CardId::Counteragent,
    CardId::Philter,
];

/// The category of an offensive card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Kinetic,
    Toxin,
    Beam,
}

/// The category of a defensive card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefenseKind {
    Barrier,
    Antidote,
}

impl DefenseKind {
    /// Returns true if this defense neutralizes the given weapon.
    pub const fn stops(self, weapon: WeaponKind) -> bool {
        matches!(
            (self, weapon),
            (DefenseKind::Barrier, WeaponKind::Kinetic)
                | (DefenseKind::Antidote, WeaponKind::Toxin)
        )
    }
}

/// Whether a card is played in the offensive or defensive slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    Weapon(WeaponKind),
    Defense(DefenseKind),
}

/// Static metadata for one card type.
#[derive(Debug, Clone, Copy)]
pub struct CardInfo {
    pub kind: CardKind,
    /// Always-discard cards never enter the winner's keep-or-discard choice.
    pub always_discard: bool,
}

/// Lookup table indexed by `CardId as usize`.
pub const CARD_INFO: [CardInfo; CARD_COUNT] = [
    CardInfo { kind: CardKind::Weapon(WeaponKind::Kinetic), always_discard: false },
    CardInfo { kind: CardKind::Weapon(WeaponKind::Kinetic), always_discard: false },
    CardInfo { kind: CardKind::Weapon(WeaponKind::Toxin), always_discard: false },
    CardInfo { kind: CardKind::Weapon(WeaponKind::Toxin), always_discard: false },
    CardInfo { kind: CardKind::Weapon(WeaponKind::Beam), always_discard: false },
    CardInfo { kind: CardKind::Weapon(WeaponKind::Kinetic), always_discard: true },
    CardInfo { kind: CardKind::Defense(DefenseKind::Barrier), always_discard: false },
    CardInfo { kind: CardKind::Defense(DefenseKind::Barrier), always_discard: false },
    CardInfo { kind: CardKind::Defense(DefenseKind::Antidote), always_discard: false },
    CardInfo { kind: CardKind::Defense(DefenseKind::Antidote), always_discard: false },
];

impl CardId {
    /// Returns the slot and category of this card.
    pub const fn kind(self) -> CardKind {
        CARD_INFO[self as usize].kind
    }

    /// Returns true if this card must be discarded after being played.
    pub const fn always_discard(self) -> bool {
        CARD_INFO[self as usize].always_discard
    }

    /// Returns the weapon category if this card is offensive.
    pub const fn weapon(self) -> Option<WeaponKind> {
        match self.kind() {
            CardKind::Weapon(w) => Some(w),
            CardKind::Defense(_) => None,
        }
    }

    /// Returns the defense category if this card is defensive.
    pub const fn defense(self) -> Option<DefenseKind> {
        match self.kind() {
            CardKind::Defense(d) => Some(d),
            CardKind::Weapon(_) => None,
        }
    }
}

/// A traitor-matching card.
///
/// Ownership of this card, not custody of the leader, determines betrayal
/// eligibility: a captured leader can still be betrayed through the card
/// matching its original identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitorCard {
    pub subject: LeaderId,
    pub held_by: Faction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_table_matches_variant_order() {
        for (i, c) in ALL_CARDS.iter().enumerate() {
            assert_eq!(*c as usize, i);
        }
    }

    #[test]
    fn defense_pairings() {
        assert!(DefenseKind::Barrier.stops(WeaponKind::Kinetic));
        assert!(DefenseKind::Antidote.stops(WeaponKind::Toxin));
        assert!(!DefenseKind::Barrier.stops(WeaponKind::Toxin));
        assert!(!DefenseKind::Antidote.stops(WeaponKind::Kinetic));
        assert!(!DefenseKind::Barrier.stops(WeaponKind::Beam));
        assert!(!DefenseKind::Antidote.stops(WeaponKind::Beam));
    }

    #[test]
    fn slot_lookups() {
        assert_eq!(CardId::Arclance.weapon(), Some(WeaponKind::Beam));
        assert_eq!(CardId::Arclance.defense(), None);
        assert_eq!(CardId::AegisField.defense(), Some(DefenseKind::Barrier));
        assert_eq!(CardId::AegisField.weapon(), None);
    }

    #[test]
    fn mirage_is_always_discarded() {
        assert!(CardId::Mirage.always_discard());
        assert!(!CardId::Slugthrower.always_discard());
    }
}
