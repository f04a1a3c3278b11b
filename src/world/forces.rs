//! Force subtypes and per-territory force stacks.
//!
//! Regular and elite forces are combat-capable; envoys occupy a territory
//! without being able to fight, so they never make a faction a battle
//! participant on their own.

use serde::{Deserialize, Serialize};

/// Elite forces count at this multiplier in battle strength.
pub const ELITE_MULTIPLIER: u32 = 2;

/// Maximum forces of a single kind a faction may hold in one territory.
/// Used by the post-mutation invariant check.
pub const MAX_STACK: u8 = 20;

/// The subtype of a force token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceKind {
    Regular,
    Elite,
    /// Diplomatic presence; occupies but cannot fight.
    Envoy,
}

impl ForceKind {
    /// Returns true if this subtype can participate in battle.
    pub const fn combat_capable(self) -> bool {
        !matches!(self, ForceKind::Envoy)
    }
}

/// The forces one faction holds in one territory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceStack {
    pub regular: u8,
    pub elite: u8,
    pub envoy: u8,
}

impl ForceStack {
    /// Returns the number of combat-capable forces in this stack.
    pub const fn combat_capable(&self) -> u8 {
        self.regular + self.elite
    }

    /// Returns the total number of forces in this stack, envoys included.
    pub const fn total(&self) -> u8 {
        self.regular + self.elite + self.envoy
    }

    /// Returns true if the stack holds no forces at all.
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Returns a mutable reference to the count for a force kind.
    pub fn count_mut(&mut self, kind: ForceKind) -> &mut u8 {
        match kind {
            ForceKind::Regular => &mut self.regular,
            ForceKind::Elite => &mut self.elite,
            ForceKind::Envoy => &mut self.envoy,
        }
    }
}
