//! # Link state tracking
//!
//! The module reports its link milestones through `+WIND` indications. The
//! reached milestones are tracked as a bit-set which
//! [wait_for_link](crate::adapter::Adapter::wait_for_link) polls against.
use crate::urc::WindIndication;

/// Bit-set of link milestones, used both as the tracked state's content and
/// as the mask argument of wait calls.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinkMask(pub(crate) u8);

impl LinkMask {
    /// Module completed power on
    pub const POWER_ON: Self = Self(0b0000_0001);

    /// AT console is ready for commands
    pub const CONSOLE_ACTIVE: Self = Self(0b0000_0010);

    /// Associated with the access point
    pub const ASSOCIATED: Self = Self(0b0000_0100);

    /// Joined the network
    pub const JOINED: Self = Self(0b0000_1000);

    /// Link is up
    pub const UP: Self = Self(0b0001_0000);

    /// Combines two masks, for waiting on any of several milestones
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Current link state of the module.
///
/// Power-on and reset indications replace the whole state, all other
/// milestones are additive and only cleared by the next reset transition.
/// Mutated exclusively by indication processing ([LinkState::apply]) and by
/// the reset operations of the adapter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinkState(u8);

impl LinkState {
    /// Module is off, no milestone reached
    pub const fn off() -> Self {
        Self(0)
    }

    /// Replaces the whole state with the given milestones (reset transition)
    pub fn reset_to(&mut self, mask: LinkMask) {
        self.0 = mask.0;
    }

    /// Adds the given milestones (additive transition)
    pub fn raise(&mut self, mask: LinkMask) {
        self.0 |= mask.0;
    }

    /// Removes the given milestones
    pub fn lower(&mut self, mask: LinkMask) {
        self.0 &= !mask.0;
    }

    /// True if any of the masked milestones is reached
    pub fn contains_any(&self, mask: LinkMask) -> bool {
        self.0 & mask.0 != 0
    }

    /// Applies a parsed WIND indication to the state
    pub fn apply(&mut self, indication: WindIndication) {
        match indication {
            WindIndication::PowerOn => self.reset_to(LinkMask::POWER_ON),
            WindIndication::Reset => *self = Self::off(),
            WindIndication::ConsoleActive => self.raise(LinkMask::CONSOLE_ACTIVE),
            WindIndication::Associated => self.raise(LinkMask::ASSOCIATED),
            WindIndication::Joined => self.raise(LinkMask::JOINED),
            WindIndication::Up => self.raise(LinkMask::UP),
            WindIndication::Undefined => {}
        }
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::off()
    }
}
