//! Independent reasons that can each hold compositing suspended.

use bitflags::bitflags;

bitflags! {
    /// Compositing runs only while this set is empty. The empty set is "no reason".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SuspendReason: u8 {
        /// The user toggled compositing off (shortcut, remote toggle, or `enabled = false`).
        const USER_REQUESTED = 1 << 0;
        /// A window rule says a client blocks compositing.
        const RULE_BLOCKED = 1 << 1;
        /// A script or remote caller asked for it.
        const SCRIPT_REQUESTED = 1 << 2;
        const ALL = Self::USER_REQUESTED.bits() | Self::RULE_BLOCKED.bits() | Self::SCRIPT_REQUESTED.bits();
    }
}

impl SuspendReason {
    /// Parses the names used on the control surface: `user`, `rule`, `script`, `all`.
    pub fn from_control_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::USER_REQUESTED),
            "rule" => Some(Self::RULE_BLOCKED),
            "script" => Some(Self::SCRIPT_REQUESTED),
            "all" => Some(Self::ALL),
            _ => None,
        }
    }
}
