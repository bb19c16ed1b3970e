//! Contact availability.

use std::fmt;

/// A contact's availability as reported by the signaling backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Presence {
    /// Not connected. Cannot be called.
    #[default]
    Offline,
    /// Online and reachable.
    Available,
    /// Online but idle.
    Away,
    /// Online, does not want to be disturbed.
    DoNotDisturb,
}

impl Presence {
    /// Order in which the own-status selector lists the variants.
    pub const SELECTOR_ORDER: [Presence; 4] =
        [Self::Available, Self::Away, Self::DoNotDisturb, Self::Offline];

    /// Decode the numeric status used on the signaling wire.
    ///
    /// Codes outside the known range are treated as [`Presence::Away`], which
    /// is how the backend reports custom statuses.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Offline,
            1 => Self::Available,
            2 => Self::DoNotDisturb,
            _ => Self::Away,
        }
    }

    /// Numeric status used on the signaling wire.
    pub fn code(self) -> u32 {
        match self {
            Self::Offline => 0,
            Self::Available => 1,
            Self::DoNotDisturb => 2,
            Self::Away => 3,
        }
    }

    /// Whether the contact can be reached for a call.
    pub fn is_online(self) -> bool {
        self != Self::Offline
    }

    /// Parse a user-facing status name (`available`, `away`, `dnd`, `offline`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "available" | "online" => Some(Self::Available),
            "away" => Some(Self::Away),
            "dnd" | "donotdisturb" | "do-not-disturb" | "busy" => Some(Self::DoNotDisturb),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Offline => "offline",
            Self::Available => "available",
            Self::Away => "away",
            Self::DoNotDisturb => "dnd",
        };
        f.write_str(name)
    }
}
