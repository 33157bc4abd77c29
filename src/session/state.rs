//! Session lifecycle phases.

use std::fmt;

/// Where the session loop currently is in its lifecycle.
///
/// `Closed` is terminal. Every other phase can be revisited: a torn-down
/// session goes back to `Dialing` unless shutdown was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Created but not yet started.
    Idle,
    /// Attempting to establish a transport, possibly waiting out a back-off.
    Dialing,
    /// A transport is live and frames are flowing.
    Active,
    /// Releasing the transport and failing pending replies.
    TearingDown,
    /// Shutdown completed; no further connects will happen.
    Closed,
}

impl SessionPhase {
    /// Returns `true` if a transition from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Dialing | Self::Closed)
                | (Self::Dialing, Self::Active | Self::Closed)
                | (Self::Active, Self::TearingDown)
                | (Self::TearingDown, Self::Dialing | Self::Closed)
        )
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Dialing => "dialing",
            Self::Active => "active",
            Self::TearingDown => "tearing-down",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}
