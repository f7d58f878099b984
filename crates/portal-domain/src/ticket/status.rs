//! Ticket status and priority
//!
//! Forward path:
//! ```text
//! Open → InProgress → Resolved → Closed
//!   ↑                              │
//!   └────────── reopen ────────────┘
//! ```
//!
//! Any status may also jump directly to any other status; only a change to
//! the current status is refused.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The status of a support ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    /// Newly raised, not yet picked up
    #[default]
    Open,
    /// Being worked on by support
    InProgress,
    /// A fix or answer was provided
    Resolved,
    /// Finished; can only be reopened
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    /// Next status on the forward path
    pub fn next(&self) -> Option<TicketStatus> {
        match self {
            TicketStatus::Open => Some(TicketStatus::InProgress),
            TicketStatus::InProgress => Some(TicketStatus::Resolved),
            TicketStatus::Resolved => Some(TicketStatus::Closed),
            TicketStatus::Closed => None,
        }
    }

    /// The only backward step: closed tickets reopen
    pub fn reopen(&self) -> Option<TicketStatus> {
        match self {
            TicketStatus::Closed => Some(TicketStatus::Open),
            _ => None,
        }
    }

    /// Check if a status change is allowed
    pub fn can_transition_to(&self, target: &TicketStatus) -> bool {
        self != target
    }

    /// Statuses reachable in one change
    pub fn valid_transitions(&self) -> Vec<TicketStatus> {
        Self::ALL.into_iter().filter(|s| s != self).collect()
    }

    /// Check if the ticket still needs attention
    pub fn is_open(&self) -> bool {
        matches!(self, TicketStatus::Open | TicketStatus::InProgress)
    }

    /// Stored form (`in-progress`)
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in-progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    /// Badge text (`In Progress`)
    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownStatus(s.to_string()))
    }
}

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 3] = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketPriority::Low => "Low",
            TicketPriority::Medium => "Medium",
            TicketPriority::High => "High",
        }
    }
}

impl std::fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TicketPriority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownPriority(s.to_string()))
    }
}
