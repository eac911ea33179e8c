//! Appointment lifecycle states and the transition table.
//!
//! Raw strings never reach storage: every status write goes through
//! [`AppointmentStatus::parse`] and [`AppointmentStatus::can_transition_to`].

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Normalize an incoming status. Case-insensitive; accepts the
    /// Portuguese synonyms the platform's clients send alongside the
    /// canonical English names.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pending" | "pendente" => Some(Self::Pending),
            "confirmed" | "confirmado" | "confirmada" => Some(Self::Confirmed),
            "cancelled" | "canceled" | "cancelado" | "cancelada" => Some(Self::Cancelled),
            "completed" | "concluido" | "concluído" | "concluida" | "concluída" => {
                Some(Self::Completed)
            }
            _ => None,
        }
    }

    /// Canonical lowercase form, as stored and as returned by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Terminal states admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// The lifecycle graph. Re-applying the current status is a no-op and
    /// allowed, so retried requests stay idempotent; completion requires
    /// prior confirmation.
    pub fn can_transition_to(&self, next: Self) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (*self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    // ── parse ──

    #[test]
    fn test_parse_canonical() {
        assert_eq!(AppointmentStatus::parse("pending"), Some(Pending));
        assert_eq!(AppointmentStatus::parse("confirmed"), Some(Confirmed));
        assert_eq!(AppointmentStatus::parse("cancelled"), Some(Cancelled));
        assert_eq!(AppointmentStatus::parse("completed"), Some(Completed));
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(AppointmentStatus::parse("CONFIRMED"), Some(Confirmed));
        assert_eq!(AppointmentStatus::parse("Pending"), Some(Pending));
    }

    #[test]
    fn test_parse_portuguese_synonyms() {
        assert_eq!(AppointmentStatus::parse("pendente"), Some(Pending));
        assert_eq!(AppointmentStatus::parse("confirmado"), Some(Confirmed));
        assert_eq!(AppointmentStatus::parse("confirmada"), Some(Confirmed));
        assert_eq!(AppointmentStatus::parse("cancelado"), Some(Cancelled));
        assert_eq!(AppointmentStatus::parse("cancelada"), Some(Cancelled));
        assert_eq!(AppointmentStatus::parse("concluido"), Some(Completed));
        assert_eq!(AppointmentStatus::parse("concluído"), Some(Completed));
        assert_eq!(AppointmentStatus::parse("concluída"), Some(Completed));
    }

    #[test]
    fn test_parse_american_spelling() {
        assert_eq!(AppointmentStatus::parse("canceled"), Some(Cancelled));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(AppointmentStatus::parse("  confirmed "), Some(Confirmed));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(AppointmentStatus::parse("archived"), None);
        assert_eq!(AppointmentStatus::parse(""), None);
    }

    // ── round trip ──

    #[test]
    fn test_as_str_round_trips() {
        for status in [Pending, Confirmed, Cancelled, Completed] {
            assert_eq!(AppointmentStatus::parse(status.as_str()), Some(status));
        }
    }

    // ── transition table ──

    #[test]
    fn test_pending_to_confirmed() {
        assert!(Pending.can_transition_to(Confirmed));
    }

    #[test]
    fn test_pending_to_cancelled() {
        assert!(Pending.can_transition_to(Cancelled));
    }

    #[test]
    fn test_confirmed_to_cancelled() {
        assert!(Confirmed.can_transition_to(Cancelled));
    }

    #[test]
    fn test_confirmed_to_completed() {
        assert!(Confirmed.can_transition_to(Completed));
    }

    #[test]
    fn test_pending_cannot_skip_to_completed() {
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert!(Cancelled.is_terminal());
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Completed));
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(Completed.is_terminal());
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Confirmed));
        assert!(!Completed.can_transition_to(Cancelled));
    }

    #[test]
    fn test_no_backwards_moves() {
        assert!(!Confirmed.can_transition_to(Pending));
    }

    #[test]
    fn test_same_status_is_noop() {
        for status in [Pending, Confirmed, Cancelled, Completed] {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn test_open_states_not_terminal() {
        assert!(!Pending.is_terminal());
        assert!(!Confirmed.is_terminal());
    }
}
