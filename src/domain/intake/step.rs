//! IntakeStep - Position in the interview.
//!
//! The interview walks a fixed sequence. The only sideways exit is
//! `Abandoned`, reachable from any non-terminal step.
//!
//! # Order
//!
//! Greeting → CollectName → CollectDOB → CollectInsurance → CollectReferral →
//! CollectComplaint → CollectAddress → ValidateAddress → CollectContact →
//! OfferAppointments → ConfirmAppointment → Complete

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// One step of the intake interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    #[default]
    Greeting,
    CollectName,
    #[serde(rename = "collect_dob")]
    CollectDOB,
    CollectInsurance,
    CollectReferral,
    CollectComplaint,
    CollectAddress,
    ValidateAddress,
    CollectContact,
    OfferAppointments,
    ConfirmAppointment,
    Complete,
    Abandoned,
}

impl IntakeStep {
    /// The canonical forward sequence. `Abandoned` is not part of it.
    pub const ORDER: [IntakeStep; 12] = [
        IntakeStep::Greeting,
        IntakeStep::CollectName,
        IntakeStep::CollectDOB,
        IntakeStep::CollectInsurance,
        IntakeStep::CollectReferral,
        IntakeStep::CollectComplaint,
        IntakeStep::CollectAddress,
        IntakeStep::ValidateAddress,
        IntakeStep::CollectContact,
        IntakeStep::OfferAppointments,
        IntakeStep::ConfirmAppointment,
        IntakeStep::Complete,
    ];

    /// Index in [`Self::ORDER`], or `None` for `Abandoned`.
    pub fn order_index(&self) -> Option<usize> {
        Self::ORDER.iter().position(|s| s == self)
    }

    /// The step after this one, or None at the end of the sequence.
    pub fn next(&self) -> Option<IntakeStep> {
        self.order_index()
            .and_then(|idx| Self::ORDER.get(idx + 1))
            .copied()
    }

    /// Returns true if `self` comes strictly before `other` in the sequence.
    pub fn is_before(&self, other: &IntakeStep) -> bool {
        match (self.order_index(), other.order_index()) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    /// Returns true for steps that consume a caller utterance.
    pub fn collects_input(&self) -> bool {
        !matches!(
            self,
            IntakeStep::Greeting | IntakeStep::Complete | IntakeStep::Abandoned
        )
    }

    /// Stable snake_case name for logs and audit.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntakeStep::Greeting => "greeting",
            IntakeStep::CollectName => "collect_name",
            IntakeStep::CollectDOB => "collect_dob",
            IntakeStep::CollectInsurance => "collect_insurance",
            IntakeStep::CollectReferral => "collect_referral",
            IntakeStep::CollectComplaint => "collect_complaint",
            IntakeStep::CollectAddress => "collect_address",
            IntakeStep::ValidateAddress => "validate_address",
            IntakeStep::CollectContact => "collect_contact",
            IntakeStep::OfferAppointments => "offer_appointments",
            IntakeStep::ConfirmAppointment => "confirm_appointment",
            IntakeStep::Complete => "complete",
            IntakeStep::Abandoned => "abandoned",
        }
    }
}

impl StateMachine for IntakeStep {
    fn can_transition_to(&self, target: &Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        *target == IntakeStep::Abandoned || self.next() == Some(*target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            IntakeStep::Complete | IntakeStep::Abandoned => vec![],
            _ => self
                .next()
                .into_iter()
                .chain(std::iter::once(IntakeStep::Abandoned))
                .collect(),
        }
    }
}

impl fmt::Display for IntakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod sequence {
        use super::*;

        #[test]
        fn order_starts_at_greeting_and_ends_at_complete() {
            assert_eq!(IntakeStep::ORDER[0], IntakeStep::Greeting);
            assert_eq!(IntakeStep::ORDER[11], IntakeStep::Complete);
        }

        #[test]
        fn next_follows_order() {
            for pair in IntakeStep::ORDER.windows(2) {
                assert_eq!(pair[0].next(), Some(pair[1]));
            }
        }

        #[test]
        fn terminal_steps_have_no_next() {
            assert_eq!(IntakeStep::Complete.next(), None);
            assert_eq!(IntakeStep::Abandoned.next(), None);
        }

        #[test]
        fn validate_address_sits_between_address_and_contact() {
            assert_eq!(IntakeStep::CollectAddress.next(), Some(IntakeStep::ValidateAddress));
            assert_eq!(IntakeStep::ValidateAddress.next(), Some(IntakeStep::CollectContact));
        }

        #[test]
        fn is_before_ignores_abandoned() {
            assert!(IntakeStep::CollectName.is_before(&IntakeStep::Complete));
            assert!(!IntakeStep::Complete.is_before(&IntakeStep::CollectName));
            assert!(!IntakeStep::Greeting.is_before(&IntakeStep::Abandoned));
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn forward_by_one_is_allowed() {
            assert!(IntakeStep::CollectDOB.can_transition_to(&IntakeStep::CollectInsurance));
        }

        #[test]
        fn skipping_ahead_is_rejected() {
            assert!(IntakeStep::CollectName
                .transition_to(IntakeStep::CollectInsurance)
                .is_err());
        }

        #[test]
        fn going_back_is_rejected() {
            assert!(!IntakeStep::CollectContact.can_transition_to(&IntakeStep::CollectAddress));
        }

        #[test]
        fn any_active_step_may_abandon() {
            for step in &IntakeStep::ORDER[..11] {
                assert!(step.can_transition_to(&IntakeStep::Abandoned), "{step}");
            }
        }

        #[test]
        fn terminal_steps_are_terminal() {
            assert!(IntakeStep::Complete.is_terminal());
            assert!(IntakeStep::Abandoned.is_terminal());
            assert!(!IntakeStep::ConfirmAppointment.is_terminal());
        }
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&IntakeStep::CollectDOB).unwrap();
        assert_eq!(json, "\"collect_dob\"");
        assert_eq!(IntakeStep::ValidateAddress.to_string(), "validate_address");
    }

    #[test]
    fn only_collecting_steps_take_input() {
        assert!(!IntakeStep::Greeting.collects_input());
        assert!(IntakeStep::ValidateAddress.collects_input());
        assert!(!IntakeStep::Complete.collects_input());
    }
}
