//! Applicant and order status enums and their transition rules.
//!
//! Statuses are stored as snake_case TEXT columns (CHECK-constrained in the
//! migrations). No status is ever derived from another: payment, process
//! and form status each advance only through an explicit write.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Generates `as_str`, `from_str_value` and `ALL` for a snake_case status enum.
macro_rules! define_text_status {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in pipeline order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Database string value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }

            /// Parse from the database string value.
            pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        stringify!($name),
                        [$( $text ),+].join(", ")
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_text_status! {
    /// Payment state of an order.
    PaymentStatus {
        Pending => "pending",
        Paid => "paid",
    }
}

define_text_status! {
    /// Document / interview pipeline of an applicant.
    ProcessStatus {
        Pending => "pending",
        Paid => "paid",
        DocumentsSubmitted => "documents_submitted",
        DocumentsInReview => "documents_in_review",
        Interview => "interview",
        Approved => "approved",
        Rejected => "rejected",
    }
}

define_text_status! {
    /// Lifecycle of an applicant's visa form.
    FormStatus {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Submitted => "submitted",
        InReview => "in_review",
        Approved => "approved",
        Rejected => "rejected",
    }
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

impl PaymentStatus {
    /// Apply a gateway confirmation. `Paid` is sticky, so replays are no-ops.
    pub fn confirm(self) -> PaymentStatus {
        PaymentStatus::Paid
    }

    pub fn is_paid(self) -> bool {
        self == PaymentStatus::Paid
    }
}

// ---------------------------------------------------------------------------
// Process
// ---------------------------------------------------------------------------

impl ProcessStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Validate a staff-driven write from `self` to `next`.
    ///
    /// Any value may be set while the current one is not terminal.
    pub fn transition_to(self, next: ProcessStatus) -> Result<ProcessStatus, CoreError> {
        if self.is_terminal() && next != self {
            return Err(CoreError::Conflict(format!(
                "Process status '{self}' is final and cannot change to '{next}'"
            )));
        }
        Ok(next)
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

impl FormStatus {
    /// Whether the owning client may still edit answers.
    pub fn is_editable_by_client(self) -> bool {
        matches!(self, Self::NotStarted | Self::InProgress)
    }

    /// Status after a client saves answers.
    ///
    /// The first save with at least one answer moves `NotStarted` to
    /// `InProgress`; every other status is left unchanged.
    pub fn after_client_save(self, has_any_answer: bool) -> Result<FormStatus, CoreError> {
        if !self.is_editable_by_client() {
            return Err(CoreError::Conflict(format!(
                "Form is '{self}' and can no longer be edited"
            )));
        }
        match self {
            Self::NotStarted if has_any_answer => Ok(Self::InProgress),
            other => Ok(other),
        }
    }

    /// Status after the client finalizes the form.
    pub fn submit(self, form_complete: bool) -> Result<FormStatus, CoreError> {
        if !self.is_editable_by_client() {
            return Err(CoreError::Conflict(format!(
                "Form is '{self}' and cannot be submitted again"
            )));
        }
        if !form_complete {
            return Err(CoreError::Validation(
                "All required fields must be completed before submitting".into(),
            ));
        }
        Ok(Self::Submitted)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn string_values_round_trip() {
        for s in ProcessStatus::ALL {
            assert_eq!(ProcessStatus::from_str_value(s.as_str()).unwrap(), *s);
        }
        for s in FormStatus::ALL {
            assert_eq!(FormStatus::from_str_value(s.as_str()).unwrap(), *s);
        }
        for s in PaymentStatus::ALL {
            assert_eq!(PaymentStatus::from_str_value(s.as_str()).unwrap(), *s);
        }
    }

    #[test]
    fn serde_uses_database_strings() {
        assert_eq!(
            serde_json::to_value(ProcessStatus::DocumentsInReview).unwrap(),
            "documents_in_review"
        );
        assert_eq!(serde_json::to_value(FormStatus::NotStarted).unwrap(), "not_started");
    }

    #[test]
    fn invalid_value_lists_choices() {
        let err = FormStatus::from_str_value("done").unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("not_started"));
    }

    #[test]
    fn payment_confirmation_is_sticky() {
        assert_eq!(PaymentStatus::Pending.confirm(), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::Paid.confirm(), PaymentStatus::Paid);
    }

    #[test]
    fn process_status_can_move_freely_until_terminal() {
        assert_matches!(
            ProcessStatus::Pending.transition_to(ProcessStatus::Interview),
            Ok(ProcessStatus::Interview)
        );
        assert_matches!(
            ProcessStatus::Interview.transition_to(ProcessStatus::DocumentsSubmitted),
            Ok(ProcessStatus::DocumentsSubmitted)
        );
        assert_matches!(
            ProcessStatus::Interview.transition_to(ProcessStatus::Approved),
            Ok(ProcessStatus::Approved)
        );
    }

    #[test]
    fn terminal_process_status_is_final() {
        assert_matches!(
            ProcessStatus::Approved.transition_to(ProcessStatus::Interview),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            ProcessStatus::Rejected.transition_to(ProcessStatus::Approved),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            ProcessStatus::Rejected.transition_to(ProcessStatus::Rejected),
            Ok(ProcessStatus::Rejected)
        );
    }

    #[test]
    fn first_answer_moves_form_in_progress() {
        assert_matches!(FormStatus::NotStarted.after_client_save(true), Ok(FormStatus::InProgress));
        assert_matches!(FormStatus::NotStarted.after_client_save(false), Ok(FormStatus::NotStarted));
        assert_matches!(FormStatus::InProgress.after_client_save(true), Ok(FormStatus::InProgress));
    }

    #[test]
    fn submitted_form_is_locked_for_clients() {
        assert_matches!(FormStatus::Submitted.after_client_save(true), Err(CoreError::Conflict(_)));
        assert_matches!(FormStatus::Approved.after_client_save(true), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn submit_requires_complete_form() {
        assert_matches!(FormStatus::InProgress.submit(true), Ok(FormStatus::Submitted));
        assert_matches!(FormStatus::InProgress.submit(false), Err(CoreError::Validation(_)));
        assert_matches!(FormStatus::InReview.submit(true), Err(CoreError::Conflict(_)));
    }
}
