use ofroot_core::InvoiceStatus;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusGateError {
    #[error("marking an invoice as {0} must be confirmed")]
    ConfirmationRequired(InvoiceStatus),
}

/// A status change cleared to be sent to the backend. The backend still
/// decides whether the transition is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    target: InvoiceStatus,
}

impl StatusChange {
    pub fn request(target: InvoiceStatus, confirmed: bool) -> Result<Self, StatusGateError> {
        if target.requires_confirmation() && !confirmed {
            return Err(StatusGateError::ConfirmationRequired(target));
        }
        Ok(Self { target })
    }

    pub fn target(&self) -> InvoiceStatus {
        self.target
    }
}

/// Buttons the editor offers from `current`: the forward path
/// draft -> sent -> paid, plus void from anything not already void.
/// Advisory only.
pub fn suggested_transitions(current: InvoiceStatus) -> Vec<InvoiceStatus> {
    let forward = match current {
        InvoiceStatus::Draft => Some(InvoiceStatus::Sent),
        InvoiceStatus::Sent => Some(InvoiceStatus::Paid),
        InvoiceStatus::Paid | InvoiceStatus::Void => None,
    };

    forward
        .into_iter()
        .chain((current != InvoiceStatus::Void).then_some(InvoiceStatus::Void))
        .collect()
}
