use alloy::primitives::B256;

/// Failures surfaced by the contract gateway and the receipt tracker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The signer declined the transaction.
    #[error("signature request rejected")]
    UserRejected,

    /// The call could not be submitted (malformed call, node rejection, no signer).
    #[error("submission failed: {0}")]
    Submission(String),

    /// The transaction was mined but reverted.
    #[error("transaction {hash} reverted")]
    ReceiptFailure { hash: B256 },

    /// No receipt arrived before the polling deadline.
    #[error("no receipt for {hash} before timeout")]
    Timeout { hash: B256 },

    /// A contract read failed or returned no data.
    #[error("read failed: {0}")]
    Read(String),
}

/// A form field did not parse into the type its call needs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("approve {required} tokens before booking")]
    AllowanceTooLow { required: String },

    #[error("room is not available")]
    RoomUnavailable,
}

impl FormError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        FormError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
