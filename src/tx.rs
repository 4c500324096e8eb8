//! Transaction lifecycle shared by every write flow.
//!
//! A controller owns one [`TxLifecycle`] and feeds it [`TxUpdate`]s coming back
//! from the data service. Transitions are pure; anything not in the table
//! below leaves the state untouched.
//!
//! ```text
//! Idle ──submit──> Submitted ──Accepted──> Pending ──Confirmed──> Confirmed
//!   ^                  │                      │
//!   └──SubmitFailed────┘                      └──Failed──> Failed
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::B256;
use tracing::debug;

use crate::error::GatewayError;

static NEXT_CONTROLLER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a mounted controller. Updates addressed to an id that is no
/// longer mounted are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerId(u64);

impl ControllerId {
    pub fn next() -> Self {
        ControllerId(NEXT_CONTROLLER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxLifecycle {
    Idle,
    /// Waiting for the signer and the node to accept the call.
    Submitted,
    Pending { hash: B256 },
    Confirmed { hash: B256 },
    Failed {
        hash: Option<B256>,
        error: GatewayError,
    },
}

/// Progress reported by the data service for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxUpdate {
    Accepted(B256),
    SubmitFailed(GatewayError),
    Confirmed(B256),
    Failed { hash: B256, error: GatewayError },
}

impl TxLifecycle {
    /// Start a submission. Allowed from rest states only.
    pub fn submit(&self) -> Option<TxLifecycle> {
        match self {
            TxLifecycle::Idle | TxLifecycle::Confirmed { .. } | TxLifecycle::Failed { .. } => {
                Some(TxLifecycle::Submitted)
            }
            TxLifecycle::Submitted | TxLifecycle::Pending { .. } => None,
        }
    }

    /// Next state for an update, or None if the update does not apply.
    pub fn apply(&self, update: &TxUpdate) -> Option<TxLifecycle> {
        match (self, update) {
            (TxLifecycle::Submitted, TxUpdate::Accepted(hash)) => {
                Some(TxLifecycle::Pending { hash: *hash })
            }
            (TxLifecycle::Submitted, TxUpdate::SubmitFailed(_)) => Some(TxLifecycle::Idle),
            (TxLifecycle::Pending { hash }, TxUpdate::Confirmed(confirmed)) if hash == confirmed => {
                Some(TxLifecycle::Confirmed { hash: *hash })
            }
            (TxLifecycle::Pending { hash }, TxUpdate::Failed { hash: failed, error })
                if hash == failed =>
            {
                Some(TxLifecycle::Failed {
                    hash: Some(*hash),
                    error: error.clone(),
                })
            }
            _ => None,
        }
    }

    /// Submit controls are disabled while busy.
    pub fn is_busy(&self) -> bool {
        matches!(self, TxLifecycle::Submitted | TxLifecycle::Pending { .. })
    }

    pub fn hash(&self) -> Option<B256> {
        match self {
            TxLifecycle::Pending { hash } | TxLifecycle::Confirmed { hash } => Some(*hash),
            TxLifecycle::Failed { hash, .. } => *hash,
            TxLifecycle::Idle | TxLifecycle::Submitted => None,
        }
    }
}

/// User-facing notification produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Pending { label: &'static str, hash: B256 },
    Success { label: &'static str, hash: B256 },
    Failure { label: &'static str, message: String },
}

/// What the owner of a controller must do after a transition.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TxReaction {
    pub notice: Option<Notice>,
    /// Re-read contract state. Set exactly once per confirmed transaction.
    pub refresh: bool,
    /// The flow completed successfully; modal controllers close.
    pub finished: bool,
}

/// State holder for one write flow.
#[derive(Debug)]
pub struct TxController {
    pub id: ControllerId,
    pub label: &'static str,
    state: TxLifecycle,
}

impl TxController {
    pub fn new(label: &'static str) -> Self {
        Self {
            id: ControllerId::next(),
            label,
            state: TxLifecycle::Idle,
        }
    }

    pub fn state(&self) -> &TxLifecycle {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Move to `Submitted`. Returns false if a submission is already in flight.
    pub fn begin(&mut self) -> bool {
        match self.state.submit() {
            Some(next) => {
                self.state = next;
                true
            }
            None => false,
        }
    }

    pub fn on_update(&mut self, update: TxUpdate) -> TxReaction {
        let Some(next) = self.state.apply(&update) else {
            debug!(controller = ?self.id, state = ?self.state, ?update, "ignoring update");
            return TxReaction::default();
        };
        self.state = next;

        let label = self.label;
        match update {
            TxUpdate::Accepted(hash) => TxReaction {
                notice: Some(Notice::Pending { label, hash }),
                ..TxReaction::default()
            },
            TxUpdate::SubmitFailed(error) => TxReaction {
                notice: Some(Notice::Failure {
                    label,
                    message: error.to_string(),
                }),
                ..TxReaction::default()
            },
            TxUpdate::Confirmed(hash) => TxReaction {
                notice: Some(Notice::Success { label, hash }),
                refresh: true,
                finished: true,
            },
            TxUpdate::Failed { error, .. } => TxReaction {
                notice: Some(Notice::Failure {
                    label,
                    message: error.to_string(),
                }),
                ..TxReaction::default()
            },
        }
    }
}
