use alloy::primitives::{Address, U256};

use crate::data::types::{ContractCall, Room};
use crate::forms::FormKind;
use crate::tx::{ControllerId, TxUpdate};

/// Views the user can navigate to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    RoomList,
    RoomCard(U256),
}

/// Events sent from background data tasks and components to the main app loop
#[derive(Debug)]
pub enum AppEvent {
    // Data loaded
    Connected {
        chain_id: u64,
        account: Option<Address>,
    },
    RoomsLoaded(Vec<Room>),
    OwnerLoaded(Address),
    AllowanceLoaded {
        owner: Address,
        spender: Address,
        amount: U256,
    },
    ReadFailed(String),
    /// The allowance read failed; the previous value can no longer be trusted.
    AllowanceFailed(String),

    // Write flows
    OpenForm(FormKind),
    CloseForm,
    /// A controller has a validated call and wants it signed.
    RequestSignature {
        controller: ControllerId,
        call: ContractCall,
    },
    Tx {
        controller: ControllerId,
        update: TxUpdate,
    },

    // Export
    ExportComplete(String),

    // Navigation
    Navigate(View),
    Back,
    Refresh,

    // Status
    Error(String),
}
