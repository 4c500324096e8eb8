use alloy::primitives::{Address, U256};

/// Token amounts are 18-decimal fixed point; prices are whole tokens.
pub const TOKEN_DECIMALS: u8 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomCategory {
    Presidential,
    Deluxe,
    Suite,
    Unknown(u8),
}

impl RoomCategory {
    pub const ALL: [RoomCategory; 3] = [
        RoomCategory::Presidential,
        RoomCategory::Deluxe,
        RoomCategory::Suite,
    ];

    pub fn from_index(index: u8) -> Self {
        match index {
            0 => RoomCategory::Presidential,
            1 => RoomCategory::Deluxe,
            2 => RoomCategory::Suite,
            other => RoomCategory::Unknown(other),
        }
    }

    pub fn index(self) -> u8 {
        match self {
            RoomCategory::Presidential => 0,
            RoomCategory::Deluxe => 1,
            RoomCategory::Suite => 2,
            RoomCategory::Unknown(other) => other,
        }
    }

    /// Parse user input: either the numeric index or the category name.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Ok(index) = input.parse::<u8>() {
            return match RoomCategory::from_index(index) {
                RoomCategory::Unknown(_) => None,
                known => Some(known),
            };
        }
        RoomCategory::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(input))
    }
}

impl std::fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomCategory::Presidential => write!(f, "Presidential"),
            RoomCategory::Deluxe => write!(f, "Deluxe"),
            RoomCategory::Suite => write!(f, "Suite"),
            RoomCategory::Unknown(i) => write!(f, "Category {i}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub room_id: U256,
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: U256,
    pub category: RoomCategory,
    /// Whole tokens per night.
    pub price_per_night: U256,
    pub is_available: bool,
    pub reviews: Vec<Review>,
}

impl Room {
    /// Payment the booking contract pulls, in token base units.
    pub fn required_payment(&self) -> U256 {
        scale_to_base_units(self.price_per_night)
    }

    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        Some(f64::from(total) / self.reviews.len() as f64)
    }
}

/// Scale a whole-token amount to 18-decimal base units, saturating on overflow.
pub fn scale_to_base_units(whole: U256) -> U256 {
    whole.saturating_mul(U256::from(10u64).pow(U256::from(TOKEN_DECIMALS)))
}

/// Addresses of the two contracts the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contracts {
    pub booking: Address,
    pub token: Address,
}

/// A state-changing call, already validated into contract argument types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    AddRoom {
        category: RoomCategory,
        price_per_night: U256,
    },
    SetAvailability {
        room_id: U256,
        is_available: bool,
    },
    AddReview {
        room_id: U256,
        rating: u8,
        comment: String,
    },
    Approve {
        spender: Address,
        amount: U256,
    },
    BookRoom {
        category: RoomCategory,
        check_in: u64,
        check_out: u64,
    },
}

impl ContractCall {
    pub fn function_name(&self) -> &'static str {
        match self {
            ContractCall::AddRoom { .. } => "addRoom",
            ContractCall::SetAvailability { .. } => "setRoomAvailability",
            ContractCall::AddReview { .. } => "addReview",
            ContractCall::Approve { .. } => "approve",
            ContractCall::BookRoom { .. } => "bookRoomByCategory",
        }
    }

    /// Contract the call is sent to.
    pub fn target(&self, contracts: &Contracts) -> Address {
        match self {
            ContractCall::Approve { .. } => contracts.token,
            _ => contracts.booking,
        }
    }
}

impl std::fmt::Display for ContractCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractCall::AddRoom {
                category,
                price_per_night,
            } => write!(f, "addRoom({category}, {price_per_night})"),
            ContractCall::SetAvailability {
                room_id,
                is_available,
            } => write!(f, "setRoomAvailability({room_id}, {is_available})"),
            ContractCall::AddReview {
                room_id,
                rating,
                comment,
            } => write!(f, "addReview({room_id}, {rating}, \"{comment}\")"),
            ContractCall::Approve { spender, amount } => {
                write!(f, "approve({spender}, {amount})")
            }
            ContractCall::BookRoom {
                category,
                check_in,
                check_out,
            } => write!(f, "bookRoomByCategory({category}, {check_in}, {check_out})"),
        }
    }
}
