use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::data::types::{ContractCall, Room, RoomCategory, Review};
use crate::error::GatewayError;

// ABI definitions for the booking contract and its payment token
sol! {
    #[allow(missing_docs)]
    interface IHotelBooking {
        struct Review {
            uint256 roomId;
            uint8 rating;
            string comment;
        }

        struct Room {
            uint256 id;
            uint8 category;
            uint256 pricePerNight;
            bool isAvailable;
            Review[] reviews;
        }

        function getAllRooms() external view returns (Room[]);
        function owner() external view returns (address);
        function addRoom(uint8 category, uint256 pricePerNight) external;
        function setRoomAvailability(uint256 roomId, bool isAvailable) external;
        function addReview(uint256 roomId, uint8 rating, string comment) external;
        function bookRoomByCategory(uint8 category, uint256 checkInDate, uint256 checkOutDate) external;
    }

    #[allow(missing_docs)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// ABI-encode a write call into calldata.
pub fn encode_call(call: &ContractCall) -> Bytes {
    let data = match call {
        ContractCall::AddRoom {
            category,
            price_per_night,
        } => IHotelBooking::addRoomCall {
            category: category.index(),
            pricePerNight: *price_per_night,
        }
        .abi_encode(),
        ContractCall::SetAvailability {
            room_id,
            is_available,
        } => IHotelBooking::setRoomAvailabilityCall {
            roomId: *room_id,
            isAvailable: *is_available,
        }
        .abi_encode(),
        ContractCall::AddReview {
            room_id,
            rating,
            comment,
        } => IHotelBooking::addReviewCall {
            roomId: *room_id,
            rating: *rating,
            comment: comment.clone(),
        }
        .abi_encode(),
        ContractCall::Approve { spender, amount } => IERC20::approveCall {
            spender: *spender,
            amount: *amount,
        }
        .abi_encode(),
        ContractCall::BookRoom {
            category,
            check_in,
            check_out,
        } => IHotelBooking::bookRoomByCategoryCall {
            category: category.index(),
            checkInDate: U256::from(*check_in),
            checkOutDate: U256::from(*check_out),
        }
        .abi_encode(),
    };
    Bytes::from(data)
}

pub fn get_all_rooms_calldata() -> Bytes {
    Bytes::from(IHotelBooking::getAllRoomsCall {}.abi_encode())
}

pub fn owner_calldata() -> Bytes {
    Bytes::from(IHotelBooking::ownerCall {}.abi_encode())
}

pub fn allowance_calldata(owner: Address, spender: Address) -> Bytes {
    Bytes::from(IERC20::allowanceCall { owner, spender }.abi_encode())
}

pub fn decode_rooms(data: &[u8]) -> Result<Vec<Room>, GatewayError> {
    ensure_data(data, "getAllRooms")?;
    let decoded = IHotelBooking::getAllRoomsCall::abi_decode_returns(data, true)
        .map_err(|e| GatewayError::Read(format!("getAllRooms: {e}")))?;
    Ok(decoded._0.into_iter().map(room_from_abi).collect())
}

pub fn decode_owner(data: &[u8]) -> Result<Address, GatewayError> {
    ensure_data(data, "owner")?;
    let decoded = IHotelBooking::ownerCall::abi_decode_returns(data, true)
        .map_err(|e| GatewayError::Read(format!("owner: {e}")))?;
    Ok(decoded._0)
}

pub fn decode_allowance(data: &[u8]) -> Result<U256, GatewayError> {
    ensure_data(data, "allowance")?;
    let decoded = IERC20::allowanceCall::abi_decode_returns(data, true)
        .map_err(|e| GatewayError::Read(format!("allowance: {e}")))?;
    Ok(decoded._0)
}

// An empty return means no contract at the address, not an empty result
fn ensure_data(data: &[u8], function: &str) -> Result<(), GatewayError> {
    if data.is_empty() {
        return Err(GatewayError::Read(format!("{function} returned no data")));
    }
    Ok(())
}

fn room_from_abi(room: IHotelBooking::Room) -> Room {
    Room {
        id: room.id,
        category: RoomCategory::from_index(room.category),
        price_per_night: room.pricePerNight,
        is_available: room.isAvailable,
        reviews: room
            .reviews
            .into_iter()
            .map(|r| Review {
                room_id: r.roomId,
                rating: r.rating,
                comment: r.comment,
            })
            .collect(),
    }
}
