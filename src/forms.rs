use alloy::primitives::U256;
use chrono::{Days, NaiveDate, Utc};

use crate::data::types::{ContractCall, Room, RoomCategory};
use crate::error::FormError;

const MAX_COMMENT_CHARS: usize = 280;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The write forms a user can open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    AddRoom,
    SetAvailability,
    AddReview { room_id: U256 },
    BookRoom { room: Room },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    Text(String),
    Toggle(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub input: FieldInput,
}

impl Field {
    fn text(name: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            label,
            input: FieldInput::Text(value.into()),
        }
    }

    fn toggle(name: &'static str, label: &'static str, value: bool) -> Self {
        Self {
            name,
            label,
            input: FieldInput::Toggle(value),
        }
    }
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::AddRoom => "Add a Room",
            FormKind::SetAvailability => "Set Room Availability",
            FormKind::AddReview { .. } => "Add a Review",
            FormKind::BookRoom { .. } => "Book Room",
        }
    }

    /// Label used in notifications for this form's transactions.
    pub fn action_label(&self) -> &'static str {
        match self {
            FormKind::AddRoom => "Add room",
            FormKind::SetAvailability => "Set availability",
            FormKind::AddReview { .. } => "Add review",
            FormKind::BookRoom { .. } => "Book room",
        }
    }

    /// Fields with their initial values.
    pub fn fields(&self) -> Vec<Field> {
        match self {
            FormKind::AddRoom => vec![
                Field::text("category", "Room category (0-2 or name)", "0"),
                Field::text("price", "Price per night", "0"),
            ],
            FormKind::SetAvailability => vec![
                Field::text("room_id", "Room ID", "0"),
                Field::toggle("is_available", "Available", true),
            ],
            FormKind::AddReview { room_id } => vec![
                Field::text("room_id", "Room ID", room_id.to_string()),
                Field::text("rating", "Rating (1-5)", ""),
                Field::text("comment", "Comment", ""),
            ],
            FormKind::BookRoom { .. } => {
                let today = Utc::now().date_naive();
                let check_in = today.checked_add_days(Days::new(1)).unwrap_or(today);
                let check_out = check_in.checked_add_days(Days::new(1)).unwrap_or(check_in);
                vec![
                    Field::text(
                        "check_in",
                        "Check-in (YYYY-MM-DD)",
                        check_in.format(DATE_FORMAT).to_string(),
                    ),
                    Field::text(
                        "check_out",
                        "Check-out (YYYY-MM-DD)",
                        check_out.format(DATE_FORMAT).to_string(),
                    ),
                ]
            }
        }
    }

    /// Turn the field values into a typed call. Shape checks only; the
    /// contract decides whether the call is allowed.
    pub fn validate(&self, fields: &[Field]) -> Result<ContractCall, FormError> {
        match self {
            FormKind::AddRoom => Ok(ContractCall::AddRoom {
                category: parse_category(text(fields, "category")?)?,
                price_per_night: parse_amount("price", text(fields, "price")?)?,
            }),
            FormKind::SetAvailability => Ok(ContractCall::SetAvailability {
                room_id: parse_amount("room_id", text(fields, "room_id")?)?,
                is_available: toggle(fields, "is_available")?,
            }),
            FormKind::AddReview { .. } => Ok(ContractCall::AddReview {
                room_id: parse_amount("room_id", text(fields, "room_id")?)?,
                rating: parse_rating(text(fields, "rating")?)?,
                comment: parse_comment(text(fields, "comment")?)?,
            }),
            FormKind::BookRoom { room } => {
                let (check_in, check_out) =
                    parse_stay(text(fields, "check_in")?, text(fields, "check_out")?)?;
                Ok(ContractCall::BookRoom {
                    category: room.category,
                    check_in,
                    check_out,
                })
            }
        }
    }
}

fn text<'a>(fields: &'a [Field], name: &'static str) -> Result<&'a str, FormError> {
    match fields.iter().find(|f| f.name == name).map(|f| &f.input) {
        Some(FieldInput::Text(value)) => Ok(value.as_str()),
        _ => Err(FormError::invalid(name, "missing")),
    }
}

fn toggle(fields: &[Field], name: &'static str) -> Result<bool, FormError> {
    match fields.iter().find(|f| f.name == name).map(|f| &f.input) {
        Some(FieldInput::Toggle(value)) => Ok(*value),
        _ => Err(FormError::invalid(name, "missing")),
    }
}

pub fn parse_category(input: &str) -> Result<RoomCategory, FormError> {
    RoomCategory::parse(input)
        .ok_or_else(|| FormError::invalid("category", "expected 0-2, Presidential, Deluxe or Suite"))
}

/// Non-negative decimal integer, as used for room ids and prices.
pub fn parse_amount(field: &'static str, input: &str) -> Result<U256, FormError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FormError::invalid(field, "required"));
    }
    if !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(FormError::invalid(field, "must be a non-negative integer"));
    }
    U256::from_str_radix(input, 10).map_err(|_| FormError::invalid(field, "too large"))
}

pub fn parse_rating(input: &str) -> Result<u8, FormError> {
    match input.trim().parse::<u8>() {
        Ok(rating @ 1..=5) => Ok(rating),
        _ => Err(FormError::invalid("rating", "must be between 1 and 5")),
    }
}

pub fn parse_comment(input: &str) -> Result<String, FormError> {
    let comment = input.trim();
    if comment.is_empty() {
        return Err(FormError::invalid("comment", "required"));
    }
    if comment.chars().count() > MAX_COMMENT_CHARS {
        return Err(FormError::invalid(
            "comment",
            format!("at most {MAX_COMMENT_CHARS} characters"),
        ));
    }
    Ok(comment.to_string())
}

/// Parse check-in/check-out dates into Unix seconds at 00:00 UTC.
pub fn parse_stay(check_in: &str, check_out: &str) -> Result<(u64, u64), FormError> {
    let check_in = parse_date("check_in", check_in)?;
    let check_out = parse_date("check_out", check_out)?;
    if check_out <= check_in {
        return Err(FormError::invalid("check_out", "must be after check-in"));
    }
    Ok((check_in, check_out))
}

fn parse_date(field: &'static str, input: &str) -> Result<u64, FormError> {
    let date = NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| FormError::invalid(field, "expected YYYY-MM-DD"))?;
    let timestamp = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| FormError::invalid(field, "invalid date"))?;
    u64::try_from(timestamp).map_err(|_| FormError::invalid(field, "before 1970"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(fields: &mut [Field], name: &str, value: &str) {
        let field = fields.iter_mut().find(|f| f.name == name).unwrap();
        field.input = FieldInput::Text(value.to_string());
    }

    fn suite() -> Room {
        Room {
            id: U256::from(4u64),
            category: RoomCategory::Suite,
            price_per_night: U256::from(2u64),
            is_available: true,
            reviews: vec![],
        }
    }

    #[test]
    fn test_add_room_maps_fields_positionally() {
        let kind = FormKind::AddRoom;
        let mut fields = kind.fields();
        set(&mut fields, "category", "2");
        set(&mut fields, "price", "150");
        assert_eq!(
            kind.validate(&fields),
            Ok(ContractCall::AddRoom {
                category: RoomCategory::Suite,
                price_per_night: U256::from(150u64),
            })
        );
    }

    #[test]
    fn test_add_room_rejects_out_of_range_category() {
        let kind = FormKind::AddRoom;
        let mut fields = kind.fields();
        set(&mut fields, "category", "3");
        assert!(matches!(
            kind.validate(&fields),
            Err(FormError::InvalidField { field: "category", .. })
        ));
    }

    #[test]
    fn test_set_availability_uses_toggle() {
        let kind = FormKind::SetAvailability;
        let mut fields = kind.fields();
        set(&mut fields, "room_id", "7");
        fields[1].input = FieldInput::Toggle(false);
        assert_eq!(
            kind.validate(&fields),
            Ok(ContractCall::SetAvailability {
                room_id: U256::from(7u64),
                is_available: false,
            })
        );
    }

    #[test]
    fn test_negative_room_id_rejected() {
        assert!(parse_amount("room_id", "-1").is_err());
        assert!(parse_amount("room_id", "").is_err());
        assert!(parse_amount("room_id", "1.5").is_err());
        assert_eq!(parse_amount("room_id", " 0 "), Ok(U256::ZERO));
    }

    #[test]
    fn test_review_prefills_room_and_validates() {
        let kind = FormKind::AddReview {
            room_id: U256::from(3u64),
        };
        let mut fields = kind.fields();
        assert!(kind.validate(&fields).is_err());

        set(&mut fields, "rating", "5");
        set(&mut fields, "comment", "  Great stay  ");
        assert_eq!(
            kind.validate(&fields),
            Ok(ContractCall::AddReview {
                room_id: U256::from(3u64),
                rating: 5,
                comment: "Great stay".to_string(),
            })
        );
    }

    #[test]
    fn test_rating_bounds() {
        assert!(parse_rating("0").is_err());
        assert!(parse_rating("6").is_err());
        assert!(parse_rating("abc").is_err());
        assert_eq!(parse_rating("1"), Ok(1));
    }

    #[test]
    fn test_comment_length_limit() {
        let long = "x".repeat(MAX_COMMENT_CHARS + 1);
        assert!(parse_comment(&long).is_err());
        assert!(parse_comment("   ").is_err());
    }

    #[test]
    fn test_stay_dates() {
        let (check_in, check_out) = parse_stay("2024-03-01", "2024-03-03").unwrap();
        assert_eq!(check_in, 1_709_251_200);
        assert_eq!(check_out - check_in, 2 * 86_400);

        assert!(parse_stay("2024-03-03", "2024-03-03").is_err());
        assert!(parse_stay("2024-03-03", "2024-03-01").is_err());
        assert!(parse_stay("03/01/2024", "2024-03-03").is_err());
    }

    #[test]
    fn test_booking_uses_room_category() {
        let kind = FormKind::BookRoom { room: suite() };
        let mut fields = kind.fields();
        // defaults are tomorrow and the day after
        assert!(kind.validate(&fields).is_ok());

        set(&mut fields, "check_in", "2025-01-10");
        set(&mut fields, "check_out", "2025-01-12");
        match kind.validate(&fields) {
            Ok(ContractCall::BookRoom { category, .. }) => {
                assert_eq!(category, RoomCategory::Suite)
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
