use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::data::types::Room;

#[derive(Serialize)]
struct RoomRecord {
    id: String,
    category: String,
    price_per_night: String,
    available: bool,
    review_count: usize,
    average_rating: Option<String>,
}

/// Export the room list to CSV.
///
/// Columns: id, category, price_per_night, available, review_count, average_rating
pub fn export_rooms_csv(rooms: &[Room], path: &Path) -> Result<String, String> {
    let file = fs::File::create(path).map_err(|e| format!("Failed to create file: {e}"))?;
    let mut wtr = csv::Writer::from_writer(file);

    for room in rooms {
        wtr.serialize(RoomRecord {
            id: room.id.to_string(),
            category: room.category.to_string(),
            price_per_night: room.price_per_night.to_string(),
            available: room.is_available,
            review_count: room.reviews.len(),
            average_rating: room.average_rating().map(|r| format!("{r:.2}")),
        })
        .map_err(|e| format!("Failed to write CSV row: {e}"))?;
    }

    wtr.flush().map_err(|e| format!("Failed to flush CSV: {e}"))?;

    Ok(format!("Exported {} rooms to {}", rooms.len(), path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{Review, RoomCategory};
    use alloy::primitives::U256;

    #[test]
    fn test_export_rooms_csv() {
        let rooms = vec![
            Room {
                id: U256::from(0u64),
                category: RoomCategory::Presidential,
                price_per_night: U256::from(10u64),
                is_available: true,
                reviews: vec![Review {
                    room_id: U256::from(0u64),
                    rating: 4,
                    comment: "nice".into(),
                }],
            },
            Room {
                id: U256::from(1u64),
                category: RoomCategory::Suite,
                price_per_night: U256::from(3u64),
                is_available: false,
                reviews: vec![],
            },
        ];

        let path = std::env::temp_dir().join(format!("hotel-tui-export-{}.csv", std::process::id()));
        let msg = export_rooms_csv(&rooms, &path).unwrap();
        assert!(msg.starts_with("Exported 2 rooms"));

        let contents = fs::read_to_string(&path).unwrap();
        let _ = fs::remove_file(&path);
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "id,category,price_per_night,available,review_count,average_rating"
        );
        assert_eq!(lines[1], "0,Presidential,10,true,1,4.00");
        assert_eq!(lines[2], "1,Suite,3,false,0,");
    }
}
