pub mod coordinates;
pub mod i18n;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use coordinates::format_coordinates;

/// A user created point of interest.
///
/// Markers are only ever built by [`Marker::create`]; after that they are
/// read-only until removed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

/// The caller supplied part of a marker, everything except `id` and `createdAt`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct NewMarker {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

impl Marker {
    pub fn create(new_marker: NewMarker) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            lat: new_marker.lat,
            lng: new_marker.lng,
            address: new_marker.address,
            created_at: Utc::now(),
        }
    }

    pub fn coordinates(&self) -> String {
        format_coordinates(self.lat, self.lng)
    }
}

#[test]
fn test_marker_json_field_names() {
    let marker = Marker::create(NewMarker {
        lat: 55.7558,
        lng: 37.6173,
        address: "Red Square, Moscow".into(),
    });
    let value = serde_json::to_value(&marker).unwrap();

    assert_eq!(value["id"], serde_json::json!(marker.id));
    assert_eq!(value["lat"], serde_json::json!(55.7558));
    assert_eq!(value["lng"], serde_json::json!(37.6173));
    assert_eq!(value["address"], serde_json::json!("Red Square, Moscow"));
    assert!(value.get("createdAt").is_some());

    let restored: Marker = serde_json::from_value(value).unwrap();
    assert_eq!(restored, marker);
}

#[test]
fn test_marker_ids_are_unique() {
    let a = Marker::create(NewMarker::default());
    let b = Marker::create(NewMarker::default());
    assert_ne!(a.id, b.id);
}
