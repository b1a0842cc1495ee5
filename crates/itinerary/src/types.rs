use serde::{Deserialize, Serialize};

/// The category of an itinerary event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// A flight segment.
    Flight,
    /// A hotel or other lodging.
    Accommodation,
    /// A meal or food stop.
    Food,
    /// A show, nightlife or similar.
    Entertainment,
    /// Ground transportation between places.
    Transit,
    /// A sightseeing or other activity.
    Activity,
}

/// A single scheduled event within an itinerary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryEvent {
    /// Unique identifier of the event.
    pub id: String,
    /// Short human-readable title.
    pub title: String,
    /// The event category.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Scheduled time, as produced by the backend.
    pub time: String,
    /// Place where the event happens.
    pub location: String,
    /// Longer description of the event.
    pub description: String,
    /// Expected duration, as produced by the backend.
    pub duration: String,
    /// `[latitude, longitude]` of the event location.
    pub coordinates: [f64; 2],
}

/// A generated travel itinerary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    /// Unique identifier of the itinerary.
    pub id: String,
    /// The destination the itinerary was generated for.
    pub location: String,
    /// First day of the trip, `YYYY-MM-DD`.
    pub start_date: String,
    /// Last day of the trip, `YYYY-MM-DD`.
    pub end_date: String,
    /// The scheduled events, in display order.
    pub events: Vec<ItineraryEvent>,
}

/// The payload sent to the generation backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// The destination city.
    pub location: String,
    /// First day of the trip, `YYYY-MM-DD`.
    pub start_date: String,
    /// Last day of the trip, `YYYY-MM-DD`.
    pub end_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_itinerary() {
        let json = r#"{
            "id": "it-1",
            "location": "Tokyo",
            "startDate": "2025-12-01",
            "endDate": "2025-12-10",
            "events": [{
                "id": "ev-1",
                "title": "Arrival flight",
                "type": "flight",
                "time": "09:30",
                "location": "Haneda Airport",
                "description": "Land and pick up luggage",
                "duration": "1h",
                "coordinates": [35.5494, 139.7798]
            }]
        }"#;

        let itinerary: Itinerary = serde_json::from_str(json).unwrap();
        assert_eq!(itinerary.location, "Tokyo");
        assert_eq!(itinerary.start_date, "2025-12-01");
        assert_eq!(itinerary.events.len(), 1);
        assert_eq!(itinerary.events[0].event_type, EventType::Flight);
        assert_eq!(itinerary.events[0].coordinates[0], 35.5494);
    }

    #[test]
    fn test_serialize_request_wire_names() {
        let req = GenerationRequest {
            location: "Paris".to_owned(),
            start_date: "2025-11-01".to_owned(),
            end_date: "2025-11-05".to_owned(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["location"], "Paris");
        assert_eq!(value["startDate"], "2025-11-01");
        assert_eq!(value["endDate"], "2025-11-05");
    }
}
