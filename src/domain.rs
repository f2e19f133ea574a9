use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier used to correlate lifecycle events with the record they describe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A record that can flow through the geo-fixing stage.
///
/// The stage only ever reads the identifier and writes the two coordinate
/// fields through `set_coordinates`. Everything else on the implementing type
/// is opaque to it.
pub trait GeoRecord: Send + Sync {
    fn id(&self) -> RecordId;

    fn latitude(&self) -> Option<f64>;

    fn longitude(&self) -> Option<f64>;

    /// Overwrite latitude and longitude, in that order
    fn set_coordinates(&mut self, latitude: f64, longitude: f64);
}

/// A crowd message as it travels through the pipeline.
///
/// Only `id`, `latitude` and `longitude` are known fields; all other attributes
/// (text, author, source, language...) are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Message {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            latitude: None,
            longitude: None,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// String value of an opaque attribute, if present and a string
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

impl GeoRecord for Message {
    fn id(&self) -> RecordId {
        RecordId::from(self.id)
    }

    fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    fn set_coordinates(&mut self, latitude: f64, longitude: f64) {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Outcome of a coordinate lookup.
///
/// "Nothing found" is a normal outcome and is never an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Resolved(Coordinates),
    Unresolved,
}

impl Resolution {
    /// Build a resolution from raw coordinate values.
    ///
    /// Exactly two values are read as `[latitude, longitude]`. Any other arity is
    /// treated as unresolved.
    pub fn from_values(values: &[f64]) -> Self {
        match values {
            [latitude, longitude] => Resolution::Resolved(Coordinates::new(*latitude, *longitude)),
            _ => Resolution::Unresolved,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Resolution::Resolved(coordinates) => Some(*coordinates),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

impl From<Coordinates> for Resolution {
    fn from(coordinates: Coordinates) -> Self {
        Resolution::Resolved(coordinates)
    }
}

impl From<Option<(f64, f64)>> for Resolution {
    fn from(pair: Option<(f64, f64)>) -> Self {
        match pair {
            Some((latitude, longitude)) => Resolution::Resolved(Coordinates::new(latitude, longitude)),
            None => Resolution::Unresolved,
        }
    }
}

impl From<Option<Vec<f64>>> for Resolution {
    fn from(values: Option<Vec<f64>>) -> Self {
        values
            .as_deref()
            .map(Resolution::from_values)
            .unwrap_or(Resolution::Unresolved)
    }
}

/// Lifecycle notifications a stage hands to its reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    ElementStarted(RecordId),
    ElementEnded(RecordId),
    StageCompleted,
    StageErrored,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleEvent::ElementStarted(id) => write!(f, "ElementStarted({})", id),
            LifecycleEvent::ElementEnded(id) => write!(f, "ElementEnded({})", id),
            LifecycleEvent::StageCompleted => f.write_str("StageCompleted"),
            LifecycleEvent::StageErrored => f.write_str("StageErrored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_values_requires_exactly_two() {
        assert_eq!(
            Resolution::from_values(&[45.0, 9.0]),
            Resolution::Resolved(Coordinates::new(45.0, 9.0))
        );
        assert_eq!(Resolution::from_values(&[]), Resolution::Unresolved);
        assert_eq!(Resolution::from_values(&[45.0]), Resolution::Unresolved);
        assert_eq!(Resolution::from_values(&[45.0, 9.0, 3.0]), Resolution::Unresolved);
    }

    #[test]
    fn test_from_optional_values() {
        assert_eq!(Resolution::from(None::<Vec<f64>>), Resolution::Unresolved);
        assert!(Resolution::from(Some(vec![1.0, 2.0])).is_resolved());
        assert_eq!(Resolution::from(Some((1.0, 2.0))).coordinates(), Some(Coordinates::new(1.0, 2.0)));
    }

    #[test]
    fn test_message_keeps_opaque_attributes() {
        let raw = json!({
            "id": 7,
            "text": "Ciao da Roma",
            "location": "Rome",
            "latitude": null
        });

        let message: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(message.id, 7);
        assert_eq!(message.latitude, None);
        assert_eq!(message.longitude, None);
        assert_eq!(message.attribute_str("location"), Some("Rome"));

        let back = serde_json::to_value(&message).unwrap();
        assert_eq!(back["text"], "Ciao da Roma");
        assert_eq!(back["latitude"], Value::Null);
    }

    #[test]
    fn test_set_coordinates_leaves_id_alone() {
        let mut message = Message::new(3).with_attribute("text", "hello");
        message.set_coordinates(10.0, 20.0);

        assert_eq!(message.id(), RecordId::from(3i64));
        assert_eq!(message.latitude(), Some(10.0));
        assert_eq!(message.longitude(), Some(20.0));
        assert_eq!(message.attribute_str("text"), Some("hello"));
    }
}
