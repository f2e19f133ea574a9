use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::app::ports::CoordinateResolver;
use crate::config::ResolverConfig;
use crate::domain::{Message, Resolution};

/// Resolves message coordinates from a static table of known places.
///
/// The value of one message attribute (for instance a free-text user location)
/// is looked up in the table after trimming and lowercasing. Table entries are
/// raw coordinate values, so an entry without exactly two values never resolves.
pub struct GazetteerResolver {
    lookup_field: String,
    places: HashMap<String, Vec<f64>>,
}

impl GazetteerResolver {
    pub fn new(lookup_field: impl Into<String>) -> Self {
        Self {
            lookup_field: lookup_field.into(),
            places: HashMap::new(),
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        config
            .places
            .iter()
            .fold(Self::new(config.lookup_field.clone()), |resolver, (name, values)| {
                resolver.with_place(name, values.clone())
            })
    }

    pub fn with_place(mut self, name: &str, values: Vec<f64>) -> Self {
        self.places.insert(normalize_key(name), values);
        self
    }

    pub fn lookup_field(&self) -> &str {
        &self.lookup_field
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Resolution {
        self.places
            .get(&normalize_key(name))
            .map(|values| Resolution::from_values(values))
            .unwrap_or(Resolution::Unresolved)
    }
}

fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[async_trait]
impl CoordinateResolver<Message> for GazetteerResolver {
    async fn resolve(&self, message: &Message) -> anyhow::Result<Resolution> {
        let Some(place) = message.attribute_str(&self.lookup_field) else {
            debug!(id = message.id, field = %self.lookup_field, "Message has no lookup attribute");
            return Ok(Resolution::Unresolved);
        };
        Ok(self.lookup(place))
    }
}
