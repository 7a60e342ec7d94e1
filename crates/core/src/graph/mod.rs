//! Relationship graph for property recommendations.
//!
//! A small directed multigraph over the property, nearby venues, activities,
//! and on-site services. The graph is populated once at startup (see
//! [`catalog`]) and read-only afterwards, so it can be shared across
//! concurrent turns without locking.

pub mod catalog;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Hotel,
    Restaurant,
    Activity,
    Service,
    CuisineType,
    ActivityType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Near,
    Serves,
    Provides,
    IsTypeOf,
}

/// Attribute values carried by graph entities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Flag(bool),
    Number(f64),
    Text(String),
    Tags(Vec<String>),
}

impl AttrValue {
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }

    pub fn tags(values: &[&str]) -> Self {
        Self::Tags(values.iter().map(|value| (*value).to_string()).collect())
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    fn rendered(&self) -> String {
        match self {
            Self::Flag(value) => value.to_string(),
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.clone(),
            Self::Tags(values) => values.join(", "),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    pub attributes: HashMap<String, AttrValue>,
}

impl Entity {
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.attr(key).and_then(AttrValue::as_number)
    }

    fn text_or(&self, key: &str, fallback: &str) -> String {
        match self.attr(key) {
            Some(AttrValue::Text(value)) => value.clone(),
            _ => fallback.to_string(),
        }
    }

    fn tag_list(&self, key: &str) -> Vec<String> {
        match self.attr(key) {
            Some(AttrValue::Tags(values)) => values.clone(),
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
    pub strength: f64,
}

/// Guest preferences extracted from an utterance and fed to
/// [`KnowledgeGraph::query_itinerary`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub cuisine: Vec<String>,
    pub romantic: bool,
    pub max_distance_km: f64,
    pub activity_type: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { cuisine: Vec::new(), romantic: false, max_distance_km: 5.0, activity_type: None }
    }
}

impl Preferences {
    /// Coarse lexical extraction from one utterance: cuisine keyword groups,
    /// the romantic/occasion flag, and an activity-type hint.
    pub fn from_utterance(text: &str) -> Self {
        let lower = text.to_lowercase();

        let romantic = ["romantic", "date", "honeymoon"].iter().any(|word| lower.contains(word));

        let cuisine_groups: [(&str, &[&str]); 3] = [
            ("sri_lankan", &["sri lankan", "local", "traditional", "curry", "rice"]),
            ("western", &["western", "international", "burger", "pizza", "pasta"]),
            ("vegetarian", &["vegetarian", "vegan", "veggie"]),
        ];
        let cuisine = cuisine_groups
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|keyword| lower.contains(keyword)))
            .map(|(tag, _)| (*tag).to_string())
            .collect();

        let activity_type = if ["hike", "hiking", "trek", "walk"]
            .iter()
            .any(|word| lower.contains(word))
        {
            Some("hiking".to_string())
        } else if ["view", "photo", "scenic", "sightseeing"].iter().any(|word| lower.contains(word))
        {
            Some("sightseeing".to_string())
        } else {
            None
        };

        Self { cuisine, romantic, activity_type, ..Self::default() }
    }
}

/// One ranked itinerary entry. Restaurants and activities carry different
/// detail fields; both expose a comparable score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recommendation {
    Restaurant {
        name: String,
        rating: f64,
        distance_km: f64,
        cuisine: Vec<String>,
        hours: String,
        price_range: String,
        score: f64,
    },
    Activity {
        name: String,
        activity_type: String,
        distance_km: f64,
        duration: String,
        cost: f64,
        difficulty: String,
        best_time: String,
        score: f64,
    },
}

impl Recommendation {
    pub fn name(&self) -> &str {
        match self {
            Self::Restaurant { name, .. } | Self::Activity { name, .. } => name,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            Self::Restaurant { score, .. } | Self::Activity { score, .. } => *score,
        }
    }
}

/// Normalization radius for restaurant scoring (walking distance).
const RESTAURANT_RADIUS_KM: f64 = 5.0;
/// Activities may be farther afield, so they normalize over a wider radius.
const ACTIVITY_RADIUS_KM: f64 = 25.0;
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Directed multigraph, insertion-ordered. Built once, then read-only.
#[derive(Clone, Debug, Default)]
pub struct KnowledgeGraph {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
    relationships: Vec<Relationship>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, name: &str, kind: EntityKind, attributes: Vec<(&str, AttrValue)>) {
        let attributes =
            attributes.into_iter().map(|(key, value)| (key.to_string(), value)).collect();
        let entity = Entity { name: name.to_string(), kind, attributes };

        match self.index.get(name) {
            Some(position) => self.entities[*position] = entity,
            None => {
                self.index.insert(name.to_string(), self.entities.len());
                self.entities.push(entity);
            }
        }
    }

    pub fn add_relationship(&mut self, source: &str, target: &str, kind: RelationKind, strength: f64) {
        self.relationships.push(Relationship {
            source: source.to_string(),
            target: target.to_string(),
            kind,
            strength,
        });
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.index.get(name).map(|position| &self.entities[*position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All outgoing edges from `name`, optionally filtered by relationship
    /// kind, in insertion order.
    pub fn neighbors(&self, name: &str, kind: Option<RelationKind>) -> Vec<(String, RelationKind)> {
        self.relationships
            .iter()
            .filter(|rel| rel.source == name)
            .filter(|rel| kind.map_or(true, |wanted| rel.kind == wanted))
            .map(|rel| (rel.target.clone(), rel.kind))
            .collect()
    }

    /// Entity keys matching every filter (conjunction), in insertion order.
    ///
    /// Filter semantics per value shape: tag lists match on intersection,
    /// flags on equality, numbers as an upper bound (entity value must be at
    /// or below the requested value, used for "within max distance"), and
    /// text by containment in the rendered attribute.
    pub fn find_by_attributes(
        &self,
        kind: Option<EntityKind>,
        filters: &[(&str, AttrValue)],
    ) -> Vec<String> {
        self.entities
            .iter()
            .filter(|entity| kind.map_or(true, |wanted| entity.kind == wanted))
            .filter(|entity| filters.iter().all(|(key, wanted)| attribute_matches(entity, key, wanted)))
            .map(|entity| entity.name.clone())
            .collect()
    }

    /// Ranked recommendations for the given preferences, capped at 5.
    ///
    /// Restaurants are only considered when a cuisine or romantic preference
    /// is present; activities are always considered. The sort is stable, so
    /// ties keep catalog order.
    pub fn query_itinerary(&self, preferences: &Preferences) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if !preferences.cuisine.is_empty() || preferences.romantic {
            let mut filters =
                vec![("distance_km", AttrValue::Number(preferences.max_distance_km))];
            if preferences.romantic {
                filters.push(("romantic", AttrValue::Flag(true)));
            }

            for name in self.find_by_attributes(Some(EntityKind::Restaurant), &filters) {
                let Some(entity) = self.entity(&name) else { continue };

                if !preferences.cuisine.is_empty() {
                    let served = entity.tag_list("cuisine");
                    let wanted = preferences.cuisine.iter().any(|tag| served.contains(tag));
                    if !wanted {
                        continue;
                    }
                }

                let distance = entity.number("distance_km").unwrap_or(999.0);
                let rating = entity.number("rating").unwrap_or(3.0);
                recommendations.push(Recommendation::Restaurant {
                    name,
                    rating,
                    distance_km: distance,
                    cuisine: entity.tag_list("cuisine"),
                    hours: entity.text_or("hours", "Unknown"),
                    price_range: entity.text_or("price_range", "Unknown"),
                    score: rating * (1.0 - distance / RESTAURANT_RADIUS_KM),
                });
            }
        }

        let distance_filter = [("distance_km", AttrValue::Number(preferences.max_distance_km))];
        for name in self.find_by_attributes(Some(EntityKind::Activity), &distance_filter) {
            let Some(entity) = self.entity(&name) else { continue };

            if let Some(wanted) = &preferences.activity_type {
                if entity.text_or("type", "") != *wanted {
                    continue;
                }
            }

            let distance = entity.number("distance_km").unwrap_or(999.0);
            recommendations.push(Recommendation::Activity {
                name,
                activity_type: entity.text_or("type", "general"),
                distance_km: distance,
                duration: entity.text_or("duration", "Unknown"),
                cost: entity.number("cost").unwrap_or(0.0),
                difficulty: entity.text_or("difficulty", "moderate"),
                best_time: entity.text_or("best_time", "Any time"),
                score: 5.0 * (1.0 - distance.min(ACTIVITY_RADIUS_KM) / ACTIVITY_RADIUS_KM),
            });
        }

        recommendations.sort_by(|a, b| {
            b.score().partial_cmp(&a.score()).unwrap_or(std::cmp::Ordering::Equal)
        });
        recommendations.truncate(MAX_RECOMMENDATIONS);
        recommendations
    }
}

fn attribute_matches(entity: &Entity, key: &str, wanted: &AttrValue) -> bool {
    let Some(actual) = entity.attr(key) else {
        return false;
    };

    match wanted {
        AttrValue::Tags(wanted_tags) => match actual {
            AttrValue::Tags(actual_tags) => {
                wanted_tags.iter().any(|tag| actual_tags.contains(tag))
            }
            _ => false,
        },
        AttrValue::Flag(wanted_flag) => actual == &AttrValue::Flag(*wanted_flag),
        AttrValue::Number(upper_bound) => {
            actual.as_number().map(|value| value <= *upper_bound).unwrap_or(false)
        }
        AttrValue::Text(needle) => actual.rendered().contains(needle.as_str()),
    }
}

/// Deterministic rendering of a recommendation list for downstream prompt
/// construction: restaurants first (at most 3), then activities (at most 3).
pub fn format_context(recommendations: &[Recommendation], _preferences: &Preferences) -> String {
    if recommendations.is_empty() {
        return "No matching venues found with your criteria. But Ella has many wonderful \
                places - ask me for general recommendations!"
            .to_string();
    }

    let mut context = String::from("Based on your preferences:\n\n");

    let restaurants: Vec<_> = recommendations
        .iter()
        .filter(|rec| matches!(rec, Recommendation::Restaurant { .. }))
        .take(3)
        .collect();
    let activities: Vec<_> = recommendations
        .iter()
        .filter(|rec| matches!(rec, Recommendation::Activity { .. }))
        .take(3)
        .collect();

    if !restaurants.is_empty() {
        context.push_str("**Restaurants:**\n");
        for (position, rec) in restaurants.iter().enumerate() {
            if let Recommendation::Restaurant {
                name,
                rating,
                distance_km,
                cuisine,
                hours,
                price_range,
                ..
            } = rec
            {
                context.push_str(&format!("{}. **{name}**\n", position + 1));
                context.push_str(&format!("   - Rating: {rating}/5.0\n"));
                context.push_str(&format!("   - Distance: {distance_km} km from cottage\n"));
                context.push_str(&format!("   - Cuisines: {}\n", cuisine.join(", ")));
                context.push_str(&format!("   - Hours: {hours}\n"));
                context.push_str(&format!("   - Price: {price_range}\n\n"));
            }
        }
    }

    if !activities.is_empty() {
        context.push_str("\n**Activities:**\n");
        for (position, rec) in activities.iter().enumerate() {
            if let Recommendation::Activity {
                name,
                activity_type,
                distance_km,
                duration,
                cost,
                best_time,
                ..
            } = rec
            {
                context.push_str(&format!("{}. **{name}**\n", position + 1));
                context.push_str(&format!("   - Type: {activity_type}\n"));
                context.push_str(&format!("   - Distance: {distance_km} km\n"));
                context.push_str(&format!("   - Duration: {duration}\n"));
                context.push_str(&format!("   - Cost: ${cost}\n"));
                context.push_str(&format!("   - Best Time: {best_time}\n\n"));
            }
        }
    }

    context
}
