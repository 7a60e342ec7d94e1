//! Fixed property catalog for the recommendation graph.
//!
//! Entities and relationships for the cottage, nearby dining venues,
//! activities, and on-site services around Ella. Built once at startup and
//! treated as immutable afterwards.

use super::{AttrValue, EntityKind, KnowledgeGraph, RelationKind};

pub const PROPERTY_NAME: &str = "Cloudy Hill Cottage";

struct Restaurant {
    name: &'static str,
    distance_km: f64,
    cuisine: &'static [&'static str],
    rating: f64,
    romantic: bool,
    hours: &'static str,
    price_range: &'static str,
}

struct Activity {
    name: &'static str,
    distance_km: f64,
    kind: &'static str,
    cost: f64,
    duration: &'static str,
    difficulty: &'static str,
    best_time: &'static str,
}

struct Service {
    name: &'static str,
    cost: f64,
    unit: &'static str,
}

const RESTAURANTS: &[Restaurant] = &[
    Restaurant {
        name: "Ella Village Restaurant",
        distance_km: 0.5,
        cuisine: &["sri_lankan", "western", "curry"],
        rating: 4.5,
        romantic: false,
        hours: "7:00-22:00",
        price_range: "$5-15",
    },
    Restaurant {
        name: "Cafe Chill",
        distance_km: 0.8,
        cuisine: &["international", "vegetarian", "breakfast"],
        rating: 4.6,
        romantic: true,
        hours: "7:00-21:00",
        price_range: "$8-20",
    },
    Restaurant {
        name: "Matey Hut",
        distance_km: 1.0,
        cuisine: &["sri_lankan", "seafood", "local"],
        rating: 4.4,
        romantic: true,
        hours: "11:00-22:00",
        price_range: "$6-18",
    },
    Restaurant {
        name: "Dream Cafe",
        distance_km: 0.6,
        cuisine: &["western", "pizza", "pasta"],
        rating: 4.3,
        romantic: false,
        hours: "8:00-21:00",
        price_range: "$7-15",
    },
    Restaurant {
        name: "Renu's Kitchen (On-site)",
        distance_km: 0.0,
        cuisine: &["sri_lankan", "homemade", "vegetarian"],
        rating: 4.9,
        romantic: true,
        hours: "Breakfast & Dinner",
        price_range: "Included/By request",
    },
];

const ACTIVITIES: &[Activity] = &[
    Activity {
        name: "Ella Rock",
        distance_km: 1.5,
        kind: "hiking",
        cost: 0.0,
        duration: "4-5 hours",
        difficulty: "moderate",
        best_time: "5:30 AM start for sunrise",
    },
    Activity {
        name: "Nine Arch Bridge",
        distance_km: 2.0,
        kind: "sightseeing",
        cost: 0.0,
        duration: "1-2 hours",
        difficulty: "easy",
        best_time: "6 AM sunrise or 3:30 PM for train",
    },
    Activity {
        name: "Little Adam's Peak",
        distance_km: 3.0,
        kind: "hiking",
        cost: 0.0,
        duration: "2-3 hours",
        difficulty: "easy",
        best_time: "Early morning or late afternoon",
    },
    Activity {
        name: "Ravana Falls",
        distance_km: 5.0,
        kind: "nature",
        cost: 0.0,
        duration: "1-2 hours",
        difficulty: "easy",
        best_time: "Midday (swimming)",
    },
    Activity {
        name: "Lipton's Seat",
        distance_km: 20.0,
        kind: "viewpoint",
        cost: 25.0,
        duration: "Half day",
        difficulty: "easy (driving)",
        best_time: "Before 10 AM",
    },
    Activity {
        name: "Cooking Class with Renu",
        distance_km: 0.0,
        kind: "experience",
        cost: 15.0,
        duration: "3-4 hours",
        difficulty: "easy",
        best_time: "10 AM or 4 PM",
    },
    Activity {
        name: "Tea Factory Tour",
        distance_km: 8.0,
        kind: "cultural",
        cost: 5.0,
        duration: "2 hours",
        difficulty: "easy",
        best_time: "Morning (factory active)",
    },
    Activity {
        name: "Kandy-Ella Train Journey",
        distance_km: 0.5,
        kind: "experience",
        cost: 3.0,
        duration: "6-7 hours",
        difficulty: "easy",
        best_time: "Book in advance!",
    },
];

const SERVICES: &[Service] = &[
    Service { name: "Bicycle Rental", cost: 10.0, unit: "per day" },
    Service { name: "Airport Transfer", cost: 80.0, unit: "Colombo" },
    Service { name: "Tuk-Tuk Tour", cost: 25.0, unit: "half day" },
    Service { name: "Laundry Service", cost: 5.0, unit: "per load" },
    Service { name: "Free WiFi", cost: 0.0, unit: "included" },
    Service { name: "Packed Lunch", cost: 5.0, unit: "per person" },
];

const ACTIVITY_TAGS: &[(&str, &[&str])] = &[
    ("hiking", &["Ella Rock", "Little Adam's Peak"]),
    ("sightseeing", &["Nine Arch Bridge", "Lipton's Seat"]),
    ("nature", &["Ravana Falls"]),
    ("experience", &["Cooking Class with Renu", "Kandy-Ella Train Journey"]),
    ("cultural", &["Tea Factory Tour"]),
];

/// Build the full property graph.
pub fn property_graph() -> KnowledgeGraph {
    let mut graph = KnowledgeGraph::new();

    graph.add_entity(
        PROPERTY_NAME,
        EntityKind::Hotel,
        vec![
            ("address", AttrValue::text("Ella, Badulla District, Sri Lanka")),
            ("rating", AttrValue::Number(9.2)),
            ("open_hours", AttrValue::text("24/7")),
            ("hosts", AttrValue::text("Renu & Nalaka")),
            ("phone", AttrValue::text("+94 77 123 4567")),
        ],
    );

    for restaurant in RESTAURANTS {
        graph.add_entity(
            restaurant.name,
            EntityKind::Restaurant,
            vec![
                ("distance_km", AttrValue::Number(restaurant.distance_km)),
                ("cuisine", AttrValue::tags(restaurant.cuisine)),
                ("rating", AttrValue::Number(restaurant.rating)),
                ("romantic", AttrValue::Flag(restaurant.romantic)),
                ("hours", AttrValue::text(restaurant.hours)),
                ("price_range", AttrValue::text(restaurant.price_range)),
            ],
        );
        graph.add_relationship(
            PROPERTY_NAME,
            restaurant.name,
            RelationKind::Near,
            1.0 - restaurant.distance_km / 5.0,
        );
    }

    for activity in ACTIVITIES {
        graph.add_entity(
            activity.name,
            EntityKind::Activity,
            vec![
                ("distance_km", AttrValue::Number(activity.distance_km)),
                ("type", AttrValue::text(activity.kind)),
                ("cost", AttrValue::Number(activity.cost)),
                ("duration", AttrValue::text(activity.duration)),
                ("difficulty", AttrValue::text(activity.difficulty)),
                ("best_time", AttrValue::text(activity.best_time)),
            ],
        );
        graph.add_relationship(
            PROPERTY_NAME,
            activity.name,
            RelationKind::Near,
            1.0 - activity.distance_km.min(5.0) / 5.0,
        );
    }

    for service in SERVICES {
        graph.add_entity(
            service.name,
            EntityKind::Service,
            vec![
                ("available", AttrValue::Flag(true)),
                ("cost", AttrValue::Number(service.cost)),
                ("unit", AttrValue::text(service.unit)),
            ],
        );
        graph.add_relationship(PROPERTY_NAME, service.name, RelationKind::Provides, 1.0);
    }

    for restaurant in RESTAURANTS {
        for cuisine in restaurant.cuisine {
            if !graph.contains(cuisine) {
                graph.add_entity(cuisine, EntityKind::CuisineType, Vec::new());
            }
            graph.add_relationship(restaurant.name, cuisine, RelationKind::Serves, 0.9);
        }
    }

    for (tag, tagged) in ACTIVITY_TAGS {
        if !graph.contains(tag) {
            graph.add_entity(tag, EntityKind::ActivityType, Vec::new());
        }
        for activity_name in *tagged {
            graph.add_relationship(activity_name, tag, RelationKind::IsTypeOf, 1.0);
        }
    }

    graph
}
