use chrono::{DateTime, Utc};
use couchmap_derive::{CouchbaseEntity, Convertible};
use serde_json::json;

mod index_manager_test;
mod mapping_round_trip_test;
mod repository_query_test;
mod repository_test;
mod template_test;

#[derive(Debug, Clone, PartialEq, Default, Convertible)]
pub struct Geo {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Convertible)]
pub enum Rating {
    #[default]
    Unrated,
    Stars(u8),
    Review { score: u8, comment: String },
}

#[derive(Debug, Clone, PartialEq, Default, CouchbaseEntity)]
#[entity(name = "Airline", n1ql_primary, n1ql_secondary = "idx_airline")]
pub struct Airline {
    #[entity(id)]
    pub id: String,
    #[entity(version)]
    pub cas: u64,
    pub name: String,
    #[entity(field = "iata_code")]
    pub iata: Option<String>,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Default, CouchbaseEntity)]
#[entity(name = "Hotel", expiry = 3600, view(design = "hotel", name = "all"))]
pub struct Hotel {
    #[entity(id)]
    pub id: String,
    pub name: String,
    pub city: String,
    pub geo: Geo,
    pub rating: Rating,
    pub tags: Vec<String>,
    pub opened: Option<DateTime<Utc>>,
    #[entity(transient)]
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Default, CouchbaseEntity)]
#[entity(name = "Route")]
pub struct Route {
    #[entity(id, constructor)]
    pub id: String,
    #[entity(constructor)]
    pub source: String,
    pub destination: String,
    pub stops: u32,
}

#[derive(Debug, Clone, PartialEq, Default, CouchbaseEntity)]
pub struct Landmark {
    pub name: String,
    pub activity: String,
}

#[derive(Debug, Clone, PartialEq, Default, CouchbaseEntity)]
#[entity(name = "Counter")]
pub struct Counter {
    #[entity(id)]
    pub id: i64,
    pub value: i64,
}

pub fn airline(id: &str, name: &str, country: &str) -> Airline {
    Airline {
        id: id.to_string(),
        cas: 0,
        name: name.to_string(),
        iata: None,
        country: country.to_string(),
    }
}

/// A row as returned by `$SELECT_ENTITY$` statements.
pub fn airline_row(id: &str, cas: u64, name: &str, country: &str) -> serde_json::Value {
    json!({"_ID": id, "_CAS": cas, "name": name, "country": country})
}
