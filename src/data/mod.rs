//! Core data models for the Pokemon cache
//!
//! This module contains the reduced record shapes served to callers, the
//! listing page returned by the upstream API, and the clients and
//! normalizers that produce them.

pub mod client;
pub mod normalize;

pub use client::{PokeApiClient, Upstream, UpstreamError, DEFAULT_API_BASE_URL};
pub use normalize::{species_url, to_basic_record, to_full_record, to_species_info, NormalizeError};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reduced per-item shape used in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicRecord {
    /// Upstream identifier
    pub id: u32,
    /// Unique, stable resource name
    pub name: String,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    /// Type names in slot order
    pub types: Vec<String>,
    /// Default front sprite URL, if the upstream has one
    pub image: Option<String>,
}

/// Richer per-item shape used for single-detail responses
///
/// Serializes flat: the basic fields sit next to `stats`, `abilities` and
/// the optional `species` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullRecord {
    #[serde(flatten)]
    pub basic: BasicRecord,
    /// Base stat value keyed by stat name, in upstream slot order
    pub stats: IndexMap<String, u32>,
    /// Ability names in slot order
    pub abilities: Vec<String>,
    /// Best-effort species enrichment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<SpeciesInfo>,
}

/// Species data attached to a full record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesInfo {
    pub name: String,
    /// Generation name, e.g. "generation-i"
    pub generation: String,
    pub habitat: Option<String>,
    pub is_legendary: bool,
    pub is_mythical: bool,
    /// First flavor text in the configured language
    pub flavor_text: Option<String>,
}

/// A composed listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingResult {
    /// Total number of resources available upstream
    pub count: u64,
    /// URL of the next upstream page
    pub next: Option<String>,
    /// URL of the previous upstream page
    pub previous: Option<String>,
    /// Resolved records, in upstream order
    pub results: Vec<BasicRecord>,
    /// Whether the whole listing was served from a single cached value
    #[serde(rename = "fromCache")]
    pub from_cache: bool,
}

/// One entry of an upstream listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    /// Identifier parsed from the entry's resource URL
    pub id: u32,
}

/// An upstream listing page before per-item resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<ListingEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulbasaur() -> BasicRecord {
        BasicRecord {
            id: 1,
            name: "bulbasaur".to_string(),
            height: 7,
            weight: 69,
            types: vec!["grass".to_string(), "poison".to_string()],
            image: Some("https://img.example/1.png".to_string()),
        }
    }

    #[test]
    fn test_listing_result_uses_from_cache_field_name() {
        let listing = ListingResult {
            count: 1302,
            next: Some("https://pokeapi.co/api/v2/pokemon?offset=2&limit=2".to_string()),
            previous: None,
            results: vec![bulbasaur()],
            from_cache: false,
        };

        let json = serde_json::to_value(&listing).expect("Failed to serialize listing");

        assert_eq!(json["fromCache"], serde_json::Value::Bool(false));
        assert!(json.get("from_cache").is_none());
        assert!(json["previous"].is_null());
        assert_eq!(json["results"][0]["name"], "bulbasaur");
    }

    #[test]
    fn test_full_record_serializes_flat() {
        let record = FullRecord {
            basic: bulbasaur(),
            stats: IndexMap::from([("hp".to_string(), 45)]),
            abilities: vec!["overgrow".to_string()],
            species: None,
        };

        let json = serde_json::to_value(&record).expect("Failed to serialize record");

        assert_eq!(json["id"], 1);
        assert_eq!(json["types"][1], "poison");
        assert_eq!(json["stats"]["hp"], 45);
        assert!(json.get("basic").is_none());
        assert!(json.get("species").is_none(), "Absent species should be omitted");
    }

    #[test]
    fn test_full_record_without_species_deserializes() {
        let json = r#"{
            "id": 1, "name": "bulbasaur", "height": 7, "weight": 69,
            "types": ["grass"], "image": null,
            "stats": {"hp": 45}, "abilities": []
        }"#;

        let record: FullRecord = serde_json::from_str(json).expect("Failed to deserialize record");

        assert_eq!(record.basic.name, "bulbasaur");
        assert!(record.basic.image.is_none());
        assert!(record.species.is_none());
    }

    #[test]
    fn test_full_record_keeps_stat_order() {
        let record = FullRecord {
            basic: bulbasaur(),
            stats: IndexMap::from([
                ("hp".to_string(), 45),
                ("attack".to_string(), 49),
                ("defense".to_string(), 49),
            ]),
            abilities: vec![],
            species: None,
        };

        let json = serde_json::to_string(&record).expect("Failed to serialize record");
        let hp = json.find("\"hp\"").expect("hp missing");
        let attack = json.find("\"attack\"").expect("attack missing");
        let defense = json.find("\"defense\"").expect("defense missing");
        assert!(hp < attack && attack < defense, "Stats out of order: {}", json);

        let back: FullRecord = serde_json::from_str(&json).expect("Failed to deserialize record");
        let names: Vec<&str> = back.stats.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["hp", "attack", "defense"]);
    }
}
