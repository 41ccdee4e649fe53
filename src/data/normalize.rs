//! Projection of raw upstream documents into reduced record shapes
//!
//! Pure functions over `serde_json::Value`. A required field that is missing
//! or of the wrong type fails the whole record with
//! [`NormalizeError::MalformedUpstreamData`]; callers decide whether that is
//! fatal.

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use super::{BasicRecord, FullRecord, SpeciesInfo};

/// Errors that can occur while normalizing an upstream document
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// A required field is missing or has an unexpected type
    #[error("Malformed upstream data: missing or invalid field '{0}'")]
    MalformedUpstreamData(String),
}

/// Walks a dotted path (e.g. `sprites.front_default`) through nested objects
fn field<'a>(raw: &'a Value, path: &str) -> Result<&'a Value, NormalizeError> {
    path.split('.')
        .try_fold(raw, |value, segment| value.get(segment))
        .ok_or_else(|| NormalizeError::MalformedUpstreamData(path.to_string()))
}

fn str_field(raw: &Value, path: &str) -> Result<String, NormalizeError> {
    field(raw, path)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| NormalizeError::MalformedUpstreamData(path.to_string()))
}

fn u32_field(raw: &Value, path: &str) -> Result<u32, NormalizeError> {
    field(raw, path)?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| NormalizeError::MalformedUpstreamData(path.to_string()))
}

fn bool_field(raw: &Value, path: &str) -> Result<bool, NormalizeError> {
    field(raw, path)?
        .as_bool()
        .ok_or_else(|| NormalizeError::MalformedUpstreamData(path.to_string()))
}

fn array_field<'a>(raw: &'a Value, path: &str) -> Result<&'a Vec<Value>, NormalizeError> {
    field(raw, path)?
        .as_array()
        .ok_or_else(|| NormalizeError::MalformedUpstreamData(path.to_string()))
}

/// Collects `inner.name` from every element of the array at `path`
///
/// Used for `types[].type.name` and `abilities[].ability.name`.
fn nested_names(raw: &Value, path: &str, inner: &str) -> Result<Vec<String>, NormalizeError> {
    array_field(raw, path)?
        .iter()
        .map(|entry| {
            str_field(entry, &format!("{}.name", inner))
                .map_err(|_| NormalizeError::MalformedUpstreamData(format!("{}[].{}.name", path, inner)))
        })
        .collect()
}

/// Builds a [`BasicRecord`] from a raw detail document
pub fn to_basic_record(raw: &Value) -> Result<BasicRecord, NormalizeError> {
    // The sprite URL may be null, but the key itself must be there.
    let image = field(raw, "sprites.front_default")?.as_str().map(str::to_string);

    Ok(BasicRecord {
        id: u32_field(raw, "id")?,
        name: str_field(raw, "name")?,
        height: u32_field(raw, "height")?,
        weight: u32_field(raw, "weight")?,
        types: nested_names(raw, "types", "type")?,
        image,
    })
}

/// Builds a [`FullRecord`] from a raw detail document, without species data
pub fn to_full_record(raw: &Value) -> Result<FullRecord, NormalizeError> {
    let basic = to_basic_record(raw)?;

    let stats = array_field(raw, "stats")?
        .iter()
        .map(|entry| {
            let name = str_field(entry, "stat.name")
                .map_err(|_| NormalizeError::MalformedUpstreamData("stats[].stat.name".to_string()))?;
            let value = u32_field(entry, "base_stat")
                .map_err(|_| NormalizeError::MalformedUpstreamData("stats[].base_stat".to_string()))?;
            Ok::<_, NormalizeError>((name, value))
        })
        .collect::<Result<IndexMap<_, _>, NormalizeError>>()?;

    Ok(FullRecord {
        basic,
        stats,
        abilities: nested_names(raw, "abilities", "ability")?,
        species: None,
    })
}

/// Resolves the species document link from a raw detail document
pub fn species_url(raw: &Value) -> Result<String, NormalizeError> {
    str_field(raw, "species.url")
}

/// Builds a [`SpeciesInfo`] from a raw species document
///
/// `flavor_text` is the first entry whose `language.name` equals `language`,
/// or `None` when no entry matches. A missing or null `habitat` is not an error.
pub fn to_species_info(raw: &Value, language: &str) -> Result<SpeciesInfo, NormalizeError> {
    let flavor_text = array_field(raw, "flavor_text_entries")?
        .iter()
        .find(|entry| {
            entry
                .pointer("/language/name")
                .and_then(Value::as_str)
                .is_some_and(|name| name == language)
        })
        .and_then(|entry| entry.get("flavor_text"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let habitat = raw
        .pointer("/habitat/name")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(SpeciesInfo {
        name: str_field(raw, "name")?,
        generation: str_field(raw, "generation.name")?,
        habitat,
        is_legendary: bool_field(raw, "is_legendary")?,
        is_mythical: bool_field(raw, "is_mythical")?,
        flavor_text,
    })
}
