// Copyright 2025 TBC.TXT
// SPDX-License-Identifier: Apache-2.0

//! Request, response and upstream projection types.
//!
//! Upstream payloads are only decoded as far as the fields the proxy consumes;
//! gear entries are passed through untouched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single equipped item as reported upstream. Opaque to this service.
pub type GearItem = Map<String, Value>;

/// Treats an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a possibly-null array, dropping entries that do not decode as `T`.
pub(crate) fn skip_invalid_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}

/// Raw query-string pairs, in order. Repeated keys are kept.
pub type QueryPairs = Vec<(String, String)>;

/// First value supplied for `key`; later repeats are ignored.
pub fn first_param(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, value)| value.clone())
}

#[derive(Debug, Default)]
pub struct CharacterQuery {
    pub name: Option<String>,
    pub realm: Option<String>,
    pub region: Option<String>,
}

impl CharacterQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            name: first_param(pairs, "name"),
            realm: first_param(pairs, "realm"),
            region: first_param(pairs, "region"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterGearResponse {
    pub name: String,
    #[serde(rename = "classID")]
    pub class_id: i64,
    pub gear: Vec<GearItem>,
    pub realm: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterQueryResult {
    pub name: String,
    pub class_id: i64,
    pub recent_reports: Vec<Report>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Report {
    pub code: String,
    #[serde(rename = "startTime", default, deserialize_with = "null_as_default")]
    pub start_time: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fights: Vec<Fight>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Fight {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Players grouped by role, as returned by `playerDetails`.
///
/// Records that do not decode are skipped so one odd entry cannot hide the
/// rest of the roster.
#[derive(Debug, Default, Deserialize)]
pub struct PlayerDetails {
    #[serde(default, deserialize_with = "skip_invalid_entries")]
    pub dps: Vec<PlayerRecord>,
    #[serde(default, deserialize_with = "skip_invalid_entries")]
    pub tanks: Vec<PlayerRecord>,
    #[serde(default, deserialize_with = "skip_invalid_entries")]
    pub healers: Vec<PlayerRecord>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Empty slots come back as `null`; only object entries are kept.
    #[serde(default, deserialize_with = "skip_invalid_entries")]
    pub gear: Vec<GearItem>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub data: DataCounts,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCounts {
    pub classes: usize,
    pub items: usize,
    pub raid_phases: usize,
    pub professions: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub title: Value,
    pub default_spec: Value,
    pub specs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfessionSummary {
    pub title: Value,
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ItemIndexResponse {
    pub total: usize,
    pub message: &'static str,
}

#[derive(Debug, Default)]
pub struct ItemSearchQuery {
    pub q: Option<String>,
}

impl ItemSearchQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            q: first_param(pairs, "q"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemSearchResponse {
    pub query: String,
    pub count: usize,
    pub limited: bool,
    pub items: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLookupResponse {
    pub name: String,
    pub item_id: Value,
    pub wowhead: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub partial_match: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_tolerates_null_fights() {
        let report: Report =
            serde_json::from_str(r#"{"code":"abc","startTime":null,"fights":null}"#).unwrap();
        assert_eq!(report.code, "abc");
        assert_eq!(report.start_time, 0);
        assert!(report.fights.is_empty());
    }

    #[test]
    fn repeated_query_keys_keep_the_first_value() {
        let pairs: QueryPairs = split_pairs("name=Thrall&realm=Whitemane&name=Jaina&q=a&q=b");

        let query = CharacterQuery::from_pairs(&pairs);
        assert_eq!(query.name.as_deref(), Some("Thrall"));
        assert_eq!(query.realm.as_deref(), Some("Whitemane"));
        assert_eq!(query.region, None);
        assert_eq!(ItemSearchQuery::from_pairs(&pairs).q.as_deref(), Some("a"));
    }

    fn split_pairs(raw: &str) -> QueryPairs {
        raw.split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn gear_response_uses_upstream_field_names() {
        let response = CharacterGearResponse {
            name: "Thrall".into(),
            class_id: 7,
            gear: Vec::new(),
            realm: "Whitemane".into(),
            region: "us".into(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["classID"], 7);
        assert_eq!(json["gear"], serde_json::json!([]));
    }
}
