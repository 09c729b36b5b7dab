// Copyright 2025 TBC.TXT
// SPDX-License-Identifier: Apache-2.0

//! Character identity and most-recent-report lookup.

use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::model::{null_as_default, CharacterQueryResult, Report};
use crate::upstream::graphql::{GraphqlClient, GraphqlResponse};
use crate::upstream::query;

/// Validated lookup parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterRequest {
    pub name: String,
    /// Realm as supplied by the caller; echoed back in the response.
    pub realm: String,
    pub region: String,
}

impl CharacterRequest {
    pub fn server_slug(&self) -> String {
        self.realm.to_lowercase()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterData {
    #[serde(default)]
    character_data: Option<CharacterNode>,
}

#[derive(Debug, Default, Deserialize)]
struct CharacterNode {
    #[serde(default)]
    character: Option<Character>,
}

#[derive(Debug, Default, Deserialize)]
struct Character {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(rename = "classID", default, deserialize_with = "null_as_default")]
    class_id: i64,
    #[serde(rename = "recentReports", default)]
    recent_reports: Option<ReportPage>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportPage {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<Report>,
}

pub async fn lookup_character(
    graphql: &GraphqlClient,
    token: &str,
    request: &CharacterRequest,
) -> Result<CharacterQueryResult, AppError> {
    let document = query::character_query(&request.name, &request.server_slug(), &request.region);
    let raw = graphql.execute(&document, token).await?;
    parse_character(raw)
}

fn parse_character(raw: Value) -> Result<CharacterQueryResult, AppError> {
    let response: GraphqlResponse<CharacterData> =
        serde_json::from_value(raw).map_err(|e| AppError::UpstreamDecode(e.to_string()))?;

    if let Some(first) = response.errors.into_iter().next() {
        return Err(AppError::UpstreamQuery(first.message));
    }

    let character = response
        .data
        .and_then(|data| data.character_data)
        .and_then(|node| node.character)
        .unwrap_or_default();

    if character.name.is_empty() {
        return Err(AppError::not_found("Character not found"));
    }

    Ok(CharacterQueryResult {
        name: character.name,
        class_id: character.class_id,
        recent_reports: character
            .recent_reports
            .map(|page| page.data)
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slug_is_lowercase_realm() {
        let request = CharacterRequest {
            name: "Thrall".into(),
            realm: "Whitemane".into(),
            region: "us".into(),
        };
        assert_eq!(request.server_slug(), "whitemane");
    }

    #[test]
    fn parses_character_with_report() {
        let raw = json!({
            "data": {
                "characterData": {
                    "character": {
                        "name": "Thrall",
                        "classID": 7,
                        "level": 70,
                        "recentReports": {
                            "data": [{
                                "code": "AbCd1234",
                                "startTime": 1717000000000i64,
                                "fights": [{ "id": 3, "name": "Gruul", "kill": true }]
                            }]
                        }
                    }
                }
            }
        });

        let result = parse_character(raw).unwrap();
        assert_eq!(result.name, "Thrall");
        assert_eq!(result.class_id, 7);
        assert_eq!(result.recent_reports.len(), 1);
        assert_eq!(result.recent_reports[0].code, "AbCd1234");
        assert_eq!(result.recent_reports[0].fights[0].id, 3);
        assert_eq!(result.recent_reports[0].fights[0].name, "Gruul");
    }

    #[test]
    fn first_graphql_error_wins() {
        let raw = json!({
            "data": null,
            "errors": [{ "message": "Unknown server" }, { "message": "second" }]
        });

        match parse_character(raw) {
            Err(AppError::UpstreamQuery(message)) => assert_eq!(message, "Unknown server"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn null_character_is_not_found() {
        let raw = json!({ "data": { "characterData": { "character": null } } });
        assert!(matches!(parse_character(raw), Err(AppError::NotFound(_))));
    }

    #[test]
    fn missing_reports_yield_empty_list() {
        let raw = json!({
            "data": { "characterData": { "character": {
                "name": "Jaina", "classID": 8, "recentReports": { "data": [] }
            } } }
        });
        let result = parse_character(raw).unwrap();
        assert!(result.recent_reports.is_empty());
    }
}
