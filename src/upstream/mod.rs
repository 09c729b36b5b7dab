// Copyright 2025 TBC.TXT
// SPDX-License-Identifier: Apache-2.0

//! Warcraft Logs integration.
//!
//! A gear lookup runs through these stages:
//!
//! 1. obtain a bearer token from the [`TokenSource`] (cached or renewed)
//! 2. look up the character and its most recent report
//! 3. when a report exists, fetch that report's player details and pull out
//!    the character's gear (best effort)

pub mod character;
pub mod gear;
pub mod graphql;
pub mod query;
pub mod token;

use std::sync::Arc;

use anyhow::anyhow;
use reqwest::Client;

use crate::config::WarcraftLogsConfig;
use crate::error::AppError;
use crate::metrics::Metrics;
use crate::model::{CharacterGearResponse, CharacterQuery};

pub use character::CharacterRequest;
pub use graphql::GraphqlClient;
pub use token::{CachedToken, TokenCache, TokenSource};

const DEFAULT_REGION: &str = "us";

#[derive(Clone)]
pub struct WarcraftLogs {
    tokens: Arc<dyn TokenSource>,
    graphql: GraphqlClient,
    metrics: Metrics,
}

impl WarcraftLogs {
    pub fn new(tokens: Arc<dyn TokenSource>, graphql: GraphqlClient, metrics: Metrics) -> Self {
        Self {
            tokens,
            graphql,
            metrics,
        }
    }

    /// Wire up the production token cache and GraphQL client from configuration.
    pub fn try_from_config(config: WarcraftLogsConfig, metrics: Metrics) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(anyhow!("Failed to build upstream client: {}", e)))?;

        let graphql = GraphqlClient::new(
            client.clone(),
            config.api_url.clone(),
            config.query_timeout,
            metrics.clone(),
        );
        let tokens = TokenCache::new(client, Arc::new(config), metrics.clone());

        Ok(Self::new(Arc::new(tokens), graphql, metrics))
    }

    pub async fn character_gear(
        &self,
        query: CharacterQuery,
    ) -> Result<CharacterGearResponse, AppError> {
        let request = validate(query)?;
        let token = self.tokens.token().await?;

        let character = character::lookup_character(&self.graphql, &token, &request).await?;

        let gear = match character.recent_reports.first() {
            Some(report) => {
                gear::fetch_gear(&self.graphql, &self.metrics, &token, report, &request.name).await
            }
            None => {
                tracing::debug!(name = %request.name, "character has no recent reports");
                Vec::new()
            }
        };

        Ok(CharacterGearResponse {
            name: character.name,
            class_id: character.class_id,
            gear,
            realm: request.realm,
            region: request.region,
        })
    }
}

fn validate(query: CharacterQuery) -> Result<CharacterRequest, AppError> {
    let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    match (present(query.name), present(query.realm)) {
        (Some(name), Some(realm)) => Ok(CharacterRequest {
            name,
            realm,
            region: present(query.region).unwrap_or_else(|| DEFAULT_REGION.to_string()),
        }),
        _ => Err(AppError::bad_request("name and realm parameters required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(name: Option<&str>, realm: Option<&str>, region: Option<&str>) -> CharacterQuery {
        CharacterQuery {
            name: name.map(String::from),
            realm: realm.map(String::from),
            region: region.map(String::from),
        }
    }

    #[test]
    fn region_defaults_to_us() {
        let request = validate(query(Some("Thrall"), Some("Whitemane"), None)).unwrap();
        assert_eq!(request.region, "us");
        assert_eq!(request.realm, "Whitemane");

        let request = validate(query(Some("Thrall"), Some("Whitemane"), Some(""))).unwrap();
        assert_eq!(request.region, "us");
    }

    #[test]
    fn explicit_region_is_kept() {
        let request = validate(query(Some("Thrall"), Some("Firemaw"), Some("eu"))).unwrap();
        assert_eq!(request.region, "eu");
    }

    #[test]
    fn name_and_realm_are_required() {
        for q in [
            query(None, Some("Whitemane"), None),
            query(Some("Thrall"), None, None),
            query(Some(" "), Some("Whitemane"), None),
            query(None, None, Some("us")),
        ] {
            assert!(matches!(validate(q), Err(AppError::BadRequest(_))));
        }
    }
}
