// Copyright 2025 TBC.TXT
// SPDX-License-Identifier: Apache-2.0

//! Best-effort gear extraction from a report's `playerDetails`.
//!
//! Any failure here degrades to an empty gear list; it never fails the
//! surrounding request.

use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::metrics::Metrics;
use crate::model::{GearItem, PlayerDetails, Report};
use crate::upstream::graphql::{GraphqlClient, GraphqlResponse};
use crate::upstream::query;

/// Fight used when a report lists no fights.
const FALLBACK_FIGHT_ID: i64 = 1;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportQueryData {
    report_data: Option<ReportNode>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportNode {
    report: Option<ReportDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportDetails {
    player_details: Option<PlayerDetailsPayload>,
}

/// `playerDetails` is a JSON scalar upstream; it arrives either as the bare role
/// buckets or wrapped as `{ "data": { "playerDetails": { ... } } }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PlayerDetailsPayload {
    Wrapped { data: WrappedDetails },
    Bare(PlayerDetails),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WrappedDetails {
    player_details: PlayerDetails,
}

impl PlayerDetailsPayload {
    fn into_details(self) -> PlayerDetails {
        match self {
            PlayerDetailsPayload::Wrapped { data } => data.player_details,
            PlayerDetailsPayload::Bare(details) => details,
        }
    }
}

pub fn fight_id_for(report: &Report) -> i64 {
    report
        .fights
        .first()
        .map(|fight| fight.id)
        .unwrap_or(FALLBACK_FIGHT_ID)
}

/// Fetch the gear `player` wore in the first fight of `report`.
pub async fn fetch_gear(
    graphql: &GraphqlClient,
    metrics: &Metrics,
    token: &str,
    report: &Report,
    player: &str,
) -> Vec<GearItem> {
    match try_fetch_gear(graphql, token, report, player).await {
        Ok(Some(gear)) => gear,
        Ok(None) => {
            tracing::debug!(report = %report.code, player, "player not present in report details");
            Vec::new()
        }
        Err(error) => {
            metrics.record_gear_degradation();
            tracing::warn!(%error, report = %report.code, player, "gear lookup failed, returning empty gear");
            Vec::new()
        }
    }
}

async fn try_fetch_gear(
    graphql: &GraphqlClient,
    token: &str,
    report: &Report,
    player: &str,
) -> Result<Option<Vec<GearItem>>, AppError> {
    let document = query::report_gear_query(&report.code, fight_id_for(report));
    let raw = graphql.execute(&document, token).await?;
    let details = parse_player_details(raw)?;
    Ok(extract_gear(&details, player))
}

fn parse_player_details(raw: Value) -> Result<PlayerDetails, AppError> {
    let response: GraphqlResponse<ReportQueryData> =
        serde_json::from_value(raw).map_err(|e| AppError::UpstreamDecode(e.to_string()))?;

    if let Some(first) = response.errors.into_iter().next() {
        return Err(AppError::UpstreamQuery(first.message));
    }

    response
        .data
        .and_then(|data| data.report_data)
        .and_then(|node| node.report)
        .and_then(|report| report.player_details)
        .map(PlayerDetailsPayload::into_details)
        .ok_or_else(|| AppError::UpstreamDecode("response has no playerDetails".to_string()))
}

/// Search dps, then tanks, then healers; the first case-insensitive name match wins.
pub fn extract_gear(details: &PlayerDetails, player: &str) -> Option<Vec<GearItem>> {
    let wanted = player.to_lowercase();

    [&details.dps, &details.tanks, &details.healers]
        .into_iter()
        .flatten()
        .find(|record| record.name.to_lowercase() == wanted)
        .map(|record| record.gear.clone())
}
