// Copyright 2025 TBC.TXT
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP API handlers.
//!
//! - `GET /api/health` - Service health and data counts
//! - `GET /metrics` - Prometheus metrics export
//! - `GET /api/classes[/{class}[/{spec}]]` - Class and spec data
//! - `GET /api/items`, `/api/items/search?q=`, `/api/items/{name}` - Item ids
//! - `GET /api/raids[/{phase}[/{raid}]]` - Raid data by phase
//! - `GET /api/recipes[/{profession}]` - Profession recipes
//! - `GET /api/reference[/enchants|/talents|/quests]` - Spell and quest ids
//! - `GET /api/wcl/character?name=&realm=&region=` - Warcraft Logs gear lookup

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::metrics::Metrics;
use crate::model::{
    CharacterGearResponse, CharacterQuery, ClassSummary, HealthResponse, ItemIndexResponse,
    ItemLookupResponse, ItemSearchQuery, ItemSearchResponse, ProfessionSummary, QueryPairs,
};
use crate::reference::ReferenceData;
use crate::upstream::WarcraftLogs;

#[derive(Clone)]
pub struct AppState {
    pub reference: ReferenceData,
    pub warcraft_logs: WarcraftLogs,
    pub metrics: Metrics,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/classes", get(classes))
        .route("/api/classes/:class", get(class_by_name))
        .route("/api/classes/:class/:spec", get(spec))
        .route("/api/items", get(items))
        .route("/api/items/search", get(item_search))
        .route("/api/items/:name", get(item_by_name))
        .route("/api/raids", get(raids))
        .route("/api/raids/:phase", get(raid_phase))
        .route("/api/raids/:phase/:raid", get(raid_by_name))
        .route("/api/recipes", get(recipes))
        .route("/api/recipes/:profession", get(profession))
        .route("/api/reference", get(reference))
        .route("/api/reference/enchants", get(enchants))
        .route("/api/reference/talents", get(talents))
        .route("/api/reference/quests", get(quests))
        .route("/api/wcl/character", get(wcl_character))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        data: state.reference.counts(),
    })
}

/// Metrics endpoint
pub async fn metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state.metrics.export()
}

pub async fn classes(State(state): State<AppState>) -> Json<BTreeMap<String, ClassSummary>> {
    Json(state.reference.class_summaries())
}

pub async fn class_by_name(
    State(state): State<AppState>,
    Path(class): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.reference.class(&class).cloned().map(Json)
}

pub async fn spec(
    State(state): State<AppState>,
    Path((class, spec)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    state.reference.spec(&class, &spec).cloned().map(Json)
}

/// The full item table is too large to return; point callers at search instead.
pub async fn items(State(state): State<AppState>) -> Json<ItemIndexResponse> {
    Json(ItemIndexResponse {
        total: state.reference.item_count(),
        message: "Use /api/items/search?q=<name> to search or /api/items/<name> to get specific item",
    })
}

pub async fn item_search(
    State(state): State<AppState>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<ItemSearchResponse>, AppError> {
    let query = ItemSearchQuery::from_pairs(&query_pairs(query)?);
    state
        .reference
        .search_items(query.q.as_deref().unwrap_or_default())
        .map(Json)
}

pub async fn item_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ItemLookupResponse>, AppError> {
    state.reference.item(&name).map(Json)
}

pub async fn raids(State(state): State<AppState>) -> Json<Map<String, Value>> {
    Json(state.reference.raids().clone())
}

pub async fn raid_phase(
    State(state): State<AppState>,
    Path(phase): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.reference.raid_phase(&phase).cloned().map(Json)
}

pub async fn raid_by_name(
    State(state): State<AppState>,
    Path((phase, raid)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    state.reference.raid(&phase, &raid).cloned().map(Json)
}

pub async fn recipes(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, ProfessionSummary>> {
    Json(state.reference.profession_summaries())
}

pub async fn profession(
    State(state): State<AppState>,
    Path(profession): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.reference.profession(&profession).cloned().map(Json)
}

pub async fn reference(State(state): State<AppState>) -> Json<Map<String, Value>> {
    Json(state.reference.reference().clone())
}

pub async fn enchants(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state
        .reference
        .reference_entry("enchantSpellIds", "Enchant")
        .cloned()
        .map(Json)
}

pub async fn talents(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state
        .reference
        .reference_entry("talentSpellIds", "Talent")
        .cloned()
        .map(Json)
}

pub async fn quests(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state
        .reference
        .reference_entry("questIds", "Quest")
        .cloned()
        .map(Json)
}

/// Look up a character's most recent gear on Warcraft Logs
pub async fn wcl_character(
    State(state): State<AppState>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<CharacterGearResponse>, AppError> {
    let query = CharacterQuery::from_pairs(&query_pairs(query)?);
    state.warcraft_logs.character_gear(query).await.map(Json)
}

/// Query strings are read as raw pairs so a repeated key cannot fail
/// extraction; rejections still render as the JSON error body.
fn query_pairs(query: Result<Query<QueryPairs>, QueryRejection>) -> Result<QueryPairs, AppError> {
    query
        .map(|Query(pairs)| pairs)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}
