// Copyright 2025 TBC.TXT
// SPDX-License-Identifier: Apache-2.0

//! Read-only game reference data loaded from JSON files at startup.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::model::{
    ClassSummary, DataCounts, ItemLookupResponse, ItemSearchResponse, ProfessionSummary,
};

const ITEM_SEARCH_LIMIT: usize = 50;
const WOWHEAD_ITEM_URL: &str = "https://tbc.wowhead.com/item=";

type JsonMap = Map<String, Value>;

#[derive(Clone, Default)]
pub struct ReferenceData {
    inner: Arc<Tables>,
}

#[derive(Default)]
pub struct Tables {
    pub classes: JsonMap,
    pub items: JsonMap,
    pub raids: JsonMap,
    pub recipes: JsonMap,
    pub reference: JsonMap,
}

impl ReferenceData {
    pub fn new(tables: Tables) -> Self {
        Self {
            inner: Arc::new(tables),
        }
    }

    pub async fn load(dir: &Path) -> Result<Self> {
        let tables = Tables {
            classes: load_table(dir, "classData.json").await?,
            items: load_table(dir, "itemIds.json").await?,
            raids: load_table(dir, "raidsData.json").await?,
            recipes: load_table(dir, "recipesData.json").await?,
            reference: load_table(dir, "referenceData.json").await?,
        };

        tracing::info!(
            classes = tables.classes.len(),
            items = tables.items.len(),
            raid_phases = tables.raids.len(),
            professions = tables.recipes.len(),
            "loaded reference data"
        );

        Ok(Self::new(tables))
    }

    pub fn counts(&self) -> DataCounts {
        DataCounts {
            classes: self.inner.classes.len(),
            items: self.inner.items.len(),
            raid_phases: self.inner.raids.len(),
            professions: self.inner.recipes.len(),
        }
    }

    pub fn class_summaries(&self) -> BTreeMap<String, ClassSummary> {
        self.inner
            .classes
            .iter()
            .filter_map(|(name, data)| {
                let class = data.as_object()?;
                let summary = ClassSummary {
                    title: class.get("title").cloned().unwrap_or(Value::Null),
                    default_spec: class.get("defaultSpec").cloned().unwrap_or(Value::Null),
                    specs: object_keys(class.get("specs")),
                };
                Some((name.clone(), summary))
            })
            .collect()
    }

    pub fn class(&self, name: &str) -> Result<&Value, AppError> {
        let name = name.to_lowercase();
        self.inner
            .classes
            .get(&name)
            .ok_or_else(|| AppError::not_found(format!("Class '{name}' not found")))
    }

    pub fn spec(&self, class_name: &str, spec_name: &str) -> Result<&Value, AppError> {
        let class_name = class_name.to_lowercase();
        let spec_name = spec_name.to_lowercase();

        let class = self
            .class(&class_name)?
            .as_object()
            .ok_or_else(|| AppError::InvalidData("Invalid class data".to_string()))?;

        let specs = class
            .get("specs")
            .and_then(Value::as_object)
            .ok_or_else(|| AppError::not_found("No specs found for class"))?;

        specs.get(&spec_name).ok_or_else(|| {
            AppError::not_found(format!(
                "Spec '{spec_name}' not found for class '{class_name}'"
            ))
        })
    }

    pub fn item_count(&self) -> usize {
        self.inner.items.len()
    }

    pub fn search_items(&self, query: &str) -> Result<ItemSearchResponse, AppError> {
        let query = query.to_lowercase();
        if query.is_empty() {
            return Err(AppError::bad_request("Query parameter 'q' is required"));
        }

        let items: JsonMap = self
            .sorted_items()
            .into_iter()
            .filter(|(name, _)| name.to_lowercase().contains(&query))
            .take(ITEM_SEARCH_LIMIT)
            .map(|(name, id)| (name.clone(), id.clone()))
            .collect();

        Ok(ItemSearchResponse {
            query,
            count: items.len(),
            limited: items.len() >= ITEM_SEARCH_LIMIT,
            items,
        })
    }

    /// Exact lookup by lower-cased name, falling back to the first partial match.
    pub fn item(&self, name: &str) -> Result<ItemLookupResponse, AppError> {
        let wanted = name.to_lowercase();

        if let Some(id) = self.inner.items.get(&wanted) {
            return Ok(item_response(wanted, id, false));
        }

        self.sorted_items()
            .into_iter()
            .find(|(candidate, _)| candidate.to_lowercase().contains(&wanted))
            .map(|(candidate, id)| item_response(candidate.clone(), id, true))
            .ok_or_else(|| AppError::not_found(format!("Item '{wanted}' not found")))
    }

    fn sorted_items(&self) -> Vec<(&String, &Value)> {
        let mut items: Vec<_> = self.inner.items.iter().collect();
        items.sort_unstable_by(|a, b| a.0.cmp(b.0));
        items
    }

    pub fn raids(&self) -> &JsonMap {
        &self.inner.raids
    }

    pub fn raid_phase(&self, phase: &str) -> Result<&Value, AppError> {
        let phase = normalize_phase(phase);
        self.inner
            .raids
            .get(&phase)
            .ok_or_else(|| AppError::not_found(format!("Phase '{phase}' not found")))
    }

    pub fn raid(&self, phase: &str, raid: &str) -> Result<&Value, AppError> {
        let phase = normalize_phase(phase);
        let raid = raid.to_lowercase();

        let phase_data = self
            .raid_phase(&phase)?
            .as_object()
            .ok_or_else(|| AppError::InvalidData("Invalid phase data".to_string()))?;

        let raids = phase_data
            .get("raids")
            .and_then(Value::as_object)
            .ok_or_else(|| AppError::not_found("No raids found for phase"))?;

        raids.get(&raid).ok_or_else(|| {
            AppError::not_found(format!("Raid '{raid}' not found in phase '{phase}'"))
        })
    }

    pub fn profession_summaries(&self) -> BTreeMap<String, ProfessionSummary> {
        self.inner
            .recipes
            .iter()
            .filter_map(|(name, data)| {
                let profession = data.as_object()?;
                let summary = ProfessionSummary {
                    title: profession.get("title").cloned().unwrap_or(Value::Null),
                    categories: object_keys(profession.get("categories")),
                };
                Some((name.clone(), summary))
            })
            .collect()
    }

    pub fn profession(&self, name: &str) -> Result<&Value, AppError> {
        let name = name.to_lowercase();
        self.inner
            .recipes
            .get(&name)
            .ok_or_else(|| AppError::not_found(format!("Profession '{name}' not found")))
    }

    pub fn reference(&self) -> &JsonMap {
        &self.inner.reference
    }

    pub fn reference_entry(&self, key: &str, label: &str) -> Result<&Value, AppError> {
        self.inner
            .reference
            .get(key)
            .ok_or_else(|| AppError::not_found(format!("{label} data not found")))
    }
}

async fn load_table(dir: &Path, file: &str) -> Result<JsonMap> {
    let path = dir.join(file);
    let raw = tokio::fs::read(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn object_keys(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            let mut keys: Vec<String> = map.keys().cloned().collect();
            keys.sort();
            keys
        })
        .unwrap_or_default()
}

/// Accepts both `phase2` and a bare `2`.
fn normalize_phase(phase: &str) -> String {
    let phase = phase.to_lowercase();
    if phase.starts_with("phase") {
        phase
    } else {
        format!("phase{phase}")
    }
}

fn item_response(name: String, id: &Value, partial_match: bool) -> ItemLookupResponse {
    let rendered = match (id.as_u64(), id.as_f64()) {
        (Some(whole), _) => whole.to_string(),
        (None, Some(float)) => format!("{float:.0}"),
        _ => id.to_string(),
    };

    ItemLookupResponse {
        name,
        item_id: id.clone(),
        wowhead: format!("{WOWHEAD_ITEM_URL}{rendered}"),
        partial_match,
    }
}
