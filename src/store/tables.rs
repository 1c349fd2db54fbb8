use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::models::{Interaction, Item};

pub const ITEM_COLUMNS: &[&str] = &["id", "title"];
pub const INTERACTION_COLUMNS: &[&str] = &["user", "item", "interaction"];

/// Reads a JSON array of row objects, checking every row carries `required`
pub fn read_table<T: DeserializeOwned>(
    path: &Path,
    table: &str,
    required: &[&str],
) -> AppResult<Vec<T>> {
    if !path.exists() {
        return Err(AppError::MissingInput(format!(
            "specify a file for {}: {} does not exist",
            table,
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)?;
    let rows: Vec<Map<String, Value>> = serde_json::from_str(&raw).map_err(|e| {
        AppError::Schema(format!(
            "{} must be a JSON array of row objects: {}",
            path.display(),
            e
        ))
    })?;

    for (index, row) in rows.iter().enumerate() {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|column| !row.contains_key(*column))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Schema(format!(
                "these columns must be present in {}: {:?} (row {} lacks {:?})",
                table, required, index, missing
            )));
        }
    }

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(Value::Object(row)).map_err(|e| {
                AppError::Schema(format!("{} row {} is malformed: {}", table, index, e))
            })
        })
        .collect()
}

/// Item id to title lookup over a dense `0..n` id space
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    titles: Vec<String>,
}

impl Catalog {
    /// Builds the catalog, requiring ids to be exactly `0..items.len()`
    pub fn from_items(items: Vec<Item>) -> AppResult<Self> {
        let mut slots: Vec<Option<String>> = vec![None; items.len()];

        for item in items {
            let count = slots.len();
            let slot = slots.get_mut(item.id).ok_or_else(|| {
                AppError::Schema(format!(
                    "item id {} is outside the dense range 0..{}",
                    item.id, count
                ))
            })?;
            if slot.is_some() {
                return Err(AppError::Schema(format!("duplicate item id {}", item.id)));
            }
            *slot = Some(item.title);
        }

        // n unique ids all below n cover the whole range
        let titles = slots.into_iter().flatten().collect();
        Ok(Self { titles })
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let items: Vec<Item> = read_table(path, "items", ITEM_COLUMNS)?;
        let catalog = Self::from_items(items)?;
        tracing::info!(path = %path.display(), items = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn title(&self, id: usize) -> Option<&str> {
        self.titles.get(id).map(String::as_str)
    }

    /// Titles in id order
    pub fn titles(&self) -> &[String] {
        &self.titles
    }
}

/// Item ids with at least one recorded interaction
#[derive(Debug, Clone, Default)]
pub struct InteractedSet {
    items: HashSet<usize>,
}

impl InteractedSet {
    pub fn from_interactions(interactions: &[Interaction]) -> Self {
        interactions.iter().map(|i| i.item).collect()
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let interactions: Vec<Interaction> =
            read_table(path, "interactions", INTERACTION_COLUMNS)?;
        let set = Self::from_interactions(&interactions);
        tracing::info!(
            path = %path.display(),
            interactions = interactions.len(),
            interacted_items = set.len(),
            "Loaded interactions"
        );
        Ok(set)
    }

    pub fn contains(&self, id: usize) -> bool {
        self.items.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Largest referenced item id, used for range validation
    pub fn max_id(&self) -> Option<usize> {
        self.items.iter().copied().max()
    }
}

impl FromIterator<usize> for InteractedSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
