use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use crate::pipeline::{Direction, Selection};
use crate::resource::{Deletable, Filter, Resource, SortKey, Updatable};
use crate::samples;

/// Items at or below this quantity are flagged for restock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    pub quantity: i64,
    #[serde(default)]
    pub supplier_id: Option<i64>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn needs_restock(&self, threshold: i64) -> bool {
        self.quantity <= threshold
    }

    pub fn stock_value(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
    pub supplier_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSortField {
    Id,
    Name,
    Category,
    Price,
    Quantity,
    UpdatedAt,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCriteria {
    pub category: Selection<String>,
}

impl Filter<Item> for ItemCriteria {
    fn admits(&self, record: &Item, _now: DateTime<Utc>) -> bool {
        self.category.admits(&record.category)
    }
}

impl Resource for Item {
    const ENDPOINT: &'static str = "items";
    const LABEL: &'static str = "item";

    type Draft = NewItem;
    type SortField = ItemSortField;
    type Criteria = ItemCriteria;

    fn id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }

    fn sort_key(&self, field: ItemSortField) -> SortKey<'_> {
        match field {
            ItemSortField::Id => SortKey::Number(self.id as f64),
            ItemSortField::Name => SortKey::Text(&self.name),
            ItemSortField::Category => SortKey::Text(&self.category),
            ItemSortField::Price => SortKey::Number(self.price),
            ItemSortField::Quantity => SortKey::Number(self.quantity as f64),
            ItemSortField::UpdatedAt => SortKey::Time(self.updated_at),
        }
    }

    fn default_sort() -> (ItemSortField, Direction) {
        (ItemSortField::Name, Direction::Asc)
    }

    fn samples() -> Vec<Self> {
        samples::items()
    }

    fn from_draft(id: i64, draft: &NewItem, now: DateTime<Utc>) -> Self {
        Item {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            category: draft.category.clone(),
            price: draft.price,
            quantity: draft.quantity,
            supplier_id: draft.supplier_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Updatable for Item {
    fn apply_draft(&mut self, draft: &NewItem, now: DateTime<Utc>) {
        self.name = draft.name.clone();
        self.description = draft.description.clone();
        self.category = draft.category.clone();
        self.price = draft.price;
        self.quantity = draft.quantity;
        self.supplier_id = draft.supplier_id;
        self.updated_at = now.max(self.created_at);
    }
}

impl Deletable for Item {}
