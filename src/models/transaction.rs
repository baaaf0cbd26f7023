use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use crate::pipeline::{Direction, Period, Selection};
use crate::resource::{Filter, Resource, SortKey};
use crate::samples;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Sale,
    Purchase,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Sale => "sale",
            TransactionKind::Purchase => "purchase",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(TransactionKind::Sale),
            "purchase" => Ok(TransactionKind::Purchase),
            other => Err(format!("unknown transaction type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub item_id: i64,
    #[serde(default)]
    pub item_name: String,
    pub quantity: i64,
    pub price_per_unit: f64,
    pub total_price: f64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub supplier_id: Option<i64>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

/// Other side of a transaction: the supplier we bought from or the customer we sold to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterparty<'a> {
    Supplier(i64),
    Customer(&'a str),
}

impl Transaction {
    pub fn counterparty(&self) -> Option<Counterparty<'_>> {
        match self.kind {
            TransactionKind::Purchase => self.supplier_id.map(Counterparty::Supplier),
            TransactionKind::Sale => self.customer_name.as_deref().map(Counterparty::Customer),
        }
    }

    #[cfg(test)]
    pub(crate) fn sample_sale(id: i64, date: DateTime<Utc>) -> Self {
        let draft = NewTransaction::sale(1, "Laptop", 2, 1299.0, "Walk-in", date);
        Transaction::from_draft(id, &draft, date)
    }
}

/// Create payload. `total_price` is always derived from quantity and unit price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub item_id: i64,
    pub item_name: String,
    pub quantity: i64,
    pub price_per_unit: f64,
    total_price: f64,
    pub date: DateTime<Utc>,
    pub supplier_id: Option<i64>,
    pub supplier_name: Option<String>,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
}

impl NewTransaction {
    pub fn sale(
        item_id: i64,
        item_name: &str,
        quantity: i64,
        price_per_unit: f64,
        customer_name: &str,
        date: DateTime<Utc>,
    ) -> Self {
        NewTransaction {
            kind: TransactionKind::Sale,
            item_id,
            item_name: item_name.to_string(),
            quantity,
            price_per_unit,
            total_price: quantity as f64 * price_per_unit,
            date,
            supplier_id: None,
            supplier_name: None,
            customer_id: None,
            customer_name: Some(customer_name.to_string()),
        }
    }

    pub fn purchase(
        item_id: i64,
        item_name: &str,
        quantity: i64,
        price_per_unit: f64,
        supplier_id: i64,
        date: DateTime<Utc>,
    ) -> Self {
        NewTransaction {
            kind: TransactionKind::Purchase,
            item_id,
            item_name: item_name.to_string(),
            quantity,
            price_per_unit,
            total_price: quantity as f64 * price_per_unit,
            date,
            supplier_id: Some(supplier_id),
            supplier_name: None,
            customer_id: None,
            customer_name: None,
        }
    }

    pub fn with_supplier_name(mut self, name: &str) -> Self {
        self.supplier_name = Some(name.to_string());
        self
    }

    pub fn with_customer_id(mut self, id: i64) -> Self {
        self.customer_id = Some(id);
        self
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionSortField {
    Id,
    Date,
    ItemName,
    Kind,
    Quantity,
    PricePerUnit,
    TotalPrice,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionCriteria {
    pub kind: Selection<TransactionKind>,
    pub period: Period,
}

impl Filter<Transaction> for TransactionCriteria {
    fn admits(&self, record: &Transaction, now: DateTime<Utc>) -> bool {
        self.kind.admits(&record.kind) && self.period.admits(record.date, now)
    }
}

impl Resource for Transaction {
    const ENDPOINT: &'static str = "transactions";
    const LABEL: &'static str = "transaction";

    type Draft = NewTransaction;
    type SortField = TransactionSortField;
    type Criteria = TransactionCriteria;

    fn id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.item_name.as_str()];
        fields.extend(self.supplier_name.as_deref());
        fields.extend(self.customer_name.as_deref());
        fields
    }

    fn sort_key(&self, field: TransactionSortField) -> SortKey<'_> {
        match field {
            TransactionSortField::Id => SortKey::Number(self.id as f64),
            TransactionSortField::Date => SortKey::Time(self.date),
            TransactionSortField::ItemName => SortKey::Text(&self.item_name),
            TransactionSortField::Kind => SortKey::Text(self.kind.as_str()),
            TransactionSortField::Quantity => SortKey::Number(self.quantity as f64),
            TransactionSortField::PricePerUnit => SortKey::Number(self.price_per_unit),
            TransactionSortField::TotalPrice => SortKey::Number(self.total_price),
        }
    }

    fn default_sort() -> (TransactionSortField, Direction) {
        (TransactionSortField::Date, Direction::Desc)
    }

    fn samples() -> Vec<Self> {
        samples::transactions()
    }

    fn from_draft(id: i64, draft: &NewTransaction, _now: DateTime<Utc>) -> Self {
        Transaction {
            id,
            kind: draft.kind,
            item_id: draft.item_id,
            item_name: draft.item_name.clone(),
            quantity: draft.quantity,
            price_per_unit: draft.price_per_unit,
            total_price: draft.total_price,
            date: draft.date,
            supplier_id: draft.supplier_id,
            supplier_name: draft.supplier_name.clone(),
            customer_id: draft.customer_id,
            customer_name: draft.customer_name.clone(),
        }
    }
}
