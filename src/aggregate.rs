//! Summary-card figures, recomputed from whatever derived list a view holds.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::models::{Item, Role, Supplier, Transaction, TransactionKind, User};

#[derive(Debug, Clone, PartialEq)]
pub struct InventorySummary {
    pub item_count: usize,
    pub total_units: i64,
    pub total_value: f64,
    /// Ids of items at or below the restock threshold.
    pub low_stock: Vec<i64>,
    pub categories: BTreeSet<String>,
}

impl InventorySummary {
    pub fn from_items(items: &[Item], threshold: i64) -> Self {
        InventorySummary {
            item_count: items.len(),
            total_units: items.iter().map(|i| i.quantity).sum(),
            total_value: items.iter().map(Item::stock_value).sum(),
            low_stock: items
                .iter()
                .filter(|i| i.needs_restock(threshold))
                .map(|i| i.id)
                .collect(),
            categories: items
                .iter()
                .filter(|i| !i.category.is_empty())
                .map(|i| i.category.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionSummary {
    pub count: usize,
    pub sales_total: f64,
    pub purchases_total: f64,
    pub profit: f64,
}

impl TransactionSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let total = |kind: TransactionKind| -> f64 {
            transactions
                .iter()
                .filter(|t| t.kind == kind)
                .map(|t| t.total_price)
                .sum()
        };
        let sales_total = total(TransactionKind::Sale);
        let purchases_total = total(TransactionKind::Purchase);
        TransactionSummary {
            count: transactions.len(),
            sales_total,
            purchases_total,
            profit: sales_total - purchases_total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserSummary {
    pub count: usize,
    pub by_role: BTreeMap<Role, usize>,
}

impl UserSummary {
    pub fn from_users(users: &[User]) -> Self {
        let mut by_role = BTreeMap::new();
        for user in users {
            *by_role.entry(user.role).or_insert(0) += 1;
        }
        UserSummary {
            count: users.len(),
            by_role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SupplierSummary {
    pub count: usize,
    /// Suppliers referenced by at least one item.
    pub active: usize,
}

impl SupplierSummary {
    pub fn from_suppliers(suppliers: &[Supplier], items: &[Item]) -> Self {
        let referenced: HashSet<i64> = items.iter().filter_map(|i| i.supplier_id).collect();
        SupplierSummary {
            count: suppliers.len(),
            active: suppliers
                .iter()
                .filter(|s| referenced.contains(&s.id))
                .count(),
        }
    }
}
