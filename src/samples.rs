//! Bundled rows shown when the API is unreachable.
//!
//! Every timestamp is a fixed instant, so repeated fallbacks yield identical data.

use crate::models::timestamp::fixed;
use crate::models::{
    AnalyticsSummary, CategoryShare, Item, MonthlyFigure, Role, Supplier, Transaction,
    TransactionKind, User,
};

fn item(
    id: i64,
    name: &str,
    description: &str,
    category: &str,
    price: f64,
    quantity: i64,
    supplier_id: i64,
) -> Item {
    Item {
        id,
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        price,
        quantity,
        supplier_id: Some(supplier_id),
        created_at: fixed(2024, 1, 10, 9),
        updated_at: fixed(2024, 3, 1, 9),
    }
}

pub fn items() -> Vec<Item> {
    vec![
        item(1, "Laptop", "15-inch business laptop, 16GB RAM", "Electronics", 1299.99, 15, 1),
        item(2, "Smartphone", "Unlocked 128GB handset", "Electronics", 699.99, 25, 1),
        item(3, "Desk Chair", "Ergonomic mesh office chair", "Furniture", 189.5, 8, 2),
        item(4, "Wireless Mouse", "2.4GHz mouse with USB receiver", "Accessories", 24.99, 3, 3),
        item(5, "Printer Paper", "A4, 500 sheets per ream", "Office Supplies", 6.49, 4, 2),
        item(6, "Monitor", "27-inch 1440p IPS display", "Electronics", 329.0, 10, 3),
    ]
}

fn supplier(
    id: i64,
    name: &str,
    contact: &str,
    email: &str,
    phone: &str,
    address: &str,
) -> Supplier {
    Supplier {
        id,
        name: name.to_string(),
        contact_person: contact.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        address: address.to_string(),
        created_at: fixed(2023, 11, 2, 10),
        updated_at: fixed(2024, 2, 20, 10),
    }
}

pub fn suppliers() -> Vec<Supplier> {
    vec![
        supplier(
            1,
            "Tech Supplies Inc.",
            "John Smith",
            "john@techsupplies.com",
            "(555) 123-4567",
            "123 Tech Street, San Francisco, CA",
        ),
        supplier(
            2,
            "Office Essentials",
            "Sarah Johnson",
            "sarah@officeessentials.com",
            "(555) 987-6543",
            "456 Office Avenue, Chicago, IL",
        ),
        supplier(
            3,
            "Global Peripherals",
            "Michael Chen",
            "michael@globalperipherals.com",
            "(555) 246-8135",
            "789 Commerce Blvd, Austin, TX",
        ),
    ]
}

fn transaction(
    id: i64,
    kind: TransactionKind,
    item: (i64, &str),
    quantity: i64,
    price_per_unit: f64,
    day: u32,
) -> Transaction {
    let (item_id, item_name) = item;
    let (supplier_id, supplier_name, customer_name) = match kind {
        TransactionKind::Purchase => (Some(1), Some("Tech Supplies Inc.".to_string()), None),
        TransactionKind::Sale => (None, None, Some("Walk-in Customer".to_string())),
    };
    Transaction {
        id,
        kind,
        item_id,
        item_name: item_name.to_string(),
        quantity,
        price_per_unit,
        total_price: quantity as f64 * price_per_unit,
        date: fixed(2024, 3, day, 14),
        supplier_id,
        supplier_name,
        customer_id: None,
        customer_name,
    }
}

pub fn transactions() -> Vec<Transaction> {
    use TransactionKind::{Purchase, Sale};
    vec![
        transaction(1, Purchase, (1, "Laptop"), 10, 1000.0, 2),
        transaction(2, Sale, (1, "Laptop"), 2, 1299.99, 5),
        transaction(3, Purchase, (2, "Smartphone"), 20, 500.0, 7),
        transaction(4, Sale, (2, "Smartphone"), 5, 699.99, 12),
        transaction(5, Sale, (4, "Wireless Mouse"), 7, 24.99, 18),
    ]
}

pub fn users() -> Vec<User> {
    let user = |id: i64, username: &str, email: &str, role: Role| User {
        id,
        username: username.to_string(),
        email: email.to_string(),
        role,
        created_at: fixed(2023, 10, 1, 8),
        updated_at: fixed(2024, 1, 5, 8),
    };
    vec![
        user(1, "admin", "admin@example.com", Role::Admin),
        user(2, "manager", "manager@example.com", Role::Manager),
        user(3, "staff1", "staff1@example.com", Role::Staff),
        user(4, "staff2", "staff2@example.com", Role::Staff),
    ]
}

pub fn analytics() -> AnalyticsSummary {
    AnalyticsSummary {
        total_items: 65,
        total_value: 45_372.45,
        low_stock_items: 2,
        total_sales: 6_274.88,
        total_purchases: 20_000.0,
        monthly: vec![
            MonthlyFigure { month: "Jan".to_string(), sales: 4_200.0, purchases: 3_100.0 },
            MonthlyFigure { month: "Feb".to_string(), sales: 3_800.0, purchases: 2_900.0 },
            MonthlyFigure { month: "Mar".to_string(), sales: 6_274.88, purchases: 20_000.0 },
        ],
        top_categories: vec![
            CategoryShare { category: "Electronics".to_string(), count: 50 },
            CategoryShare { category: "Furniture".to_string(), count: 8 },
            CategoryShare { category: "Office Supplies".to_string(), count: 4 },
            CategoryShare { category: "Accessories".to_string(), count: 3 },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_samples_are_deterministic() {
        assert_eq!(items(), items());
        assert_eq!(suppliers(), suppliers());
        assert_eq!(transactions(), transactions());
        assert_eq!(users(), users());
        assert_eq!(analytics(), analytics());
    }

    #[test]
    fn test_sample_ids_unique_and_timestamps_ordered() {
        let ids: HashSet<i64> = items().iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), items().len());
        assert!(items().iter().all(|i| i.updated_at >= i.created_at));
        assert!(suppliers().iter().all(|s| s.updated_at >= s.created_at));
        assert!(users().iter().all(|u| u.updated_at >= u.created_at));
    }
}
