use inventory_dash::aggregate::{
    InventorySummary, SupplierSummary, TransactionSummary, UserSummary,
};
use inventory_dash::config::Config;
use inventory_dash::loader::LoadPolicy;
use inventory_dash::models::{Item, Supplier, Transaction, User};
use inventory_dash::settings::SettingsStore;
use inventory_dash::{ApiClient, DashboardView, ResourceView};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventory_dash=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let settings = SettingsStore::open(&config.settings_path)?;
    let api_url = settings.api_url(&config)?;
    tracing::info!("Using API at {}", api_url);

    let client = ApiClient::new(api_url)?;
    let list_policy = LoadPolicy::list(config.list_watchdog);

    let mut dashboard = DashboardView::new(
        client.clone(),
        LoadPolicy::summary(config.summary_timeout),
    );
    let items: ResourceView<Item> = ResourceView::new(client.clone(), list_policy);
    let suppliers: ResourceView<Supplier> = ResourceView::new(client.clone(), list_policy);
    let transactions: ResourceView<Transaction> = ResourceView::new(client.clone(), list_policy);
    let users: ResourceView<User> = ResourceView::new(client, list_policy);

    let (summary, ..) = tokio::join!(
        dashboard.refresh(),
        items.refresh(),
        suppliers.refresh(),
        transactions.refresh(),
        users.refresh(),
    );
    let summary = summary.clone();

    if let Some(search) = std::env::args().nth(1) {
        items.store().lock().await.set_search(search);
    }

    let threshold = settings.get().low_stock_threshold;
    let items = items.snapshot().await;
    let suppliers = suppliers.snapshot().await;
    let transactions = transactions.snapshot().await;
    let users = users.snapshot().await;

    let banners = [
        summary.warning.as_deref(),
        items.banner.as_deref(),
        suppliers.banner.as_deref(),
        transactions.banner.as_deref(),
        users.banner.as_deref(),
    ];
    for banner in banners.into_iter().flatten() {
        println!("! {}", banner);
    }

    println!("== Dashboard");
    println!(
        "items {}  value {:.2}  low stock {}  sales {:.2}  purchases {:.2}  profit {:.2}",
        summary.data.total_items,
        summary.data.total_value,
        summary.data.low_stock_items,
        summary.data.total_sales,
        summary.data.total_purchases,
        summary.data.profit(),
    );

    let inventory = InventorySummary::from_items(&items.rows, threshold);
    println!(
        "\n== Inventory ({} of {})  units {}  value {:.2}",
        items.rows.len(),
        items.total,
        inventory.total_units,
        inventory.total_value
    );
    for item in &items.rows {
        let flag = if item.needs_restock(threshold) { "RESTOCK" } else { "" };
        println!(
            "{:>4}  {:<24} {:<16} {:>10.2} {:>6}  {}",
            item.id, item.name, item.category, item.price, item.quantity, flag
        );
    }

    let supplier_summary = SupplierSummary::from_suppliers(&suppliers.rows, &items.rows);
    println!(
        "\n== Suppliers  {} total, {} supplying listed items",
        supplier_summary.count, supplier_summary.active
    );
    for supplier in &suppliers.rows {
        println!(
            "{:>4}  {:<24} {:<18} {}",
            supplier.id, supplier.name, supplier.contact_person, supplier.email
        );
    }

    let totals = TransactionSummary::from_transactions(&transactions.rows);
    println!(
        "\n== Transactions  sales {:.2}  purchases {:.2}  profit {:.2}",
        totals.sales_total, totals.purchases_total, totals.profit
    );
    for tx in &transactions.rows {
        println!(
            "{:>4}  {}  {:<8} {:<20} {:>5} x {:>9.2} = {:>10.2}",
            tx.id,
            tx.date.format("%Y-%m-%d"),
            tx.kind,
            tx.item_name,
            tx.quantity,
            tx.price_per_unit,
            tx.total_price
        );
    }

    let roles = UserSummary::from_users(&users.rows);
    println!("\n== Users  {}", roles.count);
    for user in &users.rows {
        println!("{:>4}  {:<16} {:<28} {}", user.id, user.username, user.email, user.role);
    }

    Ok(())
}
