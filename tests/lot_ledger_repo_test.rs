use costbook::db::init_db;
use costbook::ledger::LotLedger;
use costbook::{Asset, Decimal, OrderStatus, PurchaseOrder, Repository, TimeMs};
use std::str::FromStr;
use tempfile::TempDir;

async fn setup_repo() -> (Repository, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    (Repository::new(pool), temp_dir)
}

fn order(number: &str, asset: &str, qty: &str, px: &str, at: i64, status: OrderStatus) -> PurchaseOrder {
    PurchaseOrder::new(
        Some(number.to_string()),
        Asset::new(asset),
        Decimal::from_str(qty).unwrap(),
        Decimal::from_str(px).unwrap(),
        TimeMs::new(at),
        status,
    )
}

#[tokio::test]
async fn completed_lots_are_filtered_and_ordered() {
    let (repo, _temp) = setup_repo().await;

    let orders = vec![
        order("3", "USDT", "10", "90", 3000, OrderStatus::Completed),
        order("1", "USDT", "10", "80", 1000, OrderStatus::Completed),
        order("2", "USDT", "99", "70", 2000, OrderStatus::Pending),
        order("4", "USDT", "99", "60", 500, OrderStatus::Cancelled),
        order("5", "BTC", "1", "5000000", 100, OrderStatus::Completed),
    ];
    for o in &orders {
        assert!(repo.insert_purchase_order(o).await.unwrap());
    }

    let lots = repo.completed_lots(&Asset::new("usdt")).await.unwrap();
    assert_eq!(lots.len(), 2);
    assert_eq!(lots[0].acquired_at, TimeMs::new(1000));
    assert_eq!(lots[0].unit_cost, Decimal::from_str("80").unwrap());
    assert_eq!(lots[1].acquired_at, TimeMs::new(3000));
}

#[tokio::test]
async fn same_date_lots_keep_insertion_order() {
    let (repo, _temp) = setup_repo().await;
    repo.insert_purchase_order(&order("a", "USDT", "1", "81", 1000, OrderStatus::Completed))
        .await
        .unwrap();
    repo.insert_purchase_order(&order("b", "USDT", "1", "82", 1000, OrderStatus::Completed))
        .await
        .unwrap();

    let lots = repo.query_completed_lots(&Asset::new("USDT")).await.unwrap();
    assert_eq!(lots[0].unit_cost, Decimal::from_str("81").unwrap());
    assert_eq!(lots[1].unit_cost, Decimal::from_str("82").unwrap());
}

#[tokio::test]
async fn insert_is_idempotent_on_order_key() {
    let (repo, _temp) = setup_repo().await;
    let o = order("2201", "USDT", "100", "84.5", 1000, OrderStatus::Completed);

    assert!(repo.insert_purchase_order(&o).await.unwrap());
    assert!(!repo.insert_purchase_order(&o).await.unwrap());
    assert_eq!(repo.count_purchase_orders(&Asset::new("USDT")).await.unwrap(), 1);

    let batch = vec![
        o.clone(),
        order("2202", "USDT", "50", "85", 2000, OrderStatus::Completed),
    ];
    assert_eq!(repo.insert_purchase_orders_batch(&batch).await.unwrap(), 1);
    assert_eq!(repo.count_purchase_orders(&Asset::new("USDT")).await.unwrap(), 2);
}

#[tokio::test]
async fn completing_an_order_makes_it_a_lot() {
    let (repo, _temp) = setup_repo().await;
    let o = order("77", "USDT", "25", "83.9", 1000, OrderStatus::Pending);
    repo.insert_purchase_order(&o).await.unwrap();
    assert!(repo.completed_lots(&Asset::new("USDT")).await.unwrap().is_empty());

    assert!(repo
        .set_purchase_status(&o.order_key, OrderStatus::Completed)
        .await
        .unwrap());
    let stored = repo.get_purchase_order(&o.order_key).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Completed);
    assert_eq!(stored.quantity, Decimal::from_str("25").unwrap());

    let lots = repo.completed_lots(&Asset::new("USDT")).await.unwrap();
    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0].unit_cost, Decimal::from_str("83.9").unwrap());

    assert!(!repo
        .set_purchase_status("order:missing", OrderStatus::Completed)
        .await
        .unwrap());
}

#[tokio::test]
async fn malformed_amount_surfaces_as_error() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");

    sqlx::query(
        "INSERT INTO purchase_orders (order_key, asset, quantity, unit_price, order_date, status, created_at, updated_at)
         VALUES ('bad', 'USDT', 'ten', '80', 0, 'completed', 0, 0)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let repo = Repository::new(pool);
    let err = repo.completed_lots(&Asset::new("USDT")).await.unwrap_err();
    assert!(matches!(err, costbook::LedgerError::Malformed(_)));
}
