mod common;

use anyhow::Result;
use serde_json::json;

use storefront_api::forms::Registration;
use storefront_api::resources::{Product, SaleDraft, SalesSummary, Stores};
use storefront_api::store::{Outcome, RecordId, ResourceStore};

#[tokio::test]
async fn inventory_crud_through_the_store() -> Result<()> {
    let server = common::TestServer::start().await?;
    let stores = Stores::new(&server.admin_http(), &server.url())?;

    assert!(stores.inventory.fetch_all().await.is_applied());
    assert!(stores.inventory.is_empty().await);

    let mouse = stores.inventory.create(&Product::new("Mouse", 10.0)).await.into_result()?;
    let id = mouse.id.clone().expect("server assigns an id");
    assert_eq!(stores.inventory.len().await, 1);

    let mut cheaper = mouse.clone();
    cheaper.price = 8.5;
    stores.inventory.update(cheaper).await.into_result()?;
    assert_eq!(stores.inventory.get(&id).await.map(|p| p.price), Some(8.5));

    // A second store sees the persisted change.
    let other: ResourceStore<Product> = ResourceStore::open(server.admin_http(), stores.inventory.endpoint().clone()).await;
    assert_eq!(other.get(&id).await.map(|p| p.price), Some(8.5));

    stores.inventory.delete(&id).await.into_result()?;
    assert!(stores.inventory.is_empty().await);

    let outcome = stores.inventory.delete(&id).await;
    assert!(matches!(outcome, Outcome::Failed(ref e) if e.status == 404));
    assert_eq!(stores.inventory.error().await.map(|e| e.status), Some(404));
    Ok(())
}

#[tokio::test]
async fn recorded_sales_feed_the_summary() -> Result<()> {
    let server = common::TestServer::start().await?;
    let stores = Stores::new(&server.admin_http(), &server.url())?;

    let mouse = stores.inventory.create(&Product::new("Mouse", 10.0)).await.into_result()?;
    let cable = stores.inventory.create(&Product::new("Cable", 2.5)).await.into_result()?;

    let mut draft = SaleDraft::new();
    let a = draft.add_line();
    draft.select_product(&a, &mouse)?;
    draft.set_quantity(&a, 2)?;
    let b = draft.add_line();
    draft.select_product(&b, &cable)?;
    let sale = draft.submit("2024-01-31", &stores.sales).await?.into_result()?;
    assert_eq!(sale.total, 22.5);

    let mut edit = SaleDraft::edit(&sale);
    edit.remove_line(&b);
    let edited = edit.submit("2024-02-01", &stores.sales).await?.into_result()?;
    assert_eq!(edited.id, sale.id);
    assert_eq!(edited.total, 20.0);

    let fresh = Stores::new(&server.admin_http(), &server.url())?;
    let outcomes = fresh.load_all().await;
    assert!(outcomes.iter().all(|(_, o)| o.is_applied()));

    let summary = SalesSummary::from_sales(&fresh.sales.records().await);
    assert_eq!(summary.count, 1);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.average_completed, 20.0);
    Ok(())
}

#[tokio::test]
async fn registration_creates_a_user_record() -> Result<()> {
    let server = common::TestServer::start().await?;
    let stores = Stores::new(&server.admin_http(), &server.url())?;

    let registration = Registration {
        name: "Ana".into(),
        surname: "Pérez".into(),
        email: "ana@example.com".into(),
        password: "Abcdefg1!".into(),
        confirm_password: "Abcdefg1!".into(),
        require_admin_prefix: false,
    };
    let created = registration.submit(&stores.users).await?.into_result()?;
    assert_eq!(created["email"], "ana@example.com");
    assert_eq!(stores.users.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn unauthenticated_store_records_the_error() -> Result<()> {
    let server = common::TestServer::start().await?;
    let stores = Stores::new(&server.http(), &server.url())?;

    let outcome = stores.purchases.fetch_all().await;
    let err = outcome.into_result().expect_err("no token");
    assert_eq!(err.status, 401);
    assert_eq!(err.status_text, "Unauthorized");
    assert!(stores.purchases.is_empty().await);
    assert!(!stores.purchases.is_loading().await);

    let missing = stores.purchases.update(json!({"total": 1})).await;
    assert!(matches!(missing, Outcome::Failed(ref e) if e.status == 0));

    let unknown = stores.purchases.delete(&RecordId::from("nope")).await;
    assert!(matches!(unknown, Outcome::Failed(ref e) if e.status == 401));
    Ok(())
}
