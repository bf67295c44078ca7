use serde_json::json;

use crate::cart::Cart;
use crate::cli::utils::{output_success, parse_items};
use crate::cli::{OutputFormat, Session};
use crate::resources::{Product, ResourceKind};
use crate::store::ResourceStore;

pub async fn handle(session: &Session, items: &[String], output_format: OutputFormat) -> anyhow::Result<()> {
    let items = parse_items(items)?;
    let inventory: ResourceStore<Product> =
        ResourceStore::new(session.http.clone(), ResourceKind::Inventory.endpoint(&session.base)?);
    inventory.fetch_all().await.into_result()?;

    let mut cart = Cart::new();
    for (product_id, quantity) in items {
        let product = inventory
            .get(&product_id)
            .await
            .ok_or_else(|| anyhow::anyhow!("product {} not found", product_id))?;
        cart.add(&product, quantity);
    }

    match output_format {
        OutputFormat::Text => {
            for item in cart.items() {
                println!("{:>4} x {:<30} {:>10.2}", item.quantity, item.name, item.subtotal());
            }
            println!("Total: {:.2}", cart.total());
            Ok(())
        }
        OutputFormat::Json => output_success(
            &output_format,
            "Checkout preview",
            Some(json!({ "items": cart.items(), "itemCount": cart.item_count(), "total": cart.total() })),
        ),
    }
}
