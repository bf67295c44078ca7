use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_success, parse_items};
use crate::cli::{OutputFormat, Session};
use crate::resources::{ResourceKind, SaleDraft, SalesSummary, Stores};

#[derive(Subcommand)]
pub enum SalesCommands {
    #[command(about = "Totals across every recorded sale")]
    Summary,

    #[command(about = "Record a completed sale priced from current inventory")]
    Record {
        #[arg(long, help = "Sale date, e.g. 2024-01-31")]
        date: String,
        #[arg(long = "item", value_name = "PRODUCT_ID:QTY", required = true)]
        items: Vec<String>,
    },
}

pub async fn handle(session: &Session, cmd: &SalesCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let stores = Stores::new(&session.http, &session.base)?;

    match cmd {
        SalesCommands::Summary => {
            stores.sales.fetch_all().await.into_result()?;
            let summary = SalesSummary::from_sales(&stores.sales.records().await);

            match output_format {
                OutputFormat::Text => {
                    println!("Sales:             {}", summary.count);
                    println!("Total:             {:.2}", summary.total);
                    println!("Completed:         {}", summary.completed);
                    println!("Average completed: {:.2}", summary.average_completed);
                    Ok(())
                }
                OutputFormat::Json => output_success(
                    &output_format,
                    "Sales summary",
                    Some(json!({
                        "count": summary.count,
                        "total": summary.total,
                        "completed": summary.completed,
                        "averageCompleted": summary.average_completed,
                    })),
                ),
            }
        }
        SalesCommands::Record { date, items } => {
            let items = parse_items(items)?;
            stores.inventory.fetch_all().await.into_result()?;

            let mut draft = SaleDraft::new();
            for (product_id, quantity) in items {
                let product = stores.inventory.get(&product_id).await.ok_or_else(|| {
                    anyhow::anyhow!("product {} not found in {}", product_id, ResourceKind::Inventory.path())
                })?;
                let line = draft.add_line();
                draft.select_product(&line, &product)?;
                draft.set_quantity(&line, quantity)?;
            }

            let sale = draft.submit(date, &stores.sales).await?.into_result()?;
            tracing::info!("Recorded sale {:?} for {:.2}", sale.id, sale.total);
            output_success(&output_format, "Sale recorded", Some(serde_json::to_value(&sale)?))
        }
    }
}
