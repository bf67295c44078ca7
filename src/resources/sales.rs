use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::{Outcome, RecordId, Resource, ResourceStore};

use super::{lenient, Product};

pub const STATUS_COMPLETED: &str = "Completada";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(rename = "productoId", default)]
    pub product_id: Option<RecordId>,
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "cantidad", default = "lenient::one", deserialize_with = "lenient::quantity")]
    pub quantity: u32,
    #[serde(rename = "precio", default, deserialize_with = "lenient::number")]
    pub price: f64,
}

impl SaleLine {
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "fecha", default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total: f64,
    #[serde(rename = "productos", default)]
    pub lines: Vec<SaleLine>,
    #[serde(rename = "estado", default, deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sale {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }
}

impl Resource for Sale {
    fn id(&self) -> Option<RecordId> {
        self.id.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalesSummary {
    pub count: usize,
    pub total: f64,
    pub completed: usize,
    /// Mean total of completed sales, 0 when there are none.
    pub average_completed: f64,
}

impl SalesSummary {
    pub fn from_sales(sales: &[Sale]) -> Self {
        let total = sales.iter().map(|s| s.total).sum();
        let (completed, completed_total) = sales
            .iter()
            .filter(|s| s.is_completed())
            .fold((0usize, 0.0f64), |(n, sum), s| (n + 1, sum + s.total));

        Self {
            count: sales.len(),
            total,
            completed,
            average_completed: if completed > 0 {
                completed_total / completed as f64
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SaleDraftError {
    #[error("a sale needs a date")]
    MissingDate,

    #[error("a sale needs at least one priced product")]
    EmptyTotal,

    #[error("no line with id '{0}'")]
    UnknownLine(String),
}

/// The sale being put together in the admin form, new or edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleDraft {
    editing: Option<Sale>,
    lines: Vec<SaleLine>,
}

impl SaleDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit(sale: &Sale) -> Self {
        Self {
            lines: sale.lines.clone(),
            editing: Some(sale.clone()),
        }
    }

    pub fn lines(&self) -> &[SaleLine] {
        &self.lines
    }

    /// Add an empty line and return its id.
    pub fn add_line(&mut self) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.lines.push(SaleLine {
            id: id.clone(),
            product_id: None,
            name: None,
            quantity: 1,
            price: 0.0,
        });
        id
    }

    pub fn remove_line(&mut self, line_id: &str) {
        self.lines.retain(|l| l.id != line_id);
    }

    pub fn select_product(&mut self, line_id: &str, product: &Product) -> Result<(), SaleDraftError> {
        let line = self.line_mut(line_id)?;
        line.product_id = product.id.clone();
        line.name = Some(product.name.clone());
        line.price = product.price;
        Ok(())
    }

    /// Quantities are clamped to at least one.
    pub fn set_quantity(&mut self, line_id: &str, quantity: u32) -> Result<(), SaleDraftError> {
        self.line_mut(line_id)?.quantity = quantity.max(1);
        Ok(())
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(SaleLine::subtotal).sum()
    }

    pub fn into_sale(self, date: &str) -> Result<Sale, SaleDraftError> {
        let date = date.trim();
        if date.is_empty() {
            return Err(SaleDraftError::MissingDate);
        }
        let total = self.total();
        if total <= 0.0 {
            return Err(SaleDraftError::EmptyTotal);
        }

        let (id, extra) = match self.editing {
            Some(sale) => (sale.id, sale.extra),
            None => (None, Map::new()),
        };
        Ok(Sale {
            id,
            date: date.to_string(),
            total,
            lines: self.lines,
            status: STATUS_COMPLETED.to_string(),
            extra,
        })
    }

    /// Update the edited sale, or create a new one.
    pub async fn submit(self, date: &str, store: &ResourceStore<Sale>) -> Result<Outcome<Sale>, SaleDraftError> {
        let editing = self.editing.is_some();
        let sale = self.into_sale(date)?;
        Ok(if editing {
            store.update(sale).await
        } else {
            store.create(&sale).await
        })
    }

    fn line_mut(&mut self, line_id: &str) -> Result<&mut SaleLine, SaleDraftError> {
        self.lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| SaleDraftError::UnknownLine(line_id.to_string()))
    }
}
