//! The storefront's backend collections and the stores built over them.

pub mod inventory;
mod lenient;
pub mod sales;

use serde_json::Value;
use url::Url;

use crate::http::{join_segment, HttpError, HttpHelper};
use crate::store::{Outcome, ResourceStore};

pub use inventory::Product;
pub use sales::{Sale, SaleDraft, SaleLine, SalesSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ResourceKind {
    Inventory,
    Sales,
    Purchases,
    Suppliers,
    Orders,
    Users,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Inventory,
        ResourceKind::Sales,
        ResourceKind::Purchases,
        ResourceKind::Suppliers,
        ResourceKind::Orders,
        ResourceKind::Users,
    ];

    /// Collection path on the REST backend.
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Inventory => "inventario",
            ResourceKind::Sales => "ventas",
            ResourceKind::Purchases => "compras",
            ResourceKind::Suppliers => "proveedores",
            ResourceKind::Orders => "pedidos",
            ResourceKind::Users => "usuarios",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.path() == path)
    }

    pub fn endpoint(self, base: &Url) -> Result<Url, HttpError> {
        join_segment(base, self.path())
    }
}

/// One store per collection, handed explicitly to whatever needs them.
#[derive(Debug, Clone)]
pub struct Stores {
    pub inventory: ResourceStore<Product>,
    pub sales: ResourceStore<Sale>,
    pub purchases: ResourceStore<Value>,
    pub suppliers: ResourceStore<Value>,
    pub orders: ResourceStore<Value>,
    pub users: ResourceStore<Value>,
}

impl Stores {
    pub fn new(http: &HttpHelper, base: &Url) -> Result<Self, HttpError> {
        Ok(Self {
            inventory: ResourceStore::new(http.clone(), ResourceKind::Inventory.endpoint(base)?),
            sales: ResourceStore::new(http.clone(), ResourceKind::Sales.endpoint(base)?),
            purchases: ResourceStore::new(http.clone(), ResourceKind::Purchases.endpoint(base)?),
            suppliers: ResourceStore::new(http.clone(), ResourceKind::Suppliers.endpoint(base)?),
            orders: ResourceStore::new(http.clone(), ResourceKind::Orders.endpoint(base)?),
            users: ResourceStore::new(http.clone(), ResourceKind::Users.endpoint(base)?),
        })
    }

    /// The opaque-JSON store for `kind`; typed collections have their own fields.
    pub fn json(&self, kind: ResourceKind) -> Option<&ResourceStore<Value>> {
        match kind {
            ResourceKind::Purchases => Some(&self.purchases),
            ResourceKind::Suppliers => Some(&self.suppliers),
            ResourceKind::Orders => Some(&self.orders),
            ResourceKind::Users => Some(&self.users),
            ResourceKind::Inventory | ResourceKind::Sales => None,
        }
    }

    /// Run every initial fetch concurrently.
    pub async fn load_all(&self) -> Vec<(ResourceKind, Outcome<usize>)> {
        let (inventory, sales, purchases, suppliers, orders, users) = futures::join!(
            self.inventory.fetch_all(),
            self.sales.fetch_all(),
            self.purchases.fetch_all(),
            self.suppliers.fetch_all(),
            self.orders.fetch_all(),
            self.users.fetch_all(),
        );
        vec![
            (ResourceKind::Inventory, inventory),
            (ResourceKind::Sales, sales),
            (ResourceKind::Purchases, purchases),
            (ResourceKind::Suppliers, suppliers),
            (ResourceKind::Orders, orders),
            (ResourceKind::Users, users),
        ]
    }

    pub async fn detach_all(&self) {
        futures::join!(
            self.inventory.detach(),
            self.sales.detach(),
            self.purchases.detach(),
            self.suppliers.detach(),
            self.orders.detach(),
            self.users.detach(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::testing::spawn_router;
    use axum::{routing::get, Json, Router};
    use serde_json::json;

    #[test]
    fn paths_round_trip() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_path(kind.path()), Some(kind));
        }
        assert_eq!(ResourceKind::from_path("clientes"), None);
    }

    #[test]
    fn endpoints_hang_off_base() {
        let base = Url::parse("http://localhost:3000").unwrap();
        assert_eq!(
            ResourceKind::Purchases.endpoint(&base).unwrap().as_str(),
            "http://localhost:3000/compras"
        );
    }

    #[tokio::test]
    async fn one_loose_record_does_not_empty_inventory() {
        let router = Router::new().route(
            "/inventario",
            get(|| async { Json(json!([{"id": 1, "name": "Mouse", "price": 10.0}, {"id": 2, "price": "2.5"}])) }),
        );
        let base = spawn_router(router).await;
        let http = HttpHelper::new(&ApiConfig {
            base_url: base.to_string(),
            request_timeout_secs: Some(5),
        })
        .unwrap();

        let stores = Stores::new(&http, &base).unwrap();
        assert_eq!(stores.inventory.fetch_all().await, Outcome::Applied(2));
        let cable = stores.inventory.get(&crate::store::RecordId::Number(2)).await.unwrap();
        assert_eq!(cable.price, 2.5);
    }

    #[tokio::test]
    async fn non_object_record_fails_the_whole_fetch() {
        let router = Router::new().route(
            "/inventario",
            get(|| async { Json(json!([{"id": 1, "name": "Mouse", "price": 10.0}, "corrupt"])) }),
        );
        let base = spawn_router(router).await;
        let http = HttpHelper::new(&ApiConfig {
            base_url: base.to_string(),
            request_timeout_secs: Some(5),
        })
        .unwrap();

        let stores = Stores::new(&http, &base).unwrap();
        let outcome = stores.inventory.fetch_all().await;
        assert!(matches!(outcome, Outcome::Failed(ref e) if e.status == 0));
        assert!(stores.inventory.is_empty().await);
    }

    #[tokio::test]
    async fn load_all_fills_each_store() {
        let router = Router::new()
            .route("/inventario", get(|| async { Json(json!([{"id": 1, "name": "Mouse", "price": 10.0}])) }))
            .route(
                "/ventas",
                get(|| async { Json(json!([{"id": 1, "fecha": "2024-01-01", "total": 10.0, "estado": "Completada"}])) }),
            )
            .route("/compras", get(|| async { Json(json!([])) }))
            .route("/proveedores", get(|| async { Json(json!([{"id": "p"}])) }))
            .route("/pedidos", get(|| async { Json(json!([])) }));
        // usuarios is left unrouted and fails with 404
        let base = spawn_router(router).await;
        let http = HttpHelper::new(&ApiConfig {
            base_url: base.to_string(),
            request_timeout_secs: Some(5),
        })
        .unwrap();

        let stores = Stores::new(&http, &base).unwrap();
        let outcomes = stores.load_all().await;

        assert_eq!(outcomes.len(), 6);
        assert_eq!(stores.inventory.records().await[0].name, "Mouse");
        assert_eq!(stores.sales.len().await, 1);
        assert_eq!(stores.json(ResourceKind::Suppliers).unwrap().len().await, 1);
        let users = outcomes.iter().find(|(k, _)| *k == ResourceKind::Users).unwrap();
        assert!(matches!(users.1, Outcome::Failed(ref e) if e.status == 404));

        stores.detach_all().await;
        assert!(stores.inventory.is_empty().await);
    }
}
