//! Dashboard API handlers
//!
//! All endpoints are read-only queries over the review store.

pub mod aspects;
pub mod dynamics;
pub mod filters;
pub mod health;
pub mod kpi;
pub mod products;
pub mod reviews;

pub use aspects::key_aspects;
pub use dynamics::{dynamics, dynamics_stacked_bar};
pub use health::health_routes;
pub use kpi::kpi_summary;
pub use products::products_list;
pub use reviews::list_reviews;
