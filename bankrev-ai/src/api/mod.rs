//! HTTP API handlers for bankrev-ai

pub mod health;
pub mod ingest;
pub mod postprocess;
pub mod predict;

pub use health::health_routes;
pub use ingest::ingest_routes;
pub use postprocess::postprocess_routes;
pub use predict::predict_routes;
