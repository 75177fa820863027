//! SQLite store shared by the classifier and analytics services
//!
//! Three relations: `reviews`, `topics` (unique names) and `reviews_topics`
//! (one row per review/topic pair with its sentiment).

pub mod init;
pub mod links;
pub mod models;

pub use init::*;
pub use links::*;
pub use models::*;
