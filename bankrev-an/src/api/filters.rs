//! Query parameters shared by the dashboard endpoints
//!
//! * `products` - comma-separated topic names; links of other topics are
//!   ignored
//! * `start_date`, `end_date` - inclusive `YYYY-MM-DD` range on the review
//!   date; applied only when both are given
//! * `granularity` - `day`, `week` or `month` (default)

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite};

use crate::stats::Granularity;

/// Link rows joined with their review and topic
pub const LINKS_FROM: &str = "FROM reviews_topics rt \
     JOIN reviews r ON r.id = rt.review_id \
     JOIN topics t ON t.id = rt.topic_id \
     WHERE 1 = 1";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub products: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub granularity: Option<String>,
}

impl FilterQuery {
    /// Requested topic names, `None` when no product filter applies
    pub fn product_list(&self) -> Option<Vec<String>> {
        let products: Vec<String> = self
            .products
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        (!products.is_empty()).then_some(products)
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start_date?, self.end_date?))
    }

    pub fn granularity(&self) -> Granularity {
        Granularity::parse_lenient(self.granularity.as_deref())
    }
}

/// Append `AND t.name IN (...)` when a product filter is given
pub fn push_product_filter(builder: &mut QueryBuilder<'_, Sqlite>, products: Option<&[String]>) {
    let Some(products) = products else {
        return;
    };
    builder.push(" AND t.name IN (");
    let mut separated = builder.separated(", ");
    for product in products {
        separated.push_bind(product.clone());
    }
    separated.push_unseparated(")");
}

/// Append an inclusive review date range
pub fn push_date_filter(builder: &mut QueryBuilder<'_, Sqlite>, range: Option<(NaiveDate, NaiveDate)>) {
    if let Some((start, end)) = range {
        builder
            .push(" AND date(r.date) BETWEEN ")
            .push_bind(start)
            .push(" AND ")
            .push_bind(end);
    }
}
