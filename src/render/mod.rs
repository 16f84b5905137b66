//! Static HTML reports.
//!
//! Each report is first built as plain view-model data ([`GraphDocument`],
//! [`ListingDocument`]) and then rendered through an askama template.

pub mod graph;
pub mod listing;

pub use graph::{GraphDocument, GraphEdge, GraphNode};
pub use listing::{ListingDocument, ListingGroup, ListingRow};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;

/// Serializes `value` as JSON that is safe to inline in a `<script>` element.
pub(crate) fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace("</", "<\\/").replace("<!--", "\\u003c!--"))
}

pub(crate) fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
