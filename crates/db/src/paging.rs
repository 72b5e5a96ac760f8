use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Scan direction over the ordering field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

/// Options for one page of an ordered collection scan.
///
/// The cursor is the id of the last document of the previous page. If the
/// referenced document no longer exists the scan restarts from the beginning.
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub order_by: String,
    pub direction: Direction,
    pub cursor: Option<String>,
    pub page_size: usize,
    /// Inclusive lower bound on the ordering field (ascending scans).
    pub start_at: Option<String>,
}

impl ListOptions {
    pub fn new(order_by: impl Into<String>, page_size: usize) -> Self {
        Self {
            order_by: order_by.into(),
            direction: Direction::Desc,
            cursor: None,
            page_size,
            start_at: None,
        }
    }

    pub fn ascending(mut self) -> Self {
        self.direction = Direction::Asc;
        self
    }

    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor.filter(|c| !c.is_empty());
        self
    }

    pub fn starting_at(mut self, bound: impl Into<String>) -> Self {
        self.start_at = Some(bound.into());
        self
    }
}

/// One page of documents plus the continuation token.
///
/// `next_cursor` is `None` when the page came back short or empty, signaling
/// end of list.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub docs: Vec<Document>,
    pub next_cursor: Option<String>,
}

impl Page {
    pub fn empty() -> Self {
        Self {
            docs: Vec::new(),
            next_cursor: None,
        }
    }
}
