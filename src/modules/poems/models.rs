use serde::Deserialize;

/// Request model for creating (or merge-updating) a poem.
///
/// The slug is derived from title + author + category and is stable once
/// created; repeated posts with the same derived slug merge fields
/// non-destructively.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePoem {
    pub title: String,
    pub author: String,
    pub category: String,
    /// Ordered lines of the poem body.
    #[serde(default)]
    pub lines: Vec<String>,
    pub language: Option<String>,
    pub excerpt: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

/// Query parameters for reading a poem.
#[derive(Debug, Deserialize)]
pub struct PoemQuery {
    pub slug: Option<String>,
}
