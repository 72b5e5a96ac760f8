use async_trait::async_trait;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use mehfil_db::{Document, ListOptions};
use mehfil_http::error::AppError;
use mehfil_kernel::settings::SiteSettings;
use mehfil_kernel::{AppState, Module};

use crate::utils::escape_xml;

/// Posts rendered into one feed document.
const FEED_LIMIT: usize = 50;

/// Feed module: RSS 2.0 rendering of published posts, served from the server
/// root rather than under `/api`.
pub struct FeedModule;

impl FeedModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for FeedModule {
    fn name(&self) -> &'static str {
        "feed"
    }

    fn public_routes(&self) -> Router<AppState> {
        Router::new().route("/feed.xml", get(feed_xml))
    }

    fn collections(&self) -> Vec<&'static str> {
        vec!["blogs"]
    }
}

/// RSS 2.0 document of published posts, newest first.
pub async fn feed_xml(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let opts = ListOptions::new("publishedAt", FEED_LIMIT);
    let page = state.store.list_page("blogs", &opts).await?;

    let published: Vec<Document> = page
        .docs
        .into_iter()
        .filter(|doc| doc.str_field("publishedAt").is_some_and(|p| !p.is_empty()))
        .collect();

    let xml = render_rss(&state.settings.site, &published);
    Ok((
        [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        xml,
    ))
}

fn render_rss(site: &SiteSettings, posts: &[Document]) -> String {
    let mut items = String::new();
    for post in posts {
        let title = post.str_field("title").unwrap_or("Untitled");
        let slug = post.str_field("slug").unwrap_or(post.id.as_str());
        let link = format!("{}/blog/{}", site.base_url.trim_end_matches('/'), slug);
        let description = post.str_field("excerpt").unwrap_or("");
        let pub_date = post
            .str_field("publishedAt")
            .map(rfc822_date)
            .unwrap_or_default();

        items.push_str(&format!(
            "    <item>\n      <title>{}</title>\n      <link>{}</link>\n      <guid>{}</guid>\n      <description>{}</description>\n      <pubDate>{}</pubDate>\n    </item>\n",
            escape_xml(title),
            escape_xml(&link),
            escape_xml(&link),
            escape_xml(description),
            escape_xml(&pub_date),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n  <channel>\n    <title>{}</title>\n    <link>{}</link>\n    <description>{}</description>\n{}  </channel>\n</rss>\n",
        escape_xml(&site.title),
        escape_xml(&site.base_url),
        escape_xml(&site.description),
        items,
    )
}

/// RSS wants RFC 822 dates; stored timestamps are RFC 3339. Unparseable
/// values pass through untouched.
fn rfc822_date(stored: &str) -> String {
    OffsetDateTime::parse(stored, &Rfc3339)
        .ok()
        .and_then(|dt| dt.format(&Rfc2822).ok())
        .unwrap_or_else(|| stored.to_string())
}

/// Create a new instance of the feed module.
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(FeedModule::new())
}
