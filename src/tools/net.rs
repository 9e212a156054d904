//! Network tools: file download and HTML scraping.

use super::args::{DownloadFileArgs, ScrapeHtmlContentArgs};
use super::error::ToolError;
use super::fs::ensure_parent_dir;
use super::registry::ToolKind;
use super::traits::Tool;
use super::ToolContext;
use async_trait::async_trait;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);
pub const SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of characters returned by a scrape.
pub const MAX_SCRAPED_CHARS: usize = 10_000;

/// Elements whose text is never rendered.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "template"];

/// GET `url`, treating any non-success status as an error.
async fn fetch(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> reqwest::Result<reqwest::Response> {
    http.get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()
}

/// Visible text of `element`: stripped, non-empty text nodes joined by a
/// single space.
fn visible_text(element: ElementRef<'_>) -> String {
    let node = *element;
    let root = node.id();
    node.descendants()
        .filter(|node| {
            !node
                .ancestors()
                .take_while(|ancestor| ancestor.id() != root)
                .any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
                })
        })
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some(text.trim()),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of every element in `html` matching the CSS `selector`, joined by
/// a single space.
pub fn extract_text(html: &str, selector: &str) -> Result<String, String> {
    let parsed = Selector::parse(selector)
        .map_err(|e| format!("invalid CSS selector '{}': {:?}", selector, e))?;
    let document = Html::parse_document(html);
    let texts: Vec<String> = document
        .select(&parsed)
        .map(visible_text)
        .filter(|text| !text.is_empty())
        .collect();
    Ok(texts.join(" "))
}

/// The first `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

#[async_trait]
impl Tool for DownloadFileArgs {
    const KIND: ToolKind = ToolKind::DownloadFile;

    async fn run(self, ctx: &ToolContext) -> Result<String, ToolError> {
        info!("Downloading {} -> {}", self.url, self.filename);
        let context = format!("Failed to download {}", self.url);

        let response = fetch(&ctx.http, &self.url, DOWNLOAD_TIMEOUT)
            .await
            .map_err(|e| ToolError::failed(&context, e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ToolError::failed(&context, e))?;

        let path = Path::new(&self.filename);
        ensure_parent_dir(path)
            .await
            .map_err(|e| ToolError::failed(&context, e))?;
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| ToolError::failed(&context, e))?;

        debug!("Saved {} bytes to {}", bytes.len(), self.filename);
        Ok(format!("File downloaded and saved as {}", self.filename))
    }
}

#[async_trait]
impl Tool for ScrapeHtmlContentArgs {
    const KIND: ToolKind = ToolKind::ScrapeHtmlContent;

    async fn run(self, ctx: &ToolContext) -> Result<String, ToolError> {
        info!("Scraping {} ({})", self.url, self.selector);
        let context = "An error occurred during scraping";

        let body = fetch(&ctx.http, &self.url, SCRAPE_TIMEOUT)
            .await
            .map_err(|e| ToolError::failed(context, e))?
            .text()
            .await
            .map_err(|e| ToolError::failed(context, e))?;

        let text = extract_text(&body, &self.selector).map_err(|e| ToolError::failed(context, e))?;
        let content = truncate_chars(&text, MAX_SCRAPED_CHARS);
        Ok(serde_json::json!({ "content": content }).to_string())
    }
}
