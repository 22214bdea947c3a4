//! Page title fetching
//!
//! Looks up a title for links saved without one.

use anyhow::Result;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

/// Fetch timeout in seconds
const FETCH_TIMEOUT: u64 = 10;

/// Fetch the title of the page at `url`
///
/// Returns `None` on any failure.
pub async fn fetch_title(url: &str) -> Option<String> {
    match fetch_title_inner(url).await {
        Ok(title) => title,
        Err(e) => {
            debug!("Title fetch for {} failed: {}", url, e);
            None
        }
    }
}

async fn fetch_title_inner(url: &str) -> Result<Option<String>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT))
        .user_agent("Mozilla/5.0 (compatible; viewlater/0.4)")
        .build()?;

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Ok(None);
    }

    let html = response.text().await?;
    Ok(parse_title(&html))
}

/// Extract a title from HTML
///
/// Prefers `og:title`, then `twitter:title`, then `<title>`.
fn parse_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    extract_meta_content(&document, "og:title")
        .or_else(|| extract_meta_content(&document, "twitter:title"))
        .or_else(|| {
            let selector = Selector::parse("title").ok()?;
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Extract content from a meta tag by property or name
fn extract_meta_content(document: &Html, property: &str) -> Option<String> {
    ["property", "name"].iter().find_map(|attr| {
        let selector = Selector::parse(&format!(r#"meta[{}="{}"]"#, attr, property)).ok()?;
        document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(str::to_string)
    })
}
