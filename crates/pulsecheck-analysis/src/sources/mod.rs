//! Retrieval source fan-out.

mod hackernews;
mod mastodon;
mod news_rss;
mod reddit;

use std::time::Duration;

use crate::error::AnalysisError;
use crate::types::{AnalysisConfig, Snippet};

/// Collect snippets about a subject from all configured sources.
///
/// The four collectors run concurrently and their results are merged only
/// after all complete. Each source fails independently: a failure is logged
/// and that source contributes nothing. Unconfigured sources (e.g. missing
/// Reddit credentials) are skipped. Total failure yields an empty vector,
/// never an error.
pub async fn collect_snippets(config: &AnalysisConfig, subject: &str) -> Vec<Snippet> {
    let client = match build_http_client(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build retrieval HTTP client");
            return Vec::new();
        }
    };

    let (news, hn, masto, reddit) = tokio::join!(
        news_rss::fetch_news(&client, subject),
        hackernews::fetch_comments(&client, subject),
        mastodon::fetch_tag_timeline(&client, &config.mastodon_instance, subject),
        reddit::fetch_mentions(config, subject),
    );

    let mut snippets = Vec::new();
    merge_source("news_rss", subject, news, &mut snippets);
    merge_source("hacker_news", subject, hn, &mut snippets);
    merge_source("mastodon", subject, masto, &mut snippets);
    merge_source("reddit", subject, reddit, &mut snippets);
    snippets
}

fn merge_source(
    source: &'static str,
    subject: &str,
    result: Result<Vec<Snippet>, AnalysisError>,
    out: &mut Vec<Snippet>,
) {
    match result {
        Ok(found) => {
            tracing::debug!(subject, source, count = found.len(), "collected snippets");
            out.extend(found);
        }
        Err(e) => {
            tracing::warn!(subject, source, error = %e, "source fetch failed");
        }
    }
}

fn build_http_client(config: &AnalysisConfig) -> Result<reqwest::Client, AnalysisError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(&config.user_agent)
        .build()?;
    Ok(client)
}

/// Strip HTML tags from a string, returning plain text.
pub(crate) fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_html_removes_tags() {
        assert_eq!(
            strip_html("<p>hello <b>world</b></p>"),
            "hello world"
        );
    }

    #[test]
    fn strip_html_passes_plain_text_through() {
        assert_eq!(strip_html("no tags here"), "no tags here");
    }
}
