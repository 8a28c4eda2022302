//! Mastodon hashtag timeline collector.

use serde::Deserialize;

use crate::error::AnalysisError;
use crate::types::{Platform, Snippet};

use super::strip_html;

const TIMELINE_LIMIT: usize = 40;

#[derive(Debug, Deserialize)]
struct Status {
    content: String,
    url: Option<String>,
    account: Account,
}

#[derive(Debug, Deserialize)]
struct Account {
    acct: String,
}

/// Fetch recent public posts for the subject's hashtag.
///
/// The tag is the subject lower-cased with non-alphanumerics removed; a
/// subject that reduces to nothing yields no snippets.
///
/// # Errors
///
/// Returns [`AnalysisError::Http`] on network failure or
/// [`AnalysisError::Source`] if the response body does not parse.
pub(crate) async fn fetch_tag_timeline(
    client: &reqwest::Client,
    instance: &str,
    subject: &str,
) -> Result<Vec<Snippet>, AnalysisError> {
    let tag = subject_tag(subject);
    if tag.is_empty() {
        return Ok(Vec::new());
    }

    let base = instance.trim_end_matches('/');
    let url = format!("{base}/api/v1/timelines/tag/{tag}?limit={TIMELINE_LIMIT}");

    let statuses: Vec<Status> = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .map_err(|e| AnalysisError::Source(format!("Mastodon response parse error: {e}")))?;

    let host = instance_host(instance).to_string();
    Ok(statuses
        .into_iter()
        .filter_map(|status| status_to_snippet(status, &host))
        .collect())
}

fn subject_tag(subject: &str) -> String {
    subject
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

fn instance_host(instance: &str) -> &str {
    instance
        .trim_end_matches('/')
        .trim_start_matches("https://")
        .trim_start_matches("http://")
}

fn status_to_snippet(status: Status, host: &str) -> Option<Snippet> {
    let text = strip_html(&status.content);
    if text.is_empty() {
        return None;
    }
    Some(Snippet {
        text,
        source_label: host.to_string(),
        author: Some(status.account.acct),
        url: status.url,
        platform: Platform::Mastodon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_strips_spaces_and_punctuation() {
        assert_eq!(subject_tag("Fizzy Cola 2.0"), "fizzycola20");
        assert_eq!(subject_tag("!!!"), "");
    }

    #[test]
    fn host_drops_scheme_and_trailing_slash() {
        assert_eq!(instance_host("https://mastodon.social/"), "mastodon.social");
        assert_eq!(instance_host("http://social.example"), "social.example");
    }

    #[test]
    fn status_html_is_stripped() {
        let status = Status {
            content: "<p>trying the new <a href=\"#\">Fizzy Cola</a> today</p>".to_string(),
            url: Some("https://mastodon.social/@sam/1".to_string()),
            account: Account {
                acct: "sam".to_string(),
            },
        };
        let snippet = status_to_snippet(status, "mastodon.social").unwrap();
        assert_eq!(snippet.text, "trying the new Fizzy Cola today");
        assert_eq!(snippet.author.as_deref(), Some("sam"));
        assert_eq!(snippet.platform, Platform::Mastodon);
    }

    #[test]
    fn empty_content_is_skipped() {
        let status = Status {
            content: "<p></p>".to_string(),
            url: None,
            account: Account {
                acct: "sam".to_string(),
            },
        };
        assert!(status_to_snippet(status, "mastodon.social").is_none());
    }
}
