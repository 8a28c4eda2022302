//! Hacker News comment collector (Algolia search API).

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::error::AnalysisError;
use crate::types::{Platform, Snippet};

use super::strip_html;

const HITS_PER_PAGE: usize = 30;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    comment_text: Option<String>,
    author: Option<String>,
    #[serde(rename = "objectID")]
    object_id: String,
}

/// Search Hacker News comments mentioning the subject.
///
/// # Errors
///
/// Returns [`AnalysisError::Http`] on network failure or
/// [`AnalysisError::Source`] if the response body does not parse.
pub(crate) async fn fetch_comments(
    client: &reqwest::Client,
    subject: &str,
) -> Result<Vec<Snippet>, AnalysisError> {
    let encoded = utf8_percent_encode(subject, NON_ALPHANUMERIC).to_string();
    let url = format!(
        "https://hn.algolia.com/api/v1/search?query={encoded}&tags=comment&hitsPerPage={HITS_PER_PAGE}"
    );

    let response: SearchResponse = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .map_err(|e| AnalysisError::Source(format!("Hacker News response parse error: {e}")))?;

    Ok(response.hits.into_iter().filter_map(hit_to_snippet).collect())
}

fn hit_to_snippet(hit: Hit) -> Option<Snippet> {
    let text = strip_html(&hit.comment_text?);
    if text.is_empty() {
        return None;
    }
    Some(Snippet {
        text,
        source_label: "news.ycombinator.com".to_string(),
        author: hit.author,
        url: Some(format!(
            "https://news.ycombinator.com/item?id={}",
            hit.object_id
        )),
        platform: Platform::HackerNews,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "hits": [
            {
                "comment_text": "I have been using this for a year and it is <i>great</i>.",
                "author": "pg",
                "objectID": "123456"
            },
            {
                "comment_text": null,
                "author": "ghost",
                "objectID": "654321"
            }
        ]
    }"#;

    #[test]
    fn parses_hits_into_snippets() {
        let parsed: SearchResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        let snippets: Vec<Snippet> = parsed.hits.into_iter().filter_map(hit_to_snippet).collect();
        assert_eq!(snippets.len(), 1, "hit without comment text is skipped");
        assert_eq!(snippets[0].platform, Platform::HackerNews);
        assert_eq!(snippets[0].author.as_deref(), Some("pg"));
        assert_eq!(
            snippets[0].url.as_deref(),
            Some("https://news.ycombinator.com/item?id=123456")
        );
        assert!(!snippets[0].text.contains('<'), "html stripped");
    }
}
