//! Reddit search collector (client-credentials OAuth).

use std::time::Duration;

use serde::Deserialize;

use crate::error::AnalysisError;
use crate::types::{AnalysisConfig, Platform, Snippet};

const PAGE_LIMIT: usize = 50;
const MAX_SNIPPETS: usize = 60;

/// Reddit OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: Option<String>,
    selftext: Option<String>,
    author: Option<String>,
    permalink: Option<String>,
    subreddit: Option<String>,
}

/// Search Reddit for posts mentioning the subject.
///
/// Skipped (empty result) when Reddit credentials are unconfigured.
///
/// # Errors
///
/// Returns [`AnalysisError::Reddit`] if the token exchange or search fails.
pub(crate) async fn fetch_mentions(
    config: &AnalysisConfig,
    subject: &str,
) -> Result<Vec<Snippet>, AnalysisError> {
    let (Some(client_id), Some(client_secret)) =
        (&config.reddit_client_id, &config.reddit_client_secret)
    else {
        tracing::debug!("Reddit credentials unconfigured; skipping source");
        return Ok(Vec::new());
    };

    // oauth.reddit.com requires its own client: token exchange uses basic
    // auth and the search call carries the bearer token.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| AnalysisError::Reddit(format!("failed to build HTTP client: {e}")))?;

    let token = fetch_token(&client, client_id, client_secret, &config.user_agent).await?;
    search_posts(&client, &token, &config.user_agent, subject).await
}

async fn fetch_token(
    client: &reqwest::Client,
    client_id: &str,
    client_secret: &str,
    user_agent: &str,
) -> Result<String, AnalysisError> {
    let response = client
        .post("https://www.reddit.com/api/v1/access_token")
        .header("User-Agent", user_agent)
        .basic_auth(client_id, Some(client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AnalysisError::Reddit(format!(
            "token exchange failed with status {}",
            response.status()
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| AnalysisError::Reddit(format!("token parse error: {e}")))?;
    Ok(token.access_token)
}

async fn search_posts(
    client: &reqwest::Client,
    token: &str,
    user_agent: &str,
    subject: &str,
) -> Result<Vec<Snippet>, AnalysisError> {
    let params: Vec<(&str, String)> = vec![
        ("q", format!("\"{subject}\"")),
        ("sort", "relevance".to_string()),
        ("limit", PAGE_LIMIT.to_string()),
        ("type", "link".to_string()),
    ];

    let response = client
        .get("https://oauth.reddit.com/search")
        .header("Authorization", format!("Bearer {token}"))
        .header("User-Agent", user_agent)
        .query(&params)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AnalysisError::Reddit(format!(
            "search failed with status {}",
            response.status()
        )));
    }

    let listing: Listing = response
        .json()
        .await
        .map_err(|e| AnalysisError::Reddit(format!("response parse error: {e}")))?;

    Ok(listing
        .data
        .children
        .into_iter()
        .filter_map(|post| post_to_snippet(post.data))
        .take(MAX_SNIPPETS)
        .collect())
}

fn post_to_snippet(post: PostData) -> Option<Snippet> {
    let title = post.title.unwrap_or_default();
    let selftext = post.selftext.unwrap_or_default();
    let text = if selftext.is_empty() {
        title
    } else if title.is_empty() {
        selftext
    } else {
        format!("{title} {selftext}")
    };
    if text.trim().is_empty() {
        return None;
    }

    let source_label = post
        .subreddit
        .map_or_else(|| "reddit.com".to_string(), |sub| format!("r/{sub}"));

    Some(Snippet {
        text,
        source_label,
        author: post.author,
        url: post
            .permalink
            .map(|p| format!("https://www.reddit.com{p}")),
        platform: Platform::Reddit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LISTING: &str = r#"{
        "data": {
            "children": [
                {
                    "data": {
                        "title": "Fizzy Cola is back",
                        "selftext": "Tried the new recipe and it is actually good.",
                        "author": "soda_fan",
                        "permalink": "/r/soda/comments/abc/fizzy_cola_is_back/",
                        "subreddit": "soda"
                    }
                },
                {
                    "data": {
                        "title": "",
                        "selftext": "",
                        "author": "lurker",
                        "permalink": "/r/soda/comments/def/",
                        "subreddit": "soda"
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn parses_listing_into_snippets() {
        let listing: Listing = serde_json::from_str(SAMPLE_LISTING).unwrap();
        let snippets: Vec<Snippet> = listing
            .data
            .children
            .into_iter()
            .filter_map(|post| post_to_snippet(post.data))
            .collect();

        assert_eq!(snippets.len(), 1, "empty post is skipped");
        assert_eq!(snippets[0].source_label, "r/soda");
        assert_eq!(snippets[0].author.as_deref(), Some("soda_fan"));
        assert_eq!(
            snippets[0].url.as_deref(),
            Some("https://www.reddit.com/r/soda/comments/abc/fizzy_cola_is_back/")
        );
        assert!(snippets[0].text.starts_with("Fizzy Cola is back"));
    }

    #[tokio::test]
    async fn unconfigured_credentials_skip_the_source() {
        let config = AnalysisConfig {
            user_agent: "pulsecheck-test/0.1".to_string(),
            request_timeout_secs: 5,
            classifier_base_url: None,
            classifier_api_key: None,
            classifier_timeout_secs: 5,
            reddit_client_id: None,
            reddit_client_secret: None,
            mastodon_instance: "https://mastodon.social".to_string(),
        };
        let snippets = fetch_mentions(&config, "Fizzy Cola").await.unwrap();
        assert!(snippets.is_empty());
    }
}
