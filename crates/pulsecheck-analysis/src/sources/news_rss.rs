//! Google News RSS collector.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::AnalysisError;
use crate::types::{Platform, Snippet};

use super::strip_html;

/// Fetch news items mentioning a subject from Google News RSS.
///
/// Each `<item>` becomes one [`Snippet`]: title plus stripped description,
/// with the publisher name from `<source>` as the provenance label.
///
/// # Errors
///
/// Returns [`AnalysisError::Http`] on network failure or
/// [`AnalysisError::Xml`] on malformed RSS.
pub(crate) async fn fetch_news(
    client: &reqwest::Client,
    subject: &str,
) -> Result<Vec<Snippet>, AnalysisError> {
    let encoded = utf8_percent_encode(subject, NON_ALPHANUMERIC).to_string();
    let url = format!("https://news.google.com/rss/search?q={encoded}&hl=en-US&gl=US&ceid=US:en");

    let body = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_news_feed(&body)
}

/// Parse an RSS feed XML body into snippets.
///
/// # Errors
///
/// Returns [`AnalysisError::Xml`] if the XML is malformed.
pub(crate) fn parse_news_feed(xml: &str) -> Result<Vec<Snippet>, AnalysisError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut snippets = Vec::new();
    let mut current_title = String::new();
    let mut current_link = String::new();
    let mut current_description = String::new();
    let mut current_source = String::new();
    let mut in_item = false;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "item" {
                    in_item = true;
                    current_title.clear();
                    current_link.clear();
                    current_description.clear();
                    current_source.clear();
                } else {
                    current_tag = name;
                }
            }
            Ok(Event::End(e)) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "item" && in_item {
                    in_item = false;
                    if let Some(snippet) = build_snippet(
                        &current_title,
                        &current_description,
                        &current_link,
                        &current_source,
                    ) {
                        snippets.push(snippet);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    assign_field(
                        &current_tag,
                        text,
                        &mut current_title,
                        &mut current_link,
                        &mut current_description,
                        &mut current_source,
                    );
                }
            }
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    assign_field(
                        &current_tag,
                        text,
                        &mut current_title,
                        &mut current_link,
                        &mut current_description,
                        &mut current_source,
                    );
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(AnalysisError::Xml(e)),
            _ => {}
        }
    }

    Ok(snippets)
}

fn assign_field(
    tag: &str,
    text: String,
    title: &mut String,
    link: &mut String,
    description: &mut String,
    source: &mut String,
) {
    match tag {
        "title" => *title = text,
        "link" => *link = text,
        "description" => *description = strip_html(&text),
        "source" => *source = text,
        _ => {}
    }
}

fn build_snippet(title: &str, description: &str, link: &str, source: &str) -> Option<Snippet> {
    if link.is_empty() {
        return None;
    }
    let text = if description.is_empty() {
        title.to_string()
    } else {
        format!("{title} {description}")
    };
    if text.trim().is_empty() {
        return None;
    }
    let source_label = if source.is_empty() {
        "news.google.com".to_string()
    } else {
        source.to_string()
    };
    Some(Snippet {
        text,
        source_label,
        author: None,
        url: Some(link.to_string()),
        platform: Platform::News,
    })
}
