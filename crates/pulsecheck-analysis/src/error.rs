use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("classifier error: {0}")]
    Classifier(String),

    #[error("Reddit API error: {0}")]
    Reddit(String),

    #[error("source error: {0}")]
    Source(String),
}
