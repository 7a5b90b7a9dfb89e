//! Form label translation
//!
//! The translation service sits behind the [`Translate`] trait. The driver
//! builds one [`LabelTranslator`] per run and every label goes through it;
//! service failures degrade to the untranslated text.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Arguments;

const GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised by a translation service
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// A text translation service with fixed source and target languages
pub trait Translate {
    fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

/// Google Translate's public web endpoint over a blocking HTTP client
pub struct GoogleTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
    source: String,
    target: String,
}

impl GoogleTranslator {
    pub fn new(source: &str, target: &str) -> Result<Self, TranslateError> {
        Self::with_endpoint(GOOGLE_ENDPOINT, source, target)
    }

    /// Point the translator at another endpoint speaking the same protocol
    pub fn with_endpoint(endpoint: &str, source: &str, target: &str) -> Result<Self, TranslateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        })
    }
}

impl Translate for GoogleTranslator {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source.as_str()),
                ("tl", self.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()?
            .error_for_status()?
            .text()?;
        parse_response(&body)
    }
}

/// Join the translated segments of a `translate_a/single` response
fn parse_response(body: &str) -> Result<String, TranslateError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let segments = value
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TranslateError::UnexpectedResponse(truncate(body)))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|s| s.as_str()))
        .collect();

    if translated.is_empty() {
        return Err(TranslateError::UnexpectedResponse(truncate(body)));
    }
    Ok(translated)
}

fn truncate(body: &str) -> String {
    body.chars().take(80).collect()
}

/// Translates form labels, falling back to the original text on failure
pub struct LabelTranslator {
    service: Option<Box<dyn Translate>>,
}

impl LabelTranslator {
    /// A translator that returns every label unchanged
    pub fn disabled() -> Self {
        Self { service: None }
    }

    pub fn new(service: Box<dyn Translate>) -> Self {
        Self {
            service: Some(service),
        }
    }

    /// Build the translator a run asks for. No service is constructed when
    /// no target language is set.
    pub fn for_arguments(arguments: &Arguments) -> Self {
        let Some(target) = &arguments.translate_labels else {
            return Self::disabled();
        };

        match GoogleTranslator::new(&arguments.label_original_language, target) {
            Ok(service) => {
                debug!(
                    "Translating labels {} -> {}",
                    arguments.label_original_language, target
                );
                Self::new(Box::new(service))
            }
            Err(err) => {
                warn!("Label translation disabled: {}", err);
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    pub fn translate(&self, text: &str) -> String {
        let Some(service) = &self.service else {
            return text.to_string();
        };

        match service.translate(text) {
            Ok(translated) => translated,
            Err(err) => {
                warn!("Could not translate label '{}': {}", text, err);
                text.to_string()
            }
        }
    }
}
