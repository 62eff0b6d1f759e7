use askama::Template;
use async_trait::async_trait;
use common::models::{AnalysisResult, InputMissing, validate_inputs};
use log::debug;
use reqwest::{Client, StatusCode, Url};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Template)]
#[template(path = "prompt.txt")]
struct PromptTemplate<'a> {
    schema: &'a str,
    query: &'a str,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no api key configured for the llm provider")]
    MissingApiKey,
    #[error("invalid llm base url `{0}`: {1}")]
    InvalidBaseUrl(String, String),
}

/// Coarse classification handed to callers; the variants of [`AnalysisError`]
/// only matter for logging.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    InputMissing,
    RequestFailed,
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    InputMissing(#[from] InputMissing),
    #[error("error while rendering prompt: {0}")]
    Prompt(#[from] askama::Error),
    #[error("error while sending llm request: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected code {0}: {1}")]
    Upstream(StatusCode, String),
    #[error("error while parsing llm response: {0}")]
    InvalidBody(reqwest::Error),
    #[error("error while processing llm response: choices[0].message.content not found")]
    MissingContent,
    #[error("llm returned a malformed analysis: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::InputMissing(_) => ErrorKind::InputMissing,
            _ => ErrorKind::RequestFailed,
        }
    }
}

/// Turns a schema and a query into a verdict with exactly one round trip to
/// whatever judges the query.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, schema: &str, query: &str) -> Result<AnalysisResult, AnalysisError>;
}

/// Sends schema and query to an OpenAI compatible chat completions endpoint
/// and decodes the constrained JSON answer into an [`AnalysisResult`].
#[derive(Debug)]
pub struct LlmAnalyzer {
    client: Client,
    completions_url: Url,
    settings: LlmSettings,
}

impl LlmAnalyzer {
    pub fn new(settings: LlmSettings) -> Result<Self, ConfigError> {
        if settings.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let completions_url = format!(
            "{}/chat/completions",
            settings.base_url.trim_end_matches('/')
        );
        let completions_url = Url::parse(&completions_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(settings.base_url.clone(), e.to_string()))?;

        Ok(LlmAnalyzer {
            client: Client::new(),
            completions_url,
            settings,
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }
}

#[async_trait]
impl Analyzer for LlmAnalyzer {
    async fn analyze(&self, schema: &str, query: &str) -> Result<AnalysisResult, AnalysisError> {
        validate_inputs(schema, query)?;
        let prompt = PromptTemplate { schema, query }.render()?;

        debug!(
            "requesting analysis from {} using model {}",
            self.completions_url, self.settings.model
        );
        let response = self
            .client
            .post(self.completions_url.clone())
            .bearer_auth(&self.settings.api_key)
            .json(&json!({
                "model": self.settings.model,
                "messages": vec![json!({"role": "user", "content": prompt})],
                "temperature": self.settings.temperature,
                "response_format": response_format(),
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Upstream(
                status,
                response.text().await.unwrap_or_default(),
            ));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(AnalysisError::InvalidBody)?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .ok_or(AnalysisError::MissingContent)?;

        Ok(serde_json::from_str(content)?)
    }
}

fn response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "sql_analysis",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "isBuggy": {
                        "type": "boolean",
                        "description": "A boolean indicating if a bug was found in the SQL query.",
                    },
                    "bugDescription": {
                        "type": "string",
                        "description": "A concise explanation of the bug. If no bug, explain why the query is correct according to the schema.",
                    },
                    "suggestedFix": {
                        "type": "string",
                        "description": "The corrected SQL query. If no bug was found, this should be the original query.",
                    },
                },
                "required": ["isBuggy", "bugDescription", "suggestedFix"],
                "additionalProperties": false,
            },
        },
    })
}
