use common::models::{AnalysisResult, AnalyzeRequest, ErrorResponse};
use reqwest::{Client, StatusCode, Url};

/// Anything able to turn a request into a verdict.
pub trait AnalysisService {
    fn analyze(
        &self,
        request: AnalyzeRequest,
    ) -> impl Future<Output = Result<AnalysisResult, anyhow::Error>>;
}

#[derive(Debug)]
pub struct BugfinderClient {
    client: Client,
    analyze_url: Url,
}

impl BugfinderClient {
    pub fn new(base_url: &str) -> Result<Self, anyhow::Error> {
        Ok(BugfinderClient {
            client: Client::new(),
            analyze_url: format!("{}/api/v1/analyze", base_url.trim_end_matches('/')).parse()?,
        })
    }

    async fn post_analysis(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<AnalysisResult, ClientError> {
        let res = self
            .client
            .post(self.analyze_url.clone())
            .json(request)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            // the service answers errors with an ErrorResponse, proxies in between may not
            let message = match res.json::<ErrorResponse>().await {
                Ok(body) => body.message,
                Err(_) => status.canonical_reason().unwrap_or_default().to_string(),
            };
            return Err(ClientError::Rejected(status, message));
        }

        res.json().await.map_err(ClientError::InvalidResult)
    }
}

impl AnalysisService for BugfinderClient {
    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResult, anyhow::Error> {
        Ok(self.post_analysis(&request).await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("could not reach the bugfinder service: {0}")]
    Transport(reqwest::Error),
    #[error("bugfinder service answered {0}: {1}")]
    Rejected(StatusCode, String),
    #[error("bugfinder service returned an invalid analysis: {0}")]
    InvalidResult(reqwest::Error),
}
