use std::time::Duration;

use anyhow::Context;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};

use crate::config::Config;
use crate::error::HarnessError;
use crate::submission::Submission;

/// Budget for upstream health probes, separate from the relay timeout
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of one relayed OCR request
#[derive(Debug, Clone)]
pub enum UpstreamOutcome {
    /// No response obtained from the OCR service
    Unreachable { detail: String },
    /// The service replied; interpretation depends on status and format
    Replied { status: u16, body: String },
}

/// Relays submissions to the configured OCR endpoint
pub struct OcrRelay {
    http: Client,
    endpoint: Url,
}

impl OcrRelay {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&config.ocr_url)
            .with_context(|| format!("Invalid OCR endpoint URL: {}", config.ocr_url))?;
        let http = Client::builder()
            .timeout(config.ocr_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, endpoint })
    }

    /// The OCR endpoint with the submission's query parameters applied.
    /// `enhance` is appended only when an enhancement was selected.
    pub fn target_url(&self, submission: &Submission) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("profile", submission.profile.as_str());
            pairs.append_pair("output_format", submission.format.as_str());
            if let Some(enhance) = submission.enhance {
                pairs.append_pair("enhance", enhance.as_str());
            }
        }
        url
    }

    /// Relay one submission. Transport failures at any point, including while
    /// reading the body, fold into `UpstreamOutcome::Unreachable`.
    pub async fn submit(&self, submission: &Submission) -> Result<UpstreamOutcome, HarnessError> {
        let part = Part::bytes(submission.data.to_vec())
            .file_name(submission.file_name.clone())
            .mime_str(&submission.content_type)
            .map_err(|e| {
                HarnessError::InvalidRequest(format!(
                    "Unusable content type {:?}: {}",
                    submission.content_type, e
                ))
            })?;
        let form = Form::new().part("file", part);

        let response = match self
            .http
            .post(self.target_url(submission))
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(unreachable_outcome(e)),
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => Ok(UpstreamOutcome::Replied {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            }),
            Err(e) => Ok(unreachable_outcome(e)),
        }
    }

    /// Whether the service's sibling `health` endpoint answers with success
    pub async fn upstream_reachable(&self) -> bool {
        let url = match self.endpoint.join("health") {
            Ok(url) => url,
            Err(_) => return false,
        };
        match self
            .http
            .get(url)
            .timeout(HEALTH_PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

fn unreachable_outcome(e: reqwest::Error) -> UpstreamOutcome {
    UpstreamOutcome::Unreachable {
        detail: e.to_string(),
    }
}
