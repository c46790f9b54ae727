//! HTTP validator talking to `POST /api/quiz`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use flagquiz_core::api::{ErrorResponse, SubmitRequest, SubmitResponse, SUBMIT_PATH};
use flagquiz_core::error::{
    PayloadDefect, ValidationError, BAD_REQUEST, INVALID_PAYLOAD, UNKNOWN_QUESTION,
};
use flagquiz_core::model::QuestionId;
use flagquiz_core::traits::AnswerValidator;

use crate::error::ClientError;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Validator backed by a remote flagquiz service.
pub struct HttpValidator {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpValidator {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let timeout = timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }
}

/// Map a documented `400` error string back to the rejection it stands for.
fn rejection_from(id: QuestionId, body: &ErrorResponse) -> Option<ValidationError> {
    match body.error.as_str() {
        UNKNOWN_QUESTION => Some(ValidationError::UnknownQuestion(id)),
        INVALID_PAYLOAD => Some(ValidationError::InvalidPayload(PayloadDefect::IdNotInteger)),
        BAD_REQUEST => Some(ValidationError::InvalidPayload(PayloadDefect::MalformedJson)),
        _ => None,
    }
}

#[async_trait]
impl AnswerValidator for HttpValidator {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, answer), fields(base_url = %self.base_url))]
    async fn validate(&self, id: QuestionId, answer: &str) -> anyhow::Result<bool> {
        let body = SubmitRequest {
            id,
            answer: answer.to_string(),
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, SUBMIT_PATH))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    ClientError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 400 {
            let text = response.text().await.unwrap_or_default();
            let rejection = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|err| rejection_from(id, &err));
            return match rejection {
                Some(rejection) => Err(rejection.into()),
                None => Err(ClientError::UnexpectedStatus {
                    status,
                    message: text,
                }
                .into()),
            };
        }
        if status != 200 {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::UnexpectedStatus {
                status,
                message: text,
            }
            .into());
        }

        let verdict: SubmitResponse = response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        tracing::debug!(question_id = id, correct = verdict.correct, "verdict received");
        Ok(verdict.correct)
    }
}
