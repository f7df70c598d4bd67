use crate::traits::JobBackend;
use crate::{
    AnalyzeRequest, AnalyzeResponse, CandidatesResponse, ClientConfig, ClientError,
    DatasetCandidate, GapReport, Metrics, ProfileId, Recommendation, RecommendationsResponse,
    ScoringMode, StatusResponse,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, warn};
use url::Url;

pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn recommend_url(&self, profile: &ProfileId, k: usize, mode: ScoringMode) -> Url {
        let route = profile.route();
        let (key, value) = route.query_pair();
        let mut url = self.config.endpoint(route.recommend_path());
        url.query_pairs_mut()
            .append_pair(key, value)
            .append_pair("k", &k.to_string())
            .append_pair("mode", mode.as_query());
        url
    }

    pub fn gaps_url(&self, profile: &ProfileId, job_id: &str) -> Url {
        let (key, value) = profile.route().query_pair();
        let mut url = self.config.endpoint("/gaps");
        url.query_pairs_mut()
            .append_pair(key, value)
            .append_pair("job_id", job_id);
        url
    }

    pub fn eval_url(&self, mode: ScoringMode, k: usize) -> Url {
        let mut url = self.config.endpoint("/eval/offline");
        url.query_pairs_mut()
            .append_pair("mode", mode.as_query())
            .append_pair("k", &k.to_string());
        url
    }

    async fn get_json<R>(&self, url: Url) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let target = &url;
        self.with_retry(url.path(), move || async move {
            let response = self.client.get(target.clone()).send().await?;
            decode(response).await
        })
        .await
    }

    async fn with_retry<T, F, Fut>(&self, label: &str, mut call: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let policy = self.config.retry;
        let attempts = policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = policy.delay_before(attempt);
                warn!(
                    call = label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying backend call"
                );
                tokio::time::sleep(delay).await;
            }

            match call().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() && attempt + 1 < attempts => {
                    debug!(call = label, %error, "transient backend failure");
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

async fn decode<R>(response: Response) -> Result<R, ClientError>
where
    R: DeserializeOwned,
{
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::Backend {
            status: status.as_u16(),
            detail: error_detail(&body).unwrap_or_default(),
        });
    }

    Ok(serde_json::from_str(&body)?)
}

/// Pulls the `detail` message out of an error body, if the backend sent one.
pub fn error_detail(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    match parsed.get("detail")? {
        Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
        Value::String(_) | Value::Null => None,
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        other => Some(other.to_string()),
    }
}

fn analyze_form(request: AnalyzeRequest) -> Result<Form, ClientError> {
    let mut form = Form::new();
    if let Some(text) = request.text.filter(|text| !text.is_empty()) {
        form = form.text("text", text);
    }
    form = form.text("persona", request.persona.label());
    if let Some(upload) = request.file {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.kind.mime_type())?;
        form = form.part("file", part);
    }
    Ok(form)
}

#[async_trait]
impl JobBackend for HttpBackend {
    async fn analyze_profile(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse, ClientError> {
        let url = self.config.endpoint("/profile/analyze");
        debug!(persona = %request.persona, has_file = request.file.is_some(), "submitting profile");
        let response = self
            .client
            .post(url)
            .multipart(analyze_form(request)?)
            .send()
            .await?;
        decode(response).await
    }

    async fn recommend(
        &self,
        profile: &ProfileId,
        k: usize,
        mode: ScoringMode,
    ) -> Result<Vec<Recommendation>, ClientError> {
        let parsed: RecommendationsResponse = self.get_json(self.recommend_url(profile, k, mode)).await?;
        Ok(parsed.results)
    }

    async fn gaps(&self, profile: &ProfileId, job_id: &str) -> Result<GapReport, ClientError> {
        self.get_json(self.gaps_url(profile, job_id)).await
    }

    async fn list_candidates(&self) -> Result<Vec<DatasetCandidate>, ClientError> {
        let parsed: CandidatesResponse = self.get_json(self.config.endpoint("/candidates")).await?;
        Ok(parsed.candidates)
    }

    async fn offline_eval(&self, mode: ScoringMode, k: usize) -> Result<Metrics, ClientError> {
        let raw: serde_json::Map<String, Value> = self.get_json(self.eval_url(mode, k)).await?;
        Ok(raw
            .into_iter()
            .filter_map(|(name, value)| value.as_f64().map(|score| (name, score)))
            .collect())
    }

    async fn health(&self) -> Result<String, ClientError> {
        let parsed: StatusResponse = self.get_json(self.config.endpoint("/health")).await?;
        Ok(parsed.status)
    }

    async fn reload(&self) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.config.endpoint("/ingest/reload"))
            .send()
            .await?;
        let parsed: StatusResponse = decode(response).await?;
        Ok(parsed.status)
    }
}
