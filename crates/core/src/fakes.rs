use crate::traits::JobBackend;
use crate::{
    AnalyzeRequest, AnalyzeResponse, ClientError, DatasetCandidate, GapReport, Metrics,
    ProfileId, Recommendation, ScoreBreakdown, ScoringMode,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory backend for workflow tests. Delays use tokio time so tests can
/// run with a paused clock.
#[derive(Default)]
pub(crate) struct FakeBackend {
    recommendations: HashMap<ScoringMode, Vec<Recommendation>>,
    recommend_delays: HashMap<ScoringMode, Duration>,
    failing_recommend: Vec<ScoringMode>,
    gap_reports: HashMap<String, GapReport>,
    gap_delays: HashMap<String, Duration>,
    failing_gaps: Vec<String>,
    metrics: HashMap<ScoringMode, Metrics>,
    eval_delays: HashMap<ScoringMode, Duration>,
    failing_eval: Vec<ScoringMode>,
    candidates: Option<Vec<DatasetCandidate>>,
    analyze_result: Option<Result<String, (u16, String)>>,
    analyze_delay: Duration,
    calls: Mutex<Vec<String>>,
    analyze_requests: Mutex<Vec<AnalyzeRequest>>,
}

pub(crate) fn recommendation(job_id: &str, score: f64) -> Recommendation {
    Recommendation {
        job_id: (!job_id.is_empty()).then(|| job_id.to_string()),
        title: format!("Role {job_id}"),
        experience_level: None,
        score,
        breakdown: ScoreBreakdown {
            embed: score,
            skill: score,
            exp: 1.0,
            kw: 0.0,
        },
    }
}

pub(crate) fn metrics(value: f64) -> Metrics {
    [
        ("precision@k".to_string(), value),
        ("recall@k".to_string(), value),
        ("ndcg@k".to_string(), value),
    ]
    .into_iter()
    .collect()
}

impl FakeBackend {
    pub(crate) fn with_recommendations(mut self, mode: ScoringMode, results: Vec<Recommendation>) -> Self {
        self.recommendations.insert(mode, results);
        self
    }

    pub(crate) fn with_delay(mut self, mode: ScoringMode, delay: Duration) -> Self {
        self.recommend_delays.insert(mode, delay);
        self
    }

    pub(crate) fn failing_recommendations(mut self, mode: ScoringMode) -> Self {
        self.failing_recommend.push(mode);
        self
    }

    pub(crate) fn with_gaps(mut self, job_id: &str, report: GapReport) -> Self {
        self.gap_reports.insert(job_id.to_string(), report);
        self
    }

    pub(crate) fn with_gap_delay(mut self, job_id: &str, delay: Duration) -> Self {
        self.gap_delays.insert(job_id.to_string(), delay);
        self
    }

    pub(crate) fn failing_gaps(mut self, job_id: &str) -> Self {
        self.failing_gaps.push(job_id.to_string());
        self
    }

    pub(crate) fn with_metrics(mut self, mode: ScoringMode, values: Metrics) -> Self {
        self.metrics.insert(mode, values);
        self
    }

    pub(crate) fn with_eval_delay(mut self, mode: ScoringMode, delay: Duration) -> Self {
        self.eval_delays.insert(mode, delay);
        self
    }

    pub(crate) fn failing_eval(mut self, mode: ScoringMode) -> Self {
        self.failing_eval.push(mode);
        self
    }

    pub(crate) fn with_candidates(mut self, candidates: Vec<DatasetCandidate>) -> Self {
        self.candidates = Some(candidates);
        self
    }

    pub(crate) fn analyze_succeeds(mut self, profile_id: &str) -> Self {
        self.analyze_result = Some(Ok(profile_id.to_string()));
        self
    }

    pub(crate) fn analyze_fails(mut self, status: u16, detail: &str) -> Self {
        self.analyze_result = Some(Err((status, detail.to_string())));
        self
    }

    pub(crate) fn with_analyze_delay(mut self, delay: Duration) -> Self {
        self.analyze_delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub(crate) fn analyze_requests(&self) -> Vec<AnalyzeRequest> {
        self.analyze_requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).push(call);
    }
}

fn unavailable(what: &str) -> ClientError {
    ClientError::Backend {
        status: 503,
        detail: format!("{what} unavailable"),
    }
}

async fn pause(delay: Option<&Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(*delay).await;
    }
}

#[async_trait]
impl JobBackend for FakeBackend {
    async fn analyze_profile(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse, ClientError> {
        self.record(format!("analyze persona={}", request.persona));
        self.analyze_requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(request.clone());
        if !self.analyze_delay.is_zero() {
            tokio::time::sleep(self.analyze_delay).await;
        }

        match &self.analyze_result {
            Some(Ok(profile_id)) => Ok(AnalyzeResponse {
                profile_id: profile_id.clone(),
                summary: None,
                skills: Vec::new(),
                persona: Some(request.persona.label().to_string()),
            }),
            Some(Err((status, detail))) => Err(ClientError::Backend {
                status: *status,
                detail: detail.clone(),
            }),
            None => Err(unavailable("analysis")),
        }
    }

    async fn recommend(
        &self,
        profile: &ProfileId,
        k: usize,
        mode: ScoringMode,
    ) -> Result<Vec<Recommendation>, ClientError> {
        self.record(format!("recommend {profile} k={k} mode={mode}"));
        pause(self.recommend_delays.get(&mode)).await;
        if self.failing_recommend.contains(&mode) {
            return Err(unavailable("ranking"));
        }
        Ok(self.recommendations.get(&mode).cloned().unwrap_or_default())
    }

    async fn gaps(&self, profile: &ProfileId, job_id: &str) -> Result<GapReport, ClientError> {
        self.record(format!("gaps {profile} job={job_id}"));
        pause(self.gap_delays.get(job_id)).await;
        if self.failing_gaps.iter().any(|failing| failing == job_id) {
            return Err(unavailable("gap analysis"));
        }
        Ok(self.gap_reports.get(job_id).cloned().unwrap_or_default())
    }

    async fn list_candidates(&self) -> Result<Vec<DatasetCandidate>, ClientError> {
        self.record("candidates".to_string());
        self.candidates.clone().ok_or_else(|| unavailable("dataset"))
    }

    async fn offline_eval(&self, mode: ScoringMode, k: usize) -> Result<Metrics, ClientError> {
        self.record(format!("eval mode={mode} k={k}"));
        pause(self.eval_delays.get(&mode)).await;
        if self.failing_eval.contains(&mode) {
            return Err(unavailable("evaluation"));
        }
        Ok(self.metrics.get(&mode).cloned().unwrap_or_default())
    }

    async fn health(&self) -> Result<String, ClientError> {
        self.record("health".to_string());
        Ok("ok".to_string())
    }

    async fn reload(&self) -> Result<String, ClientError> {
        self.record("reload".to_string());
        Ok("reloaded".to_string())
    }
}
