use crate::{
    AnalyzeRequest, AnalyzeResponse, ClientError, DatasetCandidate, GapReport, Metrics,
    ProfileId, Recommendation, ScoringMode,
};
use async_trait::async_trait;

/// The remote recommendation service, as seen by the client workflows.
///
/// Implementations resolve a [`ProfileId`] to the right call family through
/// [`ProfileId::route`] so recommendation and gap calls never disagree about
/// which profile they refer to.
#[async_trait]
pub trait JobBackend: Send + Sync {
    async fn analyze_profile(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse, ClientError>;

    async fn recommend(
        &self,
        profile: &ProfileId,
        k: usize,
        mode: ScoringMode,
    ) -> Result<Vec<Recommendation>, ClientError>;

    async fn gaps(&self, profile: &ProfileId, job_id: &str) -> Result<GapReport, ClientError>;

    async fn list_candidates(&self) -> Result<Vec<DatasetCandidate>, ClientError>;

    async fn offline_eval(&self, mode: ScoringMode, k: usize) -> Result<Metrics, ClientError>;

    async fn health(&self) -> Result<String, ClientError>;

    async fn reload(&self) -> Result<String, ClientError>;
}
