use crate::token::{RequestToken, RequestTokens};
use crate::traits::JobBackend;
use crate::{ClientConfig, ClientError, ProfileId, Recommendation, ScoringMode};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationSnapshot {
    pub profile: ProfileId,
    pub mode: ScoringMode,
    pub status: FetchStatus,
    pub results: Vec<Recommendation>,
}

/// A fetch that has been issued but not yet applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRecommendations {
    pub token: RequestToken,
    pub mode: ScoringMode,
}

#[derive(Debug)]
struct RecommendationState {
    mode: ScoringMode,
    status: FetchStatus,
    results: Vec<Recommendation>,
}

/// Ranked recommendations for one profile under a selectable scoring mode.
///
/// While a fetch is outstanding the previous list stays visible. Only the most
/// recently issued fetch may replace it; anything older is dropped on arrival.
pub struct RecommendationController<B> {
    backend: Arc<B>,
    profile: ProfileId,
    limit: usize,
    tokens: RequestTokens,
    state: Mutex<RecommendationState>,
}

impl<B> RecommendationController<B>
where
    B: JobBackend,
{
    pub fn new(backend: Arc<B>, profile: ProfileId, config: &ClientConfig) -> Self {
        Self {
            backend,
            profile,
            limit: config.recommendation_limit,
            tokens: RequestTokens::new(),
            state: Mutex::new(RecommendationState {
                mode: ScoringMode::default(),
                status: FetchStatus::Idle,
                results: Vec::new(),
            }),
        }
    }

    pub fn with_mode(self, mode: ScoringMode) -> Self {
        self.lock().mode = mode;
        self
    }

    pub fn profile(&self) -> &ProfileId {
        &self.profile
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn snapshot(&self) -> RecommendationSnapshot {
        let state = self.lock();
        RecommendationSnapshot {
            profile: self.profile.clone(),
            mode: state.mode,
            status: state.status.clone(),
            results: state.results.clone(),
        }
    }

    /// Records `mode` as current and issues a new token, retiring any fetch
    /// still in flight.
    pub fn begin(&self, mode: ScoringMode) -> PendingRecommendations {
        let mut state = self.lock();
        let token = self.tokens.issue();
        state.mode = mode;
        state.status = FetchStatus::Loading;
        debug!(profile = %self.profile, mode = %mode, token = token.value(), "recommendations requested");
        PendingRecommendations { token, mode }
    }

    /// Applies a fetch outcome. Returns `false` when the fetch was superseded
    /// and its outcome was discarded.
    pub fn apply(
        &self,
        pending: PendingRecommendations,
        outcome: Result<Vec<Recommendation>, ClientError>,
    ) -> bool {
        let mut state = self.lock();
        if !self.tokens.is_current(pending.token) {
            debug!(
                mode = %pending.mode,
                token = pending.token.value(),
                "discarding superseded recommendations"
            );
            return false;
        }

        match outcome {
            Ok(results) => {
                info!(mode = %pending.mode, count = results.len(), "recommendations loaded");
                state.results = results;
                state.status = FetchStatus::Ready;
            }
            Err(error) => {
                warn!(mode = %pending.mode, %error, "recommendation fetch failed");
                state.results.clear();
                state.status = FetchStatus::Failed(error.user_message());
            }
        }
        true
    }

    /// Initial entry: fetch for whatever mode is current.
    pub async fn load(&self) -> RecommendationSnapshot {
        let mode = self.lock().mode;
        self.fetch(mode).await
    }

    /// Re-fetches the current mode on explicit request.
    pub async fn refresh(&self) -> RecommendationSnapshot {
        self.load().await
    }

    pub async fn set_mode(&self, mode: ScoringMode) -> RecommendationSnapshot {
        let unchanged = {
            let state = self.lock();
            state.mode == mode && state.status != FetchStatus::Idle
        };
        if unchanged {
            return self.snapshot();
        }
        self.fetch(mode).await
    }

    async fn fetch(&self, mode: ScoringMode) -> RecommendationSnapshot {
        let pending = self.begin(mode);
        let outcome = self.backend.recommend(&self.profile, self.limit, mode).await;
        self.apply(pending, outcome);
        self.snapshot()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecommendationState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
