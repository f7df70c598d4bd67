use crate::traits::JobBackend;
use crate::{
    ClientConfig, GapOverlayController, OverlayState, ProfileId, RecommendationController,
    RecommendationSnapshot, ScoringMode, View,
};
use std::sync::Arc;

/// The candidate view: recommendations plus the gap overlay, both bound to
/// the same decoded profile so they always address the same entity.
pub struct CandidateSession<B> {
    recommendations: RecommendationController<B>,
    gaps: GapOverlayController<B>,
}

impl<B> CandidateSession<B>
where
    B: JobBackend,
{
    pub fn new(backend: Arc<B>, profile: ProfileId, config: &ClientConfig) -> Self {
        Self {
            recommendations: RecommendationController::new(
                Arc::clone(&backend),
                profile.clone(),
                config,
            ),
            gaps: GapOverlayController::new(backend, profile),
        }
    }

    pub fn profile(&self) -> &ProfileId {
        self.recommendations.profile()
    }

    pub fn view(&self) -> View {
        View::Candidate(self.profile().clone())
    }

    pub fn recommendations(&self) -> &RecommendationController<B> {
        &self.recommendations
    }

    pub fn gaps(&self) -> &GapOverlayController<B> {
        &self.gaps
    }

    pub async fn enter(&self) -> RecommendationSnapshot {
        self.recommendations.load().await
    }

    /// Switching modes closes any open overlay, since it described a row of
    /// the list being replaced.
    pub async fn set_mode(&self, mode: ScoringMode) -> RecommendationSnapshot {
        if self.recommendations.snapshot().mode != mode {
            self.gaps.close();
        }
        self.recommendations.set_mode(mode).await
    }

    /// Opens the gap overlay for the row at `index` of the current list.
    pub async fn open_gaps_at(&self, index: usize) -> OverlayState {
        let snapshot = self.recommendations.snapshot();
        match snapshot.results.get(index) {
            Some(recommendation) => self.gaps.open_for(recommendation).await,
            None => self.gaps.state(),
        }
    }
}
