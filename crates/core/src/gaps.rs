use crate::token::{RequestToken, RequestTokens};
use crate::traits::JobBackend;
use crate::{ClientError, CourseSuggestion, GapReport, ProfileId, Recommendation};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Display cap for the "present" skills list.
pub const PRESENT_DISPLAY_CAP: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayState {
    Closed,
    Loading { job_id: String },
    Open { job_id: String, report: GapReport },
    Failed { job_id: String, message: String },
}

impl OverlayState {
    pub fn job_id(&self) -> Option<&str> {
        match self {
            OverlayState::Closed => None,
            OverlayState::Loading { job_id }
            | OverlayState::Open { job_id, .. }
            | OverlayState::Failed { job_id, .. } => Some(job_id),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, OverlayState::Closed)
    }
}

/// Raised instead of opening the overlay when upstream data has no job id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingJobId;

impl fmt::Display for MissingJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Unable to open gaps: missing job id")
    }
}

impl std::error::Error for MissingJobId {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGaps {
    pub token: RequestToken,
    pub job_id: String,
}

#[derive(Debug)]
struct OverlaySlot {
    state: OverlayState,
    notice: Option<String>,
}

/// Modal skill-gap view for one job at a time. Reports are never cached: a
/// close discards the report and a reopen always refetches.
pub struct GapOverlayController<B> {
    backend: Arc<B>,
    profile: ProfileId,
    tokens: RequestTokens,
    slot: Mutex<OverlaySlot>,
}

impl<B> GapOverlayController<B>
where
    B: JobBackend,
{
    pub fn new(backend: Arc<B>, profile: ProfileId) -> Self {
        Self {
            backend,
            profile,
            tokens: RequestTokens::new(),
            slot: Mutex::new(OverlaySlot {
                state: OverlayState::Closed,
                notice: None,
            }),
        }
    }

    pub fn state(&self) -> OverlayState {
        self.lock().state.clone()
    }

    /// Takes the pending user notice, if any.
    pub fn take_notice(&self) -> Option<String> {
        self.lock().notice.take()
    }

    pub fn view(&self) -> Option<GapView> {
        match &self.lock().state {
            OverlayState::Open { job_id, report } => Some(GapView::from_report(job_id, report)),
            _ => None,
        }
    }

    /// Moves to `Loading(job_id)`, replacing whatever overlay was showing.
    pub fn begin_open(&self, job_id: Option<&str>) -> Result<PendingGaps, MissingJobId> {
        let mut slot = self.lock();
        let job_id = match job_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(job_id) => job_id.to_string(),
            None => {
                warn!(profile = %self.profile, "gap view requested for a job without id");
                slot.notice = Some(MissingJobId.to_string());
                return Err(MissingJobId);
            }
        };

        let token = self.tokens.issue();
        if let Some(previous) = slot.state.job_id() {
            debug!(previous, next = %job_id, "replacing open gap overlay");
        }
        slot.state = OverlayState::Loading {
            job_id: job_id.clone(),
        };
        Ok(PendingGaps { token, job_id })
    }

    pub fn apply(&self, pending: PendingGaps, outcome: Result<GapReport, ClientError>) -> bool {
        let mut slot = self.lock();
        if !self.tokens.is_current(pending.token) {
            debug!(job_id = %pending.job_id, "discarding superseded gap report");
            return false;
        }

        slot.state = match outcome {
            Ok(report) => {
                info!(job_id = %pending.job_id, missing = report.missing.len(), "gap report loaded");
                OverlayState::Open {
                    job_id: pending.job_id,
                    report,
                }
            }
            Err(error) => {
                warn!(job_id = %pending.job_id, %error, "gap fetch failed");
                OverlayState::Failed {
                    job_id: pending.job_id,
                    message: error.user_message(),
                }
            }
        };
        true
    }

    pub async fn open(&self, job_id: Option<&str>) -> OverlayState {
        let pending = match self.begin_open(job_id) {
            Ok(pending) => pending,
            Err(_) => return self.state(),
        };
        let outcome = self.backend.gaps(&self.profile, &pending.job_id).await;
        self.apply(pending, outcome);
        self.state()
    }

    pub async fn open_for(&self, recommendation: &Recommendation) -> OverlayState {
        self.open(recommendation.job_id.as_deref()).await
    }

    pub fn close(&self) {
        let mut slot = self.lock();
        self.tokens.invalidate();
        slot.state = OverlayState::Closed;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OverlaySlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionGroup {
    pub skill: String,
    pub courses: Vec<CourseSuggestion>,
}

/// What the overlay shows for an open report.
#[derive(Debug, Clone, PartialEq)]
pub struct GapView {
    pub job_id: String,
    pub present: Vec<String>,
    pub present_hidden: usize,
    pub missing: Vec<String>,
    pub weak: Vec<String>,
    pub suggestions: Vec<SuggestionGroup>,
    pub roadmap: String,
}

impl GapView {
    pub fn from_report(job_id: &str, report: &GapReport) -> Self {
        let present: Vec<String> = report
            .present
            .iter()
            .take(PRESENT_DISPLAY_CAP)
            .cloned()
            .collect();

        Self {
            job_id: job_id.to_string(),
            present_hidden: report.present.len() - present.len(),
            present,
            missing: report.missing.clone(),
            weak: report.weak.clone(),
            suggestions: report
                .suggestions
                .iter()
                .map(|(skill, courses)| SuggestionGroup {
                    skill: skill.to_string(),
                    courses: courses.to_vec(),
                })
                .collect(),
            roadmap: report.roadmap.clone(),
        }
    }
}
