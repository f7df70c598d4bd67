pub mod backend;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod gaps;
pub mod identifier;
pub mod models;
pub mod recommendations;
pub mod session;
pub mod submission;
pub mod token;
pub mod traits;
pub mod views;

#[cfg(test)]
pub(crate) mod fakes;

pub use backend::{error_detail, HttpBackend};
pub use config::{ClientConfig, RetryPolicy, DEFAULT_API_BASE};
pub use error::{ClientError, Result};
pub use evaluation::{
    EvaluationAggregator, EvaluationRow, EvaluationSnapshot, EvaluationTable, RowStatus,
};
pub use gaps::{
    GapOverlayController, GapView, MissingJobId, OverlayState, SuggestionGroup,
    PRESENT_DISPLAY_CAP,
};
pub use identifier::{ProfileId, ProfileRoute, DATASET_PREFIX};
pub use models::{
    AnalyzeResponse, CandidatesResponse, CourseSuggestion, DatasetCandidate, EvaluationResult,
    GapReport, Metrics, OrderedSuggestions, Persona, Recommendation, RecommendationsResponse,
    ScoreBreakdown, ScoringMode, StatusResponse, NDCG_AT_K, PRECISION_AT_K, RECALL_AT_K,
};
pub use recommendations::{
    FetchStatus, PendingRecommendations, RecommendationController, RecommendationSnapshot,
};
pub use session::CandidateSession;
pub use submission::{
    AnalyzeRequest, InputTab, ProfileSubmission, SubmissionForm, SubmitOutcome, UploadFile,
    UploadKind,
};
pub use token::{RequestToken, RequestTokens};
pub use traits::JobBackend;
pub use views::View;
