use crate::traits::JobBackend;
use crate::{ClientError, DatasetCandidate, Persona, ProfileId, View};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{info, warn};

pub const ANALYZE_FALLBACK_MESSAGE: &str = "Analyze failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputTab {
    #[default]
    PasteText,
    UploadFile,
    PickDataset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Pdf,
    Docx,
    Text,
}

impl UploadKind {
    pub fn from_file_name(file_name: &str) -> Result<Self, ClientError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("pdf") => Ok(UploadKind::Pdf),
            Some("docx") => Ok(UploadKind::Docx),
            Some("txt") => Ok(UploadKind::Text),
            _ => Err(ClientError::UnsupportedUpload(file_name.to_string())),
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            UploadKind::Pdf => "application/pdf",
            UploadKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            UploadKind::Text => "text/plain",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub kind: UploadKind,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ClientError> {
        let file_name = file_name.into();
        let kind = UploadKind::from_file_name(&file_name)?;
        Ok(Self {
            file_name,
            kind,
            bytes,
        })
    }

    /// Reads a resume from disk. The type is checked before any I/O.
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ClientError::InvalidArgument(format!("path has no file name: {}", path.display()))
            })?
            .to_string();
        let kind = UploadKind::from_file_name(&file_name)?;
        let bytes = tokio::fs::read(path).await?;
        Ok(Self {
            file_name,
            kind,
            bytes,
        })
    }
}

/// Body of one analyze call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub text: Option<String>,
    pub file: Option<UploadFile>,
    pub persona: Persona,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Analysis succeeded; continue to the candidate view.
    Navigate(View),
    Failed(String),
    /// A submission was already pending; nothing was sent.
    AlreadyInFlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionForm {
    pub tab: InputTab,
    pub text: String,
    pub file: Option<UploadFile>,
    pub persona: Persona,
    pub submitting: bool,
    pub error: Option<String>,
}

impl SubmissionForm {
    fn request(&self) -> AnalyzeRequest {
        let (text, file) = match self.tab {
            InputTab::PasteText => (Some(self.text.clone()).filter(|text| !text.is_empty()), None),
            InputTab::UploadFile => (None, self.file.clone()),
            InputTab::PickDataset => (None, None),
        };
        AnalyzeRequest {
            text,
            file,
            persona: self.persona,
        }
    }
}

/// Home screen: collects a profile from one input tab and turns it into a
/// candidate view address.
pub struct ProfileSubmission<B> {
    backend: Arc<B>,
    candidates: OnceCell<Vec<DatasetCandidate>>,
    form: Mutex<SubmissionForm>,
}

impl<B> ProfileSubmission<B>
where
    B: JobBackend,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            candidates: OnceCell::new(),
            form: Mutex::new(SubmissionForm::default()),
        }
    }

    /// Loads the dataset listing once. A failed listing is treated as empty.
    pub async fn start(&self) -> &[DatasetCandidate] {
        self.candidates
            .get_or_init(|| async {
                match self.backend.list_candidates().await {
                    Ok(candidates) => candidates,
                    Err(error) => {
                        warn!(%error, "dataset listing unavailable");
                        Vec::new()
                    }
                }
            })
            .await
    }

    pub fn candidates(&self) -> &[DatasetCandidate] {
        self.candidates.get().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn form(&self) -> SubmissionForm {
        self.lock().clone()
    }

    pub fn select_tab(&self, tab: InputTab) {
        self.lock().tab = tab;
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.lock().text = text.into();
    }

    pub fn set_persona(&self, persona: Persona) {
        self.lock().persona = persona;
    }

    pub fn attach(&self, file: UploadFile) {
        self.lock().file = Some(file);
    }

    pub async fn attach_path(&self, path: &Path) -> Result<(), ClientError> {
        let file = UploadFile::from_path(path).await?;
        self.attach(file);
        Ok(())
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().submitting
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let request = {
            let mut form = self.lock();
            if form.submitting {
                return SubmitOutcome::AlreadyInFlight;
            }
            form.submitting = true;
            form.error = None;
            form.request()
        };

        let persona = request.persona;
        let outcome = match self.backend.analyze_profile(request).await {
            Ok(response) => match ProfileId::parse(&response.profile_id) {
                Ok(profile) => {
                    info!(profile = %profile, %persona, "profile analyzed");
                    SubmitOutcome::Navigate(View::Candidate(profile))
                }
                Err(error) => {
                    warn!(%error, "analysis returned an unusable profile id");
                    SubmitOutcome::Failed(ANALYZE_FALLBACK_MESSAGE.to_string())
                }
            },
            Err(error) => {
                warn!(%error, "profile analysis failed");
                SubmitOutcome::Failed(submission_message(&error))
            }
        };

        let mut form = self.lock();
        form.submitting = false;
        if let SubmitOutcome::Failed(message) = &outcome {
            form.error = Some(message.clone());
        }
        outcome
    }

    /// Dataset picks skip analysis: the row key becomes the profile directly.
    pub fn pick_candidate(&self, resume_id: &str) -> Result<View, ClientError> {
        let resume_id = resume_id.trim();
        if resume_id.is_empty() {
            return Err(ClientError::InvalidArgument("resume id is empty".to_string()));
        }
        Ok(View::Candidate(ProfileId::dataset(resume_id)))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SubmissionForm> {
        self.form.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The backend's own rejection text, or the generic fallback for anything else.
fn submission_message(error: &ClientError) -> String {
    match error {
        ClientError::Backend { detail, .. } if !detail.trim().is_empty() => detail.clone(),
        _ => ANALYZE_FALLBACK_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        submission_message, InputTab, ProfileSubmission, SubmitOutcome, UploadFile, UploadKind,
        ANALYZE_FALLBACK_MESSAGE,
    };
    use crate::ClientError;
    use crate::fakes::FakeBackend;
    use crate::{DatasetCandidate, Persona, ProfileId, View};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn submission(backend: FakeBackend) -> ProfileSubmission<FakeBackend> {
        ProfileSubmission::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn pasted_text_submission_navigates_to_candidate_view() {
        let submission = submission(FakeBackend::default().analyze_succeeds("p-901"));
        submission.set_persona(Persona::FreshGrad);
        submission.set_text("Python, SQL and two internships in analytics");

        let outcome = submission.submit().await;

        assert_eq!(outcome, SubmitOutcome::Navigate(View::Candidate(ProfileId::live("p-901"))));
        let requests = submission.backend.analyze_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].text.as_deref(),
            Some("Python, SQL and two internships in analytics")
        );
        assert!(requests[0].file.is_none());
        assert_eq!(requests[0].persona, Persona::FreshGrad);
        assert!(!submission.is_submitting());
    }

    #[tokio::test]
    async fn dataset_pick_synthesizes_id_without_network() -> Result<(), Box<dyn std::error::Error>> {
        let submission = submission(FakeBackend::default());

        let view = submission.pick_candidate("42")?;

        assert_eq!(view.path(), "/candidate/dataset-42");
        assert!(submission.backend.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn backend_rejection_is_surfaced_verbatim() {
        let submission = submission(
            FakeBackend::default().analyze_fails(400, "Provide text or upload a file"),
        );

        let outcome = submission.submit().await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed("Provide text or upload a file".to_string())
        );
        assert_eq!(
            submission.form().error.as_deref(),
            Some("Provide text or upload a file")
        );
    }

    #[tokio::test]
    async fn rejection_without_detail_uses_fallback() {
        let submission = submission(FakeBackend::default().analyze_fails(500, ""));
        submission.set_text("some text");

        assert_eq!(
            submission.submit().await,
            SubmitOutcome::Failed("Analyze failed".to_string())
        );
    }

    #[test]
    fn only_backend_details_reach_the_user() {
        let transport = ClientError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert_eq!(submission_message(&transport), ANALYZE_FALLBACK_MESSAGE);

        let undecodable = ClientError::Serialization(
            serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
        );
        assert_eq!(submission_message(&undecodable), ANALYZE_FALLBACK_MESSAGE);

        let rejected = ClientError::Backend {
            status: 422,
            detail: "Unsupported file type".to_string(),
        };
        assert_eq!(submission_message(&rejected), "Unsupported file type");
    }

    #[test]
    fn upload_kinds_map_to_content_types() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(UploadKind::from_file_name("cv.PDF")?.mime_type(), "application/pdf");
        assert_eq!(
            UploadKind::from_file_name("cv.docx")?.mime_type(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(UploadKind::from_file_name("cv.txt")?.mime_type(), "text/plain");
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn second_submit_while_in_flight_is_ignored() {
        let backend = FakeBackend::default()
            .analyze_succeeds("p-1")
            .with_analyze_delay(Duration::from_millis(250));
        let submission = submission(backend);
        submission.set_text("profile");

        let (first, second) = tokio::join!(submission.submit(), submission.submit());

        assert!(matches!(first, SubmitOutcome::Navigate(_)));
        assert_eq!(second, SubmitOutcome::AlreadyInFlight);
        assert_eq!(submission.backend.analyze_requests().len(), 1);
    }

    #[tokio::test]
    async fn upload_tab_sends_only_the_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("resume.TXT");
        std::fs::write(&path, b"Rust engineer, 5 years")?;

        let submission = submission(FakeBackend::default().analyze_succeeds("p-2"));
        submission.set_text("stale pasted text");
        submission.attach_path(&path).await?;
        submission.select_tab(InputTab::UploadFile);
        submission.set_persona(Persona::MidCareerSwitcher);

        submission.submit().await;

        let request = &submission.backend.analyze_requests()[0];
        assert!(request.text.is_none());
        let file = request.file.as_ref().expect("file attached");
        assert_eq!(file.file_name, "resume.TXT");
        assert_eq!(file.kind, UploadKind::Text);
        assert_eq!(file.bytes, b"Rust engineer, 5 years");
        assert_eq!(request.persona, Persona::MidCareerSwitcher);
        Ok(())
    }

    #[tokio::test]
    async fn unsupported_upload_is_rejected_before_reading() {
        let missing = std::path::Path::new("/nonexistent/resume.png");
        assert!(matches!(
            UploadFile::from_path(missing).await,
            Err(ClientError::UnsupportedUpload(_))
        ));
        assert!(UploadFile::new("cv.docx", Vec::new()).is_ok());
        assert!(UploadFile::new("cv", Vec::new()).is_err());
    }

    #[tokio::test]
    async fn candidate_listing_is_fetched_once() {
        let backend = FakeBackend::default().with_candidates(vec![DatasetCandidate {
            resume_id: "42".to_string(),
            summary: "Data analyst".to_string(),
        }]);
        let submission = submission(backend);

        assert_eq!(submission.start().await.len(), 1);
        assert_eq!(submission.start().await.len(), 1);
        assert_eq!(submission.candidates()[0].resume_id, "42");
        assert_eq!(submission.backend.calls(), vec!["candidates".to_string()]);
    }

    #[tokio::test]
    async fn failed_listing_is_empty() {
        let submission = submission(FakeBackend::default());
        assert!(submission.start().await.is_empty());
        assert!(submission.candidates().is_empty());
    }
}
