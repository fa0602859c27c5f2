use crate::core::state::{GenerationJob, Notification, SourceMaterial, Stage, WizardInput};
use crate::services::generation::{GenerationCoordinator, GenerationRequest, JobOutcome};
use crate::services::presenter::{DownloadError, ResultPresenter, VideoDownloader};
use crate::services::wizard::{WizardError, WizardMachine};
use log::{debug, info};
use std::path::PathBuf;

/// A job handed out by [`LectureSession::start_generation`]. Its outcome is
/// only applied while `job_id` is still the current job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGeneration {
    pub job_id: u64,
    pub request: GenerationRequest,
}

/// One user's lecture wizard: stages, the single outstanding job, and the
/// notifications raised along the way.
#[derive(Debug, Default)]
pub struct LectureSession {
    wizard: WizardMachine,
    presenter: ResultPresenter,
    notifications: Vec<Notification>,
    last_job_id: u64,
}

impl LectureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.wizard.stage()
    }

    pub fn input(&self) -> &WizardInput {
        self.wizard.input()
    }

    pub fn presenter(&self) -> &ResultPresenter {
        &self.presenter
    }

    pub fn job(&self) -> Option<&GenerationJob> {
        self.presenter.job()
    }

    pub fn is_generating(&self) -> bool {
        self.presenter.is_generating()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Hands queued notifications to the host, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn choose_file(&mut self, material: SourceMaterial) {
        self.wizard.choose_file(material);
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.wizard.set_question(question);
    }

    pub fn set_character_name(&mut self, name: impl Into<String>) {
        self.wizard.set_character_name(name);
    }

    pub fn set_character_personality(&mut self, personality: impl Into<String>) {
        self.wizard.set_character_personality(personality);
    }

    pub fn set_voice_style(&mut self, voice_style: impl Into<String>) {
        self.wizard.set_voice_style(voice_style);
    }

    /// Opens the notes stage. A job left over from a dismissed result view is
    /// discarded, input is kept.
    pub fn begin(&mut self) -> Result<(), WizardError> {
        self.wizard.begin()?;
        if let Some(job) = self.presenter.job() {
            debug!("Discarding job #{} on begin", job.id);
            self.presenter.reset();
        }
        Ok(())
    }

    pub fn submit_notes(&mut self) -> Result<(), WizardError> {
        let result = self.wizard.submit_notes();
        self.report(result)
    }

    pub fn back(&mut self) -> Result<(), WizardError> {
        self.wizard.back()
    }

    pub fn cancel(&mut self) -> Result<(), WizardError> {
        self.wizard.cancel()
    }

    pub fn dismiss(&mut self) -> Result<(), WizardError> {
        self.wizard.dismiss()
    }

    /// Gates the character stage and opens a new pending job. Nothing is sent
    /// yet; pass the request to a coordinator and feed the result to
    /// [`complete_generation`](Self::complete_generation).
    pub fn start_generation(&mut self) -> Result<PendingGeneration, WizardError> {
        let result = self.wizard.submit_character();
        let request = self.report(result)?;

        self.last_job_id += 1;
        let job_id = self.last_job_id;
        self.presenter.track(job_id);
        info!(
            "Starting job #{} for {} as {}",
            job_id, request.source.file_name, request.character_name
        );
        Ok(PendingGeneration { job_id, request })
    }

    /// Applies a coordinator outcome. Returns `false` if the job was abandoned
    /// by a reset in the meantime.
    pub fn complete_generation(&mut self, job_id: u64, outcome: JobOutcome) -> bool {
        if !self.presenter.resolve(job_id, outcome.status()) {
            return false;
        }
        self.notifications.push(outcome.notification());
        true
    }

    /// Start, send and resolve in one go.
    pub async fn generate(
        &mut self,
        coordinator: &GenerationCoordinator,
    ) -> Result<JobOutcome, WizardError> {
        let pending = self.start_generation()?;
        let outcome = coordinator.run(&pending.request).await;
        self.complete_generation(pending.job_id, outcome.clone());
        Ok(outcome)
    }

    /// "Create another": clears everything and reopens the notes stage.
    pub fn reset(&mut self) {
        if let Some(job) = self.presenter.job() {
            debug!("Reset drops job #{}", job.id);
        }
        self.wizard.restart();
        self.presenter.reset();
    }

    pub async fn request_download(
        &self,
        downloader: &VideoDownloader,
    ) -> Result<PathBuf, DownloadError> {
        self.presenter.request_download(downloader).await
    }

    fn report<T>(&mut self, result: Result<T, WizardError>) -> Result<T, WizardError> {
        if let Err(WizardError::Validation(e)) = &result {
            debug!("Validation failed: {}", e);
            self.notifications.push(e.notification());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::NativeStorage;
    use crate::core::state::JobStatus;
    use crate::services::generation::tests::MockGenerationClient;
    use crate::services::generation::Acknowledgment;
    use crate::services::wizard::ValidationError;
    use anyhow::Result;
    use std::path::Path;
    use std::sync::Arc;

    fn notes_file(dir: &Path) -> Result<PathBuf> {
        let path = dir.join("notes.pdf");
        std::fs::write(&path, b"%PDF-1.4 polymorphism")?;
        Ok(path)
    }

    fn session_at_character(notes: &Path) -> LectureSession {
        let mut session = LectureSession::new();
        session.begin().unwrap();
        session.choose_file(SourceMaterial::from_path(notes));
        session.set_question("What is polymorphism?");
        session.submit_notes().unwrap();
        session
    }

    #[test]
    fn test_missing_notes_raise_notification() {
        let mut session = LectureSession::new();
        session.begin().unwrap();

        assert!(session.submit_notes().is_err());

        assert_eq!(session.stage(), Stage::NotesIntake);
        let notes = session.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "No content");
        assert!(session.notifications().is_empty());
    }

    #[test]
    fn test_missing_name_creates_no_job() {
        let mut session = session_at_character(Path::new("notes.pdf"));
        session.set_character_name("  ");

        let err = session.start_generation().unwrap_err();

        assert_eq!(
            err,
            WizardError::Validation(ValidationError::MissingCharacterName)
        );
        assert_eq!(session.stage(), Stage::CharacterIntake);
        assert!(session.job().is_none());
        assert!(!session.is_generating());
        assert_eq!(session.notifications()[0].title, "Missing character name");
    }

    #[test]
    fn test_invalid_transition_raises_nothing() {
        let mut session = LectureSession::new();
        assert!(matches!(
            session.start_generation(),
            Err(WizardError::InvalidTransition { .. })
        ));
        assert!(session.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_generation_lifecycle_success() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let notes = notes_file(temp_dir.path())?;
        let client = Arc::new(MockGenerationClient::ok(Acknowledgment {
            video_url: Some("http://cdn/lecture.mp4".to_string()),
            text: None,
        }));
        let forms = client.forms.clone();
        let coordinator = GenerationCoordinator::new(client, Arc::new(NativeStorage::new()));

        let mut session = session_at_character(&notes);
        session.set_character_name("Professor Quack");

        let pending = session.start_generation()?;
        assert!(session.is_generating());
        assert_eq!(session.stage(), Stage::ResultView);
        assert!(session.job().unwrap().is_pending());

        let outcome = coordinator.run(&pending.request).await;
        assert!(session.complete_generation(pending.job_id, outcome));

        assert!(!session.is_generating());
        assert_eq!(session.job().unwrap().video_ref(), Some("http://cdn/lecture.mp4"));
        assert_eq!(session.notifications()[0].title, "Generating video...");

        let forms = forms.lock().unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].character_name, "Professor Quack");
        assert_eq!(forms[0].question, "What is polymorphism?");
        assert_eq!(forms[0].file_name, "notes.pdf");
        Ok(())
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_input() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let notes = notes_file(temp_dir.path())?;
        let coordinator = GenerationCoordinator::new(
            Arc::new(MockGenerationClient::failing("Internal Server Error")),
            Arc::new(NativeStorage::new()),
        );

        let mut session = session_at_character(&notes);
        session.set_character_name("Professor Quack");
        session.set_voice_style("Warm and friendly");
        let input_before = session.input().clone();

        let outcome = session.generate(&coordinator).await?;

        assert!(matches!(outcome, JobOutcome::Failed(_)));
        assert!(!session.is_generating());
        assert_eq!(
            session.job().unwrap().status,
            JobStatus::Failed {
                error_message: "Upload failed: Internal Server Error".to_string()
            }
        );
        let note = &session.notifications()[0];
        assert!(note.is_destructive());
        assert!(note.description.contains("Internal Server Error"));
        assert_eq!(session.input(), &input_before);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_after_terminal_job() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let notes = notes_file(temp_dir.path())?;
        let coordinator = GenerationCoordinator::new(
            Arc::new(MockGenerationClient::ok(Acknowledgment::default())),
            Arc::new(NativeStorage::new()),
        );

        let mut session = session_at_character(&notes);
        session.set_character_name("Professor Quack");
        session.generate(&coordinator).await?;

        session.reset();

        assert_eq!(session.stage(), Stage::NotesIntake);
        assert_eq!(session.input(), &WizardInput::default());
        assert!(session.job().is_none());
        assert!(!session.is_generating());

        session.reset();
        assert_eq!(session.stage(), Stage::NotesIntake);
        Ok(())
    }

    #[test]
    fn test_reset_while_pending_discards_late_outcome() {
        let mut session = session_at_character(Path::new("notes.pdf"));
        session.set_character_name("Professor Quack");
        let pending = session.start_generation().unwrap();

        session.reset();
        let applied = session.complete_generation(
            pending.job_id,
            JobOutcome::Failed("Upload failed: Bad Gateway".to_string()),
        );

        assert!(!applied);
        assert!(session.job().is_none());
        assert!(session.notifications().is_empty());
        assert_eq!(session.stage(), Stage::NotesIntake);
    }

    #[test]
    fn test_resubmit_after_dismissed_failure() {
        let mut session = session_at_character(Path::new("notes.pdf"));
        session.set_character_name("Professor Quack");
        let pending = session.start_generation().unwrap();
        session.complete_generation(pending.job_id, JobOutcome::Failed("Upload failed: Bad Gateway".to_string()));

        session.dismiss().unwrap();
        assert_eq!(session.stage(), Stage::Idle);
        assert!(session.job().is_some());

        session.begin().unwrap();
        assert!(session.job().is_none());
        session.submit_notes().unwrap();
        assert_eq!(session.input().character_name, "Professor Quack");
        assert!(session.start_generation().is_ok());
    }

    #[test]
    fn test_new_job_replaces_previous() {
        let mut session = session_at_character(Path::new("notes.pdf"));
        session.set_character_name("Professor Quack");
        let first = session.start_generation().unwrap();
        session.complete_generation(first.job_id, JobOutcome::Failed("boom".to_string()));

        session.reset();
        session.choose_file(SourceMaterial::from_path("week2.txt"));
        session.submit_notes().unwrap();
        session.set_character_name("Hello Kitty");
        let second = session.start_generation().unwrap();

        assert_ne!(first.job_id, second.job_id);
        assert_eq!(session.job().unwrap().id, second.job_id);
        assert!(!session.complete_generation(first.job_id, JobOutcome::Failed("late".to_string())));
    }
}
