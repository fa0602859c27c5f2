use crate::core::state::{Notification, SourceMaterial, Stage, WizardInput};
use crate::services::generation::GenerationRequest;
use log::debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please upload or paste lecture notes.")]
    NoContent,
    #[error("Please provide a character name.")]
    MissingCharacterName,
}

impl ValidationError {
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::NoContent => "No content",
            ValidationError::MissingCharacterName => "Missing character name",
        }
    }

    pub fn notification(&self) -> Notification {
        Notification::destructive(self.title(), self.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("cannot {action} while in {stage}")]
    InvalidTransition { stage: Stage, action: &'static str },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Stage tracking and input gating for the lecture wizard.
///
/// Setters accept anything at any time; constraints are only checked when a
/// stage is submitted.
#[derive(Debug, Clone)]
pub struct WizardMachine {
    stage: Stage,
    input: WizardInput,
}

impl Default for WizardMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardMachine {
    pub fn new() -> Self {
        Self {
            stage: Stage::Idle,
            input: WizardInput::default(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn input(&self) -> &WizardInput {
        &self.input
    }

    pub fn choose_file(&mut self, material: SourceMaterial) {
        self.input.source_material = Some(material);
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.input.question = question.into();
    }

    pub fn set_character_name(&mut self, name: impl Into<String>) {
        self.input.character_name = name.into();
    }

    pub fn set_character_personality(&mut self, personality: impl Into<String>) {
        self.input.character_personality = personality.into();
    }

    pub fn set_voice_style(&mut self, voice_style: impl Into<String>) {
        self.input.voice_style = voice_style.into();
    }

    pub fn begin(&mut self) -> Result<(), WizardError> {
        self.require_stage(Stage::Idle, "begin upload")?;
        self.move_to(Stage::NotesIntake);
        Ok(())
    }

    pub fn submit_notes(&mut self) -> Result<(), WizardError> {
        self.require_stage(Stage::NotesIntake, "submit notes")?;
        if !self.input.has_source_material() {
            return Err(ValidationError::NoContent.into());
        }
        self.move_to(Stage::CharacterIntake);
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), WizardError> {
        self.require_stage(Stage::CharacterIntake, "go back")?;
        self.move_to(Stage::NotesIntake);
        Ok(())
    }

    /// Validates the character stage and, on success, moves to the result view
    /// and returns the request to send. The caller is responsible for starting the job.
    pub fn submit_character(&mut self) -> Result<GenerationRequest, WizardError> {
        self.require_stage(Stage::CharacterIntake, "generate video")?;
        if !self.input.has_character_name() {
            return Err(ValidationError::MissingCharacterName.into());
        }
        let request = GenerationRequest::from_input(&self.input).ok_or(ValidationError::NoContent)?;
        self.move_to(Stage::ResultView);
        Ok(request)
    }

    /// Closes an intake dialog. Entered values survive.
    pub fn cancel(&mut self) -> Result<(), WizardError> {
        match self.stage {
            Stage::NotesIntake | Stage::CharacterIntake => {
                self.move_to(Stage::Idle);
                Ok(())
            }
            stage => Err(WizardError::InvalidTransition {
                stage,
                action: "cancel",
            }),
        }
    }

    pub fn dismiss(&mut self) -> Result<(), WizardError> {
        self.require_stage(Stage::ResultView, "close the result")?;
        self.move_to(Stage::Idle);
        Ok(())
    }

    /// Drops all input and reopens the notes dialog.
    pub fn restart(&mut self) {
        self.input = WizardInput::default();
        self.move_to(Stage::NotesIntake);
    }

    fn require_stage(&self, stage: Stage, action: &'static str) -> Result<(), WizardError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                stage: self.stage,
                action,
            })
        }
    }

    fn move_to(&mut self, next: Stage) {
        debug!("wizard: {} -> {}", self.stage, next);
        self.stage = next;
    }
}
