use std::fmt;
use std::path::{Path, PathBuf};

/// The wizard step currently shown to the user. `Idle` means no dialog is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    NotesIntake,
    CharacterIntake,
    ResultView,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::NotesIntake => "notes intake",
            Stage::CharacterIntake => "character intake",
            Stage::ResultView => "result view",
        };
        f.write_str(name)
    }
}

/// Lecture notes picked by the user. Only the location is held here; the
/// bytes are read when the generation request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMaterial {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
}

impl SourceMaterial {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mime_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            path,
            file_name,
            mime_type,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardInput {
    pub source_material: Option<SourceMaterial>,
    pub question: String,
    pub character_name: String,
    pub character_personality: String,
    pub voice_style: String,
}

impl WizardInput {
    pub fn has_source_material(&self) -> bool {
        self.source_material
            .as_ref()
            .map_or(false, |m| !m.file_name.trim().is_empty())
    }

    pub fn has_character_name(&self) -> bool {
        !self.character_name.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Succeeded {
        /// Playable/downloadable location, when the service returns one.
        video_ref: Option<String>,
        extracted_text: Option<String>,
    },
    Failed {
        error_message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub id: u64,
    pub status: JobStatus,
}

impl GenerationJob {
    pub fn pending(id: u64) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, JobStatus::Pending)
    }

    pub fn video_ref(&self) -> Option<&str> {
        match &self.status {
            JobStatus::Succeeded { video_ref, .. } => video_ref.as_deref(),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            JobStatus::Failed { error_message } => Some(error_message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// A transient message for the host to display. Rendering is up to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}
