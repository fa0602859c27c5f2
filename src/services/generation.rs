use crate::core::config::Config;
use crate::core::io::Storage;
use crate::core::state::{JobStatus, Notification, SourceMaterial, WizardInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{multipart, Client};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Could not read lecture notes: {0}")]
    Source(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upload failed: {reason}{}", detail_suffix(.detail))]
    Status {
        reason: String,
        detail: Option<String>,
    },

    #[error("Unexpected response from generation service: {0}")]
    Decode(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default()
}

/// Snapshot of a gated wizard input, taken when the character stage is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub source: SourceMaterial,
    pub question: String,
    pub character_name: String,
    pub character_personality: String,
    pub voice_style: String,
}

impl GenerationRequest {
    /// `None` when no lecture notes were chosen.
    pub fn from_input(input: &WizardInput) -> Option<Self> {
        let source = input.source_material.clone()?;
        Some(Self {
            source,
            question: input.question.clone(),
            character_name: input.character_name.clone(),
            character_personality: input.character_personality.clone(),
            voice_style: input.voice_style.clone(),
        })
    }
}

/// Everything that goes into the multipart body, with the notes already loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationForm {
    pub file_name: String,
    pub mime_type: String,
    pub file: Vec<u8>,
    pub question: String,
    pub character_name: String,
    pub character_personality: String,
    pub voice_style: String,
}

impl GenerationForm {
    pub fn new(request: &GenerationRequest, file: Vec<u8>) -> Self {
        Self {
            file_name: request.source.file_name.clone(),
            mime_type: request.source.mime_type.clone(),
            file,
            question: request.question.clone(),
            character_name: request.character_name.clone(),
            character_personality: request.character_personality.clone(),
            voice_style: request.voice_style.clone(),
        }
    }

    /// Text fields in wire order.
    pub fn text_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("question", &self.question),
            ("character_name", &self.character_name),
            ("character_personality", &self.character_personality),
            ("voice_style", &self.voice_style),
        ]
    }
}

/// Job-accepted acknowledgment. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Acknowledgment {
    #[serde(default, alias = "video_ref")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded(Acknowledgment),
    Failed(String),
}

impl JobOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            JobOutcome::Succeeded(ack) => JobStatus::Succeeded {
                video_ref: ack.video_url.clone(),
                extracted_text: ack.text.clone(),
            },
            JobOutcome::Failed(message) => JobStatus::Failed {
                error_message: message.clone(),
            },
        }
    }

    pub fn notification(&self) -> Notification {
        match self {
            JobOutcome::Succeeded(_) => Notification::info(
                "Generating video...",
                "Your lecture video is being created. This may take a moment.",
            ),
            JobOutcome::Failed(message) => {
                Notification::destructive("Error generating video", message.clone())
            }
        }
    }
}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn submit(&self, form: GenerationForm) -> Result<Acknowledgment, GenerationError>;
}

pub struct HttpGenerationClient {
    endpoint: Url,
    client: Client,
}

impl HttpGenerationClient {
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .with_context(|| format!("Invalid generation endpoint: {}", config.endpoint))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[derive(Deserialize)]
struct ServiceError {
    error: String,
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn submit(&self, form: GenerationForm) -> Result<Acknowledgment, GenerationError> {
        let mut body = multipart::Form::new();
        for (name, value) in form.text_fields() {
            body = body.text(name, value.to_string());
        }
        let part = multipart::Part::bytes(form.file)
            .file_name(form.file_name)
            .mime_str(&form.mime_type)?;
        let body = body.part("file", part);

        debug!("POST {}", self.endpoint);
        let resp = self
            .client
            .post(self.endpoint.clone())
            .multipart(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ServiceError>(&text)
                .ok()
                .map(|e| e.error);
            return Err(GenerationError::Status {
                reason: status
                    .canonical_reason()
                    .unwrap_or(status.as_str())
                    .to_string(),
                detail,
            });
        }

        serde_json::from_str(&text).map_err(|e| GenerationError::Decode(e.to_string()))
    }
}

/// Turns a request into exactly one call to the generation service.
pub struct GenerationCoordinator {
    client: Arc<dyn GenerationClient>,
    storage: Arc<dyn Storage>,
}

impl GenerationCoordinator {
    pub fn new(client: Arc<dyn GenerationClient>, storage: Arc<dyn Storage>) -> Self {
        Self { client, storage }
    }

    /// Never fails: every error is folded into `JobOutcome::Failed`.
    pub async fn run(&self, request: &GenerationRequest) -> JobOutcome {
        match self.dispatch(request).await {
            Ok(ack) => {
                info!("Video generation started for {}", request.source.file_name);
                JobOutcome::Succeeded(ack)
            }
            Err(e) => {
                error!("Error generating video: {}", e);
                JobOutcome::Failed(e.to_string())
            }
        }
    }

    async fn dispatch(&self, request: &GenerationRequest) -> Result<Acknowledgment, GenerationError> {
        let file = self
            .storage
            .read(request.source.path())
            .await
            .map_err(|e| GenerationError::Source(format!("{:#}", e)))?;
        debug!(
            "Uploading {} ({} bytes) for {}",
            request.source.file_name,
            file.len(),
            request.character_name
        );
        self.client.submit(GenerationForm::new(request, file)).await
    }
}
