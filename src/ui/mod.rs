//! Terminal front-end for the lecture wizard. Each stage is rendered as a
//! handful of prompts; everything else is delegated to [`LectureSession`].

use crate::core::config::Config;
use crate::core::state::{JobStatus, Notification, SourceMaterial, Stage};
use crate::services::generation::GenerationCoordinator;
use crate::services::presenter::VideoDownloader;
use crate::services::session::LectureSession;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{InquireError, Select, Text};
use log::warn;
use std::path::Path;
use std::time::Duration;

const UPLOAD: &str = "Upload Lecture Notes";
const QUIT: &str = "Quit";
const NEXT: &str = "Next: Character Details";
const CANCEL: &str = "Cancel";
const GENERATE: &str = "Generate Video";
const BACK: &str = "Back";
const DOWNLOAD: &str = "Download Video";
const CREATE_ANOTHER: &str = "Create Another";
const CLOSE: &str = "Close";

/// What the user did at a prompt.
enum Answer<T> {
    Value(T),
    /// Esc: close the current dialog.
    Cancelled,
    /// Ctrl-C: leave the program.
    Interrupted,
}

fn ask<T>(result: std::result::Result<T, InquireError>) -> Result<Answer<T>> {
    match result {
        Ok(value) => Ok(Answer::Value(value)),
        Err(InquireError::OperationCanceled) => Ok(Answer::Cancelled),
        Err(InquireError::OperationInterrupted) => Ok(Answer::Interrupted),
        Err(e) => Err(e.into()),
    }
}

fn ask_text(label: &str, placeholder: &str, current: &str) -> Result<Answer<String>> {
    ask(Text::new(label)
        .with_initial_value(current)
        .with_placeholder(placeholder)
        .prompt())
}

pub async fn run(
    config: &Config,
    coordinator: &GenerationCoordinator,
    downloader: &VideoDownloader,
) -> Result<()> {
    let mut session = LectureSession::new();

    println!("AI Lecturer");
    println!("Upload your lecture notes, customize your AI lecturer character, and generate a video presentation.");

    loop {
        let keep_going = match session.stage() {
            Stage::Idle => idle(&mut session)?,
            Stage::NotesIntake => notes_intake(config, &mut session)?,
            Stage::CharacterIntake => character_intake(&mut session, coordinator).await?,
            Stage::ResultView => result_view(&mut session, downloader).await?,
        };
        show_notifications(&mut session);
        if !keep_going {
            break;
        }
    }

    Ok(())
}

fn idle(session: &mut LectureSession) -> Result<bool> {
    match ask(Select::new("What next?", vec![UPLOAD, QUIT]).prompt())? {
        Answer::Value(UPLOAD) => {
            session.begin()?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn notes_intake(config: &Config, session: &mut LectureSession) -> Result<bool> {
    println!("\n== Upload Lecture Notes ==");

    let current = session
        .input()
        .source_material
        .as_ref()
        .map(|m| m.path.to_string_lossy().to_string())
        .unwrap_or_default();
    let extensions = config.accepted_extensions.join(", ");
    let help = format!("Accepted: {}", extensions);
    let path = match ask(
        Text::new("Lecture notes file:")
            .with_initial_value(&current)
            .with_help_message(&help)
            .prompt(),
    )? {
        Answer::Value(path) => path,
        Answer::Cancelled => return cancel(session),
        Answer::Interrupted => return Ok(false),
    };
    choose_file(config, session, path.trim());

    if let Some(material) = &session.input().source_material {
        println!("📄 {}", material.file_name);
    }

    let question = session.input().question.clone();
    match ask_text(
        "Ask a question about the lecture notes for the AI to answer:",
        "Enter your question here...",
        &question,
    )? {
        Answer::Value(question) => session.set_question(question),
        Answer::Cancelled => return cancel(session),
        Answer::Interrupted => return Ok(false),
    }

    match ask(Select::new("Continue?", vec![NEXT, CANCEL]).prompt())? {
        Answer::Value(NEXT) => {
            // Validation failures stay on this stage and surface as a notification.
            let _ = session.submit_notes();
            Ok(true)
        }
        Answer::Interrupted => Ok(false),
        _ => cancel(session),
    }
}

fn choose_file(config: &Config, session: &mut LectureSession, path: &str) {
    if path.is_empty() {
        return;
    }
    let path = Path::new(path);
    if !path.is_file() {
        println!("File not found: {}", path.display());
        return;
    }
    if !config.accepts(path) {
        println!("Unsupported file type: {}", path.display());
        return;
    }
    session.choose_file(SourceMaterial::from_path(path));
}

async fn character_intake(
    session: &mut LectureSession,
    coordinator: &GenerationCoordinator,
) -> Result<bool> {
    println!("\n== Customize Your AI Lecturer ==");

    let current = session.input().character_name.clone();
    match ask_text("Character:", "e.g., Hello Kitty, Chiikawa...", &current)? {
        Answer::Value(name) => session.set_character_name(name),
        Answer::Cancelled => return cancel(session),
        Answer::Interrupted => return Ok(false),
    }

    let current = session.input().character_personality.clone();
    match ask_text(
        "Personality traits:",
        "e.g., Enthusiastic, clear, patient, encouraging...",
        &current,
    )? {
        Answer::Value(personality) => session.set_character_personality(personality),
        Answer::Cancelled => return cancel(session),
        Answer::Interrupted => return Ok(false),
    }

    let current = session.input().voice_style.clone();
    match ask_text(
        "Voice style (optional):",
        "e.g., Warm and friendly, Professional, Energetic...",
        &current,
    )? {
        Answer::Value(voice_style) => session.set_voice_style(voice_style),
        Answer::Cancelled => return cancel(session),
        Answer::Interrupted => return Ok(false),
    }

    match ask(Select::new("Ready?", vec![GENERATE, BACK, CANCEL]).prompt())? {
        Answer::Value(GENERATE) => {
            generate(session, coordinator).await;
            Ok(true)
        }
        Answer::Value(BACK) => {
            session.back()?;
            Ok(true)
        }
        Answer::Interrupted => Ok(false),
        _ => cancel(session),
    }
}

async fn generate(session: &mut LectureSession, coordinator: &GenerationCoordinator) {
    let pending = match session.start_generation() {
        Ok(pending) => pending,
        // Stays on the character stage; the notification explains why.
        Err(_) => return,
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Generating your AI lecture video...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = coordinator.run(&pending.request).await;

    spinner.finish_and_clear();
    session.complete_generation(pending.job_id, outcome);
}

async fn result_view(session: &mut LectureSession, downloader: &VideoDownloader) -> Result<bool> {
    println!("\n== Your AI Lecture Video ==");

    let mut options = vec![CREATE_ANOTHER, CLOSE];
    match session.job().map(|job| &job.status) {
        Some(JobStatus::Succeeded {
            video_ref,
            extracted_text,
        }) => {
            match video_ref {
                Some(video_ref) => {
                    println!("Video: {}", video_ref);
                    options.insert(0, DOWNLOAD);
                }
                None => println!("The service accepted the job; no video reference was returned yet."),
            }
            if let Some(text) = extracted_text {
                let preview: String = text.chars().take(300).collect();
                println!("Extracted notes: {}", preview);
            }
        }
        Some(JobStatus::Failed { error_message }) => {
            println!("Generation failed: {}", error_message);
            println!("Close keeps your inputs for another attempt; Create Another starts over.");
        }
        Some(JobStatus::Pending) => println!("Still generating..."),
        None => println!("Nothing generated yet."),
    }

    match ask(Select::new("What next?", options).prompt())? {
        Answer::Value(DOWNLOAD) => {
            match session.request_download(downloader).await {
                Ok(path) => println!("Saved to {}", path.display()),
                Err(e) => {
                    warn!("Download failed: {}", e);
                    println!("{}", e);
                }
            }
            Ok(true)
        }
        Answer::Value(CREATE_ANOTHER) => {
            session.reset();
            Ok(true)
        }
        Answer::Interrupted => Ok(false),
        _ => {
            session.dismiss()?;
            Ok(true)
        }
    }
}

fn cancel(session: &mut LectureSession) -> Result<bool> {
    session.cancel()?;
    Ok(true)
}

fn show_notifications(session: &mut LectureSession) {
    for note in session.take_notifications() {
        println!("{}", render(&note));
    }
}

fn render(note: &Notification) -> String {
    let marker = if note.is_destructive() { "✖" } else { "•" };
    format!("{} {}", marker, note)
}
