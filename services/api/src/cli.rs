//! services/api/src/cli.rs
//!
//! The `dermascan` command-line client. Each command reads store state, renders
//! it, or forwards the action to the stores; no business logic lives here.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use dermascan_core::{
    AnalysisError, AnalysisFlow, AnalysisResult, AnalysisService, AuthState, ImageUpload,
    IntakeForm, KeyValueStore, ResultStore, SessionStore,
};
use uuid::Uuid;

use crate::adapters::{HttpAnalysisAdapter, JsonFileStore, MockAnalysisAdapter};
use crate::config::Config;
use crate::error::ApiError;

#[derive(Debug, Parser)]
#[command(name = "dermascan", version, about = "Skin-condition self-assessment from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "DERMASCAN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in to an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "DERMASCAN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Submit a photo and intake details for analysis
    Analyze(AnalyzeArgs),
    /// List past analyses, oldest first
    History,
    /// Show one analysis (the most recent by default)
    Show { id: Option<Uuid> },
    /// Forget all stored analyses
    Clear,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Photo of the affected skin (png, jpg or jpeg)
    #[arg(long)]
    pub image: PathBuf,
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub age: String,
    #[arg(long, default_value = "")]
    pub gender: String,
    #[arg(long, default_value = "")]
    pub skin_type: String,
    /// Comma-separated, e.g. "nuts, dairy"
    #[arg(long, default_value = "")]
    pub allergies: String,
}

/// The stores and flow behind the commands.
pub struct App {
    sessions: SessionStore,
    results: Arc<ResultStore>,
    analysis: AnalysisFlow,
}

impl App {
    /// Wires the app from configuration: file-backed storage and either the
    /// remote or the mock analysis service.
    pub async fn open(config: &Config) -> Result<Self, ApiError> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(&config.storage_dir));
        let service: Arc<dyn AnalysisService> = if config.mock_analysis {
            Arc::new(MockAnalysisAdapter::default())
        } else {
            Arc::new(HttpAnalysisAdapter::new(
                config.analysis_url.clone(),
                config.analysis_timeout,
            )?)
        };
        Self::from_parts(storage, service, config.auth_latency).await
    }

    pub async fn from_parts(
        storage: Arc<dyn KeyValueStore>,
        service: Arc<dyn AnalysisService>,
        auth_latency: Duration,
    ) -> Result<Self, ApiError> {
        let sessions = SessionStore::new(storage.clone()).with_latency(auth_latency);
        sessions.rehydrate().await?;
        let results = Arc::new(ResultStore::open(storage).await?);
        let analysis = AnalysisFlow::new(service, results.clone());
        Ok(Self {
            sessions,
            results,
            analysis,
        })
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    pub async fn execute<W: Write>(&self, command: Command, out: &mut W) -> Result<(), ApiError> {
        match command {
            Command::Signup {
                username,
                email,
                password,
            } => {
                let session = self.sessions.signup(&username, &email, &password).await?;
                writeln!(out, "Account created. Signed in as {} <{}>", session.username, session.email)?;
            }
            Command::Login { email, password } => {
                let session = self.sessions.login(&email, &password).await?;
                writeln!(out, "Signed in as {} <{}>", session.username, session.email)?;
            }
            Command::Logout => {
                self.sessions.logout().await?;
                writeln!(out, "Signed out")?;
            }
            Command::Whoami => match self.sessions.state() {
                AuthState::SignedIn(session) => {
                    writeln!(out, "{} <{}>", session.username, session.email)?
                }
                AuthState::SignedOut | AuthState::Unknown => writeln!(out, "Not signed in")?,
            },
            Command::Analyze(args) => {
                let form = intake_form(args).await?;
                let result = self.analysis.submit(form).await?;
                render_result(&result, out)?;
            }
            Command::History => {
                let results = self.results.results().await;
                if results.is_empty() {
                    writeln!(out, "No analysis results found")?;
                }
                for result in results {
                    writeln!(
                        out,
                        "{}  {}  {}",
                        result.id,
                        result.date.format("%Y-%m-%d %H:%M"),
                        result.disease
                    )?;
                }
            }
            Command::Show { id } => {
                let found = match id {
                    Some(id) => self.results.get_result_by_id(id).await,
                    None => self.results.most_recent().await,
                };
                match found {
                    Some(result) => render_result(&result, out)?,
                    None => writeln!(out, "No analysis results found")?,
                }
            }
            Command::Clear => {
                self.results.clear_in_memory().await;
                self.results.clear_persisted().await?;
                writeln!(out, "Analysis history cleared")?;
            }
        }
        Ok(())
    }
}

async fn intake_form(args: AnalyzeArgs) -> Result<IntakeForm, ApiError> {
    let bytes = tokio::fs::read(&args.image).await?;
    let file_name = args
        .image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let image = ImageUpload::new(file_name, bytes).map_err(AnalysisError::from)?;

    Ok(IntakeForm {
        name: args.name,
        age: args.age,
        gender: args.gender,
        skin_type: args.skin_type,
        allergies: args.allergies,
        image: Some(image),
    })
}

fn render_result<W: Write>(result: &AnalysisResult, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Analysis {} ({})", result.id, result.date.format("%B %-d, %Y"))?;
    match result.confidence {
        Some(confidence) => writeln!(out, "Condition: {} (confidence {:.2})", result.disease, confidence)?,
        None => writeln!(out, "Condition: {}", result.disease)?,
    }
    writeln!(out, "{}", result.description)?;

    let sections = [("Symptoms", &result.symptoms), ("Home remedies", &result.remedies)];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        writeln!(out, "{}:", title)?;
        for item in items {
            writeln!(out, "  - {}", item)?;
        }
    }

    if !result.products.is_empty() {
        writeln!(out, "Recommended products:")?;
        for product in &result.products {
            match &product.description {
                Some(description) => writeln!(out, "  - {}: {}", product.name, description)?,
                None => writeln!(out, "  - {}", product.name)?,
            }
        }
    }
    Ok(())
}
