//! Doctor command for setup diagnostics
//!
//! Checks configuration, credentials, the knowledge-base index and the
//! reachability of the model and web search endpoints.

use colored::*;

use crate::config::{Config, Credentials, VectorBackend};
use crate::ingest::discover_pdfs;
use crate::models::GeminiClient;
use crate::search::DuckDuckGoSearch;
use crate::vector_db::{build_store, VectorStore};

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

pub struct Doctor {
    config: Config,
    credentials: Credentials,
}

impl Doctor {
    pub fn new(config: Config, credentials: Credentials) -> Self {
        Self { config, credentials }
    }

    /// Run all health checks
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let mut checks = vec![
            self.check_configuration(),
            self.check_credentials(),
            self.check_data_dir(),
        ];

        checks.push(match build_store(&self.config, &self.credentials) {
            Ok(store) => check_index(store.as_ref()).await,
            Err(e) => HealthCheck::new("Vector Index", HealthStatus::Fail(e.to_string())),
        });
        checks.push(self.check_model_api().await);
        checks.push(self.check_web_search().await);

        checks
    }

    fn check_configuration(&self) -> HealthCheck {
        match self.config.validate() {
            Ok(()) => HealthCheck::new("Configuration", HealthStatus::Pass),
            Err(e) => HealthCheck::new("Configuration", HealthStatus::Fail(e.to_string())),
        }
    }

    fn check_credentials(&self) -> HealthCheck {
        let mut missing = Vec::new();
        if let Err(e) = self.credentials.google() {
            missing.push(e.to_string());
        }
        if self.config.vector_store.backend == VectorBackend::Pinecone {
            if let Err(e) = self.credentials.pinecone() {
                missing.push(e.to_string());
            }
        }

        if missing.is_empty() {
            HealthCheck::new("Credentials", HealthStatus::Pass)
        } else {
            HealthCheck::new("Credentials", HealthStatus::Fail(missing.join("; ")))
        }
    }

    /// Only needed for `medquery ingest`, so problems are warnings
    fn check_data_dir(&self) -> HealthCheck {
        let dir = self.config.data_dir();
        match discover_pdfs(&dir) {
            Ok(pdfs) if pdfs.is_empty() => HealthCheck::new(
                "Data Directory",
                HealthStatus::Warn(format!("No PDF files in {}", dir.display())),
            ),
            Ok(_) => HealthCheck::new("Data Directory", HealthStatus::Pass),
            Err(e) => HealthCheck::new("Data Directory", HealthStatus::Warn(e.to_string())),
        }
    }

    async fn check_model_api(&self) -> HealthCheck {
        let Ok(key) = self.credentials.google() else {
            return HealthCheck::new(
                "Gemini API",
                HealthStatus::Fail("GOOGLE_API_KEY not set".to_string()),
            );
        };

        let client = GeminiClient::new(key, &self.config.model);
        if client.is_available().await {
            HealthCheck::new("Gemini API", HealthStatus::Pass)
        } else {
            HealthCheck::new(
                "Gemini API",
                HealthStatus::Fail(format!("Model {} not reachable with this key", self.config.model.name)),
            )
        }
    }

    async fn check_web_search(&self) -> HealthCheck {
        match DuckDuckGoSearch::new(&self.config.search) {
            Ok(search) if search.is_available().await => HealthCheck::new("Web Search", HealthStatus::Pass),
            Ok(_) => HealthCheck::new(
                "Web Search",
                HealthStatus::Warn("DuckDuckGo not reachable".to_string()),
            ),
            Err(e) => HealthCheck::new("Web Search", HealthStatus::Fail(e.to_string())),
        }
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "MedQuery Diagnostics".bold().cyan());
        println!("{:<20} Status", "Check");
        println!("{}", "=".repeat(50));

        for check in checks {
            let message = match &check.status {
                HealthStatus::Pass => "PASS".green(),
                HealthStatus::Warn(msg) => format!("WARN: {}", msg).yellow(),
                HealthStatus::Fail(msg) => format!("FAIL: {}", msg).red(),
            };
            println!("{:<20} {}", check.name, message);
        }

        println!();
    }

    /// False when any check failed
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}

/// The index must exist; an empty one means ingest has not run yet
pub async fn check_index(store: &dyn VectorStore) -> HealthCheck {
    if let Err(e) = store.connect_existing().await {
        return HealthCheck::new("Vector Index", HealthStatus::Fail(e.to_string()));
    }

    match store.vector_count().await {
        Ok(0) => HealthCheck::new(
            "Vector Index",
            HealthStatus::Warn(format!(
                "{} index is empty; run `medquery ingest`",
                store.backend_name()
            )),
        ),
        Ok(_) => HealthCheck::new("Vector Index", HealthStatus::Pass),
        Err(e) => HealthCheck::new("Vector Index", HealthStatus::Warn(e.to_string())),
    }
}
