use std::sync::Arc;

use crate::core::config::{AppPaths, ConfigService, ResearchSettings};
use crate::embedding::build_embedder;
use crate::export::Exporter;
use crate::rag::{DocumentStore, SqliteDocumentPersistence};
use crate::research::{AgentOptions, ResearchAgent, Summarizer};

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
///
/// Everything is built once here and passed explicitly; there is no
/// global session state.
#[derive(Clone)]
pub struct AppState {
    pub config: ConfigService,
    pub settings: ResearchSettings,
    pub agent: ResearchAgent,
    pub exporter: Exporter,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// This process includes:
    /// 1. Loading and validating configuration
    /// 2. Building the configured embedder
    /// 3. Opening the SQLite document store and loading stored documents
    /// 4. Wiring the research agent and the export sink
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());
        let settings = config.load_settings().map_err(InitializationError::Config)?;

        let embedder = build_embedder(&settings).map_err(InitializationError::Embedder)?;
        tracing::info!("Using embedder '{}'", embedder.name());

        let persistence =
            SqliteDocumentPersistence::with_path(paths.resolve_data_file(&settings.db_file))
                .await
                .map_err(InitializationError::Store)?;
        let store = Arc::new(
            DocumentStore::open(Arc::new(persistence))
                .await
                .map_err(InitializationError::Store)?,
        );

        let agent = ResearchAgent::new(
            store,
            embedder,
            Summarizer::new(settings.summary_order),
            AgentOptions::from(&settings),
        );

        let export_dir = settings
            .export_dir
            .as_deref()
            .map(|dir| paths.resolve_data_file(dir))
            .unwrap_or_else(|| paths.export_dir.clone());
        let exporter = Exporter::new(export_dir);

        Ok(Arc::new(AppState {
            config,
            settings,
            agent,
            exporter,
        }))
    }
}
