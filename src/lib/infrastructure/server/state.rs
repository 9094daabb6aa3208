use crate::application::generate::GenerationService;
use crate::application::outline::OutlineService;
use crate::application::prompts::PromptTemplates;
use crate::config::{AppSettings, ConfigError};
use crate::infrastructure::model::RetryPolicy;
use crate::infrastructure::storage::{HistoryStore, OutputStore};
use std::sync::Arc;

pub struct ServerState {
    settings: Arc<AppSettings>,
    outline: OutlineService,
    generation: GenerationService,
    history: HistoryStore,
    output: OutputStore,
}

impl ServerState {
    /// Build services from settings, loading prompt overrides.
    pub fn new(settings: AppSettings) -> Result<Self, ConfigError> {
        let prompts = Arc::new(PromptTemplates::load(settings.prompts_dir.as_deref())?);
        let settings = Arc::new(settings);
        Ok(Self {
            outline: OutlineService::new(settings.clone(), prompts.clone()),
            generation: GenerationService::new(settings.clone(), prompts),
            history: HistoryStore::new(settings.history_dir.clone()),
            output: OutputStore::new(settings.output_dir.clone()),
            settings,
        })
    }

    /// Override the provider retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.outline = self.outline.with_retry(retry);
        self.generation = self.generation.with_retry(retry);
        self
    }

    pub(crate) fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub(crate) fn outline(&self) -> &OutlineService {
        &self.outline
    }

    pub(crate) fn generation(&self) -> &GenerationService {
        &self.generation
    }

    pub(crate) fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub(crate) fn output(&self) -> &OutputStore {
        &self.output
    }
}
