use crate::config::ServerConfig;
use crate::error::ServerResult;
use metrics_exporter_prometheus::PrometheusHandle;
use recall::{Recall, RecallConfig};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Archive shared by every request
    pub recall: Arc<Recall>,

    /// Prometheus render handle, present when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Build the archive from `config.recall_config`, or from defaults.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let recall_config = match &config.recall_config {
            Some(path) => RecallConfig::from_file(path)
                .map_err(|e| crate::ServerError::Config(format!("{}: {e}", path.display())))?,
            None => RecallConfig::default(),
        };
        let recall = Recall::from_config(&recall_config)?;
        Ok(Self::with_recall(config, Arc::new(recall)))
    }

    pub fn with_recall(config: ServerConfig, recall: Arc<Recall>) -> Self {
        Self {
            config: Arc::new(config),
            recall,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
}
