//! Builder pattern for LoadGenerator construction

use std::sync::Arc;

use crate::config::LoadConfig;
use crate::error::{LoadError, Result};
use crate::executor::RequestExecutor;
use crate::traits::{HttpTransport, Logger, MetricsRecorder, Tracer};

use super::executor::LoadGenerator;

/// Scope given to the logger handed to the request executor
const REQUEST_SCOPE: &str = "request";

/// Builder for creating a LoadGenerator with its collaborators
///
/// # Example
///
/// ```ignore
/// let generator = LoadGeneratorBuilder::new()
///     .config(config)
///     .transport(Arc::new(ReqwestTransport::new()?))
///     .logger(Arc::new(TracingLogger::new()))
///     .tracer(Arc::new(TracingTracer::from_env()))
///     .metrics(Arc::new(metrics))
///     .build()?;
/// ```
///
/// The configuration is not validated here; that happens when the run starts
/// so that a bad configuration is reported as a failed run.
pub struct LoadGeneratorBuilder {
    config: LoadConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    logger: Option<Arc<dyn Logger>>,
    tracer: Option<Arc<dyn Tracer>>,
    metrics: Option<Arc<dyn MetricsRecorder>>,
}

impl LoadGeneratorBuilder {
    /// Create a builder with the default configuration
    pub fn new() -> Self {
        Self {
            config: LoadConfig::default(),
            transport: None,
            logger: None,
            tracer: None,
            metrics: None,
        }
    }

    /// Set the full load configuration
    pub fn config(mut self, config: LoadConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the HTTP transport
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the structured logger
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Set the span factory
    pub fn tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Set the metrics recorder
    pub fn metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the load generator
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MissingConfig`] naming the first collaborator
    /// that was not set.
    pub fn build(self) -> Result<LoadGenerator> {
        let transport = self
            .transport
            .ok_or_else(|| LoadError::missing_config("transport"))?;
        let logger = self
            .logger
            .ok_or_else(|| LoadError::missing_config("logger"))?;
        let tracer = self
            .tracer
            .ok_or_else(|| LoadError::missing_config("tracer"))?;
        let metrics = self
            .metrics
            .ok_or_else(|| LoadError::missing_config("metrics"))?;

        let executor = Arc::new(RequestExecutor::new(
            transport,
            logger.scoped(REQUEST_SCOPE),
            tracer,
            metrics,
        ));

        Ok(LoadGenerator::new(self.config, executor, logger))
    }
}

impl Default for LoadGeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
