use std::sync::Arc;

use crate::adapters::{
    FFmpegAdapter, FFprobeAdapter, FsDiagnosticsAdapter, MergeXConfig, Toolchain,
    TracingLogAdapter,
};
use crate::app::{
    audit_interactor::AuditInteractor, batch_interactor::BatchInteractor,
    validate_interactor::ValidateInteractor,
};
use crate::domain::errors::BatchError;
use crate::ports::{ConcatPort, DiagnosticsPort, LogPort, ProbePort};

pub trait AppContainer: Send + Sync {
    fn batch_interactor(&self) -> Arc<BatchInteractor>;
    fn toolchain(&self) -> &Toolchain;
}

pub struct DefaultAppContainer {
    toolchain: Toolchain,
    batch_interactor: Arc<BatchInteractor>,
}

impl DefaultAppContainer {
    /// Locate the media tools and wire the production adapters
    pub fn new(config: &MergeXConfig) -> Result<Self, BatchError> {
        let toolchain = Toolchain::locate(&config.ffmpeg, &config.ffprobe)?;

        let probe_port = Arc::new(FFprobeAdapter::new(&toolchain.ffprobe, config.probe_timeout()));
        let concat_port = Arc::new(
            FFmpegAdapter::new(&toolchain.ffmpeg, config.merge_timeout())
                .with_temp_dir(config.temp_dir.clone()),
        );
        let diagnostics_port = Arc::new(FsDiagnosticsAdapter::new(&config.log_dir));
        let log_port = Arc::new(TracingLogAdapter::new());

        let validator = Arc::new(ValidateInteractor::new(
            Arc::clone(&probe_port) as Arc<dyn ProbePort>,
            Arc::clone(&log_port) as Arc<dyn LogPort>,
            config.part_order,
        ));

        let auditor = Arc::new(AuditInteractor::new(
            Arc::clone(&probe_port) as Arc<dyn ProbePort>,
            Arc::clone(&log_port) as Arc<dyn LogPort>,
            config.duration_tolerance(),
        ));

        let batch_interactor = Arc::new(BatchInteractor::new(
            validator,
            auditor,
            concat_port as Arc<dyn ConcatPort>,
            diagnostics_port as Arc<dyn DiagnosticsPort>,
            log_port as Arc<dyn LogPort>,
            config.part_order,
            config.exclude_prefixes.clone(),
        ));

        Ok(Self {
            toolchain,
            batch_interactor,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn batch_interactor(&self) -> Arc<BatchInteractor> {
        Arc::clone(&self.batch_interactor)
    }

    fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }
}
