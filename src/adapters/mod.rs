// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod fs_diagnostics;
pub mod probe_ffprobe;
pub mod process;
pub mod toml_config;
pub mod toolchain;
pub mod tracing_log;

// Re-export adapters
pub use exec_ffmpeg::FFmpegAdapter;
pub use fs_diagnostics::FsDiagnosticsAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use toml_config::{MergeXConfig, TomlConfigAdapter};
pub use toolchain::Toolchain;
pub use tracing_log::TracingLogAdapter;
