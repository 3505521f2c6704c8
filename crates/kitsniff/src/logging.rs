use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Covers the CLI and every `kitsniff_*` library crate.
const KITSNIFF_TARGET: &str = "kitsniff";
const DECODER_TARGET: &str = "kitsniff_decode";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    /// The decoder reports every truncated packet at debug, which drowns a
    /// busy capture. It only gets that verbose at `trace`.
    fn decoder_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug | LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }

    fn foreign_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            _ => LevelFilter::WARN,
        }
    }
}

/// Per-crate filter: `level` for kitsniff itself, the decoder held back
/// below `trace`, everything else at warnings.
pub fn targets(level: LogLevel) -> Targets {
    Targets::new()
        .with_default(level.foreign_filter())
        .with_target(KITSNIFF_TARGET, level.as_filter())
        .with_target(DECODER_TARGET, level.decoder_filter())
}

/// Install the stderr subscriber. Stdout carries records only.
///
/// Capture workers run on threads named `kit:<port>` inside a `worker` span,
/// so both formats say which kit a line came from.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let registry = tracing_subscriber::registry().with(targets(level));

    let result = match format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_names(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_thread_names(true),
            )
            .try_init(),
    };
    let _ = result;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn debug_keeps_decoder_at_info() {
        let filter = targets(LogLevel::Debug);
        assert!(filter.would_enable("kitsniff_frame::extractor", &Level::DEBUG));
        assert!(filter.would_enable("kitsniff::pipeline", &Level::DEBUG));
        assert!(!filter.would_enable("kitsniff_decode::mac", &Level::DEBUG));
        assert!(filter.would_enable("kitsniff_decode::mac", &Level::INFO));
    }

    #[test]
    fn trace_opens_the_decoder() {
        let filter = targets(LogLevel::Trace);
        assert!(filter.would_enable("kitsniff_decode::mac", &Level::TRACE));
    }

    #[test]
    fn foreign_crates_only_warn() {
        let filter = targets(LogLevel::Trace);
        assert!(!filter.would_enable("serialport", &Level::INFO));
        assert!(filter.would_enable("serialport", &Level::WARN));

        let quiet = targets(LogLevel::Error);
        assert!(!quiet.would_enable("serialport", &Level::WARN));
        assert!(!quiet.would_enable("kitsniff::pipeline", &Level::WARN));
    }
}
