use log::{error, info, warn};
use wld_files::log::{LogLevel, LogSink};

/// Routes the decoder's diagnostic events onto the `log` facade, so the
/// console output obeys the usual RUST_LOG filters.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    pub warnings: usize,
}

impl LogSink for ConsoleSink {
    fn log(&mut self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => info!("{message}"),
            LogLevel::Warn => {
                self.warnings += 1;
                warn!("{message}");
            }
            LogLevel::Error => error!("{message}"),
            LogLevel::Success => info!("{message}"),
        }
    }
}
