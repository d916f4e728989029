/// Severity of a diagnostic event emitted during a parse.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
}

/// Write-only diagnostic channel handed to the decoder by the caller.
/// Events arrive in strict decoder-visit order; the sink never influences
/// control flow.
pub trait LogSink {
    fn log(&mut self, level: LogLevel, message: &str);
}

/// Default sink that drops every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&mut self, _level: LogLevel, _message: &str) {}
}
