//! `LogSink` backed by `tracing`.

use rotating_imager_core::{LogEntry, LogSink, Severity};
use serde_json::Value;

/// Forwards run log entries to the installed `tracing` subscriber.
///
/// Severities collapse onto tracing levels: Default, Info and Notice log
/// at INFO; Error and everything above log at ERROR. The entry's
/// severity name is kept in the `severity` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl TracingLogSink {
    pub fn new() -> Self {
        Self
    }
}

/// Emit at a fixed level, adding `fields` only when there are any.
macro_rules! emit {
    ($level:ident, $severity:expr, $fields:expr, $message:expr) => {
        match $fields {
            Some(fields) => {
                tracing::$level!(severity = %$severity, fields = %fields, "{}", $message)
            }
            None => tracing::$level!(severity = %$severity, "{}", $message),
        }
    };
}

impl LogSink for TracingLogSink {
    fn log(&self, severity: Severity, entry: LogEntry) {
        // Record fields travel as one JSON object string.
        let fields = entry
            .fields()
            .filter(|f| !f.is_empty())
            .map(|f| Value::Object(f.clone()).to_string());
        let message = entry.message();

        match severity {
            Severity::Debug => emit!(debug, severity, fields, message),
            Severity::Default | Severity::Info | Severity::Notice => {
                emit!(info, severity, fields, message)
            }
            Severity::Warning => emit!(warn, severity, fields, message),
            Severity::Error | Severity::Critical | Severity::Alert | Severity::Emergency => {
                emit!(error, severity, fields, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotating_imager_core::LogRecord;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_warning_maps_to_warn() {
        let out = capture(|| {
            TracingLogSink::new().warn("Could not deregister ami-1: in use".into());
        });
        assert!(out.contains("WARN"));
        assert!(out.contains("severity=WARNING"));
        assert!(out.contains("Could not deregister ami-1: in use"));
        assert!(!out.contains("fields="));
    }

    #[test]
    fn test_critical_maps_to_error_with_fields() {
        let out = capture(|| {
            let record = LogRecord::new("Image creation failed").field("instance_id", "i-1");
            TracingLogSink::new().log(Severity::Critical, record.into());
        });
        assert!(out.contains("ERROR"));
        assert!(out.contains("severity=CRITICAL"));
        assert!(out.contains(r#"fields={"instance_id":"i-1"}"#));
    }

    #[test]
    fn test_record_without_fields_omits_field() {
        let out = capture(|| {
            TracingLogSink::new().info(LogRecord::new("Rotating images...").into());
        });
        assert!(out.contains("Rotating images..."));
        assert!(out.contains("severity=INFO"));
        assert!(!out.contains("fields="));
    }
}
