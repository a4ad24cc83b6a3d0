//! Line-oriented integer source feeding the first stage.

use crate::error::{PipelineError, Result};
use crate::observer::{PipelineEvent, SharedObserver};
use crate::shutdown::ShutdownSignal;
use crate::sink::OutputSink;
use crossbeam::channel::Sender;
use crossbeam::select;
use std::io::{BufRead, ErrorKind};

/// Line that stops the whole program, compared case-insensitively
pub const EXIT_COMMAND: &str = "exit";

/// How reading the input ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// End of input; the pipeline drains normally
    Exhausted,
    /// The exit command was read and the shutdown signal raised
    ExitRequested,
    /// Shutdown was raised by someone else while sending
    Cancelled,
    /// The reader failed; the pipeline drains what it already has
    Failed(String),
}

/// Parse one whitespace-delimited token as a signed integer
pub fn parse_token(token: &str) -> Result<i64> {
    token
        .parse::<i64>()
        .map_err(|_| PipelineError::InvalidToken(token.to_string()))
}

/// Read lines from `reader`, sending each integer token into `tx`.
///
/// `tx` is consumed and dropped on every return path, which closes the
/// pipeline input.
pub fn read_input<R: BufRead>(
    reader: R,
    tx: Sender<i64>,
    shutdown: &ShutdownSignal,
    sink: &dyn OutputSink,
    observer: &SharedObserver,
) -> InputOutcome {
    let outcome = pump_lines(reader, &tx, shutdown, sink, observer);
    drop(tx);
    if outcome != InputOutcome::ExitRequested {
        observer.record(&PipelineEvent::InputClosed);
    }
    outcome
}

fn pump_lines<R: BufRead>(
    mut reader: R,
    tx: &Sender<i64>,
    shutdown: &ShutdownSignal,
    sink: &dyn OutputSink,
    observer: &SharedObserver,
) -> InputOutcome {
    let mut raw = Vec::new();
    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                let e = PipelineError::from(e);
                tracing::error!(error = %e, "failed reading input");
                return InputOutcome::Failed(e.to_string());
            }
        }
        // undecodable bytes become U+FFFD and surface as invalid tokens
        let line = String::from_utf8_lossy(&raw);

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case(EXIT_COMMAND) {
            observer.record(&PipelineEvent::ExitRequested);
            shutdown.raise();
            return InputOutcome::ExitRequested;
        }

        for token in trimmed.split_whitespace() {
            let value = match parse_token(token) {
                Ok(value) => value,
                Err(e) => {
                    sink.diagnostic(&e.to_string());
                    observer.record(&PipelineEvent::InvalidToken {
                        token: token.to_string(),
                    });
                    continue;
                }
            };

            if shutdown.is_raised() {
                return InputOutcome::Cancelled;
            }
            select! {
                recv(shutdown.listener()) -> _ => return InputOutcome::Cancelled,
                send(tx, value) -> res => {
                    // first stage gone means the pipeline already shut down
                    if res.is_err() {
                        return InputOutcome::Cancelled;
                    }
                }
            }
        }
    }
    InputOutcome::Exhausted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use crate::sink::CollectingSink;
    use crossbeam::channel;
    use std::io::{self, Cursor, Read};
    use std::sync::Arc;

    fn collect(input: &str) -> (InputOutcome, Vec<i64>, CollectingSink, ShutdownSignal) {
        let (tx, rx) = channel::unbounded();
        let sink = CollectingSink::new();
        let shutdown = ShutdownSignal::new();
        let observer: SharedObserver = Arc::new(NoopObserver);
        let outcome = read_input(Cursor::new(input.to_string()), tx, &shutdown, &sink, &observer);
        let values = rx.iter().collect();
        (outcome, values, sink, shutdown)
    }

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token("-42").unwrap(), -42);
        assert!(matches!(
            parse_token("4.5"),
            Err(PipelineError::InvalidToken(t)) if t == "4.5"
        ));
    }

    #[test]
    fn test_reads_tokens_and_skips_invalid() {
        let (outcome, values, sink, shutdown) = collect("1 2 abc\n\n-3 9\n");
        assert_eq!(outcome, InputOutcome::Exhausted);
        assert_eq!(values, vec![1, 2, -3, 9]);
        assert_eq!(
            sink.diagnostics(),
            vec!["Invalid number: abc (You can only use integers)".to_string()]
        );
        assert!(!shutdown.is_raised());
    }

    #[test]
    fn test_exit_command_raises_shutdown() {
        let (outcome, values, _sink, shutdown) = collect("3 6\n  EXIT \n9\n");
        assert_eq!(outcome, InputOutcome::ExitRequested);
        assert_eq!(values, vec![3, 6]);
        assert!(shutdown.is_raised());
    }

    #[test]
    fn test_exit_must_be_whole_line() {
        let (outcome, values, sink, _shutdown) = collect("3 exit\n");
        assert_eq!(outcome, InputOutcome::Exhausted);
        assert_eq!(values, vec![3]);
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped_not_fatal() {
        let (tx, rx) = channel::unbounded();
        let sink = CollectingSink::new();
        let observer: SharedObserver = Arc::new(NoopObserver);
        let outcome = read_input(
            Cursor::new(&b"3\n\xff\xfe 4\n6 9\n"[..]),
            tx,
            &ShutdownSignal::new(),
            &sink,
            &observer,
        );

        assert_eq!(outcome, InputOutcome::Exhausted);
        assert_eq!(rx.iter().collect::<Vec<i64>>(), vec![3, 4, 6, 9]);
        assert_eq!(sink.diagnostics().len(), 1);
        assert!(sink.diagnostics()[0].starts_with("Invalid number: "));
    }

    #[test]
    fn test_last_line_without_newline() {
        let (outcome, values, _sink, _shutdown) = collect("3\n6");
        assert_eq!(outcome, InputOutcome::Exhausted);
        assert_eq!(values, vec![3, 6]);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn test_read_error_closes_input() {
        let (tx, rx) = channel::unbounded::<i64>();
        let sink = CollectingSink::new();
        let observer: SharedObserver = Arc::new(NoopObserver);
        let outcome = read_input(
            io::BufReader::new(FailingReader),
            tx,
            &ShutdownSignal::new(),
            &sink,
            &observer,
        );

        assert!(matches!(outcome, InputOutcome::Failed(ref r) if r.starts_with("Input read error")));
        assert_eq!(rx.iter().count(), 0);
        // read failures are logged, not written to the sink
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn test_cancelled_while_blocked() {
        let (tx, _rx) = channel::bounded(0);
        let shutdown = ShutdownSignal::new();
        shutdown.raise();
        let observer: SharedObserver = Arc::new(NoopObserver);
        let outcome = read_input(
            Cursor::new("1\n".to_string()),
            tx,
            &shutdown,
            &CollectingSink::new(),
            &observer,
        );
        assert_eq!(outcome, InputOutcome::Cancelled);
    }
}
