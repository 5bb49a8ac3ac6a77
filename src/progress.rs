//! Progress reporting
//!
//! The organizer pushes one [`ProgressEvent`] per visited file into a
//! [`ProgressSink`]. Interactive shells run the organizer on a worker thread
//! and hand it the sending half of [`channel`]; the UI polls the receiving
//! half on its own tick.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// What a progress event reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    /// One visited file
    File,
    /// The closing multi-line run summary
    Summary,
}

/// A human-readable progress line with an optional completion percentage
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub message: String,
    /// Percent complete in `[0, 100]`
    pub percent: Option<f64>,
    pub kind: ProgressKind,
}

impl ProgressEvent {
    pub fn new(message: impl Into<String>, percent: Option<f64>) -> Self {
        Self {
            message: message.into(),
            percent: percent.map(|p| p.clamp(0.0, 100.0)),
            kind: ProgressKind::File,
        }
    }

    /// Final event of a run
    pub fn summary(message: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Summary,
            ..Self::new(message, Some(100.0))
        }
    }

    pub fn is_summary(&self) -> bool {
        self.kind == ProgressKind::Summary
    }

    /// Event for the `done`-th of `total` files
    pub fn for_file(message: impl Into<String>, done: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100.0
        } else {
            done as f64 / total as f64 * 100.0
        };
        Self::new(message, Some(percent))
    }
}

/// Consumer of progress events
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

/// Collects events in memory
impl ProgressSink for Vec<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&mut self, _event: ProgressEvent) {}
}

/// Producing half of the progress channel
///
/// Deliberately not `Clone`: a run has exactly one producer.
#[derive(Debug)]
pub struct ProgressSender {
    tx: Sender<ProgressEvent>,
}

impl ProgressSink for ProgressSender {
    fn emit(&mut self, event: ProgressEvent) {
        // The UI may already be gone; the run still has to finish
        let _ = self.tx.send(event);
    }
}

/// Consuming half of the progress channel
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: Receiver<ProgressEvent>,
    closed: bool,
}

impl ProgressReceiver {
    /// Drain every event queued so far without blocking
    pub fn poll(&mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
        events
    }

    /// The sender was dropped and every event has been drained
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Create an unbounded, ordered, single-producer progress channel
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel();
    (ProgressSender { tx }, ProgressReceiver { rx, closed: false })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_is_clamped() {
        assert_eq!(ProgressEvent::new("x", Some(150.0)).percent, Some(100.0));
        assert_eq!(ProgressEvent::new("x", Some(-3.0)).percent, Some(0.0));
        assert_eq!(ProgressEvent::new("x", None).percent, None);
    }

    #[test]
    fn test_for_file_percent() {
        assert_eq!(ProgressEvent::for_file("x", 1, 4).percent, Some(25.0));
        assert_eq!(ProgressEvent::for_file("x", 4, 4).percent, Some(100.0));
        assert_eq!(ProgressEvent::for_file("x", 0, 0).percent, Some(100.0));
    }

    #[test]
    fn test_summary_event() {
        let event = ProgressEvent::summary("Operation completed:\nFiles processed: 1");
        assert!(event.is_summary());
        assert_eq!(event.percent, Some(100.0));
        assert!(!ProgressEvent::for_file("Moved 'a' to 'b'", 1, 1).is_summary());
    }

    #[test]
    fn test_channel_preserves_order_and_closes() {
        let (mut tx, mut rx) = channel();

        assert!(rx.poll().is_empty());
        assert!(!rx.is_closed());

        tx.emit(ProgressEvent::new("first", Some(50.0)));
        tx.emit(ProgressEvent::new("second", Some(100.0)));
        drop(tx);

        let events = rx.poll();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "first");
        assert_eq!(events[1].message, "second");
        assert!(rx.is_closed());
    }

    #[test]
    fn test_sender_survives_dropped_receiver() {
        let (mut tx, rx) = channel();
        drop(rx);
        tx.emit(ProgressEvent::new("nobody listening", None));
    }
}
