//! Message types for communication between the capture threads and the UI

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;

use crate::overlay::Keyword;
use crate::vision::OcrResult;

/// Messages sent from background threads to the overlay renderer
#[derive(Debug, Clone)]
pub enum OverlayUpdate {
    /// A new recognition result replaces the previous one
    Recognized(Arc<OcrResult>),
    /// The active keyword changed; `None` stops box drawing
    Keyword(Option<Keyword>),
}

/// Callback asking the UI thread to redraw
pub type RepaintRequest = Arc<dyn Fn() + Send + Sync>;

/// Producer side of the overlay hand-off.
///
/// Publishing enqueues the update and asks for a repaint; the renderer only
/// reads updates on the UI thread.
#[derive(Clone)]
pub struct OverlaySink {
    sender: Sender<OverlayUpdate>,
    repaint: RepaintRequest,
}

impl OverlaySink {
    /// Create a sink and the receiver the UI thread drains
    pub fn new(repaint: RepaintRequest) -> (Self, Receiver<OverlayUpdate>) {
        let (sender, receiver) = unbounded();
        (Self { sender, repaint }, receiver)
    }

    /// Create a sink that does not request repaints
    #[cfg(test)]
    pub fn detached() -> (Self, Receiver<OverlayUpdate>) {
        Self::new(Arc::new(|| {}))
    }

    /// Hand an update to the UI thread
    pub fn publish(&self, update: OverlayUpdate) {
        if self.sender.send(update).is_ok() {
            (self.repaint)();
        }
    }

    /// Ask for a redraw without changing overlay state
    pub fn request_repaint(&self) {
        (self.repaint)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_requests_repaint() {
        let repaints = Arc::new(AtomicUsize::new(0));
        let counter = repaints.clone();
        let (sink, receiver) = OverlaySink::new(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        sink.publish(OverlayUpdate::Keyword(Keyword::parse("hello")));

        assert_eq!(repaints.load(Ordering::SeqCst), 1);
        match receiver.try_recv().unwrap() {
            OverlayUpdate::Keyword(Some(k)) => assert_eq!(k.as_str(), "hello"),
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[test]
    fn test_publish_after_receiver_dropped_is_silent() {
        let repaints = Arc::new(AtomicUsize::new(0));
        let counter = repaints.clone();
        let (sink, receiver) = OverlaySink::new(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        drop(receiver);

        sink.publish(OverlayUpdate::Keyword(None));
        assert_eq!(repaints.load(Ordering::SeqCst), 0);
    }
}
