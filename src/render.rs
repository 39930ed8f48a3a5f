//! The capability surface the sequencer animates through.
//!
//! Offsets are measured in cell heights: offset `k` shows cell `k` in the
//! visible slot, offset `0` is the rest position.

use crate::icons::Icon;
use std::{
    fmt,
    pin::Pin,
    task::{
        Context,
        Poll,
    },
    time::Duration,
};
use tokio::sync::oneshot;

/// Identifies a reel container on the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReelId(String);

impl ReelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait Renderer {
    /// Whether the surface has a container for `reel`.
    fn has_reel(&self, reel: &ReelId) -> bool;

    /// Replace the icons shown in the reel's cells.
    fn show_cells(&mut self, reel: &ReelId, cells: &[Icon]);

    /// Move the strip instantly with transitions disabled. The new position
    /// must be committed before returning so a following `animate_to` starts
    /// from it instead of coalescing both moves.
    fn position(&mut self, reel: &ReelId, offset: usize);

    /// Start a timed transition to `offset`. The returned signal resolves once
    /// the transition has finished.
    fn animate_to(
        &mut self,
        reel: &ReelId,
        offset: usize,
        duration: Duration,
    ) -> TransitionEnd;

    /// Drop any transition and pin the strip at rest.
    fn settle(&mut self, reel: &ReelId) {
        self.position(reel, 0);
    }
}

/// Sending half of a transition-end signal, held by the renderer.
#[derive(Debug)]
pub struct TransitionSignal(oneshot::Sender<()>);

impl TransitionSignal {
    pub fn fire(self) {
        // The receiver may already be gone if nobody waits for this reel.
        let _ = self.0.send(());
    }
}

/// Resolves when the renderer reports the end of a transition. A renderer
/// that drops its signal without firing also counts as finished.
#[derive(Debug)]
pub struct TransitionEnd(oneshot::Receiver<()>);

impl TransitionEnd {
    pub fn channel() -> (TransitionSignal, TransitionEnd) {
        let (tx, rx) = oneshot::channel();
        (TransitionSignal(tx), TransitionEnd(rx))
    }

    /// An already-finished transition.
    pub fn finished() -> Self {
        let (signal, end) = Self::channel();
        signal.fire();
        end
    }
}

impl Future for TransitionEnd {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match Pin::new(&mut self.0).poll(cx) {
            Poll::Ready(Ok(())) => Poll::Ready(()),
            Poll::Ready(Err(_)) => {
                tracing::warn!("renderer dropped a transition signal without firing it");
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[tokio::test]
    async fn transition_end__resolves_after_fire() {
        let (signal, end) = TransitionEnd::channel();
        signal.fire();
        end.await;
    }

    #[tokio::test]
    async fn transition_end__resolves_when_signal_dropped() {
        let (signal, end) = TransitionEnd::channel();
        drop(signal);
        end.await;
    }

    #[tokio::test]
    async fn finished__is_immediately_ready() {
        TransitionEnd::finished().await;
    }
}
