use anyhow::Result;
use async_trait::async_trait;
use moodbuddy_core::classifier::{ExpressionClassifier, Frame};
use moodbuddy_core::emotion::{EmotionLabel, EmotionScores};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// A scripted stand-in for the real expression model, which is outside the
/// core's scope. It reports "not ready" until [`finish_loading`] is called
/// (the runtime simulates the asynchronous model download), then answers
/// "no face" for a configured number of warm-up ticks before reporting a
/// fixed score distribution dominated by the scripted label.
///
/// [`finish_loading`]: StubClassifier::finish_loading
pub struct StubClassifier {
    scripted: EmotionLabel,
    remaining_misses: AtomicU32,
    ready: AtomicBool,
}

impl StubClassifier {
    pub fn new(scripted: EmotionLabel, warmup_ticks: u32) -> Self {
        Self {
            scripted,
            remaining_misses: AtomicU32::new(warmup_ticks),
            ready: AtomicBool::new(false),
        }
    }

    /// Marks the simulated model load as complete.
    pub fn finish_loading(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ExpressionClassifier for StubClassifier {
    fn ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn classify(&self, _frame: &Frame) -> Result<Option<EmotionScores>> {
        // Count down the warm-up misses before the "face" appears.
        let misses = self.remaining_misses.load(Ordering::SeqCst);
        if misses > 0 {
            self.remaining_misses.store(misses - 1, Ordering::SeqCst);
            return Ok(None);
        }

        let mut scores = EmotionScores::new();
        for label in EmotionLabel::ALL {
            scores.insert(label, if label == self.scripted { 0.9 } else { 0.05 });
        }
        Ok(Some(scores))
    }
}
