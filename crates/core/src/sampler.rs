use crate::classifier::{ExpressionClassifier, Frame};
use crate::emotion::EmotionLabel;
use std::time::Duration;

/// Recommended cadence for driving [`EmotionSampler::tick`].
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(3000);

/// Where the sampler is in its one-shot detection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    /// Created but not yet started.
    Idle,
    /// Actively polling the classifier on each tick.
    Armed,
    /// A label has been committed. Terminal until [`EmotionSampler::reset`].
    Detected,
}

/// Decides when to attempt classification and reduces raw scores to a single
/// label, exactly once per session.
///
/// The sampler does not own a timer. The runtime drives `tick()` on a fixed
/// interval (see [`SAMPLE_INTERVAL`]), must stop that timer once `tick`
/// reports a detection, and restarts it after `reset()`. Keeping the clock
/// outside makes every transition testable without wall-clock waits.
#[derive(Debug)]
pub struct EmotionSampler {
    state: SamplerState,
}

impl Default for EmotionSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionSampler {
    pub fn new() -> Self {
        Self {
            state: SamplerState::Idle,
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Arms the sampler. Idempotent; a `Detected` sampler stays detected
    /// until `reset()`.
    pub fn start(&mut self) {
        if self.state != SamplerState::Detected {
            self.state = SamplerState::Armed;
        }
    }

    /// One polling attempt. Silent no-op unless the sampler is armed, the
    /// classifier is ready, and a frame is available. Classifier errors and
    /// "no face found" both leave the sampler armed for the next tick; they
    /// are never surfaced to the user.
    ///
    /// Returns the dominant label on the tick that commits the detection,
    /// and `None` on every other tick. The label is returned exactly once.
    pub async fn tick<C: ExpressionClassifier + ?Sized>(
        &mut self,
        classifier: &C,
        frame: Option<&Frame>,
    ) -> Option<EmotionLabel> {
        if self.state != SamplerState::Armed {
            return None;
        }
        if !classifier.ready() {
            tracing::trace!("classifier not ready, skipping sample tick");
            return None;
        }
        let frame = frame?;

        let scores = match classifier.classify(frame).await {
            Ok(Some(scores)) => scores,
            Ok(None) => {
                tracing::trace!("no face found this tick");
                return None;
            }
            Err(e) => {
                // Treated identically to a miss: polling continues.
                tracing::debug!("classification attempt failed: {e:#}");
                return None;
            }
        };

        let label = scores.dominant()?;
        self.state = SamplerState::Detected;
        tracing::info!(emotion = %label, "emotion detected");
        Some(label)
    }

    /// Re-arms the sampler, forgetting the previous detection. The runtime
    /// is expected to restart the tick timer alongside this call.
    pub fn reset(&mut self) {
        self.state = SamplerState::Armed;
    }
}
