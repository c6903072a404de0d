use crate::emotion::EmotionLabel;
use anyhow::Result;
use std::time::Duration;

/// Artificial latency the runtime waits before invoking the chat backend,
/// to smooth perceived response time.
pub const REPLY_DELAY: Duration = Duration::from_millis(1000);

/// Shown when the backend answered but carried no usable reply text.
pub const NO_REPLY_FALLBACK: &str =
    "Hmm... I didn't quite catch that. Can you say it another way?";

/// Shown when the backend call itself failed.
pub const BACKEND_ERROR_FALLBACK: &str =
    "Something went wrong while contacting the assistant. Let's try that again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// One message in the transcript. Immutable once appended; insertion order
/// is display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ConversationTurn {
    fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

/// A prompt accepted for delivery to the chat backend. The generation tag
/// lets the controller discard replies that resolve after a reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPrompt {
    pub generation: u64,
    pub prompt: String,
}

/// Owns the chat transcript and mediates every request/response cycle with
/// the chat backend, conditioned on the detected emotion.
///
/// The controller is a plain state machine: `begin_user_message` hands the
/// runtime an [`OutboundPrompt`] to deliver, and `complete_reply` applies the
/// outcome. All mutation happens between those two calls on the single
/// control thread, so `pending` is the only concurrency primitive needed to
/// keep replies from overlapping.
#[derive(Debug, Default)]
pub struct ConversationController {
    detected: Option<EmotionLabel>,
    transcript: Vec<ConversationTurn>,
    pending: bool,
    generation: u64,
}

impl ConversationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detected_emotion(&self) -> Option<EmotionLabel> {
        self.detected
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    /// The heading for the detected emotion, once one has been committed.
    pub fn heading(&self) -> Option<&'static str> {
        self.detected.map(|label| label.greeting())
    }

    /// Seeds the conversation for a freshly detected emotion. Valid at most
    /// once per session: returns false (and changes nothing) if a label has
    /// already been committed.
    pub fn on_emotion_detected(&mut self, label: EmotionLabel) -> bool {
        if self.detected.is_some() {
            tracing::debug!(emotion = %label, "ignoring duplicate emotion detection");
            return false;
        }
        self.detected = Some(label);
        self.transcript.clear();
        self.transcript
            .push(ConversationTurn::assistant(label.opener()));
        self.pending = false;
        true
    }

    /// Accepts a user submission. Rejected without any state change when the
    /// trimmed text is empty, when a reply is already in flight, or when no
    /// emotion has been seeded yet.
    ///
    /// On acceptance the user turn is appended synchronously, before any
    /// suspension point, so transcript order always reflects submission
    /// order. The caller delivers the returned prompt to the backend (after
    /// [`REPLY_DELAY`]) and feeds the outcome to [`Self::complete_reply`].
    pub fn begin_user_message(&mut self, text: &str) -> Option<OutboundPrompt> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if self.pending {
            tracing::debug!("rejecting submission while a reply is in flight");
            return None;
        }
        let emotion = match self.detected {
            Some(emotion) => emotion,
            None => {
                tracing::debug!("rejecting submission before emotion detection");
                return None;
            }
        };

        self.transcript.push(ConversationTurn::user(trimmed));
        self.pending = true;
        Some(OutboundPrompt {
            generation: self.generation,
            prompt: build_prompt(emotion, trimmed),
        })
    }

    /// Applies the outcome of a backend call. Outcomes tagged with a stale
    /// generation (the session was reset while the call was in flight) are
    /// dropped so they cannot corrupt the new session's transcript.
    ///
    /// Exactly one assistant turn is appended for a live outcome: the reply
    /// text, or a fixed fallback when the backend returned no usable text or
    /// failed outright. `pending` is always cleared.
    pub fn complete_reply(&mut self, generation: u64, outcome: Result<Option<String>>) {
        if generation != self.generation {
            tracing::debug!(generation, "dropping reply from a stale generation");
            return;
        }
        if !self.pending {
            tracing::warn!("reply arrived with no request pending, ignoring");
            return;
        }

        let text = match outcome {
            Ok(Some(reply)) if !reply.trim().is_empty() => reply,
            Ok(_) => NO_REPLY_FALLBACK.to_string(),
            Err(e) => {
                tracing::warn!("chat backend call failed: {e:#}");
                BACKEND_ERROR_FALLBACK.to_string()
            }
        };
        self.transcript.push(ConversationTurn::assistant(text));
        self.pending = false;
    }

    /// Returns the controller to its initial state. Safe while a reply is in
    /// flight: the generation bump guarantees the late outcome is discarded
    /// rather than applied to the new session.
    pub fn reset(&mut self) {
        self.detected = None;
        self.transcript.clear();
        self.pending = false;
        self.generation = self.generation.wrapping_add(1);
    }
}

fn build_prompt(emotion: EmotionLabel, text: &str) -> String {
    format!(
        "You are a kind, emotionally-aware AI assistant. The user's detected mood is \
         \"{emotion}\". They said: \"{text}\". Based on that, continue the conversation \
         naturally. Be empathetic, ask follow-up questions, and keep the conversation flowing."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(label: EmotionLabel) -> ConversationController {
        let mut controller = ConversationController::new();
        assert!(controller.on_emotion_detected(label));
        controller
    }

    #[test]
    fn detection_seeds_exactly_one_opener_turn() {
        let controller = seeded(EmotionLabel::Happy);
        assert_eq!(controller.detected_emotion(), Some(EmotionLabel::Happy));
        assert_eq!(controller.transcript().len(), 1);
        assert_eq!(
            controller.transcript()[0],
            ConversationTurn::assistant(EmotionLabel::Happy.opener())
        );
        assert!(!controller.pending());
        assert_eq!(controller.heading(), Some(EmotionLabel::Happy.greeting()));
    }

    #[test]
    fn second_detection_is_ignored() {
        let mut controller = seeded(EmotionLabel::Happy);
        assert!(!controller.on_emotion_detected(EmotionLabel::Sad));
        assert_eq!(controller.detected_emotion(), Some(EmotionLabel::Happy));
        assert_eq!(controller.transcript().len(), 1);
    }

    #[test]
    fn accepted_submission_appends_user_turn_and_builds_prompt() {
        let mut controller = seeded(EmotionLabel::Sad);
        let outbound = controller
            .begin_user_message("I'm okay I guess")
            .expect("submission should be accepted");

        assert!(controller.pending());
        assert_eq!(controller.transcript().len(), 2);
        assert_eq!(
            controller.transcript()[1],
            ConversationTurn::user("I'm okay I guess")
        );
        assert!(outbound.prompt.contains("\"sad\""));
        assert!(outbound.prompt.contains("I'm okay I guess"));
    }

    #[test]
    fn successful_reply_appends_one_assistant_turn() {
        let mut controller = seeded(EmotionLabel::Sad);
        let outbound = controller.begin_user_message("I'm okay I guess").unwrap();

        controller.complete_reply(outbound.generation, Ok(Some("Tell me more.".to_string())));
        assert!(!controller.pending());
        assert_eq!(controller.transcript().len(), 3);
        assert_eq!(
            controller.transcript()[2],
            ConversationTurn::assistant("Tell me more.")
        );
    }

    #[test]
    fn missing_reply_text_uses_clarification_fallback() {
        let mut controller = seeded(EmotionLabel::Neutral);
        let outbound = controller.begin_user_message("hello").unwrap();

        controller.complete_reply(outbound.generation, Ok(None));
        assert_eq!(
            controller.transcript().last().unwrap().text,
            NO_REPLY_FALLBACK
        );
        assert!(!controller.pending());
    }

    #[test]
    fn backend_failure_uses_error_fallback_and_session_stays_usable() {
        let mut controller = seeded(EmotionLabel::Angry);
        let outbound = controller.begin_user_message("ugh").unwrap();

        controller.complete_reply(outbound.generation, Err(anyhow::anyhow!("connection refused")));
        assert_eq!(
            controller.transcript().last().unwrap().text,
            BACKEND_ERROR_FALLBACK
        );
        assert!(!controller.pending());

        // A further submission is accepted after the failure.
        assert!(controller.begin_user_message("still here").is_some());
    }

    #[test]
    fn empty_and_whitespace_submissions_are_rejected() {
        let mut controller = seeded(EmotionLabel::Happy);
        assert!(controller.begin_user_message("").is_none());
        assert!(controller.begin_user_message("   ").is_none());
        assert_eq!(controller.transcript().len(), 1);
        assert!(!controller.pending());
    }

    #[test]
    fn submissions_before_detection_are_rejected() {
        let mut controller = ConversationController::new();
        assert!(controller.begin_user_message("anyone there?").is_none());
        assert!(controller.transcript().is_empty());
    }

    #[test]
    fn only_the_first_submission_wins_while_pending() {
        let mut controller = seeded(EmotionLabel::Happy);
        let first = controller.begin_user_message("first").unwrap();
        assert!(controller.begin_user_message("second").is_none());
        assert!(controller.begin_user_message("third").is_none());
        assert_eq!(controller.transcript().len(), 2);

        controller.complete_reply(first.generation, Ok(Some("hi".to_string())));
        assert!(controller.begin_user_message("fourth").is_some());
    }

    #[test]
    fn reset_clears_everything() {
        let mut controller = seeded(EmotionLabel::Fearful);
        controller.begin_user_message("help").unwrap();

        controller.reset();
        assert_eq!(controller.detected_emotion(), None);
        assert!(controller.transcript().is_empty());
        assert!(!controller.pending());
        assert_eq!(controller.heading(), None);
    }

    #[test]
    fn stale_reply_after_reset_is_dropped() {
        let mut controller = seeded(EmotionLabel::Happy);
        let outbound = controller.begin_user_message("hello").unwrap();

        // Reset while the reply is still in flight.
        controller.reset();
        controller.on_emotion_detected(EmotionLabel::Sad);

        controller.complete_reply(outbound.generation, Ok(Some("late reply".to_string())));
        assert_eq!(controller.transcript().len(), 1);
        assert_eq!(
            controller.transcript()[0],
            ConversationTurn::assistant(EmotionLabel::Sad.opener())
        );
        assert!(!controller.pending());
    }

    #[tokio::test]
    async fn full_turn_cycle_through_a_mock_backend() {
        use crate::chat::{ChatBackend, MockChatBackend};

        let mut backend = MockChatBackend::new();
        backend
            .expect_complete()
            .returning(|_| Box::pin(async { Ok(Some("Tell me more.".to_string())) }))
            .once();

        let mut controller = seeded(EmotionLabel::Sad);
        let outbound = controller.begin_user_message("I'm okay I guess").unwrap();

        let outcome = backend.complete(&outbound.prompt).await;
        controller.complete_reply(outbound.generation, outcome);

        assert!(!controller.pending());
        assert_eq!(controller.transcript().len(), 3);
        assert_eq!(
            controller.transcript()[2],
            ConversationTurn::assistant("Tell me more.")
        );
    }

    #[test]
    fn reply_without_pending_request_is_ignored() {
        let mut controller = seeded(EmotionLabel::Neutral);
        controller.complete_reply(0, Ok(Some("unsolicited".to_string())));
        assert_eq!(controller.transcript().len(), 1);
    }
}
