pub mod chat;
pub mod classifier;
pub mod conversation;
pub mod emotion;
pub mod sampler;

pub use conversation::{ConversationController, ConversationTurn, Speaker};
pub use emotion::{EmotionLabel, EmotionScores};
pub use sampler::{EmotionSampler, SamplerState};
