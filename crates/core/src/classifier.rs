use crate::emotion::EmotionScores;
use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// A single camera frame handed to the classifier. The core never inspects
/// the pixel data; it only passes frames through to the adapter.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

// The `ExpressionClassifier` trait is the seam between the sampling logic and
// whatever expression model backs it. The sampler depends only on this
// abstraction, so tests drive it with `mockall`'s generated mock instead of a
// real model, and the service can swap in any implementation (a local ONNX
// model, a remote API, a scripted stub) without touching the core.
//
// `#[async_trait]` is needed because trait methods here are async;
// `#[cfg_attr(test, automock)]` generates `MockExpressionClassifier` for
// test builds only.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait ExpressionClassifier: Send + Sync {
    /// Whether the underlying model has finished loading. Classification is
    /// never attempted before this returns true.
    fn ready(&self) -> bool;

    /// Classifies the expression in `frame`. `Ok(None)` means no face was
    /// found; `Err` means the attempt itself failed. Both are non-fatal to
    /// the caller.
    async fn classify(&self, frame: &Frame) -> Result<Option<EmotionScores>>;
}
