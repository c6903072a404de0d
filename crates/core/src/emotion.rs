use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The closed set of emotions the expression classifier can report.
///
/// Declaration order doubles as the canonical tie-break order for score
/// reduction: when two labels share the maximal confidence, the one listed
/// first here wins. Keep this order stable; tests depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Surprised,
    Neutral,
    Fearful,
    Disgusted,
}

impl EmotionLabel {
    /// All labels in canonical iteration order.
    pub const ALL: [EmotionLabel; 7] = [
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Surprised,
        EmotionLabel::Neutral,
        EmotionLabel::Fearful,
        EmotionLabel::Disgusted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Angry => "angry",
            EmotionLabel::Surprised => "surprised",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Fearful => "fearful",
            EmotionLabel::Disgusted => "disgusted",
        }
    }

    /// Parses a raw classifier label. Returns `None` for anything outside the
    /// closed set, so unrecognized labels are never forwarded downstream.
    pub fn parse(raw: &str) -> Option<EmotionLabel> {
        match raw.trim().to_lowercase().as_str() {
            "happy" => Some(EmotionLabel::Happy),
            "sad" => Some(EmotionLabel::Sad),
            "angry" => Some(EmotionLabel::Angry),
            "surprised" => Some(EmotionLabel::Surprised),
            "neutral" => Some(EmotionLabel::Neutral),
            "fearful" => Some(EmotionLabel::Fearful),
            "disgusted" => Some(EmotionLabel::Disgusted),
            _ => None,
        }
    }

    /// The heading shown to the user once this emotion has been detected.
    pub fn greeting(&self) -> &'static str {
        match self {
            EmotionLabel::Happy => "You look joyful today! 😊",
            EmotionLabel::Sad => "You seem a little down. 😔",
            EmotionLabel::Angry => "Looks like something is bothering you. 😠",
            EmotionLabel::Surprised => "Something caught your attention! 😮",
            EmotionLabel::Neutral => "You seem calm. 😊",
            EmotionLabel::Fearful => "It's okay to feel anxious sometimes. 😟",
            EmotionLabel::Disgusted => "Something feels off? 😕",
        }
    }

    /// The assistant turn that opens the conversation for this emotion.
    pub fn opener(&self) -> &'static str {
        match self {
            EmotionLabel::Happy => {
                "That's a beautiful smile! What's making you feel so good today?"
            }
            EmotionLabel::Sad => {
                "I'm here for you. Do you want to talk about what's bothering you?"
            }
            EmotionLabel::Angry => {
                "I understand things can be frustrating. Want to share what happened?"
            }
            EmotionLabel::Surprised => "You look surprised! Want to tell me what just happened?",
            EmotionLabel::Neutral => "Hey there, how are you feeling today?",
            EmotionLabel::Fearful => "It's okay to feel scared sometimes. Want to talk about it?",
            EmotionLabel::Disgusted => "Did something feel uncomfortable or unpleasant?",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-emotion confidence scores from a single classification call.
///
/// Only the relative ordering of scores matters; the map is produced fresh
/// per call and never retained.
#[derive(Debug, Clone, Default)]
pub struct EmotionScores {
    scores: HashMap<EmotionLabel, f32>,
}

impl EmotionScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: EmotionLabel, score: f32) {
        self.scores.insert(label, score);
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Builds a score map from raw classifier output, dropping any label
    /// outside the closed emotion set.
    pub fn from_raw<'a, I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut out = Self::new();
        for (name, score) in raw {
            match EmotionLabel::parse(name) {
                Some(label) => out.insert(label, score),
                None => tracing::debug!(label = name, "dropping unrecognized emotion label"),
            }
        }
        out
    }

    /// Reduces the map to the single dominant label: the strictly greatest
    /// score wins, and ties resolve to the label encountered first in
    /// [`EmotionLabel::ALL`] order. Empty maps reduce to `None`.
    pub fn dominant(&self) -> Option<EmotionLabel> {
        let mut best: Option<(EmotionLabel, f32)> = None;
        for label in EmotionLabel::ALL {
            if let Some(&score) = self.scores.get(&label) {
                match best {
                    Some((_, top)) if score <= top => {}
                    _ => best = Some((label, score)),
                }
            }
        }
        best.map(|(label, _)| label)
    }
}

impl FromIterator<(EmotionLabel, f32)> for EmotionScores {
    fn from_iter<I: IntoIterator<Item = (EmotionLabel, f32)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_picks_strict_maximum() {
        let scores: EmotionScores = [
            (EmotionLabel::Happy, 0.9),
            (EmotionLabel::Neutral, 0.3),
            (EmotionLabel::Sad, 0.1),
        ]
        .into_iter()
        .collect();
        assert_eq!(scores.dominant(), Some(EmotionLabel::Happy));
    }

    #[test]
    fn dominant_breaks_ties_in_canonical_order() {
        // Sad precedes Neutral in EmotionLabel::ALL, so an exact tie
        // resolves to Sad regardless of map iteration order.
        let scores: EmotionScores = [(EmotionLabel::Neutral, 0.5), (EmotionLabel::Sad, 0.5)]
            .into_iter()
            .collect();
        assert_eq!(scores.dominant(), Some(EmotionLabel::Sad));
    }

    #[test]
    fn dominant_of_empty_scores_is_none() {
        assert_eq!(EmotionScores::new().dominant(), None);
    }

    #[test]
    fn dominant_is_always_in_the_closed_set() {
        let scores: EmotionScores = EmotionLabel::ALL
            .iter()
            .enumerate()
            .map(|(i, &label)| (label, i as f32 * 0.1))
            .collect();
        let label = scores.dominant().unwrap();
        assert!(EmotionLabel::ALL.contains(&label));
    }

    #[test]
    fn from_raw_drops_unknown_labels() {
        let scores = EmotionScores::from_raw([("happy", 0.2), ("confused", 0.9), ("SAD", 0.4)]);
        // "confused" is not in the closed set and must never win.
        assert_eq!(scores.dominant(), Some(EmotionLabel::Sad));
    }

    #[test]
    fn parse_rejects_unknown_labels() {
        assert_eq!(EmotionLabel::parse("happy"), Some(EmotionLabel::Happy));
        assert_eq!(EmotionLabel::parse(" Neutral "), Some(EmotionLabel::Neutral));
        assert_eq!(EmotionLabel::parse("ecstatic"), None);
        assert_eq!(EmotionLabel::parse(""), None);
    }
}
