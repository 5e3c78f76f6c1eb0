//! Per-emotion affect descriptors on the pleasure/arousal/dominance axes.
//!
//! The PAD model is used here purely as a qualitative lookup: each catalog
//! emotion maps to a coarse tier per axis, and the prompt renders the tiers
//! as felt-sense language rather than numbers.

use crate::catalog::Emotion;

/// Coarse qualitative tier for one affect axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffectTier {
    Low,
    Medium,
    High,
}

impl AffectTier {
    pub fn label(&self) -> &'static str {
        match self {
            AffectTier::Low => "低",
            AffectTier::Medium => "中等",
            AffectTier::High => "高",
        }
    }
}

/// Three-axis affect descriptor for an emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffectProfile {
    /// Pleasantness of the state.
    pub pleasure: AffectTier,
    /// Physiological activation.
    pub arousal: AffectTier,
    /// Sense of control over the situation.
    pub dominance: AffectTier,
}

impl AffectProfile {
    /// Mid-tier profile used when no catalog emotion is selected.
    pub const DEFAULT: AffectProfile = AffectProfile {
        pleasure: AffectTier::Medium,
        arousal: AffectTier::Medium,
        dominance: AffectTier::Medium,
    };

    /// Render the profile as a single descriptor line for the prompt.
    pub fn describe(&self) -> String {
        format!(
            "愉悦度{}、唤醒度{}、掌控感{}",
            self.pleasure.label(),
            self.arousal.label(),
            self.dominance.label(),
        )
    }
}

/// Fixed per-emotion lookup. Absent emotion falls back to the mid-tier
/// default profile.
pub fn affect_for(emotion: Option<Emotion>) -> AffectProfile {
    use AffectTier::*;
    match emotion {
        Some(Emotion::Anger) => AffectProfile { pleasure: Low, arousal: High, dominance: High },
        Some(Emotion::Anxiety) => AffectProfile { pleasure: Low, arousal: High, dominance: Low },
        Some(Emotion::Sadness) => AffectProfile { pleasure: Low, arousal: Low, dominance: Low },
        Some(Emotion::Shame) => AffectProfile { pleasure: Low, arousal: Medium, dominance: Low },
        Some(Emotion::Stress) => AffectProfile { pleasure: Low, arousal: High, dominance: Medium },
        Some(Emotion::Numbness) => AffectProfile { pleasure: Low, arousal: Low, dominance: Medium },
        None => AffectProfile::DEFAULT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_emotion_gets_mid_tier() {
        assert_eq!(affect_for(None), AffectProfile::DEFAULT);
    }

    #[test]
    fn test_anxiety_profile() {
        let p = affect_for(Some(Emotion::Anxiety));
        assert_eq!(p.pleasure, AffectTier::Low);
        assert_eq!(p.arousal, AffectTier::High);
        assert_eq!(p.dominance, AffectTier::Low);
        assert_eq!(p.describe(), "愉悦度低、唤醒度高、掌控感低");
    }

    #[test]
    fn test_every_emotion_has_a_profile() {
        for e in Emotion::ALL {
            // Lookup is total; describe never panics.
            let _ = affect_for(Some(e)).describe();
        }
    }
}
