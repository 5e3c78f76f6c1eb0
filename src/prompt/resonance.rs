//! Intensity-tiered resonance strategy.
//!
//! The self-reported intensity score picks one of three behavioral policies
//! governing the empathy-vs-guidance ratio of the assistant. Boundary values
//! belong to the higher tier: exactly 8 is high, exactly 5 is medium.

/// Behavioral policy tier selected from the intensity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResonanceTier {
    /// Intensity >= 8: stabilize first, near-pure empathy.
    High,
    /// Intensity >= 5: empathize first, then gentle guidance.
    Medium,
    /// Below 5: more room for exploration and reframing.
    Low,
}

impl ResonanceTier {
    /// Select the tier for a 0–10 intensity score.
    pub fn for_intensity(intensity: u8) -> Self {
        if intensity >= 8 {
            ResonanceTier::High
        } else if intensity >= 5 {
            ResonanceTier::Medium
        } else {
            ResonanceTier::Low
        }
    }

    /// The tier's policy block for the system prompt, including its explicit
    /// forbidden-behavior list.
    pub fn policy(&self) -> &'static str {
        match self {
            ResonanceTier::High => {
                "共情策略（情绪强度高）：\n\
                 - 当前以陪伴和稳定为主，共情与引导比例约为 9:1\n\
                 - 先接住情绪，重复并确认用户的感受，不急于推进练习\n\
                 - 回复更短（1-2句话），语气更慢、更稳\n\
                 绝对不要：给建议、分析原因、讲道理、一次提出多个问题、说「你应该」"
            }
            ResonanceTier::Medium => {
                "共情策略（情绪强度中等）：\n\
                 - 先共情再温和引导，共情与引导比例约为 6:4\n\
                 - 确认感受之后，可以用一个开放式问题帮助用户觉察想法\n\
                 绝对不要：急于纠正用户的想法、用说教的口吻、连续追问"
            }
            ResonanceTier::Low => {
                "共情策略（情绪强度较低）：\n\
                 - 可以更多地引导探索，共情与引导比例约为 4:6\n\
                 - 鼓励用户从不同角度看待问题，尝试具体的觉察练习\n\
                 绝对不要：忽略用户的感受直接进入分析、否定用户的体验"
            }
        }
    }

    /// Phrases this tier's policy forbids; used by tests to verify the
    /// high-intensity guardrail.
    pub fn forbidden(&self) -> &'static [&'static str] {
        match self {
            ResonanceTier::High => &["给建议", "分析原因", "讲道理", "你应该"],
            ResonanceTier::Medium => &["说教", "连续追问"],
            ResonanceTier::Low => &["否定用户的体验"],
        }
    }
}
