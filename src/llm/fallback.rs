//! Precomputed fallback content.
//!
//! Every transport failure degrades to one of these canned texts so the
//! guided flow can always complete, even with the AI features entirely
//! offline.

use crate::catalog::{emotion_label, Emotion};

/// Shown when a mid-conversation reply cannot be fetched.
pub const FALLBACK_REPLY: &str =
    "抱歉，我暂时无法回应。请稍后再试，或者继续完成认知重构练习。💙";

/// Shown in place of AI-suggested Socratic questions.
pub const FALLBACK_QUESTIONS: [&str; 2] = [
    "如果换作是你最好的朋友有这样的想法，你会对TA说什么？",
    "有没有什么证据，可能和你现在想的不太一样？",
];

/// Opening greeting used when the initial proactive message cannot be
/// fetched.
pub fn fallback_greeting(emotion: Option<Emotion>) -> String {
    format!(
        "我注意到你正在经历{}。我在这里陪伴你，愿意和我聊聊现在的感受吗？🌱",
        emotion_label(emotion),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_names_the_emotion() {
        assert!(fallback_greeting(Some(Emotion::Stress)).contains("压力"));
        assert!(fallback_greeting(None).contains("情绪困扰"));
    }

    #[test]
    fn test_fallback_questions_end_in_question_mark() {
        for q in FALLBACK_QUESTIONS {
            assert!(q.ends_with('？'));
        }
    }
}
