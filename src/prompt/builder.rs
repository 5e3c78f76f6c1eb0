//! Counseling and Socratic system-prompt builders.
//!
//! [`build_counseling_prompt`] assembles four ordered layers:
//!
//! 1. Persona — the fixed 「心灵伙伴」 counselor description.
//! 2. Emotion context — label, intensity, affect descriptor, optional
//!    body-sensation/automatic-thought callouts, detected distortions.
//! 3. Resonance strategy — the intensity-selected policy block.
//! 4. Self-monitoring directive — sentiment-trend tracking plus the
//!    per-emotion guardrail.
//!
//! Layers are joined with a blank line. Optional sub-sections are omitted
//! entirely rather than rendered empty.

use crate::catalog::{emotion_label, Emotion};
use crate::detect::distortion_names;

use super::affect::affect_for;
use super::resonance::ResonanceTier;

/// Inputs to the counseling prompt builder. All fields come from the live
/// session state; the builder itself is pure.
#[derive(Debug, Clone, Default)]
pub struct PromptInput {
    pub emotion: Option<Emotion>,
    /// Self-reported intensity in [0, 10].
    pub intensity: u8,
    pub body_sensation: Option<String>,
    pub automatic_thought: Option<String>,
    /// Detected distortion ids, catalog order.
    pub distortions: Vec<String>,
    /// Whether this call produces the proactive opening greeting.
    pub is_initial: bool,
}

const PERSONA: &str = "你是一位温暖、有同理心的心理咨询师「心灵伙伴」。你的任务是：\n\n\
    1. 用温暖、友善、不评判的语气与用户交流\n\
    2. 主动关心用户的感受，表达理解和接纳\n\
    3. 使用简短的回复（2-4句话），避免长篇大论\n\
    4. 适时给予鼓励和肯定\n\
    5. 引导用户觉察情绪和想法，但不说教";

/// Build the layered counseling system prompt. Deterministic: identical
/// inputs produce a byte-identical string.
pub fn build_counseling_prompt(input: &PromptInput) -> String {
    let layers = [
        PERSONA.to_string(),
        emotion_context(input),
        ResonanceTier::for_intensity(input.intensity).policy().to_string(),
        awareness_directive(input.emotion),
    ];
    layers.join("\n\n")
}

/// Layer 2: the user's current emotional context.
fn emotion_context(input: &PromptInput) -> String {
    let label = emotion_label(input.emotion);
    let affect = affect_for(input.emotion);

    let mut lines = vec![
        format!("用户当前情绪：{}（强度 {}/10）", label, input.intensity),
        format!("情绪维度：{}", affect.describe()),
    ];

    if let Some(sensation) = non_empty(input.body_sensation.as_deref()) {
        lines.push(format!("身体感受：「{}」", sensation));
    }
    if let Some(thought) = non_empty(input.automatic_thought.as_deref()) {
        lines.push(format!("用户的自动思维：「{}」", thought));
    }
    let names = distortion_names(&input.distortions);
    if !names.is_empty() {
        lines.push(format!("检测到的认知偏误：{}", names.join("、")));
    }

    lines.join("\n")
}

/// Layer 4: multi-turn self-monitoring plus the per-emotion guardrail.
fn awareness_directive(emotion: Option<Emotion>) -> String {
    format!(
        "自我监控：\n\
         - 留意多轮对话中用户情绪的变化趋势\n\
         - 如果连续两轮之后用户情绪没有好转，放下当前引导，回到纯粹的陪伴和确认\n\
         - {}\n\
         - 始终保持温暖和支持性，回复要简洁自然，像朋友聊天一样，用中文回复",
        emotion_guardrail(emotion),
    )
}

/// The "never do X" line for the selected emotion.
fn emotion_guardrail(emotion: Option<Emotion>) -> &'static str {
    match emotion {
        Some(Emotion::Anger) => "永远不要让用户「冷静一点」，不要否定他的愤怒",
        Some(Emotion::Anxiety) => "永远不要说「别担心」，不要轻描淡写用户的担忧",
        Some(Emotion::Sadness) => "永远不要强行灌输积极思考，不要说「往好处想」",
        Some(Emotion::Shame) => "永远不要评价用户的对错，不要让用户感到被审视",
        Some(Emotion::Stress) => "永远不要催促用户，不要增加新的任务感",
        Some(Emotion::Numbness) => "永远不要强迫用户立刻说出感受或贴上情绪标签",
        None => "永远不要否定或轻视用户的感受",
    }
}

/// The user turn sent in place of history when `is_initial` is set: asks the
/// model to open the conversation itself.
pub fn initial_greeting_turn(emotion: Option<Emotion>) -> String {
    format!(
        "请根据我的情绪状态（{}）主动向我打招呼，表达你注意到我的情绪，\
         并温暖地询问我是否愿意聊聊。回复要简短亲切（1-2句话），可以使用一个适合的 emoji。",
        emotion_label(emotion),
    )
}

/// Build the Socratic-question system prompt.
pub fn build_socratic_prompt(
    emotion: Option<Emotion>,
    distortions: &[String],
    intensity: u8,
) -> String {
    let names = distortion_names(distortions);
    let distortion_line = if names.is_empty() {
        "未识别".to_string()
    } else {
        names.join("、")
    };

    format!(
        "你是一位温暖、有同理心的心理咨询师，专门使用苏格拉底式提问帮助人们重新审视自己的想法。\n\n\
         你的任务是：\n\
         1. 不直接给建议，而是用开放式问题引导对方思考\n\
         2. 用温和、不评判的语气\n\
         3. 帮助对方从不同角度看待问题\n\
         4. 提问要简短、具体、有针对性\n\n\
         用户正在感受：{}（强度 {}/10）\n\
         检测到的认知偏误：{}\n\n\
         请根据用户的想法，生成 1-2 个苏格拉底式引导问题。问题要：\n\
         - 用中文\n\
         - 语气温和亲切\n\
         - 引导反思而非说教\n\
         - 每个问题一行",
        emotion_label(emotion),
        intensity,
        distortion_line,
    )
}

/// Post-process a model reply into suggested questions: one per line,
/// trimmed, must end in a full-width question mark, at most two.
pub fn extract_questions(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.ends_with('？'))
        .take(2)
        .map(String::from)
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> PromptInput {
        PromptInput {
            emotion: Some(Emotion::Anxiety),
            intensity: 9,
            body_sensation: Some("胸口发紧".into()),
            automatic_thought: Some("明天的汇报一定会搞砸".into()),
            distortions: vec!["catastrophizing".into(), "all-or-nothing".into()],
            is_initial: false,
        }
    }

    #[test]
    fn test_builder_is_deterministic() {
        let input = sample_input();
        assert_eq!(build_counseling_prompt(&input), build_counseling_prompt(&input));
    }

    #[test]
    fn test_layers_appear_in_order() {
        let prompt = build_counseling_prompt(&sample_input());
        let persona = prompt.find("心灵伙伴").unwrap();
        let emotion = prompt.find("用户当前情绪").unwrap();
        let resonance = prompt.find("共情策略").unwrap();
        let awareness = prompt.find("自我监控").unwrap();
        assert!(persona < emotion && emotion < resonance && resonance < awareness);
    }

    #[test]
    fn test_high_intensity_selects_high_tier_only() {
        let prompt = build_counseling_prompt(&sample_input());
        assert!(prompt.contains(ResonanceTier::High.policy()));
        assert!(!prompt.contains(ResonanceTier::Medium.policy()));
        assert!(!prompt.contains(ResonanceTier::Low.policy()));
    }

    #[test]
    fn test_high_tier_never_instructs_giving_advice() {
        // "给建议" may only ever appear under a negation; the prompt must not
        // instruct the model to give advice at high intensity.
        let prompt = build_counseling_prompt(&sample_input());
        for (idx, _) in prompt.match_indices("给建议") {
            let prefix = &prompt[..idx];
            let window = prefix
                .char_indices()
                .rev()
                .nth(9)
                .map(|(i, _)| i)
                .unwrap_or(0);
            let preceding = &prefix[window..];
            assert!(
                preceding.contains("不要") || preceding.contains("不直接"),
                "un-negated advice instruction at byte {}",
                idx
            );
        }
    }

    #[test]
    fn test_intensity_boundaries() {
        let mut input = sample_input();
        for (intensity, tier) in [
            (4, ResonanceTier::Low),
            (5, ResonanceTier::Medium),
            (7, ResonanceTier::Medium),
            (8, ResonanceTier::High),
        ] {
            input.intensity = intensity;
            let prompt = build_counseling_prompt(&input);
            assert!(prompt.contains(tier.policy()), "intensity {}", intensity);
        }
    }

    #[test]
    fn test_empty_distortions_section_omitted() {
        let mut input = sample_input();
        input.distortions.clear();
        let prompt = build_counseling_prompt(&input);
        assert!(!prompt.contains("检测到的认知偏误"));
    }

    #[test]
    fn test_blank_optional_fields_omitted() {
        let mut input = sample_input();
        input.body_sensation = Some("   ".into());
        input.automatic_thought = None;
        let prompt = build_counseling_prompt(&input);
        assert!(!prompt.contains("身体感受"));
        assert!(!prompt.contains("自动思维"));
    }

    #[test]
    fn test_unknown_emotion_falls_back() {
        let mut input = sample_input();
        input.emotion = None;
        let prompt = build_counseling_prompt(&input);
        assert!(prompt.contains("情绪困扰"));
        assert!(prompt.contains("愉悦度中等、唤醒度中等、掌控感中等"));
    }

    #[test]
    fn test_anxiety_guardrail_present() {
        let prompt = build_counseling_prompt(&sample_input());
        assert!(prompt.contains("别担心"));
    }

    #[test]
    fn test_initial_greeting_turn_names_emotion() {
        let turn = initial_greeting_turn(Some(Emotion::Sadness));
        assert!(turn.contains("沮丧"));
        assert!(turn.contains("打招呼"));
    }

    #[test]
    fn test_socratic_prompt_without_distortions() {
        let prompt = build_socratic_prompt(Some(Emotion::Shame), &[], 6);
        assert!(prompt.contains("未识别"));
        assert!(prompt.contains("羞耻"));
    }

    #[test]
    fn test_extract_questions_filters_and_caps() {
        let reply = "好的，这里有几个问题：\n\
                     如果换作是你最好的朋友，你会对TA说什么？\n\
                     这不是问题\n\
                     有没有相反的证据？\n\
                     第三个问题会被丢弃吗？";
        let questions = extract_questions(reply);
        assert_eq!(questions.len(), 2);
        assert!(questions[0].ends_with('？'));
        assert_eq!(questions[1], "有没有相反的证据？");
    }

    #[test]
    fn test_extract_questions_empty_reply() {
        assert!(extract_questions("").is_empty());
        assert!(extract_questions("没有问题。").is_empty());
    }
}
