//! Reference data for the CBT wizard.
//!
//! Everything in this module is immutable catalog data: the closed emotion
//! set, the cognitive-distortion taxonomy with its trigger keywords, the
//! per-emotion micro-action recommendations, and the crisis keyword/hotline
//! lists. Nothing here is created or destroyed at runtime — the wizard
//! selects from these tables.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Emotions
// ---------------------------------------------------------------------------

/// The closed set of nameable emotions, one selected per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anger,
    Anxiety,
    Sadness,
    Shame,
    Stress,
    Numbness,
}

impl Emotion {
    /// All emotions in catalog order.
    pub const ALL: [Emotion; 6] = [
        Emotion::Anger,
        Emotion::Anxiety,
        Emotion::Sadness,
        Emotion::Shame,
        Emotion::Stress,
        Emotion::Numbness,
    ];

    /// Wire identifier (matches the serde representation).
    pub fn id(&self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Anxiety => "anxiety",
            Emotion::Sadness => "sadness",
            Emotion::Shame => "shame",
            Emotion::Stress => "stress",
            Emotion::Numbness => "numbness",
        }
    }

    /// User-facing Chinese label.
    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Anger => "愤怒",
            Emotion::Anxiety => "焦虑",
            Emotion::Sadness => "沮丧",
            Emotion::Shame => "羞耻",
            Emotion::Stress => "压力",
            Emotion::Numbness => "麻木",
        }
    }

    /// Emoji shown next to the label in pickers and share cards.
    pub fn icon(&self) -> &'static str {
        match self {
            Emotion::Anger => "😤",
            Emotion::Anxiety => "😰",
            Emotion::Sadness => "😢",
            Emotion::Shame => "😳",
            Emotion::Stress => "😫",
            Emotion::Numbness => "😶",
        }
    }
}

impl std::str::FromStr for Emotion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .iter()
            .copied()
            .find(|e| e.id() == s)
            .ok_or(())
    }
}

/// Label used when no catalog emotion is selected.
pub const GENERIC_EMOTION_LABEL: &str = "情绪困扰";

/// Resolve an optional emotion to its display label, falling back to the
/// generic "emotional distress" label.
pub fn emotion_label(emotion: Option<Emotion>) -> &'static str {
    emotion.map(|e| e.label()).unwrap_or(GENERIC_EMOTION_LABEL)
}

// ---------------------------------------------------------------------------
// Cognitive distortions
// ---------------------------------------------------------------------------

/// One entry in the cognitive-distortion taxonomy.
#[derive(Debug, Clone, Serialize)]
pub struct Distortion {
    /// Stable identifier stored in session rows.
    pub id: &'static str,
    /// Chinese display name.
    pub name: &'static str,
    /// One-line description shown on the tag.
    pub description: &'static str,
    /// Trigger keywords; a substring match on any of them tags the text.
    pub keywords: &'static [&'static str],
}

/// The six-entry distortion catalog, in fixed order. Detection results are
/// always reported in this order, not in match order.
pub const DISTORTIONS: [Distortion; 6] = [
    Distortion {
        id: "catastrophizing",
        name: "灾难化",
        description: "把事情往最坏的方向想",
        keywords: &[
            "完了", "毁了", "糟糕透了", "不可能", "再也", "肯定完蛋", "没救了", "世界末日",
        ],
    },
    Distortion {
        id: "mind-reading",
        name: "读心术",
        description: "以为知道别人在想什么",
        keywords: &[
            "他一定", "她肯定", "他们觉得", "别人认为", "大家都", "他们会想", "看不起",
        ],
    },
    Distortion {
        id: "all-or-nothing",
        name: "非黑即白",
        description: "只看极端，没有中间地带",
        keywords: &["总是", "从不", "永远", "绝对", "完全", "一定", "必须", "根本"],
    },
    Distortion {
        id: "overgeneralization",
        name: "以偏概全",
        description: "用一次经历推断所有情况",
        keywords: &["每次", "所有人", "没有人", "任何", "全部", "都是这样", "一直都"],
    },
    Distortion {
        id: "should-statements",
        name: "应该思维",
        description: "用「应该」给自己或他人施压",
        keywords: &["应该", "必须", "不应该", "不能", "一定要", "怎么能"],
    },
    Distortion {
        id: "personalization",
        name: "过度自责",
        description: "把不相关的事情归咎于自己",
        keywords: &["都怪我", "是我的错", "如果我", "都因为我", "我害的"],
    },
];

/// Look up a distortion's display name by id.
pub fn distortion_name(id: &str) -> Option<&'static str> {
    DISTORTIONS.iter().find(|d| d.id == id).map(|d| d.name)
}

// ---------------------------------------------------------------------------
// Micro-actions
// ---------------------------------------------------------------------------

/// A small, concrete regulation exercise recommended at the Action step.
#[derive(Debug, Clone, Serialize)]
pub struct MicroAction {
    pub id: &'static str,
    pub emotion: Emotion,
    pub title: &'static str,
    pub description: &'static str,
    pub duration: &'static str,
    pub icon: &'static str,
}

/// Three recommendations per emotion, in catalog order.
pub const MICRO_ACTIONS: [MicroAction; 18] = [
    // 焦虑
    MicroAction { id: "box-breathing", emotion: Emotion::Anxiety, title: "盒式呼吸", description: "吸气4秒→屏息4秒→呼气4秒→屏息4秒，重复3次", duration: "2分钟", icon: "🌬️" },
    MicroAction { id: "grounding", emotion: Emotion::Anxiety, title: "5-4-3-2-1 接地练习", description: "说出5样你能看到的，4样能摸到的，3样能听到的...", duration: "3分钟", icon: "🌱" },
    MicroAction { id: "cold-water-anxiety", emotion: Emotion::Anxiety, title: "冷水洗手", description: "用冷水冲洗手腕内侧30秒", duration: "1分钟", icon: "💧" },
    // 愤怒
    MicroAction { id: "cold-water-face", emotion: Emotion::Anger, title: "冷水洗脸", description: "用冷水拍打脸颊，激活迷走神经", duration: "1分钟", icon: "🧊" },
    MicroAction { id: "physical-release", emotion: Emotion::Anger, title: "身体释放", description: "做10个深蹲或拍打枕头", duration: "2分钟", icon: "💪" },
    MicroAction { id: "count-backwards", emotion: Emotion::Anger, title: "倒数呼吸", description: "从100开始倒数，每个数字配合一次呼吸", duration: "3分钟", icon: "🔢" },
    // 沮丧
    MicroAction { id: "walk-50-steps", emotion: Emotion::Sadness, title: "出门走50步", description: "离开当前空间，走到户外感受阳光", duration: "3分钟", icon: "🚶" },
    MicroAction { id: "music", emotion: Emotion::Sadness, title: "听一首振奋的歌", description: "选一首你喜欢的充满能量的音乐", duration: "4分钟", icon: "🎵" },
    MicroAction { id: "gratitude", emotion: Emotion::Sadness, title: "写三件感恩的事", description: "今天有什么小事值得感谢？", duration: "2分钟", icon: "🙏" },
    // 羞耻
    MicroAction { id: "self-compassion", emotion: Emotion::Shame, title: "自我安慰", description: "把手放在心口，对自己说三句温暖的话", duration: "2分钟", icon: "💝" },
    MicroAction { id: "normalize", emotion: Emotion::Shame, title: "正常化练习", description: "想想有多少人也经历过类似的事", duration: "2分钟", icon: "🤝" },
    MicroAction { id: "letter", emotion: Emotion::Shame, title: "给自己写封信", description: "像对待好朋友那样写几句话给自己", duration: "4分钟", icon: "✉️" },
    // 压力
    MicroAction { id: "stretch", emotion: Emotion::Stress, title: "简单拉伸", description: "转动脖子、耸肩、活动手腕", duration: "2分钟", icon: "🧘" },
    MicroAction { id: "tea", emotion: Emotion::Stress, title: "泡一杯茶", description: "专注于泡茶的每一个步骤", duration: "5分钟", icon: "🍵" },
    MicroAction { id: "brain-dump", emotion: Emotion::Stress, title: "大脑清空", description: "把脑海里的事情全部写在纸上", duration: "3分钟", icon: "📝" },
    // 麻木
    MicroAction { id: "sensory", emotion: Emotion::Numbness, title: "感官唤醒", description: "吃一颗糖或闻一下咖啡豆", duration: "1分钟", icon: "🍬" },
    MicroAction { id: "movement", emotion: Emotion::Numbness, title: "活动身体", description: "原地跳跃或甩动手臂", duration: "2分钟", icon: "🦘" },
    MicroAction { id: "texture", emotion: Emotion::Numbness, title: "触感体验", description: "触摸不同材质的物品，感受差异", duration: "2分钟", icon: "🧸" },
];

/// The recommendations for one emotion, in catalog order.
pub fn actions_for(emotion: Emotion) -> Vec<&'static MicroAction> {
    MICRO_ACTIONS.iter().filter(|a| a.emotion == emotion).collect()
}

// ---------------------------------------------------------------------------
// Crisis keywords & hotlines
// ---------------------------------------------------------------------------

/// Self-harm phrases that gate the crisis intervention overlay.
pub const CRISIS_KEYWORDS: [&str; 12] = [
    "自杀", "不想活", "想死", "活着没意思", "结束生命", "离开这个世界",
    "自残", "伤害自己", "割", "跳楼", "吃药", "死了算了",
];

/// A crisis support hotline shown by the intervention overlay.
#[derive(Debug, Clone, Serialize)]
pub struct Hotline {
    pub name: &'static str,
    pub number: &'static str,
}

/// Hotlines listed on the crisis intervention overlay.
pub const HOTLINES: [Hotline; 2] = [
    Hotline { name: "全国心理援助热线", number: "400-161-9995" },
    Hotline { name: "生命热线", number: "400-821-1215" },
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emotion_roundtrip() {
        for e in Emotion::ALL {
            let parsed: Emotion = e.id().parse().unwrap();
            assert_eq!(parsed, e);
        }
        assert!("serenity".parse::<Emotion>().is_err());
    }

    #[test]
    fn test_emotion_serde_lowercase() {
        let json = serde_json::to_string(&Emotion::Anxiety).unwrap();
        assert_eq!(json, "\"anxiety\"");
        let back: Emotion = serde_json::from_str("\"numbness\"").unwrap();
        assert_eq!(back, Emotion::Numbness);
    }

    #[test]
    fn test_generic_label_fallback() {
        assert_eq!(emotion_label(Some(Emotion::Anger)), "愤怒");
        assert_eq!(emotion_label(None), GENERIC_EMOTION_LABEL);
    }

    #[test]
    fn test_three_actions_per_emotion() {
        for e in Emotion::ALL {
            assert_eq!(actions_for(e).len(), 3, "emotion {:?}", e);
        }
    }

    #[test]
    fn test_distortion_catalog_order_is_stable() {
        let ids: Vec<&str> = DISTORTIONS.iter().map(|d| d.id).collect();
        assert_eq!(
            ids,
            vec![
                "catastrophizing",
                "mind-reading",
                "all-or-nothing",
                "overgeneralization",
                "should-statements",
                "personalization",
            ]
        );
    }

    #[test]
    fn test_distortion_name_lookup() {
        assert_eq!(distortion_name("catastrophizing"), Some("灾难化"));
        assert_eq!(distortion_name("unknown"), None);
    }
}
