//! In-progress CBT session state.
//!
//! A linear four-step wizard — Welcome → Naming → Restructuring → Action —
//! with explicit transitions only. Each session instance owns its own state
//! struct; there is no ambient mutable state. Text setters recompute the
//! derived distortion tags and crisis flag from scratch on every change so
//! they can never go stale.

use serde::Serialize;
use thiserror::Error;

use crate::catalog::Emotion;
use crate::detect::{contains_crisis_keyword, detect_distortions};
use crate::history::NewSession;

/// Wizard step pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Welcome,
    Naming,
    Restructuring,
    Action,
}

impl Step {
    pub fn index(&self) -> u8 {
        match self {
            Step::Welcome => 0,
            Step::Naming => 1,
            Step::Restructuring => 2,
            Step::Action => 3,
        }
    }
}

/// A rejected transition. Guard failures block navigation without any error
/// dialog; the caller just keeps the affordance disabled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("an emotion must be named before restructuring")]
    EmotionRequired,
    #[error("an automatic thought is required before choosing an action")]
    ThoughtRequired,
    #[error("already at the final step")]
    AtFinalStep,
    #[error("already at the first step")]
    AtFirstStep,
    #[error("session is complete; reset to start over")]
    Completed,
}

/// The in-progress session. Created with defaults at wizard start, mutated
/// field-by-field by user actions, and either reset or snapshotted on
/// completion.
#[derive(Debug, Clone)]
pub struct SessionState {
    step: Step,
    // Step 1 — emotion naming
    pub custom_emotion: String,
    pub selected_emotion: Option<Emotion>,
    intensity: u8,
    pub body_sensation: String,
    // Step 2 — cognitive restructuring
    automatic_thought: String,
    detected_distortions: Vec<String>,
    pub ai_questions: Vec<String>,
    balanced_thought: String,
    // Step 3 — micro-action
    pub selected_action: Option<String>,
    action_completed: bool,
    // Crisis banner
    crisis_banner: bool,
    crisis_dismissed: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            step: Step::Welcome,
            custom_emotion: String::new(),
            selected_emotion: None,
            intensity: 5,
            body_sensation: String::new(),
            automatic_thought: String::new(),
            detected_distortions: Vec::new(),
            ai_questions: Vec::new(),
            balanced_thought: String::new(),
            selected_action: None,
            action_completed: false,
            crisis_banner: false,
            crisis_dismissed: false,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    pub fn automatic_thought(&self) -> &str {
        &self.automatic_thought
    }

    pub fn balanced_thought(&self) -> &str {
        &self.balanced_thought
    }

    pub fn detected_distortions(&self) -> &[String] {
        &self.detected_distortions
    }

    pub fn crisis_banner_visible(&self) -> bool {
        self.crisis_banner
    }

    pub fn is_completed(&self) -> bool {
        self.action_completed
    }

    // -- guards ------------------------------------------------------------

    /// Naming → Restructuring needs either a catalog selection or non-blank
    /// custom text.
    pub fn can_proceed_to_restructuring(&self) -> bool {
        self.selected_emotion.is_some() || !self.custom_emotion.trim().is_empty()
    }

    /// Restructuring → Action needs a non-blank automatic thought.
    pub fn can_proceed_to_action(&self) -> bool {
        !self.automatic_thought.trim().is_empty()
    }

    // -- transitions -------------------------------------------------------

    /// Advance one step, enforcing the guards. The state is unchanged on
    /// rejection.
    pub fn advance(&mut self) -> Result<Step, TransitionError> {
        if self.action_completed {
            return Err(TransitionError::Completed);
        }
        let next = match self.step {
            Step::Welcome => Step::Naming,
            Step::Naming => {
                if !self.can_proceed_to_restructuring() {
                    return Err(TransitionError::EmotionRequired);
                }
                Step::Restructuring
            }
            Step::Restructuring => {
                if !self.can_proceed_to_action() {
                    return Err(TransitionError::ThoughtRequired);
                }
                Step::Action
            }
            Step::Action => return Err(TransitionError::AtFinalStep),
        };
        self.step = next;
        Ok(next)
    }

    /// Go back one step. Unguarded, except that a completed session only
    /// exits through reset.
    pub fn back(&mut self) -> Result<Step, TransitionError> {
        if self.action_completed {
            return Err(TransitionError::Completed);
        }
        let prev = match self.step {
            Step::Welcome => return Err(TransitionError::AtFirstStep),
            Step::Naming => Step::Welcome,
            Step::Restructuring => Step::Naming,
            Step::Action => Step::Restructuring,
        };
        self.step = prev;
        Ok(prev)
    }

    /// Return to Welcome with all fields cleared. Re-arms crisis detection.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // -- field updates -----------------------------------------------------

    pub fn set_custom_emotion(&mut self, emotion: impl Into<String>) {
        self.custom_emotion = emotion.into();
    }

    pub fn select_emotion(&mut self, emotion: Emotion) {
        self.selected_emotion = Some(emotion);
    }

    /// Set the self-reported intensity, clamped to [0, 10].
    pub fn set_intensity(&mut self, intensity: u8) {
        self.intensity = intensity.min(10);
    }

    pub fn set_body_sensation(&mut self, sensation: impl Into<String>) {
        self.body_sensation = sensation.into();
    }

    pub fn set_automatic_thought(&mut self, thought: impl Into<String>) {
        self.automatic_thought = thought.into();
        self.recompute_derived();
    }

    pub fn set_balanced_thought(&mut self, thought: impl Into<String>) {
        self.balanced_thought = thought.into();
        self.recompute_derived();
    }

    pub fn set_ai_questions(&mut self, questions: Vec<String>) {
        self.ai_questions = questions;
    }

    pub fn select_action(&mut self, action_id: impl Into<String>) {
        self.selected_action = Some(action_id.into());
    }

    /// Confirm the micro-action. This is the terminal sub-state: afterwards
    /// the only exits are [`reset`](Self::reset) or snapshot-then-reset.
    pub fn complete_action(&mut self) {
        self.action_completed = true;
    }

    /// Hide the crisis banner for the rest of the session. Dismissal is
    /// sticky; only [`reset`](Self::reset) re-arms it.
    pub fn dismiss_crisis(&mut self) {
        self.crisis_dismissed = true;
        self.crisis_banner = false;
    }

    /// Recompute the derived tags and crisis flag from the current text
    /// fields. Full recomputation, never an incremental patch.
    fn recompute_derived(&mut self) {
        self.detected_distortions = detect_distortions(&self.automatic_thought)
            .into_iter()
            .map(String::from)
            .collect();
        self.crisis_banner = !self.crisis_dismissed
            && contains_crisis_keyword(&[
                self.automatic_thought.as_str(),
                self.balanced_thought.as_str(),
            ]);
    }

    // -- persistence -------------------------------------------------------

    /// Immutable snapshot for the history store. Blank optional fields map
    /// to `None` so they are stored as NULL, not omitted.
    pub fn snapshot(&self, user_id: impl Into<String>) -> NewSession {
        NewSession {
            user_id: user_id.into(),
            custom_emotion: blank_to_none(&self.custom_emotion),
            selected_emotion: self.selected_emotion,
            emotion_intensity: Some(self.intensity),
            body_sensation: blank_to_none(&self.body_sensation),
            automatic_thought: blank_to_none(&self.automatic_thought),
            detected_distortions: self.detected_distortions.clone(),
            ai_questions: self.ai_questions.clone(),
            balanced_thought: blank_to_none(&self.balanced_thought),
            selected_action: self.selected_action.clone(),
        }
    }
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
