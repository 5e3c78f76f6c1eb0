//! Layered system-prompt assembly for the AI counseling features.
//!
//! The prompt is a deterministic pipeline of pure text layers — persona,
//! emotion context, resonance strategy, self-monitoring directive — each
//! emitting a block, concatenated with fixed separators. No network, no
//! randomness: same inputs, byte-identical output.

pub mod affect;
pub mod builder;
pub mod resonance;

pub use affect::{affect_for, AffectProfile, AffectTier};
pub use builder::{
    build_counseling_prompt, build_socratic_prompt, extract_questions,
    initial_greeting_turn, PromptInput,
};
pub use resonance::ResonanceTier;
