//! Goal classification
//!
//! The default classifier is deliberately shallow keyword matching. The trait
//! exists so a richer classifier (rule table, model-backed) can be swapped in
//! without touching the plan scaffold contract.

use serde::{Deserialize, Serialize};

/// Broad category of a user goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    /// Reading, writing, or organizing files
    FileSystem,
    /// Writing or modifying code
    Code,
    /// Inspecting or summarizing existing material
    Analysis,
    /// Anything else
    General,
}

/// Classifies a goal into a [`GoalCategory`]
pub trait GoalClassifier: Send + Sync {
    /// Classify the goal text
    fn classify(&self, goal: &str) -> GoalCategory;
}

/// Keyword-based default classifier
#[derive(Debug, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    const FILE_KEYWORDS: &'static [&'static str] = &[
        "file", "directory", "folder", "path", "rename", "move", "copy", "delete",
    ];
    const CODE_KEYWORDS: &'static [&'static str] = &[
        "code", "function", "implement", "refactor", "compile", "bug", "fix", "test",
    ];
    const ANALYSIS_KEYWORDS: &'static [&'static str] = &[
        "analyze", "analyse", "review", "summarize", "summarise", "explain", "compare", "inspect",
    ];

    pub fn new() -> Self {
        Self
    }
}

impl GoalClassifier for KeywordClassifier {
    fn classify(&self, goal: &str) -> GoalCategory {
        let lowered = goal.to_lowercase();
        let contains_any = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

        // Code wins over filesystem when both match ("fix the bug in main.rs
        // file") since the code steps subsume the file access.
        if contains_any(Self::CODE_KEYWORDS) {
            GoalCategory::Code
        } else if contains_any(Self::FILE_KEYWORDS) {
            GoalCategory::FileSystem
        } else if contains_any(Self::ANALYSIS_KEYWORDS) {
            GoalCategory::Analysis
        } else {
            GoalCategory::General
        }
    }
}
