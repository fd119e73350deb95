//! Code submission and validation types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Language tags the validator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Python,
    JavaScript,
    TypeScript,
    Java,
    CSharp,
    Cpp,
    C,
    Go,
    Rust,
    Sql,
    Json,
    Yaml,
    Toml,
}

impl CodeLanguage {
    pub const ALL: [CodeLanguage; 13] = [
        CodeLanguage::Python,
        CodeLanguage::JavaScript,
        CodeLanguage::TypeScript,
        CodeLanguage::Java,
        CodeLanguage::CSharp,
        CodeLanguage::Cpp,
        CodeLanguage::C,
        CodeLanguage::Go,
        CodeLanguage::Rust,
        CodeLanguage::Sql,
        CodeLanguage::Json,
        CodeLanguage::Yaml,
        CodeLanguage::Toml,
    ];

    /// Parse a free-form language tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "python" | "py" => Some(CodeLanguage::Python),
            "javascript" | "js" => Some(CodeLanguage::JavaScript),
            "typescript" | "ts" => Some(CodeLanguage::TypeScript),
            "java" => Some(CodeLanguage::Java),
            "csharp" | "c#" | "cs" => Some(CodeLanguage::CSharp),
            "cpp" | "c++" | "cxx" => Some(CodeLanguage::Cpp),
            "c" => Some(CodeLanguage::C),
            "go" | "golang" => Some(CodeLanguage::Go),
            "rust" | "rs" => Some(CodeLanguage::Rust),
            "sql" => Some(CodeLanguage::Sql),
            "json" => Some(CodeLanguage::Json),
            "yaml" | "yml" => Some(CodeLanguage::Yaml),
            "toml" => Some(CodeLanguage::Toml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeLanguage::Python => "python",
            CodeLanguage::JavaScript => "javascript",
            CodeLanguage::TypeScript => "typescript",
            CodeLanguage::Java => "java",
            CodeLanguage::CSharp => "csharp",
            CodeLanguage::Cpp => "cpp",
            CodeLanguage::C => "c",
            CodeLanguage::Go => "go",
            CodeLanguage::Rust => "rust",
            CodeLanguage::Sql => "sql",
            CodeLanguage::Json => "json",
            CodeLanguage::Yaml => "yaml",
            CodeLanguage::Toml => "toml",
        }
    }
}

impl fmt::Display for CodeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one code string. Pure value, no identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeValidationResult {
    pub is_valid: bool,
    /// Language tag as submitted.
    pub language: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub line_count: usize,
    pub char_count: usize,
    /// Heuristic structural complexity, 0-100.
    pub complexity_score: u8,
    pub security_issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// A stored, validated code submission. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSnippet {
    pub snippet_id: String,
    /// Owning session, held by value only.
    pub session_id: Uuid,
    pub code: String,
    pub language: String,
    pub timestamp: DateTime<Utc>,
    pub validation_result: CodeValidationResult,
    pub is_solution: bool,
    pub problem_description: String,
}

/// Coarse bucket derived from big-O notation in model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
    Unknown,
}

/// Qualitative review of a code submission produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeAnalysis {
    /// 0-100.
    pub score: u8,
    pub feedback: String,
    pub suggestions: Vec<String>,
    pub language: String,
    pub complexity: ComplexityLevel,
}

/// Holistic end-of-interview summary produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSummary {
    pub summary: String,
    pub grade: String,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_tags_round_trip() {
        for lang in CodeLanguage::ALL {
            assert_eq!(CodeLanguage::from_tag(lang.as_str()), Some(lang));
        }
        assert_eq!(CodeLanguage::from_tag("C++"), Some(CodeLanguage::Cpp));
        assert_eq!(CodeLanguage::from_tag("brainfuck"), None);
    }

    #[test]
    fn test_complexity_level_serialization() {
        assert_eq!(serde_json::to_string(&ComplexityLevel::VeryHigh).unwrap(), "\"Very High\"");
        assert_eq!(serde_json::to_string(&ComplexityLevel::Medium).unwrap(), "\"Medium\"");
    }
}
