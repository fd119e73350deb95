//! Static checks on submitted code.
//!
//! Validation runs in a fixed order: length limits, the empty-input short
//! circuit, a language-specific syntax check, the security scan, complexity
//! scoring, then suggestions. Only errors affect `is_valid`.

mod compiler;
mod complexity;
mod python;
mod security;
mod suggestions;
mod syntax;

pub use compiler::{CompilerConfig, DEFAULT_COMPILER_TIMEOUT};
pub use syntax::{SyntaxReport, SyntaxStrategy};

use compiler::{CompileOutcome, CppCompiler};
use rehearse_types::{CodeLanguage, CodeValidationResult};
use tracing::{debug, info};

pub const MIN_CODE_LENGTH: usize = 5;
pub const MAX_CODE_LENGTH: usize = 10_000;
pub const MAX_LINES: usize = 500;

pub const EMPTY_CODE_ERROR: &str = "程式碼不能為空";

/// Validates code strings. Safe to share between tasks.
pub struct CodeValidator {
    compiler: CppCompiler,
}

impl Default for CodeValidator {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl CodeValidator {
    pub fn new(compiler: CompilerConfig) -> Self {
        Self {
            compiler: CppCompiler::new(compiler),
        }
    }

    /// Whether the external C++ compiler can be used.
    pub async fn compiler_available(&self) -> bool {
        self.compiler.is_available().await
    }

    /// Validate `code` written in `language` (a free-form tag such as "py" or "c++").
    ///
    /// Unknown tags skip the syntax step but still get the remaining checks.
    pub async fn validate(&self, code: &str, language: &str) -> CodeValidationResult {
        let char_count = code.chars().count();
        let line_count = code.lines().count();

        if code.trim().is_empty() {
            return CodeValidationResult {
                is_valid: false,
                language: language.to_string(),
                errors: vec![EMPTY_CODE_ERROR.to_string()],
                warnings: Vec::new(),
                line_count: 0,
                char_count: 0,
                complexity_score: 0,
                security_issues: Vec::new(),
                suggestions: Vec::new(),
            };
        }

        let mut errors = length_errors(char_count, line_count);
        let mut warnings = Vec::new();

        let parsed = CodeLanguage::from_tag(language);
        match parsed {
            Some(lang) => {
                let report = self.check_syntax(code, lang).await;
                errors.extend(report.errors);
                warnings.extend(report.warnings);
            }
            None => debug!(
                target: "rehearse::validator",
                "Unknown language '{}', skipping syntax check", language
            ),
        }

        let security_issues = security::scan(code);
        let complexity_score = complexity::score(code, parsed);
        let suggestions = suggestions::suggest(code, parsed, complexity_score);

        let result = CodeValidationResult {
            is_valid: errors.is_empty(),
            language: language.to_string(),
            errors,
            warnings,
            line_count,
            char_count,
            complexity_score,
            security_issues,
            suggestions,
        };

        info!(
            target: "rehearse::validator",
            "Validated {} chars of {}: valid={}, errors={}, complexity={}",
            char_count,
            language,
            result.is_valid,
            result.errors.len(),
            result.complexity_score
        );
        result
    }

    async fn check_syntax(&self, code: &str, language: CodeLanguage) -> SyntaxReport {
        match SyntaxStrategy::for_language(language) {
            SyntaxStrategy::StructuredParse => syntax::check_structured(code, language),
            SyntaxStrategy::BracketBalance => syntax::check_brackets(code, language),
            SyntaxStrategy::ExternalCompiler => match self.compiler.check(code).await {
                CompileOutcome::Checked(report) => report,
                CompileOutcome::Unavailable => compiler::fallback_check(code),
                CompileOutcome::TimedOut => {
                    let mut report = compiler::fallback_check(code);
                    report
                        .warnings
                        .push("C++ 編譯器逾時，已改用簡易語法檢查".to_string());
                    report
                }
            },
        }
    }
}

fn length_errors(char_count: usize, line_count: usize) -> Vec<String> {
    let mut errors = Vec::new();
    if char_count < MIN_CODE_LENGTH {
        errors.push(format!("程式碼太短，至少需要 {MIN_CODE_LENGTH} 個字元"));
    }
    if char_count > MAX_CODE_LENGTH {
        errors.push(format!("程式碼太長，最多允許 {MAX_CODE_LENGTH} 個字元"));
    }
    if line_count > MAX_LINES {
        errors.push(format!("程式碼行數太多，最多允許 {MAX_LINES} 行"));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn validator() -> CodeValidator {
        // Keep tests independent of whether a compiler is installed.
        CodeValidator::new(CompilerConfig {
            program: PathBuf::from("/nonexistent/rehearse-g++"),
            timeout: Duration::from_secs(2),
        })
    }

    #[tokio::test]
    async fn test_too_short() {
        let result = validator().validate("abcd", "python").await;
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("太短"));
        assert_eq!(result.char_count, 4);
    }

    #[tokio::test]
    async fn test_length_boundaries() {
        let v = validator();
        assert!(v.validate("x = 1", "python").await.is_valid);

        let max = format!("#{}", "a".repeat(MAX_CODE_LENGTH - 1));
        let result = v.validate(&max, "python").await;
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(result.char_count, MAX_CODE_LENGTH);

        let over = format!("#{}", "a".repeat(MAX_CODE_LENGTH));
        let result = v.validate(&over, "python").await;
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("太長"));
    }

    #[tokio::test]
    async fn test_too_many_lines() {
        let code = "x=1\n".repeat(MAX_LINES + 1);
        let result = validator().validate(&code, "python").await;
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("行數"));
    }

    #[tokio::test]
    async fn test_empty_short_circuits() {
        for code in ["", "   \n\t  "] {
            let result = validator().validate(code, "python").await;
            assert!(!result.is_valid);
            assert_eq!(result.errors, vec![EMPTY_CODE_ERROR.to_string()]);
            assert_eq!(result.line_count, 0);
            assert_eq!(result.char_count, 0);
            assert_eq!(result.complexity_score, 0);
        }
    }

    #[tokio::test]
    async fn test_bracket_languages() {
        let v = validator();
        let bad = v.validate("function f() { return (1+2; }", "javascript").await;
        assert!(!bad.is_valid);
        assert!(!bad.errors.is_empty());

        let good = v.validate("function f() { return 1+2; }", "javascript").await;
        assert!(good.is_valid);
    }

    #[tokio::test]
    async fn test_structured_single_error() {
        let result = validator().validate("{\"a\": 1,,}", "json").await;
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("第 1 行"));

        let result = validator()
            .validate("def f()\n    return 1\n", "py")
            .await;
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Python 語法錯誤"));
        assert!(result.errors[0].contains("第 1 行"));
    }

    #[tokio::test]
    async fn test_cpp_falls_back_without_compiler() {
        let v = validator();
        assert!(!v.compiler_available().await);

        let result = v.validate("int main() {\n    return (0;\n}", "cpp").await;
        assert!(!result.is_valid);

        let result = v
            .validate("#include <cstdio>\nint main() {\n    return 0;\n}", "c++")
            .await;
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[tokio::test]
    async fn test_unknown_language_skips_syntax() {
        let result = validator().validate("((((( unbalanced", "brainfuck").await;
        assert!(result.is_valid);
        assert_eq!(result.language, "brainfuck");
    }

    #[tokio::test]
    async fn test_security_does_not_invalidate() {
        let result = validator()
            .validate("import os\nos.system('ls')\n", "python")
            .await;
        assert!(result.is_valid);
        assert_eq!(result.security_issues.len(), 2);
    }

    #[tokio::test]
    async fn test_counts_and_suggestions() {
        let code = "var a = 1;\nvar b = 2;\n";
        let result = validator().validate(code, "js").await;
        assert_eq!(result.line_count, 2);
        assert_eq!(result.char_count, code.chars().count());
        assert!(result.suggestions.iter().any(|s| s.contains("var")));
    }
}
