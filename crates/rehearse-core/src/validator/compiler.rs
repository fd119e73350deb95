//! C++ syntax checking through the host compiler.
//!
//! Source is written to a temporary file and compiled with `-fsyntax-only`.
//! When no compiler is installed, or it does not answer within the timeout,
//! callers fall back to [`fallback_check`].

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::syntax::{SyntaxReport, check_brackets};
use rehearse_types::CodeLanguage;

/// Default syntax-check timeout.
pub const DEFAULT_COMPILER_TIMEOUT: Duration = Duration::from_secs(10);

/// Where to find the C++ compiler and how long to wait for it.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("g++"),
            timeout: DEFAULT_COMPILER_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CompileOutcome {
    Checked(SyntaxReport),
    Unavailable,
    TimedOut,
}

pub(crate) struct CppCompiler {
    config: CompilerConfig,
    available: OnceCell<bool>,
}

impl CppCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            available: OnceCell::new(),
        }
    }

    /// Probe for the compiler once; the answer is cached for the process lifetime.
    pub async fn is_available(&self) -> bool {
        *self
            .available
            .get_or_init(|| probe(&self.config))
            .await
    }

    pub async fn check(&self, code: &str) -> CompileOutcome {
        if !self.is_available().await {
            return CompileOutcome::Unavailable;
        }

        // Removed when `source` drops, on every return path.
        let source = match write_source(code) {
            Ok(file) => file,
            Err(e) => {
                warn!(target: "rehearse::validator", "Failed to write C++ source to temp file: {}", e);
                return CompileOutcome::Unavailable;
            }
        };

        let mut cmd = Command::new(&self.config.program);
        cmd.args(["-fsyntax-only", "-Wall", "-x", "c++"])
            .arg(source.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match timeout(self.config.timeout, cmd.output()).await {
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                debug!(
                    target: "rehearse::validator",
                    "Compiler exited with {} ({} bytes of diagnostics)",
                    output.status,
                    stderr.len()
                );
                CompileOutcome::Checked(parse_diagnostics(
                    &stderr,
                    source.path(),
                    output.status.success(),
                ))
            }
            Ok(Err(e)) => {
                warn!(target: "rehearse::validator", "Failed to run compiler: {}", e);
                CompileOutcome::Unavailable
            }
            Err(_) => {
                warn!(
                    target: "rehearse::validator",
                    "Compiler timed out after {:?}", self.config.timeout
                );
                CompileOutcome::TimedOut
            }
        }
    }
}

async fn probe(config: &CompilerConfig) -> bool {
    let mut cmd = Command::new(&config.program);
    cmd.arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let available = matches!(
        timeout(config.timeout, cmd.status()).await,
        Ok(Ok(status)) if status.success()
    );
    debug!(
        target: "rehearse::validator",
        "C++ compiler {} available: {}",
        config.program.display(),
        available
    );
    available
}

fn write_source(code: &str) -> std::io::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("rehearse-")
        .suffix(".cpp")
        .tempfile()?;
    file.write_all(code.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Turn compiler stderr into errors and warnings, hiding the temp path.
pub(crate) fn parse_diagnostics(stderr: &str, source: &Path, success: bool) -> SyntaxReport {
    let source = source.display().to_string();
    let mut report = SyntaxReport::default();

    for line in stderr.lines() {
        let line = line.replace(&source, "<source>");
        if line.contains("error:") {
            report.errors.push(format!("C++ 編譯錯誤: {}", line.trim()));
        } else if line.contains("warning:") {
            report.warnings.push(format!("C++ 編譯警告: {}", line.trim()));
        }
    }

    if !success && report.errors.is_empty() {
        report.errors.push("C++ 編譯失敗".to_string());
    }
    report
}

static STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#).expect("Invalid string literal regex"));

static STD_USAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:std::\w+|cout|cin|endl|printf|scanf|vector|string)\b")
        .expect("Invalid std usage regex")
});

static UNQUALIFIED_STD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^:\w])(cout|cin|endl|vector|string)\b").expect("Invalid namespace regex")
});

const NO_SEMICOLON_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "else", "do", "class", "struct", "namespace", "template",
    "public", "private", "protected", "case", "default", "enum", "union", "try", "catch",
];

const CONTINUATION_PREFIXES: &[&str] = &[
    "{", ":", ".", "<<", ">>", "&&", "||", "+", "-", "*", "/", "?", ",", ")", "->",
];

/// Heuristic C++ checks used when the compiler cannot be run.
pub(crate) fn fallback_check(code: &str) -> SyntaxReport {
    let mut report = check_brackets(code, CodeLanguage::Cpp);

    let lines: Vec<String> = code.lines().map(clean_line).collect();
    let has_include = code.contains("#include");
    let uses_namespace = code.contains("using namespace std");

    if !has_include && lines.iter().any(|l| STD_USAGE.is_match(l)) {
        report
            .warnings
            .push("C++ 程式碼使用了標準函式庫但缺少 #include 指令".to_string());
    }

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if !uses_namespace {
            if let Some(caps) = UNQUALIFIED_STD.captures(trimmed) {
                report.warnings.push(format!(
                    "C++ 第 {} 行使用了 '{}' 但未加上 std:: 前綴或 using namespace std",
                    idx + 1,
                    &caps[1]
                ));
            }
        }

        let next = lines[idx + 1..]
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .unwrap_or("");
        if looks_like_missing_semicolon(trimmed, next) {
            report
                .warnings
                .push(format!("C++ 第 {} 行可能缺少分號", idx + 1));
        }
    }

    report
}

/// Strip comments and blank out string contents.
fn clean_line(line: &str) -> String {
    let without_strings = STRING_LITERAL.replace_all(line, "\"\"");
    let code = match without_strings.find("//") {
        Some(idx) => &without_strings[..idx],
        None => &without_strings[..],
    };
    let trimmed = code.trim_start();
    if trimmed.starts_with("/*") || trimmed.starts_with('*') {
        return String::new();
    }
    code.to_string()
}

fn looks_like_missing_semicolon(line: &str, next: &str) -> bool {
    let Some(last) = line.chars().last() else {
        return false;
    };
    if !(last.is_alphanumeric() || matches!(last, '_' | ')' | ']' | '"' | '\'')) {
        return false;
    }
    let first_word: String = line
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if NO_SEMICOLON_KEYWORDS.contains(&first_word.as_str()) {
        return false;
    }
    !CONTINUATION_PREFIXES.iter().any(|p| next.starts_with(p))
}
