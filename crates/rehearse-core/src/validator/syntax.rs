//! Language-specific syntax checks, dispatched by language tag.

use super::python;
use rehearse_types::CodeLanguage;

/// Errors and warnings produced by one syntax check.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyntaxReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl SyntaxReport {
    pub fn with_errors(errors: Vec<String>) -> Self {
        Self {
            errors,
            warnings: Vec::new(),
        }
    }
}

/// How a language is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxStrategy {
    /// Full parse; the first failure becomes a single error.
    StructuredParse,
    /// Bracket matching only.
    BracketBalance,
    /// Host compiler in syntax-only mode, bracket heuristics as fallback.
    ExternalCompiler,
}

impl SyntaxStrategy {
    pub fn for_language(language: CodeLanguage) -> Self {
        match language {
            CodeLanguage::Python | CodeLanguage::Json | CodeLanguage::Yaml | CodeLanguage::Toml => {
                SyntaxStrategy::StructuredParse
            }
            CodeLanguage::Cpp => SyntaxStrategy::ExternalCompiler,
            _ => SyntaxStrategy::BracketBalance,
        }
    }
}

pub(crate) fn display_name(language: CodeLanguage) -> &'static str {
    match language {
        CodeLanguage::Python => "Python",
        CodeLanguage::JavaScript => "JavaScript",
        CodeLanguage::TypeScript => "TypeScript",
        CodeLanguage::Java => "Java",
        CodeLanguage::CSharp => "C#",
        CodeLanguage::Cpp => "C++",
        CodeLanguage::C => "C",
        CodeLanguage::Go => "Go",
        CodeLanguage::Rust => "Rust",
        CodeLanguage::Sql => "SQL",
        CodeLanguage::Json => "JSON",
        CodeLanguage::Yaml => "YAML",
        CodeLanguage::Toml => "TOML",
    }
}

/// Run the structured parser for `language`.
pub fn check_structured(code: &str, language: CodeLanguage) -> SyntaxReport {
    let failure = match language {
        CodeLanguage::Python => python::parse(code).err().map(|e| (e.message, e.line)),
        CodeLanguage::Json => serde_json::from_str::<serde_json::Value>(code)
            .err()
            .map(|e| (strip_location(&e.to_string()), e.line())),
        CodeLanguage::Yaml => serde_yaml::from_str::<serde_yaml::Value>(code).err().map(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(1);
            (strip_location(&e.to_string()), line)
        }),
        CodeLanguage::Toml => toml::from_str::<toml::Table>(code).err().map(|e| {
            let line = e
                .span()
                .map(|span| line_of_offset(code, span.start))
                .unwrap_or(1);
            (e.message().trim().to_string(), line)
        }),
        _ => None,
    };

    match failure {
        Some((message, line)) => SyntaxReport::with_errors(vec![format!(
            "{} 語法錯誤: {} (第 {} 行)",
            display_name(language),
            message,
            line
        )]),
        None => SyntaxReport::default(),
    }
}

/// Match `()`, `[]` and `{}` line by line, ignoring comments and string literals.
///
/// Scanning stops at the first mismatched closer; openers still pending at
/// the end are each reported with the line they were opened on.
pub fn check_brackets(code: &str, language: CodeLanguage) -> SyntaxReport {
    let name = display_name(language);
    let quotes = quote_chars(language);
    let mut stack: Vec<(char, char, usize)> = Vec::new();
    let mut in_block_comment = false;

    for (idx, raw_line) in code.lines().enumerate() {
        let line_no = idx + 1;
        let mut chars = raw_line.chars().peekable();
        let mut in_string: Option<char> = None;

        while let Some(c) = chars.next() {
            if in_block_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    in_block_comment = false;
                }
                continue;
            }
            if let Some(q) = in_string {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    in_string = None;
                }
                continue;
            }
            match c {
                '/' if chars.peek() == Some(&'/') => break,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    in_block_comment = true;
                }
                '-' if language == CodeLanguage::Sql && chars.peek() == Some(&'-') => break,
                '#' if language == CodeLanguage::Sql => break,
                q if quotes.contains(&q) => in_string = Some(q),
                '(' => stack.push(('(', ')', line_no)),
                '[' => stack.push(('[', ']', line_no)),
                '{' => stack.push(('{', '}', line_no)),
                ')' | ']' | '}' => match stack.pop() {
                    Some((_, expected, _)) if expected == c => {}
                    Some((_, expected, opened)) => {
                        return SyntaxReport::with_errors(vec![format!(
                            "{name} 括號不匹配: 第 {line_no} 行的 '{c}' 無法對應第 {opened} 行的開啟括號（預期 '{expected}'）"
                        )]);
                    }
                    None => {
                        return SyntaxReport::with_errors(vec![format!(
                            "{name} 括號不匹配: 第 {line_no} 行有多餘的 '{c}'"
                        )]);
                    }
                },
                _ => {}
            }
        }
    }

    let errors = stack
        .iter()
        .map(|(open, _, line)| format!("{name} 括號未閉合: 第 {line} 行的 '{open}'"))
        .collect();
    SyntaxReport::with_errors(errors)
}

fn quote_chars(language: CodeLanguage) -> &'static [char] {
    match language {
        // Single quotes start lifetimes in Rust.
        CodeLanguage::Rust => &['"'],
        CodeLanguage::JavaScript | CodeLanguage::TypeScript | CodeLanguage::Go => &['"', '\'', '`'],
        _ => &['"', '\''],
    }
}

pub(crate) fn line_of_offset(code: &str, offset: usize) -> usize {
    let offset = offset.min(code.len());
    code.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Drop the trailing " at line X column Y" serde adds to its messages.
fn strip_location(message: &str) -> String {
    match message.find(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_dispatch() {
        assert_eq!(SyntaxStrategy::for_language(CodeLanguage::Python), SyntaxStrategy::StructuredParse);
        assert_eq!(SyntaxStrategy::for_language(CodeLanguage::Toml), SyntaxStrategy::StructuredParse);
        assert_eq!(SyntaxStrategy::for_language(CodeLanguage::Cpp), SyntaxStrategy::ExternalCompiler);
        assert_eq!(SyntaxStrategy::for_language(CodeLanguage::JavaScript), SyntaxStrategy::BracketBalance);
        assert_eq!(SyntaxStrategy::for_language(CodeLanguage::C), SyntaxStrategy::BracketBalance);
    }

    #[test]
    fn test_brackets_unbalanced_paren() {
        let report = check_brackets("function f() { return (1+2; }", CodeLanguage::JavaScript);
        assert!(!report.errors.is_empty());
        assert!(report.errors[0].contains("第 1 行"));
    }

    #[test]
    fn test_brackets_balanced() {
        let report = check_brackets("function f() { return 1+2; }", CodeLanguage::JavaScript);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_brackets_ignore_comments_and_strings() {
        let code = "// closing ) in a comment\nconst s = \"(\";\n/* { spans\n lines */\nlet t = `]`;";
        assert!(check_brackets(code, CodeLanguage::JavaScript).errors.is_empty());
    }

    #[test]
    fn test_brackets_unclosed_reports_each_opener() {
        let code = "fn main() {\n    let v = vec![1, 2;\n";
        let report = check_brackets(code, CodeLanguage::Rust);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("第 1 行"));
        assert!(report.errors[1].contains("第 2 行"));

        let report = check_brackets("class A {\n  void f() {\n", CodeLanguage::Java);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("第 1 行"));
        assert!(report.errors[1].contains("第 2 行"));
    }

    #[test]
    fn test_brackets_rust_lifetimes() {
        let code = "fn first<'a>(s: &'a str) -> &'a str {\n    &s[..1]\n}";
        assert!(check_brackets(code, CodeLanguage::Rust).errors.is_empty());
    }

    #[test]
    fn test_brackets_extra_closer() {
        let report = check_brackets("SELECT 1);", CodeLanguage::Sql);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("多餘"));
    }

    #[test]
    fn test_structured_json() {
        assert!(check_structured("{\"a\": [1, 2]}", CodeLanguage::Json).errors.is_empty());

        let report = check_structured("{\n  \"a\": 1,\n  \"b\": \n}", CodeLanguage::Json);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("JSON 語法錯誤"));
        assert!(report.errors[0].contains("(第 4 行)"));
    }

    #[test]
    fn test_structured_toml() {
        assert!(check_structured("[server]\nport = 8000\n", CodeLanguage::Toml).errors.is_empty());

        let report = check_structured("[server]\nport = \n", CodeLanguage::Toml);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("(第 2 行)"));
    }

    #[test]
    fn test_structured_yaml() {
        assert!(check_structured("a: 1\nb:\n  - x\n", CodeLanguage::Yaml).errors.is_empty());

        let report = check_structured("a: [1, 2\nb: 3\n", CodeLanguage::Yaml);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("YAML 語法錯誤"));
    }

    #[test]
    fn test_line_of_offset() {
        assert_eq!(line_of_offset("a\nb\nc", 0), 1);
        assert_eq!(line_of_offset("a\nb\nc", 2), 2);
        assert_eq!(line_of_offset("a\nb\nc", 99), 3);
    }
}
