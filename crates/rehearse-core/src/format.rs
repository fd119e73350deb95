//! Light code formatting for display.

use rehearse_types::CodeLanguage;

const INDENT: &str = "    ";
const DEDENT_KEYWORDS: &[&str] = &["elif", "else", "except", "finally"];

/// Reformat `code`. Python is re-indented to four spaces per block; other
/// languages lose trailing whitespace and blank lines.
pub fn format_code(code: &str, language: &str) -> String {
    match CodeLanguage::from_tag(language) {
        Some(CodeLanguage::Python) => format_python(code),
        _ => code
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

struct Placed {
    original_indent: usize,
    level: usize,
    opens_block: bool,
}

/// A line ending in `:` opens a block one level deeper. Shrinking original
/// indentation returns to the level of the last line at or above it, so
/// both well-indented and flattened pastes come out consistent.
fn format_python(code: &str) -> String {
    let mut history: Vec<Placed> = Vec::new();
    let mut out = Vec::new();

    for line in code.lines() {
        let stripped = line.trim();
        if stripped.is_empty() {
            out.push(String::new());
            continue;
        }

        let indent = line.len() - line.trim_start().len();
        let first_word = stripped
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .next()
            .unwrap_or("");
        let dedents = DEDENT_KEYWORDS.contains(&first_word);

        let level = match history.last() {
            None => 0,
            Some(prev) if indent < prev.original_indent => history
                .iter()
                .rev()
                .find(|placed| placed.original_indent <= indent)
                .map(|placed| placed.level)
                .unwrap_or(0),
            Some(prev) if prev.opens_block => prev.level + 1,
            Some(prev) if dedents && indent == prev.original_indent => prev.level.saturating_sub(1),
            Some(prev) if indent > prev.original_indent => prev.level + 1,
            Some(prev) => prev.level,
        };

        out.push(format!("{}{}", INDENT.repeat(level), stripped));
        history.push(Placed {
            original_indent: indent,
            level,
            opens_block: stripped.ends_with(':'),
        });
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_python_cleanup() {
        let code = "int main() {   \n\n    return 0;\t\n}\n";
        assert_eq!(format_code(code, "cpp"), "int main() {\n    return 0;\n}");
    }

    #[test]
    fn test_python_two_space_indent() {
        let code = "def f(x):\n  if x:\n    return 1\n  return 0\n";
        assert_eq!(
            format_code(code, "python"),
            "def f(x):\n    if x:\n        return 1\n    return 0"
        );
    }

    #[test]
    fn test_python_flattened_blocks() {
        let code = "if x:\ny = 1\nelse:\ny = 2";
        assert_eq!(
            format_code(code, "py"),
            "if x:\n    y = 1\nelse:\n    y = 2"
        );
    }

    #[test]
    fn test_python_keeps_blank_lines() {
        let code = "a = 1\n\nb = 2";
        assert_eq!(format_code(code, "python"), "a = 1\n\nb = 2");
    }

    #[test]
    fn test_python_aligned_else() {
        let code = "for i in x:\n    if i:\n        pass\n    else:\n        continue\nprint(i)";
        assert_eq!(format_code(code, "python"), code);
    }
}
