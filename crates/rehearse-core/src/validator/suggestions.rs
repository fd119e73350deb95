//! Improvement hints attached to a validation result.

use once_cell::sync::Lazy;
use regex::Regex;
use rehearse_types::CodeLanguage;

const LONG_LINE: usize = 100;
const UNCOMMENTED_LINES: usize = 10;
const HIGH_COMPLEXITY: u8 = 50;
const MAX_PRINTS: usize = 3;

static NEW_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bnew\b").expect("Invalid new regex"));
static DELETE_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bdelete\b").expect("Invalid delete regex"));
static VAR_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bvar\s").expect("Invalid var regex"));

pub fn suggest(code: &str, language: Option<CodeLanguage>, complexity: u8) -> Vec<String> {
    let lines: Vec<&str> = code.lines().collect();
    let mut suggestions = Vec::new();

    if lines.iter().any(|l| l.chars().count() > LONG_LINE) {
        suggestions.push("考慮將過長的程式碼行拆分（建議每行不超過100字元）".to_string());
    }

    let commented = lines
        .iter()
        .any(|l| l.contains('#') || l.contains("//") || l.contains("/*"));
    if lines.len() > UNCOMMENTED_LINES && !commented {
        suggestions.push("建議增加註解說明程式碼邏輯".to_string());
    }

    if complexity > HIGH_COMPLEXITY {
        suggestions.push("程式碼複雜度較高，考慮拆分為更小的函數".to_string());
    }

    match language {
        Some(CodeLanguage::Python) if code.matches("print(").count() > MAX_PRINTS => {
            suggestions.push("考慮使用 logging 模組取代過多的 print 語句".to_string());
        }
        Some(CodeLanguage::Cpp)
            if NEW_KEYWORD.find_iter(code).count() != DELETE_KEYWORD.find_iter(code).count() =>
        {
            suggestions.push(
                "new 與 delete 的數量不一致，建議使用智慧指標（std::unique_ptr / std::shared_ptr）管理記憶體"
                    .to_string(),
            );
        }
        Some(CodeLanguage::JavaScript | CodeLanguage::TypeScript) if VAR_KEYWORD.is_match(code) => {
            suggestions.push("建議使用 let 或 const 取代 var".to_string());
        }
        _ => {}
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_suggestions_for_short_clean_code() {
        assert!(suggest("x = 1\n", Some(CodeLanguage::Python), 3).is_empty());
    }

    #[test]
    fn test_long_line() {
        let code = format!("x = '{}'", "a".repeat(120));
        let suggestions = suggest(&code, Some(CodeLanguage::Python), 1);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].contains("100"));
    }

    #[test]
    fn test_missing_comments_needs_more_than_ten_lines() {
        let ten = "x = 1\n".repeat(10);
        assert!(suggest(&ten, Some(CodeLanguage::Python), 10).is_empty());

        let eleven = "x = 1\n".repeat(11);
        assert_eq!(suggest(&eleven, Some(CodeLanguage::Python), 11).len(), 1);

        let commented = format!("# setup\n{eleven}");
        assert!(suggest(&commented, Some(CodeLanguage::Python), 12).is_empty());
    }

    #[test]
    fn test_high_complexity() {
        assert!(suggest("x", None, 50).is_empty());
        assert_eq!(suggest("x", None, 51).len(), 1);
    }

    #[test]
    fn test_python_prints() {
        let three = "print(1)\n".repeat(3);
        assert!(suggest(&three, Some(CodeLanguage::Python), 3).is_empty());
        let four = "print(1)\n".repeat(4);
        assert!(suggest(&four, Some(CodeLanguage::Python), 4)[0].contains("logging"));
    }

    #[test]
    fn test_cpp_new_delete_balance() {
        let leaky = "int* p = new int(1);";
        assert_eq!(suggest(leaky, Some(CodeLanguage::Cpp), 1).len(), 1);
        let paired = "int* p = new int(1);\ndelete p;";
        assert!(suggest(paired, Some(CodeLanguage::Cpp), 2).is_empty());
    }

    #[test]
    fn test_javascript_var() {
        assert_eq!(suggest("var x = 1;", Some(CodeLanguage::JavaScript), 1).len(), 1);
        assert!(suggest("let variable = 1;", Some(CodeLanguage::JavaScript), 1).is_empty());
        assert!(suggest("var x = 1;", Some(CodeLanguage::Python), 1).is_empty());
    }
}
