//! Pattern scan for risky operations in submitted code.

use once_cell::sync::Lazy;
use regex::Regex;

struct SecurityCategory {
    name: &'static str,
    pattern: Regex,
}

const CATEGORY_PATTERNS: &[(&str, &[&str])] = &[
    (
        "file_operations",
        &[
            r"open\s*\(",
            r"file\s*\(",
            r"with\s+open",
            r"\.read\s*\(",
            r"\.write\s*\(",
            r"import\s+os",
            r"os\.",
            r"subprocess",
            r"eval\s*\(",
            r"exec\s*\(",
        ],
    ),
    (
        "network_operations",
        &[
            r"import\s+requests",
            r"import\s+urllib",
            r"import\s+socket",
            r"socket\.",
            r"requests\.",
            r"urllib\.",
            r"http\.",
            r"fetch\s*\(",
        ],
    ),
    (
        "system_calls",
        &[
            r"system\s*\(",
            r"shell_exec",
            r"passthru",
            r"__import__",
            r"importlib",
        ],
    ),
];

/// One case-insensitive alternation per category, compiled once.
static CATEGORIES: Lazy<Vec<SecurityCategory>> = Lazy::new(|| {
    CATEGORY_PATTERNS
        .iter()
        .map(|(name, patterns)| SecurityCategory {
            name,
            pattern: Regex::new(&format!("(?i){}", patterns.join("|")))
                .expect("Invalid security pattern regex"),
        })
        .collect()
});

/// Report each matching category at most once, in category order.
pub fn scan(code: &str) -> Vec<String> {
    CATEGORIES
        .iter()
        .filter(|category| category.pattern.is_match(code))
        .map(|category| format!("檢測到潛在的安全風險: {}", category.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_code() {
        assert!(scan("def add(a, b):\n    return a + b").is_empty());
    }

    #[test]
    fn test_one_issue_per_category() {
        let issues = scan("import os\nos.system('ls')\nopen('x').read()");
        assert_eq!(
            issues,
            vec![
                "檢測到潛在的安全風險: file_operations".to_string(),
                "檢測到潛在的安全風險: system_calls".to_string(),
            ]
        );
    }

    #[test]
    fn test_case_insensitive() {
        let issues = scan("Socket.connect(addr)");
        assert_eq!(issues, vec!["檢測到潛在的安全風險: network_operations".to_string()]);
    }

    #[test]
    fn test_all_categories() {
        let issues = scan("import requests\n__import__('x')\neval('1')");
        assert_eq!(issues.len(), 3);
    }
}
