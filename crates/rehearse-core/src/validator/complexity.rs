//! Weighted keyword complexity score, clamped to 0..=100.

use once_cell::sync::Lazy;
use regex::Regex;
use rehearse_types::CodeLanguage;

pub const MAX_COMPLEXITY: u8 = 100;

macro_rules! keyword_regex {
    ($name:ident, $pattern:expr) => {
        static $name: Lazy<Regex> =
            Lazy::new(|| Regex::new($pattern).expect(concat!("Invalid ", stringify!($name), " regex")));
    };
}

keyword_regex!(BRANCHES, r"\b(?:if|for|while)\b");
keyword_regex!(CLASSES, r"\b(?:class|struct)\b");
keyword_regex!(TEMPLATES, r"\btemplate\s*<");
keyword_regex!(SWITCHES, r"\bswitch\b");
keyword_regex!(CASES, r"\bcase\b");
keyword_regex!(MATCHES, r"\bmatch\b");
keyword_regex!(TRY_CATCH, r"\b(?:try|catch)\b");
keyword_regex!(TRY_EXCEPT, r"\b(?:try|except)\b");
keyword_regex!(PY_DEF, r"\bdef\b");
keyword_regex!(JS_FUNCTION, r"\bfunction\b|=>");
keyword_regex!(RUST_FN, r"\bfn\b");
keyword_regex!(GO_FUNC, r"\bfunc\b");
keyword_regex!(ANY_FUNCTION, r"\b(?:def|function|fn|func)\b");
keyword_regex!(
    C_FAMILY_FUNCTION,
    r"(?m)^[ \t]*(?:[\w:<>,\*&\[\]]+[ \t]+)+[\*&]?[\w:~]+[ \t]*\([^;{}]*\)[ \t]*(?:const[ \t]*)?(?:override[ \t]*)?(?:\{|$)"
);

const NOT_A_DEFINITION: &[&str] = &[
    "if", "for", "while", "switch", "return", "else", "catch", "new", "delete", "throw", "case",
];

/// Score `code`; `None` means an unrecognized language and uses generic weights.
pub fn score(code: &str, language: Option<CodeLanguage>) -> u8 {
    let non_blank = code.lines().filter(|l| !l.trim().is_empty()).count();
    let count = |re: &Regex| re.find_iter(code).count();

    let mut total = non_blank;
    total += count(&BRANCHES) * 2;
    total += function_count(code, language) * 3;
    total += count(&CLASSES) * 4;

    match language {
        Some(CodeLanguage::Cpp) => {
            total += count(&TEMPLATES) * 5;
            total += count(&SWITCHES) * 3 + count(&CASES);
            total += count(&TRY_CATCH) * 2;
        }
        Some(
            CodeLanguage::Java
            | CodeLanguage::CSharp
            | CodeLanguage::JavaScript
            | CodeLanguage::TypeScript,
        ) => {
            total += count(&SWITCHES) * 3 + count(&CASES);
            total += count(&TRY_CATCH) * 2;
        }
        Some(CodeLanguage::C | CodeLanguage::Go) => {
            total += count(&SWITCHES) * 3 + count(&CASES);
        }
        Some(CodeLanguage::Rust) => total += count(&MATCHES) * 3,
        Some(CodeLanguage::Python) => total += count(&TRY_EXCEPT) * 2,
        _ => {}
    }

    total.min(MAX_COMPLEXITY as usize) as u8
}

fn function_count(code: &str, language: Option<CodeLanguage>) -> usize {
    let regex: &Regex = match language {
        Some(CodeLanguage::Python) => &PY_DEF,
        Some(CodeLanguage::JavaScript | CodeLanguage::TypeScript) => &JS_FUNCTION,
        Some(CodeLanguage::Rust) => &RUST_FN,
        Some(CodeLanguage::Go) => &GO_FUNC,
        Some(CodeLanguage::C | CodeLanguage::Cpp | CodeLanguage::Java | CodeLanguage::CSharp) => {
            return C_FAMILY_FUNCTION
                .find_iter(code)
                .filter(|m| {
                    let first = m
                        .as_str()
                        .trim_start()
                        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
                        .next()
                        .unwrap_or("");
                    !NOT_A_DEFINITION.contains(&first)
                })
                .count();
        }
        Some(_) => return 0,
        None => &ANY_FUNCTION,
    };
    regex.find_iter(code).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_python_weights() {
        // 3 lines + def*3 + if*2
        let code = "def f(x):\n    if x:\n        return 1\n";
        assert_eq!(score(code, Some(CodeLanguage::Python)), 3 + 3 + 2);
    }

    #[test]
    fn test_elif_is_not_weighted() {
        // 4 lines + if*2; elif adds only its line
        let code = "if a:\n    x = 1\nelif b:\n    x = 2\n";
        assert_eq!(score(code, Some(CodeLanguage::Python)), 4 + 2);
    }

    #[test]
    fn test_word_boundaries() {
        // "undefined", "format" and "classify" are not keywords
        let code = "undefined = format(classify)\n";
        assert_eq!(score(code, Some(CodeLanguage::Python)), 1);
    }

    #[test]
    fn test_cpp_weights() {
        let code = "template <typename T>\nT id(T x) {\n    switch (x) {\n        case 1: return x;\n    }\n    return x;\n}\n";
        // 7 lines + template*5 + id()*3 + switch*3 + case*1
        assert_eq!(score(code, Some(CodeLanguage::Cpp)), 7 + 5 + 3 + 3 + 1);
    }

    #[test]
    fn test_c_family_skips_control_statements() {
        let code = "int main() {\n    if (x) {\n    }\n    while (y) {\n    }\n}\n";
        // 6 lines + main*3 + if*2 + while*2
        assert_eq!(score(code, Some(CodeLanguage::C)), 6 + 3 + 2 + 2);
    }

    #[test]
    fn test_rust_match_and_struct() {
        let code = "struct A;\nfn f(a: u8) -> u8 {\n    match a { _ => 1 }\n}\n";
        // 4 lines + struct*4 + fn*3 + match*3
        assert_eq!(score(code, Some(CodeLanguage::Rust)), 4 + 4 + 3 + 3);
    }

    #[test]
    fn test_unknown_language_generic_weights() {
        assert_eq!(score("func a()\nif b", None), 2 + 3 + 2);
    }

    #[test]
    fn test_blank_code_scores_zero() {
        assert_eq!(score("\n   \n", Some(CodeLanguage::Python)), 0);
    }

    proptest! {
        #[test]
        fn prop_score_is_clamped(lines in 1usize..400, keyword in prop::sample::select(vec!["if x:", "for i in y:", "class A:", "def f():", "x = 1"])) {
            let code = vec![keyword; lines].join("\n");
            let value = score(&code, Some(CodeLanguage::Python));
            prop_assert!(value <= MAX_COMPLEXITY);
            if lines >= 100 {
                prop_assert_eq!(value, MAX_COMPLEXITY);
            }
        }
    }
}
