//! Lenient extraction of scores, grades and lists from model output.
//!
//! The model's phrasing is not contractually stable, so every function here
//! is best-effort pattern matching that falls back to a safe default instead
//! of failing.

use once_cell::sync::Lazy;
use regex::Regex;
use rehearse_types::ComplexityLevel;

pub const DEFAULT_SCORE: u8 = 75;
pub const DEFAULT_GRADE: &str = "B";
pub const MAX_SUGGESTIONS: usize = 5;
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Fallback feedback when the reply carries no recognisable question marker.
pub const DEFAULT_FEEDBACK: &str = "感謝您的回答。";

/// Line markers that start the "next question" part of a reply.
const QUESTION_MARKERS: [&str; 6] = ["問題", "請問", "能否", "如何", "什麼", "為什麼"];

const DEFAULT_SUGGESTIONS: [&str; 3] = ["檢查程式碼邏輯", "改善變數命名", "添加適當註解"];
const DEFAULT_RECOMMENDATIONS: [&str; 3] = ["持續練習", "加強基礎知識", "提升表達能力"];

// Ordered from most to least specific.
static SCORE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"評分[：:]\s*(\d+)",
        r"分數[：:]\s*(\d+)",
        r"得分[：:]\s*(\d+)",
        r"(?i)\bscore\s*[：:]\s*(\d+)",
        r"(\d+)\s*分",
        r"(?i)(\d+)\s*points?\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid score regex"))
    .collect()
});

static NUMBERED_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+[\.、]\s*([^。\n]+)").expect("Invalid numbered item regex"));

static BULLET_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[•\-\*]\s*([^。\n]+)").expect("Invalid bullet item regex"));

static LABELLED_GRADE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[等級評分]|[Gg]rade)\s*[：:]\s*([A-F][+\-]?)").expect("Invalid grade regex")
});

static RECOMMENDATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"建議[：:]([^。\n]+)", r"改進方向[：:]([^。\n]+)", r"下一步[：:]([^。\n]+)"]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid recommendation regex"))
        .collect()
});

/// Numeric score (0-100) from phrases like `評分：85`, `score: 85` or `85 points`.
pub fn extract_score(text: &str) -> u8 {
    for pattern in SCORE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            if let Ok(value) = caps[1].parse::<u64>() {
                return value.min(100) as u8;
            }
            // Absurdly long digit runs overflow; treat as the maximum.
            return 100;
        }
    }
    DEFAULT_SCORE
}

/// Bucket big-O notation found in the text. The most severe mention wins.
pub fn extract_complexity(text: &str) -> ComplexityLevel {
    const BUCKETS: [(&[&str], ComplexityLevel); 4] = [
        (&["O(2^n)", "O(2ⁿ)", "O(n!)"], ComplexityLevel::VeryHigh),
        (&["O(n²)", "O(n^2)", "O(n³)", "O(n^3)"], ComplexityLevel::High),
        (&["O(n log n)", "O(nlogn)", "O(n)"], ComplexityLevel::Medium),
        (&["O(log n)", "O(1)"], ComplexityLevel::Low),
    ];

    BUCKETS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, level)| *level)
        .unwrap_or(ComplexityLevel::Medium)
}

/// Up to five list items, numbered first, then bulleted, then a fixed default.
pub fn extract_suggestions(text: &str) -> Vec<String> {
    let mut suggestions = collect_items(&NUMBERED_ITEM_RE, text, MAX_SUGGESTIONS);
    if suggestions.is_empty() {
        suggestions = collect_items(&BULLET_ITEM_RE, text, MAX_SUGGESTIONS);
    }
    if suggestions.is_empty() {
        suggestions = DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
    }
    suggestions
}

/// Letter grade `A+` through `F`, by label or by a standalone mention.
pub fn extract_grade(text: &str) -> String {
    if let Some(caps) = LABELLED_GRADE_RE.captures(text) {
        return caps[1].to_string();
    }

    const GRADES: [&str; 11] = ["A+", "A-", "A", "B+", "B-", "B", "C+", "C-", "C", "D", "F"];
    GRADES
        .iter()
        .find(|grade| contains_standalone(text, grade))
        .map(|g| g.to_string())
        .unwrap_or_else(|| DEFAULT_GRADE.to_string())
}

/// Up to three recommendations from `建議：` / `改進方向：` / `下一步：` lines.
pub fn extract_recommendations(text: &str) -> Vec<String> {
    let mut recommendations: Vec<String> = RECOMMENDATION_PATTERNS
        .iter()
        .flat_map(|re| re.captures_iter(text).map(|c| c[1].trim().to_string()))
        .filter(|s| !s.is_empty())
        .collect();

    if recommendations.is_empty() {
        recommendations = DEFAULT_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect();
    }
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

/// Split a reply into `(feedback, next_question)`.
///
/// Lines before the first question marker are feedback; that line and every
/// line after it form the question. Without any marker the whole reply is the
/// question and the feedback is a generic acknowledgement.
pub fn split_feedback_and_question(response: &str) -> (String, String) {
    let mut feedback_lines = Vec::new();
    let mut question_lines = Vec::new();
    let mut in_question = false;

    for line in response.lines() {
        if !in_question && QUESTION_MARKERS.iter().any(|m| line.contains(m)) {
            in_question = true;
        }
        if in_question {
            question_lines.push(line);
        } else {
            feedback_lines.push(line);
        }
    }

    let feedback = feedback_lines.join("\n").trim().to_string();
    let question = question_lines.join("\n").trim().to_string();

    if question.is_empty() {
        return (DEFAULT_FEEDBACK.to_string(), response.trim().to_string());
    }
    (feedback, question)
}

fn collect_items(re: &Regex, text: &str, limit: usize) -> Vec<String> {
    re.captures_iter(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .take(limit)
        .collect()
}

/// True when `needle` occurs without an ASCII letter or grade modifier glued to it.
fn contains_standalone(text: &str, needle: &str) -> bool {
    text.match_indices(needle).any(|(idx, _)| {
        let before = text[..idx].chars().next_back();
        let after = text[idx + needle.len()..].chars().next();
        let boundary_before = before.is_none_or(|c| !c.is_ascii_alphanumeric());
        let boundary_after = after.is_none_or(|c| !c.is_ascii_alphanumeric() && c != '+' && c != '-');
        boundary_before && boundary_after
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_score_chinese_labels() {
        assert_eq!(extract_score("程式碼品質評分：85\n整體不錯"), 85);
        assert_eq!(extract_score("分數: 62"), 62);
        assert_eq!(extract_score("得分：90 分"), 90);
        assert_eq!(extract_score("這段程式碼可以得到 70 分"), 70);
    }

    #[test]
    fn test_extract_score_english_patterns() {
        assert_eq!(extract_score("Overall score: 88/100"), 88);
        assert_eq!(extract_score("I'd give this 64 points."), 64);
        assert_eq!(extract_score("SCORE:7"), 7);
    }

    #[test]
    fn test_extract_score_clamps_and_defaults() {
        assert_eq!(extract_score("評分：150"), 100);
        assert_eq!(extract_score("評分：99999999999999999999999"), 100);
        assert_eq!(extract_score("no numbers here"), DEFAULT_SCORE);
        assert_eq!(extract_score(""), DEFAULT_SCORE);
    }

    #[test]
    fn test_extract_complexity_buckets() {
        assert_eq!(extract_complexity("時間複雜度為 O(1)"), ComplexityLevel::Low);
        assert_eq!(extract_complexity("binary search is O(log n)"), ComplexityLevel::Low);
        assert_eq!(extract_complexity("single pass, O(n)"), ComplexityLevel::Medium);
        assert_eq!(extract_complexity("sorting costs O(n log n)"), ComplexityLevel::Medium);
        assert_eq!(extract_complexity("nested loops give O(n²)"), ComplexityLevel::High);
        assert_eq!(extract_complexity("brute force subsets O(2^n)"), ComplexityLevel::VeryHigh);
        assert_eq!(extract_complexity("nothing to see"), ComplexityLevel::Medium);
    }

    #[test]
    fn test_extract_complexity_most_severe_wins() {
        assert_eq!(extract_complexity("O(1) space but O(n^2) time"), ComplexityLevel::High);
    }

    #[test]
    fn test_extract_suggestions_numbered() {
        let text = "建議如下：\n1. 使用雜湊表。\n2、處理空輸入\n3. 加上單元測試";
        assert_eq!(
            extract_suggestions(text),
            vec!["使用雜湊表", "處理空輸入", "加上單元測試"]
        );
    }

    #[test]
    fn test_extract_suggestions_caps_at_five() {
        let text = (1..=8).map(|i| format!("{i}. item {i}")).collect::<Vec<_>>().join("\n");
        let suggestions = extract_suggestions(&text);
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(suggestions[4], "item 5");
    }

    #[test]
    fn test_extract_suggestions_bullets_and_default() {
        let text = "Improvements:\n- rename variables\n* add tests";
        assert_eq!(extract_suggestions(text), vec!["rename variables", "add tests"]);
        assert_eq!(extract_suggestions("looks fine"), DEFAULT_SUGGESTIONS.to_vec());
    }

    #[test]
    fn test_extract_grade_labelled() {
        assert_eq!(extract_grade("總評等級：A-"), "A-");
        assert_eq!(extract_grade("評分: B+ 表現良好"), "B+");
        assert_eq!(extract_grade("Grade: C"), "C");
    }

    #[test]
    fn test_extract_grade_direct_mention() {
        assert_eq!(extract_grade("候選人表現為 B+，溝通清楚"), "B+");
        assert_eq!(extract_grade("整體 A 級表現"), "A");
        assert_eq!(extract_grade("沒有等第"), DEFAULT_GRADE);
        // Capital letters inside words are not grades.
        assert_eq!(extract_grade("Docker and AWS experience"), DEFAULT_GRADE);
    }

    #[test]
    fn test_extract_recommendations() {
        let text = "建議：多練習動態規劃。\n改進方向：加強系統設計\n下一步：模擬面試\n建議：閱讀原始碼";
        assert_eq!(
            extract_recommendations(text),
            vec!["多練習動態規劃", "閱讀原始碼", "加強系統設計"]
        );
        assert_eq!(extract_recommendations("good job"), DEFAULT_RECOMMENDATIONS.to_vec());
    }

    #[test]
    fn test_split_feedback_and_question() {
        let response = "你的回答很完整。\n考慮了邊界條件。\n下一個問題：如何設計 LRU 快取？\n請說明資料結構。";
        let (feedback, question) = split_feedback_and_question(response);
        assert_eq!(feedback, "你的回答很完整。\n考慮了邊界條件。");
        assert_eq!(question, "下一個問題：如何設計 LRU 快取？\n請說明資料結構。");
    }

    #[test]
    fn test_split_marker_on_first_line() {
        let (feedback, question) = split_feedback_and_question("請問你熟悉哪些資料庫？");
        assert_eq!(feedback, "");
        assert_eq!(question, "請問你熟悉哪些資料庫？");
    }

    #[test]
    fn test_split_without_marker_falls_back() {
        let (feedback, question) = split_feedback_and_question("Tell me about your last project.");
        assert_eq!(feedback, DEFAULT_FEEDBACK);
        assert_eq!(question, "Tell me about your last project.");
    }
}
