//! Prompt templates sent to the interviewer model.

use rehearse_types::InterviewType;

pub(crate) fn system_prompt(interview_type: InterviewType) -> &'static str {
    match interview_type {
        InterviewType::Technical => {
            "你是一位經驗豐富的技術面試官。你的任務是：

1. 進行專業的技術面試，評估候選人的程式設計能力
2. 問題應該涵蓋：資料結構、演算法、系統設計、程式語言特性
3. 根據候選人回答調整問題難度
4. 提供建設性的回饋和追問
5. 保持友善但專業的語調
6. 每次只問一個問題，等待候選人回答

請開始面試並自我介紹。"
        }
        InterviewType::Behavioral => {
            "你是一位資深的人力資源面試官。你的任務是：

1. 評估候選人的軟技能和工作經驗
2. 使用 STAR 方法（Situation, Task, Action, Result）引導回答
3. 關注領導力、團隊合作、問題解決能力
4. 了解候選人的職涯規劃和動機
5. 保持同理心並營造舒適的面試環境
6. 深入挖掘具體的工作經驗和成就

請開始面試並自我介紹。"
        }
        InterviewType::SystemDesign => {
            "你是一位系統架構師，專門進行系統設計面試。你的任務是：

1. 評估候選人的系統設計和架構能力
2. 從高層設計開始，逐步深入技術細節
3. 關注可擴展性、可靠性、效能考量
4. 討論權衡取捨和技術選擇
5. 鼓勵候選人畫圖和說明架構
6. 模擬真實的業務需求場景

請開始面試並介紹今天的系統設計題目。"
        }
    }
}

/// Opening line for a session, tailored to the position.
pub(crate) fn welcome_title(interview_type: InterviewType, position: &str) -> String {
    let (fallback, kind) = match interview_type {
        InterviewType::Technical => ("軟體工程師", "技術面試"),
        InterviewType::Behavioral => ("職位", "行為面試"),
        InterviewType::SystemDesign => ("系統設計師", "系統設計面試"),
    };
    let position = if position.trim().is_empty() {
        fallback
    } else {
        position.trim()
    };
    format!("歡迎參加{position}的{kind}")
}

pub(crate) fn opening_prompt(interview_type: InterviewType, position: &str, difficulty: &str) -> String {
    format!(
        "{}\n\n{}。面試難度：{}。",
        system_prompt(interview_type),
        welcome_title(interview_type, position),
        difficulty
    )
}

pub(crate) fn follow_up_prompt(interview_type: InterviewType, answer: &str) -> String {
    format!(
        "基於以下面試背景：
{context}

候選人剛才回答：{answer}

請根據候選人的回答：
1. 給予簡短但建設性的回饋
2. 提出相關的追問或下一個問題
3. 保持面試的連續性和深度
4. 如果回答不夠詳細，請要求更多細節

回應應該專業且友善。",
        context = system_prompt(interview_type),
    )
}

pub(crate) fn code_analysis_prompt(code: &str, language: &str) -> String {
    format!(
        "請分析以下 {language} 程式碼：

```{language}
{code}
```

請提供：
1. 程式碼品質評分（0-100分）
2. 詳細的技術回饋
3. 具體的改進建議
4. 時間和空間複雜度分析
5. 潛在的 bug 或問題
6. 程式碼風格評估

請用繁體中文回應，格式化為結構化的分析報告。"
    )
}

pub(crate) fn summary_prompt(transcript: &str) -> String {
    format!(
        "以下是完整的面試對話記錄：

{transcript}

請提供完整的面試總結：
1. 候選人表現總評（A-F等級）
2. 技術能力評估
3. 回答品質分析
4. 具體的改進建議
5. 整體印象和建議

請用繁體中文提供專業的面試總結。"
    )
}

pub(crate) fn question_prompt(interview_type: InterviewType, difficulty: &str) -> String {
    format!(
        "{}\n\n請只提出一個難度為「{}」的新面試問題，不需要自我介紹。",
        system_prompt(interview_type),
        difficulty
    )
}

pub(crate) fn with_context(prompt: &str, context: &str) -> String {
    format!("對話歷史：\n{context}\n\n當前問題：{prompt}")
}
