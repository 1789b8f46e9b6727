use serde::{Deserialize, Serialize};

/// Instruction wrapped around every transcript sent for classification
pub const PROMPT_TEMPLATE: &str = "다음 통화 스크립트를 분석하여 보이스피싱 여부를 판단해주세요:\n[{text}]";

/// Shown when the classifier answers without any text
pub const EMPTY_RESULT_MESSAGE: &str = "분석 결과를 얻지 못했습니다.";

/// Build the classification prompt, embedding the transcript verbatim
pub fn build_prompt(text: &str) -> String {
    PROMPT_TEMPLATE.replace("{text}", text)
}

/// Result of classifying one transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Model-generated judgement, opaque prose
    Verdict(String),
    /// Human-readable reason the classification did not happen
    Failure(String),
}

impl AnalysisOutcome {
    /// Text surfaced to the user, whichever way the analysis went
    pub fn message(&self) -> &str {
        match self {
            AnalysisOutcome::Verdict(text) | AnalysisOutcome::Failure(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, AnalysisOutcome::Failure(_))
    }

    pub fn into_message(self) -> String {
        match self {
            AnalysisOutcome::Verdict(text) | AnalysisOutcome::Failure(text) => text,
        }
    }
}

/// Voice-phishing classifier
///
/// Implementations never fail: every error is folded into
/// `AnalysisOutcome::Failure`. One attempt per call, no retries.
#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> AnalysisOutcome;

    /// Get analyzer name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_text_verbatim() {
        let prompt = build_prompt("내 계좌로 입금해주세요");
        assert!(prompt.starts_with("다음 통화 스크립트를 분석하여"));
        assert!(prompt.ends_with("[내 계좌로 입금해주세요]"));
    }

    #[test]
    fn test_prompt_keeps_braces_in_transcript() {
        let prompt = build_prompt("{text} and [brackets]");
        assert!(prompt.ends_with("[{text} and [brackets]]"));
    }

    #[test]
    fn test_outcome_message() {
        let verdict = AnalysisOutcome::Verdict("안전".to_string());
        let failure = AnalysisOutcome::Failure("오류".to_string());

        assert_eq!(verdict.message(), "안전");
        assert!(!verdict.is_failure());
        assert_eq!(failure.message(), "오류");
        assert!(failure.is_failure());
    }
}
