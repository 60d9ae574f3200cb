//! Prompt building and text summarisation of historical and simulated results.
//!
//! The summariser is an explicitly constructed handle passed into
//! [`run_analysis`]; nothing here keeps a global client.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::BizPlanError;
use crate::periods::year_key;
use crate::persistence::SavedSimulation;
use crate::statement::PeriodRecord;
use crate::types::{checked_ratio, round_currency, Money, Percent};
use crate::BizPlanResult;

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub retries: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4".into(),
            temperature: 0.7,
            max_tokens: 1000,
            endpoint: OPENAI_ENDPOINT.into(),
            timeout_secs: 30,
            retries: 1,
        }
    }
}

impl AnalysisConfig {
    /// Defaults with the API key taken from `OPENAI_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            ..Default::default()
        }
    }

    /// Lower temperature for answering questions about supplied data.
    pub fn for_data_questions(mut self) -> Self {
        self.temperature = 0.3;
        self
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub total_revenue: Money,
    pub total_cost: Money,
    pub total_inventory: Money,
    /// Mean of the per-period profitability
    pub avg_profitability: Percent,
    pub periods: usize,
    /// Inventory over revenue in percent, `None` on zero revenue
    pub inventory_share: Option<Percent>,
    /// Cost over revenue in percent, `None` on zero revenue
    pub cost_share: Option<Percent>,
}

pub fn summarize_history(records: &[PeriodRecord]) -> BizPlanResult<HistorySummary> {
    if records.is_empty() {
        return Err(BizPlanError::InsufficientData(
            "No historical records to summarise".into(),
        ));
    }

    let total_revenue: Money = records.iter().map(|r| r.revenue).sum();
    let total_cost: Money = records.iter().map(|r| r.cost).sum();
    let total_inventory: Money = records.iter().filter_map(|r| r.inventory).sum();
    let profitability_sum: Percent = records.iter().map(|r| r.profitability).sum();
    let hundred = Decimal::ONE_HUNDRED;

    Ok(HistorySummary {
        total_revenue,
        total_cost,
        total_inventory,
        avg_profitability: profitability_sum / Decimal::from(records.len()),
        periods: records.len(),
        inventory_share: checked_ratio(total_inventory, total_revenue).map(|r| r * hundred),
        cost_share: checked_ratio(total_cost, total_revenue).map(|r| r * hundred),
    })
}

/// Whole units with thousands separators, e.g. `1,234,567`.
pub fn format_amount(value: Money) -> String {
    let rounded = round_currency(value);
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn format_share(share: Option<Percent>) -> String {
    share.map_or_else(|| "-".to_string(), |s| format!("{}%", s.round_dp(1)))
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Prompt asking for a revenue / markup / inventory / cost review of history.
pub fn history_prompt(summary: &HistorySummary, question: Option<&str>) -> String {
    let mut prompt = format!(
        "다음은 과거 {periods}개월간의 실적 요약입니다.\n\
         - 총 매출: {revenue}원\n\
         - 총 비용: {cost}원 (매출 대비 {cost_share})\n\
         - 재고 합계: {inventory}원 (매출 대비 {inventory_share})\n\
         - 평균 수익률: {profitability}%\n\n\
         매출, 마크업, 재고, 비용 관점에서 각각 분석해주세요.",
        periods = summary.periods,
        revenue = format_amount(summary.total_revenue),
        cost = format_amount(summary.total_cost),
        cost_share = format_share(summary.cost_share),
        inventory = format_amount(summary.total_inventory),
        inventory_share = format_share(summary.inventory_share),
        profitability = summary.avg_profitability.round_dp(1),
    );
    if let Some(q) = question.map(str::trim).filter(|q| !q.is_empty()) {
        prompt.push_str(&format!("\n\n질문: {q}\n\n답변:"));
    }
    prompt
}

/// Total actual sales and operating profit of one simulation in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationYearTotals {
    pub year: String,
    pub total_actual_sales: Money,
    pub operating_profit: Money,
}

pub fn simulation_year_totals(sim: &SavedSimulation, year: &str) -> SimulationYearTotals {
    let in_year = sim.data.iter().filter(|d| year_key(&d.period) == year);
    let (sales, profit) = in_year.fold((Decimal::ZERO, Decimal::ZERO), |(s, p), d| {
        (s + d.figures.total_actual_sales, p + d.figures.operating_profit)
    });
    SimulationYearTotals {
        year: year.to_string(),
        total_actual_sales: sales,
        operating_profit: profit,
    }
}

/// Prompt comparing two or more saved simulations over `years`.
pub fn comparison_prompt(sims: &[SavedSimulation], years: &[String]) -> BizPlanResult<String> {
    if sims.len() < 2 {
        return Err(BizPlanError::InsufficientData(format!(
            "Select at least two simulations to compare, got {}",
            sims.len()
        )));
    }
    if years.is_empty() {
        return Err(BizPlanError::InvalidInput {
            field: "years".into(),
            reason: "At least one year is required".into(),
        });
    }

    let span = match (years.first(), years.last()) {
        (Some(first), Some(last)) if first != last => format!("{first}-{last}"),
        (Some(first), _) => first.clone(),
        _ => String::new(),
    };

    let mut prompt = format!("다음 시뮬레이션들의 {span}년 계획 데이터를 비교 분석해주세요.\n");
    for sim in sims {
        prompt.push_str(&format!("\n시뮬레이션 {}:\n", sim.name));
        let totals: Vec<SimulationYearTotals> = years.iter().map(|y| simulation_year_totals(sim, y)).collect();
        for t in &totals {
            prompt.push_str(&format!("- {}년 총 매출: {}원\n", t.year, format_amount(t.total_actual_sales)));
        }
        for t in &totals {
            prompt.push_str(&format!("- {}년 영업이익: {}원\n", t.year, format_amount(t.operating_profit)));
        }
    }
    prompt.push_str("\n시뮬레이션 간의 차이점, 장단점, 추천사항을 분석해주세요.\n");
    Ok(prompt)
}

// ---------------------------------------------------------------------------
// Summarisers
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> BizPlanResult<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client.
pub struct OpenAiSummarizer {
    client: Client,
    config: AnalysisConfig,
    api_key: String,
}

impl OpenAiSummarizer {
    pub fn new(config: AnalysisConfig) -> BizPlanResult<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| BizPlanError::InvalidInput {
            field: "OPENAI_API_KEY".into(),
            reason: "API key is not set".into(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BizPlanError::ExternalService(e.to_string()))?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, prompt: &str) -> BizPlanResult<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BizPlanError::ExternalService(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(BizPlanError::ExternalService(format!("{status}: {detail}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BizPlanError::ExternalService(e.to_string()))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Running
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AnalysisOutcome {
    Completed { text: String },
    Failed { reason: String },
}

impl AnalysisOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            AnalysisOutcome::Completed { text } => Some(text),
            AnalysisOutcome::Failed { .. } => None,
        }
    }
}

/// Run `prompt` through `summarizer` with a per-attempt timeout and `retries`
/// extra attempts. An empty reply counts as a failure.
pub async fn run_analysis(
    summarizer: &dyn Summarizer,
    prompt: &str,
    timeout: Duration,
    retries: u32,
) -> AnalysisOutcome {
    let attempts = retries + 1;
    let mut reason = String::new();

    for attempt in 1..=attempts {
        match tokio::time::timeout(timeout, summarizer.summarize(prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                log::info!("analysis completed on attempt {attempt}");
                return AnalysisOutcome::Completed { text };
            }
            Ok(Ok(_)) => reason = "summariser returned an empty reply".into(),
            Ok(Err(e)) => reason = e.to_string(),
            Err(_) => reason = format!("timed out after {}ms", timeout.as_millis()),
        }
        log::warn!("analysis attempt {attempt}/{attempts} failed: {reason}");
    }
    AnalysisOutcome::Failed { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{derive_summary, SummaryPeriodRecord};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedSummarizer {
        replies: Vec<BizPlanResult<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedSummarizer {
        fn new(replies: Vec<BizPlanResult<String>>) -> Self {
            Self {
                replies,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Summarizer for ScriptedSummarizer {
        async fn summarize(&self, _prompt: &str) -> BizPlanResult<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.replies.get(n) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(e)) => Err(BizPlanError::ExternalService(e.to_string())),
                None => Err(BizPlanError::ExternalService("no more replies".into())),
            }
        }
    }

    fn sim(name: &str, revenue: Money) -> SavedSimulation {
        let data: Vec<SummaryPeriodRecord> = ["2026-01", "2026-02", "2027-01"]
            .iter()
            .map(|p| derive_summary(&PeriodRecord::new(*p, revenue, revenue * dec!(0.5), None, None)))
            .collect();
        SavedSimulation {
            id: format!("sim-{name}"),
            name: name.into(),
            data,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_totals_and_shares() {
        let records = vec![
            PeriodRecord::new("2024-01", dec!(1000), dec!(600), Some(dec!(400)), None),
            PeriodRecord::new("2024-02", dec!(1000), dec!(800), None, None),
        ];
        let s = summarize_history(&records).unwrap();
        assert_eq!(s.total_revenue, dec!(2000));
        assert_eq!(s.total_inventory, dec!(400));
        assert_eq!(s.avg_profitability, dec!(30));
        assert_eq!(s.cost_share, Some(dec!(70)));
        assert_eq!(s.inventory_share, Some(dec!(20)));
        assert_eq!(s.periods, 2);
    }

    #[test]
    fn test_summary_zero_revenue_and_empty() {
        let records = vec![PeriodRecord::new("2024-01", Decimal::ZERO, dec!(5), None, None)];
        let s = summarize_history(&records).unwrap();
        assert_eq!(s.cost_share, None);
        assert!(matches!(summarize_history(&[]), Err(BizPlanError::InsufficientData(_))));
    }

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(dec!(1234567.4)), "1,234,567");
        assert_eq!(format_amount(dec!(999)), "999");
        assert_eq!(format_amount(dec!(-1000)), "-1,000");
        assert_eq!(format_amount(Decimal::ZERO), "0");
    }

    #[test]
    fn test_history_prompt_mentions_figures() {
        let records = vec![PeriodRecord::new("2024-01", dec!(1_000_000), dec!(700_000), None, None)];
        let prompt = history_prompt(&summarize_history(&records).unwrap(), Some("재고는 적정한가?"));
        assert!(prompt.contains("1,000,000"));
        assert!(prompt.contains("질문: 재고는 적정한가?"));
    }

    #[test]
    fn test_comparison_prompt_needs_two() {
        let years = vec!["2026".to_string(), "2027".to_string()];
        assert!(matches!(
            comparison_prompt(&[sim("a", dec!(100))], &years),
            Err(BizPlanError::InsufficientData(_))
        ));

        let prompt = comparison_prompt(&[sim("a", dec!(100)), sim("b", dec!(200))], &years).unwrap();
        assert!(prompt.contains("2026-2027"));
        assert!(prompt.contains("시뮬레이션 a:"));
        assert!(prompt.contains("- 2027년 총 매출: 200원"));
    }

    #[test]
    fn test_year_totals_sum_periods() {
        let t = simulation_year_totals(&sim("a", dec!(1000)), "2026");
        assert_eq!(t.total_actual_sales, dec!(2000));
    }

    #[tokio::test]
    async fn test_run_analysis_retries_once() {
        let s = ScriptedSummarizer::new(vec![
            Err(BizPlanError::ExternalService("boom".into())),
            Ok("분석 결과".into()),
        ]);
        let outcome = run_analysis(&s, "p", Duration::from_secs(1), 1).await;
        assert_eq!(outcome.text(), Some("분석 결과"));
        assert_eq!(s.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_analysis_reports_failure() {
        let s = ScriptedSummarizer::new(vec![Ok("  ".into()), Ok(String::new())]);
        let outcome = run_analysis(&s, "p", Duration::from_secs(1), 1).await;
        assert!(matches!(outcome, AnalysisOutcome::Failed { .. }));
    }

    struct SlowSummarizer;

    #[async_trait]
    impl Summarizer for SlowSummarizer {
        async fn summarize(&self, _prompt: &str) -> BizPlanResult<String> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok("too late".into())
        }
    }

    #[tokio::test]
    async fn test_run_analysis_sub_second_timeout_reported_in_millis() {
        let outcome = run_analysis(&SlowSummarizer, "p", Duration::from_millis(20), 0).await;
        assert_eq!(
            outcome,
            AnalysisOutcome::Failed {
                reason: "timed out after 20ms".into()
            }
        );
    }

    #[test]
    fn test_summarizer_requires_key() {
        let config = AnalysisConfig {
            api_key: None,
            ..Default::default()
        };
        assert!(OpenAiSummarizer::new(config).is_err());
    }
}
