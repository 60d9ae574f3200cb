use clap::Args;
use serde_json::{json, Value};
use std::time::Duration;

use bizplan_core::analysis::{
    history_prompt, run_analysis, summarize_history, AnalysisConfig, OpenAiSummarizer,
};

use crate::commands::block_on;
use crate::commands::history::HistorySourceArgs;

/// Arguments for a text analysis of historical actuals
#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: HistorySourceArgs,

    /// Specific question to ask about the data
    #[arg(long)]
    pub question: Option<String>,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// Print the prompt instead of calling the service
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut source = args.source.clone();
    if source.through.is_none() {
        source.through = Some("2025-10".into());
    }

    block_on(async move {
        let loaded = source.load().await;
        let summary = summarize_history(&loaded.records)?;
        let prompt = history_prompt(&summary, args.question.as_deref());

        if args.dry_run {
            return Ok(json!({ "summary": summary, "origin": loaded.origin, "prompt": prompt }));
        }

        let mut config = AnalysisConfig::from_env();
        if args.question.is_some() {
            config = config.for_data_questions();
        }
        if let Some(model) = args.model {
            config.model = model;
        }
        let timeout = Duration::from_secs(config.timeout_secs);
        let retries = config.retries;
        let summarizer = OpenAiSummarizer::new(config)?;

        let outcome = run_analysis(&summarizer, &prompt, timeout, retries).await;
        Ok::<Value, Box<dyn std::error::Error>>(json!({
            "summary": summary,
            "origin": loaded.origin,
            "result": outcome,
        }))
    })?
}
