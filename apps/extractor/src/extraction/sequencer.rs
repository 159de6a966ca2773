//! Pass Sequencer — runs one transcript through its variant's pass list.
//!
//! Passes execute strictly in order; each output is recorded before the next
//! prompt is built, so context only ever flows forward. A pass whose response
//! fails to parse degrades to a failure marker and the remaining passes still
//! run against whatever partial context exists. Only completion-service
//! errors escalate out of here — the corpus driver turns those into a failed
//! file stub.

use tracing::{info, warn};

use crate::corpus::models::FileResult;
use crate::errors::PipelineError;
use crate::extraction::context::PassContext;
use crate::extraction::models::PassOutput;
use crate::extraction::passes::ExtractorVariant;
use crate::extraction::{projection, Transcript};
use crate::llm_client::CompletionClient;
use crate::normalize;

/// Runs all passes of `variant` against one transcript and assembles the
/// file result. No pass is retried; all passes are always attempted.
pub async fn process_transcript(
    client: &dyn CompletionClient,
    variant: ExtractorVariant,
    transcript: &Transcript,
) -> Result<FileResult, PipelineError> {
    info!(
        "processing {} ({} chars, {})",
        transcript.file_name,
        transcript.len(),
        variant.label()
    );

    let mut ctx = PassContext::new();
    for (i, pass) in variant.passes().iter().enumerate() {
        info!(
            "  pass {}/{}: {}",
            i + 1,
            variant.pass_count(),
            pass.id.as_str()
        );
        let prompt = (pass.build_prompt)(transcript, &ctx);
        let raw = client.complete(&prompt, pass.max_tokens).await?;
        let output = match normalize::parse(&raw) {
            Ok(value) => PassOutput::Parsed(value),
            Err(failure) => {
                warn!(
                    "  pass {} of {} returned unparseable output: {}",
                    pass.id.as_str(),
                    transcript.file_name,
                    failure.error
                );
                PassOutput::Failed(failure)
            }
        };
        ctx.record(pass.id, output);
    }

    let result = assemble(variant, transcript, ctx);
    info!(
        "  done: {} constructs identified in {}",
        result.constructs_identified, result.file_name
    );
    Ok(result)
}

fn assemble(variant: ExtractorVariant, transcript: &Transcript, ctx: PassContext) -> FileResult {
    let legacy = projection::project(variant, &ctx);

    let native_data = match variant {
        ExtractorVariant::Standard => None,
        ExtractorVariant::Robust | ExtractorVariant::Guided => Some(
            ctx.outputs()
                .iter()
                .map(|(id, output)| (id.as_str().to_string(), output.clone()))
                .collect(),
        ),
    };

    FileResult {
        file_name: transcript.file_name.clone(),
        transcript_length: transcript.len(),
        constructs_identified: legacy.constructs_identified,
        domains_constructs: legacy.domains_constructs,
        assessments: legacy.assessments,
        interventions: legacy.interventions,
        relationships: legacy.relationships,
        native_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::models::{AssessmentsBlock, DomainsConstructs};
    use crate::llm_client::CompletionError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns one canned response per call, in order, and records every
    /// prompt it saw. Calls past the script return "{}".
    struct ScriptedClient {
        responses: Vec<String>,
        prompts: Mutex<Vec<String>>,
        calls: Mutex<usize>,
    }

    impl ScriptedClient {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: responses.iter().map(|s| s.to_string()).collect(),
                prompts: Mutex::new(Vec::new()),
                calls: Mutex::new(0),
            }
        }

        fn prompt(&self, index: usize) -> String {
            self.prompts.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut calls = self.calls.lock().unwrap();
            let response = self
                .responses
                .get(*calls)
                .cloned()
                .unwrap_or_else(|| "{}".to_string());
            *calls += 1;
            Ok(response)
        }
    }

    struct FailingClient;

    #[async_trait]
    impl CompletionClient for FailingClient {
        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String, CompletionError> {
            Err(CompletionError::Api {
                status: 429,
                message: "rate limited".to_string(),
            })
        }
    }

    fn transcript() -> Transcript {
        Transcript::new(
            "interview_01.txt",
            "Interviewer: how do you assess endurance athletes? \
             Practitioner: a VO2 max test on the treadmill, plus Garmin data.",
        )
    }

    #[tokio::test]
    async fn test_standard_run_produces_expected_legacy_counts() {
        let client = ScriptedClient::new(&[
            r#"{"constructs_mentioned": [{"construct_name": "Aerobic Capacity"}]}"#,
            r#"{"assessments": [{"assessment_name": "VO2 Max Test", "constructs_measured": ["Aerobic Capacity"]}]}"#,
            r#"{"interventions": []}"#,
            r#"{"construct_relationships": []}"#,
        ]);

        let result = process_transcript(&client, ExtractorVariant::Standard, &transcript())
            .await
            .unwrap();

        assert_eq!(result.constructs_identified, 1);
        let assessments: AssessmentsBlock = result.assessments.view_or_default("assessments");
        assert_eq!(assessments.assessments.len(), 1);
        assert_eq!(assessments.assessments[0].assessment_name, "VO2 Max Test");
        assert!(result.native_data.is_none());
    }

    #[tokio::test]
    async fn test_construct_names_bias_the_assessment_prompt() {
        let client = ScriptedClient::new(&[
            r#"{"constructs_mentioned": [{"construct_name": "Aerobic Capacity"}]}"#,
        ]);
        process_transcript(&client, ExtractorVariant::Standard, &transcript())
            .await
            .unwrap();

        assert!(client.prompt(1).contains("- Aerobic Capacity"));
    }

    #[tokio::test]
    async fn test_malformed_pass_degrades_and_later_passes_still_run() {
        let client = ScriptedClient::new(&[
            "I'm sorry, I cannot produce JSON here.",
            r#"{"assessments": [{"assessment_name": "DEXA Scan"}]}"#,
            r#"{"interventions": []}"#,
            r#"{"construct_relationships": []}"#,
        ]);

        let result = process_transcript(&client, ExtractorVariant::Standard, &transcript())
            .await
            .unwrap();

        // All four passes were attempted.
        assert_eq!(*client.calls.lock().unwrap(), 4);
        // The failed pass is a marker with the raw text preserved.
        assert!(result.domains_constructs.is_failed());
        let constructs: DomainsConstructs =
            result.domains_constructs.view_or_default("domains_constructs");
        assert!(constructs.constructs_mentioned.is_empty());
        // The pass that succeeded kept its data.
        let assessments: AssessmentsBlock = result.assessments.view_or_default("assessments");
        assert_eq!(assessments.assessments[0].assessment_name, "DEXA Scan");
    }

    #[tokio::test]
    async fn test_transport_error_escalates() {
        let result =
            process_transcript(&FailingClient, ExtractorVariant::Standard, &transcript()).await;
        assert!(matches!(result, Err(PipelineError::Completion(_))));
    }

    #[tokio::test]
    async fn test_robust_run_records_native_data_per_pass() {
        let client = ScriptedClient::new(&[]);
        let result = process_transcript(&client, ExtractorVariant::Robust, &transcript())
            .await
            .unwrap();

        let native = result.native_data.expect("robust keeps native data");
        assert_eq!(native.len(), 7);
        assert!(native.contains_key("knowledge_map"));
        assert!(native.contains_key("validation"));
    }

    #[tokio::test]
    async fn test_guided_run_makes_eight_calls() {
        let client = ScriptedClient::new(&[]);
        process_transcript(&client, ExtractorVariant::Guided, &transcript())
            .await
            .unwrap();
        assert_eq!(*client.calls.lock().unwrap(), 8);
    }
}
