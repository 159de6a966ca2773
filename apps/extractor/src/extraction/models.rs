//! Pass output storage and typed schema views.
//!
//! Every pass output is stored losslessly as the parsed `serde_json::Value`
//! (or a failure marker). Typed views are derived from the stored value on
//! demand: each view struct defaults every field, so a response missing
//! fields — or a failed pass — reads as empty collections rather than an
//! error. Shape anomalies are logged once at conversion, never rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::normalize::ParseFailure;

/// The recorded outcome of one pass: parsed JSON, or a failure marker
/// carrying the raw model text. Untagged so a marker persists exactly as
/// `{"error": ..., "raw_response": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PassOutput {
    Failed(ParseFailure),
    Parsed(Value),
}

impl PassOutput {
    pub fn is_failed(&self) -> bool {
        matches!(self, PassOutput::Failed(_))
    }

    /// Converts the stored value into a typed view, defaulting on a failed
    /// pass or an unexpected shape. `pass` labels the anomaly log line.
    pub fn view_or_default<T: DeserializeOwned + Default>(&self, pass: &str) -> T {
        match self {
            PassOutput::Failed(_) => T::default(),
            PassOutput::Parsed(value) => match serde_json::from_value(value.clone()) {
                Ok(view) => view,
                Err(e) => {
                    warn!("unexpected response shape for pass '{pass}': {e}");
                    T::default()
                }
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Legacy schema — the stable shape every variant projects onto
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DomainRecord {
    pub domain_name: String,
    pub domain_description: String,
    pub specialization_notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConstructRecord {
    pub construct_name: String,
    pub construct_description: String,
    pub domain_association: String,
    pub assessment_context: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SportSpecificity {
    pub sport: String,
    pub assessment_modifications: String,
    pub intervention_modifications: String,
}

/// Output shape of the domain/construct discovery pass, and the legacy
/// `domains_constructs` block of every file result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DomainsConstructs {
    pub practitioner_domains: Vec<DomainRecord>,
    pub constructs_mentioned: Vec<ConstructRecord>,
    pub sport_specificity: Vec<SportSpecificity>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricRecord {
    pub metric_name: String,
    pub unit: String,
    pub reference_ranges: String,
    pub validity_confidence: String,
    pub reliability_confidence: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssessmentRecord {
    pub assessment_name: String,
    pub assessment_description: String,
    pub constructs_measured: Vec<String>,
    pub modality: String,
    pub technology_vendor: Value,
    pub protocols: Value,
    pub metrics: Vec<MetricRecord>,
    pub state_influences: Value,
    pub assets_generated: Value,
}

/// Output shape of the standard assessment pass, and the legacy
/// `assessments` block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssessmentsBlock {
    pub assessments: Vec<AssessmentRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterventionRecord {
    pub intervention_name: String,
    pub intervention_description: String,
    pub purpose: String,
    pub constructs_targeted: Vec<String>,
    pub intervention_types: Vec<String>,
    pub protocols: Value,
    pub constraints_accommodations: Value,
    pub resource_requirements: Value,
}

/// Output shape of the standard intervention pass, and the legacy
/// `interventions` block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterventionsBlock {
    pub interventions: Vec<InterventionRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Robust (7-pass) native schemas
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExpertiseArea {
    pub area: String,
    pub description: String,
    pub scope: String,
    pub depth_indicators: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KnowledgeDomain {
    pub domain: String,
    pub description: String,
    pub sub_areas: Vec<String>,
}

/// Pass 1 of the robust variant: open-ended knowledge domain mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KnowledgeMap {
    pub primary_expertise: Vec<ExpertiseArea>,
    pub knowledge_domains: Vec<KnowledgeDomain>,
    pub target_populations: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeasurableConcept {
    pub concept_name: String,
    pub description: String,
    pub category: String,
    pub why_important: String,
    pub measurement_approach: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CapabilityRecord {
    pub capability: String,
    pub description: String,
    pub components: Vec<String>,
    pub assessment_indicators: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HealthStateRecord {
    pub state: String,
    pub description: String,
    pub indicators: Vec<String>,
    pub influencing_factors: Vec<String>,
}

/// Pass 2 of the robust variant: unconstrained entity inventory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EntityInventory {
    pub measurable_concepts: Vec<MeasurableConcept>,
    pub capabilities_and_attributes: Vec<CapabilityRecord>,
    pub health_performance_states: Vec<HealthStateRecord>,
}

impl EntityInventory {
    /// Total entity records across all categories — the robust variant's
    /// `constructs_identified` count.
    pub fn total(&self) -> usize {
        self.measurable_concepts.len()
            + self.capabilities_and_attributes.len()
            + self.health_performance_states.len()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormalAssessment {
    pub assessment_name: String,
    pub description: String,
    pub what_it_measures: Vec<String>,
    pub assessment_type: String,
    pub administration_context: String,
    pub frequency_timing: String,
}

/// Pass 3 of the robust variant. Only `formal_assessments` is projected;
/// the protocol and equipment arrays stay in the native data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RobustAssessments {
    pub formal_assessments: Vec<FormalAssessment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterventionStrategy {
    pub intervention_name: String,
    pub description: String,
    pub intervention_category: String,
    pub target_outcomes: Vec<String>,
    pub mechanism_of_action: String,
    pub typical_candidates: String,
}

/// Pass 4 of the robust variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RobustInterventions {
    pub intervention_strategies: Vec<InterventionStrategy>,
}

// ────────────────────────────────────────────────────────────────────────────
// Guided (8-pass) native schemas
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuidedConstruct {
    pub construct_name: String,
    pub construct_description: String,
    pub domain_association: String,
    pub why_important: String,
    pub how_assessed: String,
    pub measurement_approach: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HealthPerformanceFactor {
    pub factor_name: String,
    pub factor_type: String,
    pub description: String,
    pub measurement_approach: String,
}

/// Pass 1 of the guided variant: ontology-guided domain/construct discovery.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuidedDomainsConstructs {
    pub practitioner_domains: Vec<DomainRecord>,
    pub constructs_mentioned: Vec<GuidedConstruct>,
    pub health_performance_factors: Vec<HealthPerformanceFactor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuidedAssessment {
    pub assessment_name: String,
    pub assessment_description: String,
    pub constructs_measured: Vec<String>,
    pub modality: String,
    pub administration_details: Value,
    pub protocol_details: Value,
}

/// Pass 2 of the guided variant. Technology and metric discovery is a
/// separate pass in this variant, so the assessment schema carries none.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuidedAssessments {
    pub assessments: Vec<GuidedAssessment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TechnologyRecord {
    pub technology_name: String,
    pub vendor_manufacturer: String,
    pub technology_type: String,
    pub specific_model: String,
    pub used_for_assessments: Vec<String>,
    pub what_it_measures: Vec<String>,
    pub data_output_format: String,
    pub mentioned_advantages: Vec<String>,
    pub mentioned_limitations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuidedMetric {
    pub metric_name: String,
    pub measurement_unit: String,
    pub assessment_source: String,
    pub normal_ranges: String,
    pub interpretation_notes: String,
    pub factors_affecting_values: Vec<String>,
    pub reliability_notes: String,
}

/// Pass 3 of the guided variant: dedicated technology and metric discovery.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TechnologiesMetrics {
    pub technologies: Vec<TechnologyRecord>,
    pub metrics: Vec<GuidedMetric>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuidedIntervention {
    pub intervention_name: String,
    pub intervention_description: String,
    pub purpose: String,
    pub constructs_targeted: Vec<String>,
    pub intervention_types: Vec<String>,
    pub dosage_details: Value,
    pub implementation_specifics: Value,
    pub resource_requirements: Value,
}

/// Pass 4 of the guided variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuidedInterventions {
    pub interventions: Vec<GuidedIntervention>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pass_output_failure_serializes_as_marker_object() {
        let output = PassOutput::Failed(ParseFailure {
            error: "JSON parsing failed: expected value".to_string(),
            raw_response: "not json".to_string(),
        });
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["error"], "JSON parsing failed: expected value");
        assert_eq!(json["raw_response"], "not json");
    }

    #[test]
    fn test_pass_output_round_trip_preserves_variant() {
        let failed = PassOutput::Failed(ParseFailure {
            error: "e".to_string(),
            raw_response: "r".to_string(),
        });
        let parsed = PassOutput::Parsed(json!({"assessments": []}));

        for output in [failed, parsed] {
            let s = serde_json::to_string(&output).unwrap();
            let back: PassOutput = serde_json::from_str(&s).unwrap();
            assert_eq!(back, output);
        }
    }

    #[test]
    fn test_view_defaults_missing_fields() {
        let output = PassOutput::Parsed(json!({
            "constructs_mentioned": [{"construct_name": "Sleep Quality"}]
        }));
        let view: DomainsConstructs = output.view_or_default("domains_constructs");
        assert_eq!(view.constructs_mentioned.len(), 1);
        assert_eq!(view.constructs_mentioned[0].construct_name, "Sleep Quality");
        assert_eq!(view.constructs_mentioned[0].construct_description, "");
        assert!(view.practitioner_domains.is_empty());
    }

    #[test]
    fn test_view_of_failed_pass_is_default() {
        let output = PassOutput::Failed(ParseFailure {
            error: "e".to_string(),
            raw_response: "r".to_string(),
        });
        let view: AssessmentsBlock = output.view_or_default("assessments");
        assert!(view.assessments.is_empty());
    }

    #[test]
    fn test_view_of_wrong_shape_is_default() {
        // Syntactically valid, structurally wrong: accepted, logged, defaulted.
        let output = PassOutput::Parsed(json!({"assessments": "not an array"}));
        let view: AssessmentsBlock = output.view_or_default("assessments");
        assert!(view.assessments.is_empty());
    }

    #[test]
    fn test_view_ignores_unknown_fields() {
        let output = PassOutput::Parsed(json!({
            "formal_assessments": [{"assessment_name": "DEXA Scan"}],
            "protocols_and_procedures": [{"assessment_name": "DEXA Scan"}]
        }));
        let view: RobustAssessments = output.view_or_default("assessments");
        assert_eq!(view.formal_assessments.len(), 1);
    }

    #[test]
    fn test_entity_inventory_total_spans_categories() {
        let inventory = EntityInventory {
            measurable_concepts: vec![MeasurableConcept::default(); 2],
            capabilities_and_attributes: vec![CapabilityRecord::default()],
            health_performance_states: vec![HealthStateRecord::default(); 3],
        };
        assert_eq!(inventory.total(), 6);
    }
}
