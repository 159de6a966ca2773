//! Legacy projection — the stable common shape every variant maps onto.
//!
//! Downstream consumers (the result viewer, summary counters) read the same
//! four blocks regardless of which extractor variant produced a file result:
//! `domains_constructs`, `assessments`, `interventions`, `relationships`.
//! The projection is pure and recomputed from the pass context on every
//! assembly; richer variant-specific fields are dropped here and survive
//! only in the file's native data.

use serde::Serialize;
use serde_json::{json, Value};

use crate::extraction::context::PassContext;
use crate::extraction::models::{
    AssessmentRecord, AssessmentsBlock, ConstructRecord, DomainRecord, DomainsConstructs,
    EntityInventory, GuidedAssessments, GuidedDomainsConstructs, GuidedInterventions,
    InterventionRecord, InterventionsBlock, KnowledgeMap, PassOutput, RobustAssessments,
    RobustInterventions,
};
use crate::extraction::passes::{ExtractorVariant, PassId};

/// The legacy-shaped slice of one file result.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyView {
    pub domains_constructs: PassOutput,
    pub assessments: PassOutput,
    pub interventions: PassOutput,
    pub relationships: PassOutput,
    pub constructs_identified: usize,
}

/// Projects a completed pass context onto the legacy shape.
pub fn project(variant: ExtractorVariant, ctx: &PassContext) -> LegacyView {
    match variant {
        ExtractorVariant::Standard => project_standard(ctx),
        ExtractorVariant::Robust => project_robust(ctx),
        ExtractorVariant::Guided => project_guided(ctx),
    }
}

fn recorded(ctx: &PassContext, id: PassId) -> PassOutput {
    ctx.get(id)
        .cloned()
        .unwrap_or(PassOutput::Parsed(json!({})))
}

fn to_output<T: Serialize>(block: &T) -> PassOutput {
    PassOutput::Parsed(serde_json::to_value(block).unwrap_or(Value::Null))
}

/// The standard variant already speaks the legacy schema: its pass outputs
/// (failure markers included) are carried through untouched.
fn project_standard(ctx: &PassContext) -> LegacyView {
    let view: DomainsConstructs = ctx.view(PassId::DomainsConstructs);
    LegacyView {
        domains_constructs: recorded(ctx, PassId::DomainsConstructs),
        assessments: recorded(ctx, PassId::Assessments),
        interventions: recorded(ctx, PassId::Interventions),
        relationships: recorded(ctx, PassId::Relationships),
        constructs_identified: view.constructs_mentioned.len(),
    }
}

fn project_robust(ctx: &PassContext) -> LegacyView {
    let knowledge: KnowledgeMap = ctx.view(PassId::KnowledgeMap);
    let entities: EntityInventory = ctx.view(PassId::Entities);

    let mut legacy = DomainsConstructs::default();
    for expertise in knowledge.primary_expertise {
        legacy.practitioner_domains.push(DomainRecord {
            domain_name: expertise.area,
            domain_description: expertise.description,
            specialization_notes: expertise.scope,
        });
    }
    let constructs_identified = entities.total();
    for concept in entities.measurable_concepts {
        push_construct(
            &mut legacy,
            concept.concept_name,
            concept.description,
            "measurable_concepts",
            concept.measurement_approach,
        );
    }
    for capability in entities.capabilities_and_attributes {
        push_construct(
            &mut legacy,
            capability.capability,
            capability.description,
            "capabilities_and_attributes",
            String::new(),
        );
    }
    for state in entities.health_performance_states {
        push_construct(
            &mut legacy,
            state.state,
            state.description,
            "health_performance_states",
            String::new(),
        );
    }

    let assessments: RobustAssessments = ctx.view(PassId::Assessments);
    let legacy_assessments = AssessmentsBlock {
        assessments: assessments
            .formal_assessments
            .into_iter()
            .map(|a| AssessmentRecord {
                assessment_name: a.assessment_name,
                assessment_description: a.description,
                constructs_measured: a.what_it_measures,
                modality: a.assessment_type,
                technology_vendor: json!({}),
                protocols: json!({}),
                metrics: vec![],
                state_influences: json!([]),
                assets_generated: json!([]),
            })
            .collect(),
    };

    let interventions: RobustInterventions = ctx.view(PassId::Interventions);
    let legacy_interventions = InterventionsBlock {
        interventions: interventions
            .intervention_strategies
            .into_iter()
            .map(|i| InterventionRecord {
                intervention_name: i.intervention_name,
                intervention_description: i.description,
                purpose: i.target_outcomes.join(", "),
                constructs_targeted: i.target_outcomes,
                intervention_types: vec![i.intervention_category],
                protocols: json!({}),
                constraints_accommodations: json!([]),
                resource_requirements: json!({}),
            })
            .collect(),
    };

    LegacyView {
        domains_constructs: to_output(&legacy),
        assessments: to_output(&legacy_assessments),
        interventions: to_output(&legacy_interventions),
        relationships: recorded(ctx, PassId::Relationships),
        constructs_identified,
    }
}

fn push_construct(
    legacy: &mut DomainsConstructs,
    name: String,
    description: String,
    category: &str,
    assessment_context: String,
) {
    if name.is_empty() {
        return;
    }
    legacy.constructs_mentioned.push(ConstructRecord {
        construct_name: name,
        construct_description: description,
        domain_association: category.to_string(),
        assessment_context,
    });
}

fn project_guided(ctx: &PassContext) -> LegacyView {
    let native: GuidedDomainsConstructs = ctx.view(PassId::DomainsConstructs);
    let constructs_identified =
        native.constructs_mentioned.len() + native.health_performance_factors.len();

    let legacy = DomainsConstructs {
        practitioner_domains: native.practitioner_domains,
        constructs_mentioned: native
            .constructs_mentioned
            .into_iter()
            .filter(|c| !c.construct_name.is_empty())
            .map(|c| ConstructRecord {
                construct_name: c.construct_name,
                construct_description: c.construct_description,
                domain_association: c.domain_association,
                assessment_context: c.how_assessed,
            })
            .collect(),
        sport_specificity: vec![],
    };

    let assessments: GuidedAssessments = ctx.view(PassId::Assessments);
    let legacy_assessments = AssessmentsBlock {
        assessments: assessments
            .assessments
            .into_iter()
            .map(|a| AssessmentRecord {
                assessment_name: a.assessment_name,
                assessment_description: a.assessment_description,
                constructs_measured: a.constructs_measured,
                modality: a.modality,
                technology_vendor: json!({}),
                protocols: json!({}),
                metrics: vec![],
                state_influences: json!([]),
                assets_generated: json!([]),
            })
            .collect(),
    };

    let interventions: GuidedInterventions = ctx.view(PassId::Interventions);
    let legacy_interventions = InterventionsBlock {
        interventions: interventions
            .interventions
            .into_iter()
            .map(|i| InterventionRecord {
                intervention_name: i.intervention_name,
                intervention_description: i.intervention_description,
                purpose: i.purpose,
                constructs_targeted: i.constructs_targeted,
                intervention_types: i.intervention_types,
                protocols: json!({}),
                constraints_accommodations: json!([]),
                resource_requirements: i.resource_requirements,
            })
            .collect(),
    };

    LegacyView {
        domains_constructs: to_output(&legacy),
        assessments: to_output(&legacy_assessments),
        interventions: to_output(&legacy_interventions),
        relationships: recorded(ctx, PassId::Relationships),
        constructs_identified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::ParseFailure;
    use serde_json::json;

    fn robust_ctx() -> PassContext {
        let mut ctx = PassContext::new();
        ctx.record(
            PassId::KnowledgeMap,
            PassOutput::Parsed(json!({
                "primary_expertise": [
                    {"area": "Cardiovascular Health", "description": "Endurance focus", "scope": "athletes"}
                ]
            })),
        );
        ctx.record(
            PassId::Entities,
            PassOutput::Parsed(json!({
                "measurable_concepts": [
                    {"concept_name": "Aerobic Capacity", "description": "Peak oxygen uptake",
                     "measurement_approach": "Graded exercise test"}
                ],
                "capabilities_and_attributes": [
                    {"capability": "Muscular Power", "description": "Explosive output"}
                ],
                "health_performance_states": [
                    {"state": "", "description": "unnamed"}
                ]
            })),
        );
        ctx.record(
            PassId::Assessments,
            PassOutput::Parsed(json!({
                "formal_assessments": [
                    {"assessment_name": "VO2 Max Test", "description": "Treadmill test",
                     "what_it_measures": ["Aerobic Capacity"], "assessment_type": "Physical test"}
                ]
            })),
        );
        ctx.record(
            PassId::Interventions,
            PassOutput::Parsed(json!({
                "intervention_strategies": [
                    {"intervention_name": "Periodized Endurance Training",
                     "description": "12-16 week program",
                     "intervention_category": "Physical",
                     "target_outcomes": ["Aerobic Capacity", "Lactate Threshold"]}
                ]
            })),
        );
        ctx.record(PassId::Relationships, PassOutput::Parsed(json!({"causal_relationships": []})));
        ctx
    }

    #[test]
    fn test_projection_is_idempotent() {
        let ctx = robust_ctx();
        let first = project(ExtractorVariant::Robust, &ctx);
        let second = project(ExtractorVariant::Robust, &ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn test_robust_domains_map_from_expertise() {
        let view = project(ExtractorVariant::Robust, &robust_ctx());
        let legacy: DomainsConstructs = view.domains_constructs.view_or_default("domains_constructs");
        assert_eq!(legacy.practitioner_domains.len(), 1);
        assert_eq!(legacy.practitioner_domains[0].domain_name, "Cardiovascular Health");
        assert_eq!(legacy.practitioner_domains[0].specialization_notes, "athletes");
    }

    #[test]
    fn test_robust_constructs_span_categories_and_skip_unnamed() {
        let view = project(ExtractorVariant::Robust, &robust_ctx());
        let legacy: DomainsConstructs = view.domains_constructs.view_or_default("domains_constructs");
        let names: Vec<&str> = legacy
            .constructs_mentioned
            .iter()
            .map(|c| c.construct_name.as_str())
            .collect();
        assert_eq!(names, vec!["Aerobic Capacity", "Muscular Power"]);
        assert_eq!(legacy.constructs_mentioned[0].domain_association, "measurable_concepts");
        assert_eq!(
            legacy.constructs_mentioned[0].assessment_context,
            "Graded exercise test"
        );
        // The unnamed state still counts toward the total (it is a record).
        assert_eq!(view.constructs_identified, 3);
    }

    #[test]
    fn test_robust_assessments_fill_empty_legacy_slots() {
        let view = project(ExtractorVariant::Robust, &robust_ctx());
        let legacy: AssessmentsBlock = view.assessments.view_or_default("assessments");
        assert_eq!(legacy.assessments.len(), 1);
        let a = &legacy.assessments[0];
        assert_eq!(a.assessment_name, "VO2 Max Test");
        assert_eq!(a.modality, "Physical test");
        assert_eq!(a.technology_vendor, json!({}));
        assert!(a.metrics.is_empty());
    }

    #[test]
    fn test_robust_intervention_purpose_joins_outcomes() {
        let view = project(ExtractorVariant::Robust, &robust_ctx());
        let legacy: InterventionsBlock = view.interventions.view_or_default("interventions");
        assert_eq!(legacy.interventions[0].purpose, "Aerobic Capacity, Lactate Threshold");
        assert_eq!(legacy.interventions[0].intervention_types, vec!["Physical".to_string()]);
    }

    #[test]
    fn test_robust_failed_passes_project_to_empty_blocks() {
        let mut ctx = PassContext::new();
        for id in [
            PassId::KnowledgeMap,
            PassId::Entities,
            PassId::Assessments,
            PassId::Interventions,
        ] {
            ctx.record(
                id,
                PassOutput::Failed(ParseFailure {
                    error: "JSON parsing failed".to_string(),
                    raw_response: "garbage".to_string(),
                }),
            );
        }
        let view = project(ExtractorVariant::Robust, &ctx);
        let legacy: AssessmentsBlock = view.assessments.view_or_default("assessments");
        assert!(legacy.assessments.is_empty());
        assert_eq!(view.constructs_identified, 0);
        assert!(!view.assessments.is_failed());
    }

    #[test]
    fn test_standard_projection_is_identity_including_markers() {
        let marker = PassOutput::Failed(ParseFailure {
            error: "JSON parsing failed".to_string(),
            raw_response: "I cannot answer".to_string(),
        });
        let mut ctx = PassContext::new();
        ctx.record(PassId::DomainsConstructs, marker.clone());
        ctx.record(
            PassId::Assessments,
            PassOutput::Parsed(json!({"assessments": [{"assessment_name": "DEXA Scan"}]})),
        );
        ctx.record(PassId::Interventions, PassOutput::Parsed(json!({"interventions": []})));
        ctx.record(PassId::Relationships, PassOutput::Parsed(json!({})));

        let view = project(ExtractorVariant::Standard, &ctx);
        assert_eq!(view.domains_constructs, marker);
        assert_eq!(view.constructs_identified, 0);
        let legacy: AssessmentsBlock = view.assessments.view_or_default("assessments");
        assert_eq!(legacy.assessments[0].assessment_name, "DEXA Scan");
    }

    #[test]
    fn test_guided_constructs_count_includes_factors() {
        let mut ctx = PassContext::new();
        ctx.record(
            PassId::DomainsConstructs,
            PassOutput::Parsed(json!({
                "constructs_mentioned": [
                    {"construct_name": "Sleep Quality", "how_assessed": "Sleep study"}
                ],
                "health_performance_factors": [
                    {"factor_name": "Training Load", "factor_type": "behavioral"}
                ]
            })),
        );
        let view = project(ExtractorVariant::Guided, &ctx);
        assert_eq!(view.constructs_identified, 2);
        let legacy: DomainsConstructs = view.domains_constructs.view_or_default("domains_constructs");
        assert_eq!(legacy.constructs_mentioned.len(), 1);
        assert_eq!(legacy.constructs_mentioned[0].assessment_context, "Sleep study");
    }
}
