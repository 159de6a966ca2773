// All extraction prompt builders, one per pass, plus the shared ontology
// definition table that guides them. Builders are pure: transcript + prior
// pass context in, prompt string out. The JSON schema shown in each template
// is the contract the typed views in `models` parse.

use crate::extraction::context::{
    self, assessment_names, biasing_names, construct_names, expertise_areas, intervention_names,
    known_names, PassContext,
};
use crate::extraction::Transcript;

/// Entity categories of the ontology vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Domain,
    Construct,
    Assessment,
    Technology,
    Metric,
    Intervention,
}

struct OntologyEntry {
    name: &'static str,
    definition: &'static str,
    examples: &'static [&'static str],
    key_characteristics: &'static str,
}

const MAX_ONTOLOGY_EXAMPLES: usize = 8;

fn ontology_entry(kind: EntityKind) -> OntologyEntry {
    match kind {
        EntityKind::Domain => OntologyEntry {
            name: "DOMAIN",
            definition: "A distinct, specific area of focus within one or many Dimensions, \
                characterized by a set of related constructs.",
            examples: &[
                "Physical Health",
                "Female Health",
                "Cardiovascular Health",
                "Cognitive Health",
                "Stress & Adaptation",
                "Mental Health",
                "Recovery",
                "Performance",
                "Metabolic Health",
            ],
            key_characteristics: "Contains multiple related constructs and represents \
                practitioner expertise areas",
        },
        EntityKind::Construct => OntologyEntry {
            name: "CONSTRUCT",
            definition: "A specific, identifiable attribute within one or many Domains. \
                These are key concepts to understand, track, or influence.",
            examples: &[
                "Breast Health",
                "Blood Pressure Control",
                "Fall Risk",
                "Body Composition",
                "Sleep Quality",
                "Functional Mobility",
                "Muscular Power",
                "Heart Rate Variability",
                "Insulin Sensitivity",
                "Aerobic Capacity",
            ],
            key_characteristics: "Can be measured, tracked over time, influenced by \
                interventions, and have dependencies with other constructs",
        },
        EntityKind::Assessment => OntologyEntry {
            name: "ASSESSMENT",
            definition: "The systematic process or procedure used to evaluate the status of \
                a Construct or progress towards a Goal, producing data that will become Metrics.",
            examples: &[
                "Countermovement Jump",
                "Mammogram",
                "Lipid panel",
                "VO2 Max Test",
                "DEXA Scan",
                "Sleep Study",
                "24-hour Blood Pressure Monitoring",
                "Hormone Panel",
            ],
            key_characteristics: "Has specific protocols, uses technology vendors, produces \
                quantifiable metrics",
        },
        EntityKind::Technology => OntologyEntry {
            name: "TECHNOLOGY",
            definition: "The specific tools, devices, software, or commercial providers used \
                to perform an Assessment or deliver an Intervention.",
            examples: &[
                "VALD ForceDecks",
                "Neurocatch",
                "Oura Ring",
                "COSMED",
                "Polar H10",
                "LabCorp",
                "Quest Diagnostics",
                "HRV4Training",
                "Hologic DEXA",
                "SpaceLabs",
            ],
            key_characteristics: "Has vendor/manufacturer, specific model numbers, \
                hardware/software classification",
        },
        EntityKind::Metric => OntologyEntry {
            name: "METRIC",
            definition: "A specific, measurable, and observable data point produced by an \
                Assessment that directly contributes to understanding a Construct.",
            examples: &[
                "Body Fat Percentage (%)",
                "Systolic Blood Pressure (mmHg)",
                "Jump Height (cm)",
                "HRV (ms)",
                "VO2 Max (ml/kg/min)",
                "Estradiol (pg/mL)",
                "Sleep Efficiency (%)",
                "RER",
            ],
            key_characteristics: "Has specific units, reference ranges, reliability/validity \
                characteristics",
        },
        EntityKind::Intervention => OntologyEntry {
            name: "INTERVENTION",
            definition: "A specific action, programme, or strategy designed to influence, \
                improve, or manage a particular Construct, aiming to achieve a Goal.",
            examples: &[
                "12-week Progressive Resistance Training",
                "Personalized Nutrition Plan",
                "Sleep Restriction Therapy",
                "HRV Biofeedback Training",
                "Aerobic Exercise Training",
                "Light Therapy",
            ],
            key_characteristics: "Has specific protocols, dosage parameters, targets specific \
                constructs, has resource requirements",
        },
    }
}

/// Renders the ontology framework block for the given entity kinds.
pub fn ontology_context(kinds: &[EntityKind]) -> String {
    kinds
        .iter()
        .map(|&kind| {
            let entry = ontology_entry(kind);
            format!(
                "**{} DEFINITION:** {}\n**Examples:** {}\n**Key Characteristics:** {}\n",
                entry.name,
                entry.definition,
                entry.examples[..entry.examples.len().min(MAX_ONTOLOGY_EXAMPLES)].join(", "),
                entry.key_characteristics
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bullet_list(names: &[String]) -> String {
    if names.is_empty() {
        return "- (none identified)".to_string();
    }
    names
        .iter()
        .map(|n| format!("- {n}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn comma_list(names: &[String]) -> String {
    if names.is_empty() {
        "(none identified)".to_string()
    } else {
        names.join(", ")
    }
}

/// First `n` characters of the transcript, for passes that only need a taste.
fn excerpt(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Standard (4-pass) builders
// ────────────────────────────────────────────────────────────────────────────

const DOMAINS_CONSTRUCTS_TEMPLATE: &str = r#"You are analyzing a semi-structured interview transcript about health and performance assessment practices.

ONTOLOGY FRAMEWORK:
{ontology}

TRANSCRIPT:
{transcript}

Extract and return a JSON structure with:
{
    "practitioner_domains": [
        {
            "domain_name": "string (use terminology from examples when possible)",
            "domain_description": "string",
            "specialization_notes": "string"
        }
    ],
    "constructs_mentioned": [
        {
            "construct_name": "string (use specific terminology when possible)",
            "construct_description": "string",
            "domain_association": "string",
            "assessment_context": "string"
        }
    ],
    "sport_specificity": [
        {
            "sport": "string",
            "assessment_modifications": "string",
            "intervention_modifications": "string"
        }
    ]
}

Be precise and look for specific terminology that matches the ontology framework."#;

pub fn domains_constructs_standard(transcript: &Transcript, _ctx: &PassContext) -> String {
    DOMAINS_CONSTRUCTS_TEMPLATE
        .replace(
            "{ontology}",
            &ontology_context(&[EntityKind::Domain, EntityKind::Construct]),
        )
        .replace("{transcript}", &transcript.text)
}

const ASSESSMENTS_STANDARD_TEMPLATE: &str = r#"Analyze this interview transcript to extract assessment information.

ONTOLOGY FRAMEWORK:
{ontology}

CONSTRUCTS TO ASSESS:
{constructs}

TRANSCRIPT:
{transcript}

For each assessment mentioned, extract:
{
    "assessments": [
        {
            "assessment_name": "string (exact name used)",
            "assessment_description": "string",
            "constructs_measured": ["list of constructs from above"],
            "modality": "string (Physical test/Wearable monitoring/Labs/Imaging/Survey/etc.)",
            "technology_vendor": {
                "name": "string (exact vendor/brand name)",
                "type": "hardware/software/service",
                "specific_equipment": "string (model numbers, specific devices)"
            },
            "protocols": {
                "preparation_steps": ["list"],
                "coaching_cues": ["specific instructions"],
                "common_mistakes": ["errors that affect results"]
            },
            "metrics": [
                {
                    "metric_name": "string (exact metric name)",
                    "unit": "string (specific units: cm, kg, mmHg, %, etc.)",
                    "reference_ranges": "string (normal values mentioned)",
                    "validity_confidence": "string",
                    "reliability_confidence": "string"
                }
            ],
            "state_influences": [
                {
                    "state_name": "string",
                    "impact_on_assessment": "string",
                    "impact_on_interpretation": "string"
                }
            ],
            "assets_generated": [
                {
                    "asset_name": "string",
                    "asset_type": "PDF report/raw data/video/dashboard/etc.",
                    "description": "string"
                }
            ]
        }
    ]
}

Hunt specifically for technology vendor names, specific equipment models, and measurable metrics with units."#;

pub fn assessments_standard(transcript: &Transcript, ctx: &PassContext) -> String {
    ASSESSMENTS_STANDARD_TEMPLATE
        .replace(
            "{ontology}",
            &ontology_context(&[
                EntityKind::Assessment,
                EntityKind::Technology,
                EntityKind::Metric,
            ]),
        )
        .replace("{constructs}", &bullet_list(&construct_names(ctx)))
        .replace("{transcript}", &transcript.text)
}

const INTERVENTIONS_STANDARD_TEMPLATE: &str = r#"Analyze this transcript for intervention information.

ONTOLOGY FRAMEWORK:
{ontology}

CONSTRUCTS TO TARGET:
{constructs}

TRANSCRIPT:
{transcript}

Extract:
{
    "interventions": [
        {
            "intervention_name": "string (exact name used)",
            "intervention_description": "string",
            "purpose": "string",
            "constructs_targeted": ["which constructs from above list"],
            "intervention_types": ["Physical/Nutrition/Sleep/Stress Management/Medical/Education/Recovery"],
            "protocols": {
                "duration": "string (specific timeframes)",
                "frequency": "string (how often)",
                "intensity": "string (how hard/strong)",
                "volume": "string (how much)",
                "progression_criteria": ["when/how to advance"],
                "reassessment_intervals": "string"
            },
            "constraints_accommodations": [
                {
                    "constraint_type": "string",
                    "accommodation_strategy": "string"
                }
            ],
            "resource_requirements": {
                "time": "string",
                "equipment": "string",
                "staff_expertise": "string",
                "cost_level": "High/Moderate/Low"
            }
        }
    ]
}

Look for specific protocols, dosage details, and resource requirements."#;

pub fn interventions_standard(transcript: &Transcript, ctx: &PassContext) -> String {
    INTERVENTIONS_STANDARD_TEMPLATE
        .replace("{ontology}", &ontology_context(&[EntityKind::Intervention]))
        .replace("{constructs}", &bullet_list(&construct_names(ctx)))
        .replace("{transcript}", &transcript.text)
}

const RELATIONSHIPS_TEMPLATE: &str = r#"Based on this interview transcript and the entities already identified, extract relationships.

IDENTIFIED ENTITIES:
Constructs: {constructs}
Assessments: {assessments}
Interventions: {interventions}

TRANSCRIPT:
{transcript}

Extract:
{
    "construct_relationships": [
        {
            "source_construct": "string",
            "target_construct": "string",
            "relationship_type": "causal/association/dependency",
            "relationship_description": "string",
            "evidence_mentioned": "string",
            "directionality": "bidirectional/unidirectional"
        }
    ],
    "assessment_intervention_links": [
        {
            "assessment_name": "string",
            "intervention_name": "string",
            "connection_type": "informs/measures_progress/triggers/evaluates",
            "description": "string"
        }
    ],
    "goal_connections": [
        {
            "goal_description": "string",
            "target_constructs": ["list"],
            "supporting_assessments": ["list"],
            "recommended_interventions": ["list"]
        }
    ]
}"#;

pub fn relationships_standard(transcript: &Transcript, ctx: &PassContext) -> String {
    let names = known_names(ctx);
    RELATIONSHIPS_TEMPLATE
        .replace("{constructs}", &comma_list(&names.constructs))
        .replace("{assessments}", &comma_list(&names.assessments))
        .replace("{interventions}", &comma_list(&names.interventions))
        .replace("{transcript}", &transcript.text)
}

// ────────────────────────────────────────────────────────────────────────────
// Robust (7-pass) builders
// ────────────────────────────────────────────────────────────────────────────

const KNOWLEDGE_MAP_TEMPLATE: &str = r#"Analyze this interview transcript to create a comprehensive knowledge map. Be expansive and inclusive - capture ALL areas of expertise, knowledge domains, and specializations mentioned.

TRANSCRIPT:
{transcript}

Extract and return JSON:
{
    "primary_expertise": [
        {
            "area": "string",
            "description": "string",
            "scope": "string",
            "depth_indicators": ["specific examples showing depth"]
        }
    ],
    "knowledge_domains": [
        {
            "domain": "string",
            "description": "string",
            "sub_areas": ["list of sub-specializations"]
        }
    ],
    "target_populations": [
        {
            "population": "string",
            "characteristics": "string",
            "specific_needs": "string"
        }
    ]
}"#;

pub fn knowledge_map(transcript: &Transcript, _ctx: &PassContext) -> String {
    KNOWLEDGE_MAP_TEMPLATE.replace("{transcript}", &transcript.text)
}

const ENTITIES_TEMPLATE: &str = r#"Extract ALL measurable, trackable, or influenceable concepts from this interview. Cast a wide net - include anything the practitioner considers important to assess, track, monitor, or influence.

CONTEXT: Primary expertise: {expertise}

TRANSCRIPT:
{transcript}

Extract comprehensive entities:
{
    "measurable_concepts": [
        {
            "concept_name": "string",
            "description": "string",
            "category": "string",
            "why_important": "string",
            "measurement_approach": "string"
        }
    ],
    "capabilities_and_attributes": [
        {
            "capability": "string",
            "description": "string",
            "components": ["sub-components"],
            "assessment_indicators": ["how to recognize this capability"]
        }
    ],
    "health_performance_states": [
        {
            "state": "string",
            "description": "string",
            "indicators": ["how to recognize this state"],
            "influencing_factors": ["what affects this state"]
        }
    ]
}"#;

pub fn entities(transcript: &Transcript, ctx: &PassContext) -> String {
    ENTITIES_TEMPLATE
        .replace("{expertise}", &comma_list(&expertise_areas(ctx)))
        .replace("{transcript}", &transcript.text)
}

const ASSESSMENTS_ROBUST_TEMPLATE: &str = r#"Extract ALL assessment and evaluation methods mentioned in this interview.

CONCEPTS ALREADY IDENTIFIED: {entities}

TRANSCRIPT:
{transcript}

Extract comprehensive assessments:
{
    "formal_assessments": [
        {
            "assessment_name": "string",
            "description": "string",
            "what_it_measures": ["list of concepts/capabilities assessed"],
            "assessment_type": "string",
            "administration_context": "string",
            "frequency_timing": "string"
        }
    ],
    "protocols_and_procedures": [
        {
            "assessment_name": "string",
            "detailed_protocol": "string",
            "preparation_requirements": ["list"],
            "step_by_step_process": ["ordered list"],
            "quality_control_measures": ["how to ensure good data"]
        }
    ],
    "technologies_and_equipment": [
        {
            "technology_name": "string",
            "vendor_manufacturer": "string",
            "equipment_type": "string",
            "what_it_measures": ["capabilities"],
            "advantages": ["benefits"],
            "limitations": ["constraints"]
        }
    ]
}"#;

pub fn assessments_robust(transcript: &Transcript, ctx: &PassContext) -> String {
    ASSESSMENTS_ROBUST_TEMPLATE
        .replace("{entities}", &comma_list(&biasing_names(ctx)))
        .replace("{transcript}", &transcript.text)
}

const INTERVENTIONS_ROBUST_TEMPLATE: &str = r#"Extract ALL intervention strategies, treatments, programs, and approaches mentioned.

CONCEPTS ALREADY IDENTIFIED: {entities}

TRANSCRIPT:
{transcript}

Extract comprehensive interventions:
{
    "intervention_strategies": [
        {
            "intervention_name": "string",
            "description": "string",
            "intervention_category": "string",
            "target_outcomes": ["what this intervention aims to improve"],
            "mechanism_of_action": "string",
            "typical_candidates": "string"
        }
    ],
    "detailed_protocols": [
        {
            "intervention_name": "string",
            "dosage_parameters": {
                "frequency": "string",
                "duration": "string",
                "intensity": "string",
                "progression_rules": "string"
            },
            "implementation_details": "string",
            "monitoring_requirements": ["what to track"]
        }
    ],
    "resource_requirements": [
        {
            "intervention_name": "string",
            "equipment_needed": ["list"],
            "time_investment": "string",
            "expertise_level_required": "string"
        }
    ]
}"#;

pub fn interventions_robust(transcript: &Transcript, ctx: &PassContext) -> String {
    INTERVENTIONS_ROBUST_TEMPLATE
        .replace("{entities}", &comma_list(&biasing_names(ctx)))
        .replace("{transcript}", &transcript.text)
}

const CONTEXTUAL_FACTORS_TEMPLATE: &str = r#"Extract all contextual information that affects assessment and intervention decisions.

CONCEPTS ALREADY IDENTIFIED: {entities}

TRANSCRIPT:
{transcript}

Extract contextual factors:
{
    "client_goals": [
        {
            "goal_description": "string",
            "goal_type": "string",
            "target_metrics": ["specific measurable outcomes"],
            "timeline": "string"
        }
    ],
    "constraints_and_limitations": [
        {
            "constraint_type": "string",
            "description": "string",
            "impact_on_assessment": "string",
            "impact_on_intervention": "string",
            "workaround_strategies": ["accommodations"]
        }
    ],
    "moderating_factors": [
        {
            "factor_name": "string",
            "description": "string",
            "what_it_moderates": "string",
            "management_strategies": ["how to account for this factor"]
        }
    ]
}"#;

pub fn contextual_factors(transcript: &Transcript, ctx: &PassContext) -> String {
    CONTEXTUAL_FACTORS_TEMPLATE
        .replace("{entities}", &comma_list(&biasing_names(ctx)))
        .replace("{transcript}", &transcript.text)
}

const RELATIONSHIPS_ROBUST_TEMPLATE: &str = r#"Analyze this interview for ALL types of relationships, dependencies, and connections discussed.

ENTITIES ALREADY IDENTIFIED:
Concepts: {constructs}
Assessments: {assessments}
Interventions: {interventions}

TRANSCRIPT:
{transcript}

Extract all relationship types:
{
    "causal_relationships": [
        {
            "cause": "string",
            "effect": "string",
            "relationship_strength": "string",
            "mechanism": "string",
            "evidence_mentioned": "string"
        }
    ],
    "assessment_construct_links": [
        {
            "assessment": "string",
            "constructs_measured": ["list"],
            "measurement_quality": "string"
        }
    ],
    "intervention_outcome_links": [
        {
            "intervention": "string",
            "target_outcomes": ["list"],
            "expected_timeline": "string",
            "moderating_factors": ["what affects effectiveness"]
        }
    ]
}"#;

pub fn relationships_robust(transcript: &Transcript, ctx: &PassContext) -> String {
    let names = known_names(ctx);
    RELATIONSHIPS_ROBUST_TEMPLATE
        .replace("{constructs}", &comma_list(&names.constructs))
        .replace("{assessments}", &comma_list(&names.assessments))
        .replace("{interventions}", &comma_list(&names.interventions))
        .replace("{transcript}", &transcript.text)
}

const VALIDATION_TEMPLATE: &str = r#"Review this transcript and the extracted information to identify any significant gaps.

EXTRACTION COUNTS SO FAR:
- constructs identified: {construct_count}
- assessments identified: {assessment_count}
- interventions identified: {intervention_count}
- technologies identified: {technology_count}
- metrics identified: {metric_count}

TRANSCRIPT EXCERPT (first 2000 chars):
{transcript_excerpt}...

Perform ontology validation:
{
    "potential_missed_entities": [
        {
            "entity_type": "string (construct/assessment/intervention/technology/metric)",
            "potential_entity": "string",
            "evidence_in_transcript": "string",
            "confidence": "string (high/medium/low)"
        }
    ],
    "quality_assessment": {
        "extraction_completeness": "string (high/medium/low)",
        "terminology_consistency": "string (high/medium/low)",
        "relationship_coverage": "string (high/medium/low)",
        "overall_confidence": "string (high/medium/low)"
    },
    "recommendations": [
        {
            "recommendation_type": "string",
            "description": "string",
            "priority": "string (high/medium/low)"
        }
    ]
}"#;

/// Terminal advisory pass — flags likely omissions. Its output is metadata
/// only and never feeds back into earlier passes.
pub fn validation(transcript: &Transcript, ctx: &PassContext) -> String {
    let counts = context::coverage_counts(ctx);
    VALIDATION_TEMPLATE
        .replace("{construct_count}", &counts.constructs.to_string())
        .replace("{assessment_count}", &counts.assessments.to_string())
        .replace("{intervention_count}", &counts.interventions.to_string())
        .replace("{technology_count}", &counts.technologies.to_string())
        .replace("{metric_count}", &counts.metrics.to_string())
        .replace("{transcript_excerpt}", &excerpt(&transcript.text, 2000))
}

// ────────────────────────────────────────────────────────────────────────────
// Guided (8-pass) builders
// ────────────────────────────────────────────────────────────────────────────

const DOMAINS_CONSTRUCTS_GUIDED_TEMPLATE: &str = r#"Extract ALL domains and constructs using these specific ontology definitions.

ONTOLOGY FRAMEWORK:
{ontology}

TRANSCRIPT:
{transcript}

Look specifically for attributes that practitioners measure, track, or influence. Use exact terminology when possible.

Extract:
{
    "practitioner_domains": [
        {
            "domain_name": "string (use terminology from examples when possible)",
            "domain_description": "string",
            "specialization_notes": "string"
        }
    ],
    "constructs_mentioned": [
        {
            "construct_name": "string (use specific terminology when possible)",
            "construct_description": "string",
            "domain_association": "string",
            "why_important": "string (why practitioner focuses on this)",
            "how_assessed": "string (how they evaluate this construct)",
            "measurement_approach": "string"
        }
    ],
    "health_performance_factors": [
        {
            "factor_name": "string",
            "factor_type": "string (physiological/psychological/behavioral/environmental)",
            "description": "string",
            "measurement_approach": "string"
        }
    ]
}

Be specific - look for exact terminology like "sleep quality," "muscular power," "insulin sensitivity," etc."#;

pub fn domains_constructs_guided(transcript: &Transcript, _ctx: &PassContext) -> String {
    DOMAINS_CONSTRUCTS_GUIDED_TEMPLATE
        .replace(
            "{ontology}",
            &ontology_context(&[EntityKind::Domain, EntityKind::Construct]),
        )
        .replace("{transcript}", &transcript.text)
}

const ASSESSMENTS_GUIDED_TEMPLATE: &str = r#"Extract ALL assessments using this specific definition.

ONTOLOGY FRAMEWORK:
{ontology}

CONSTRUCTS IDENTIFIED: {constructs}

TRANSCRIPT:
{transcript}

Look for ANY method used to evaluate, test, measure, or gather information about the constructs above.

Extract all assessments:
{
    "assessments": [
        {
            "assessment_name": "string (exact name used)",
            "assessment_description": "string",
            "constructs_measured": ["list - which constructs does this assess"],
            "modality": "string (Physical test/Wearable monitoring/Consultation/Labs/Imaging/Survey/etc)",
            "administration_details": {
                "where_performed": "string (lab/clinic/field/home)",
                "duration": "string",
                "preparation_required": "string",
                "frequency": "string"
            },
            "protocol_details": {
                "key_steps": ["list of main protocol steps"],
                "coaching_cues": ["specific instructions given"],
                "common_mistakes": ["errors that affect results"],
                "quality_controls": ["how to ensure good data"]
            }
        }
    ]
}

Include formal tests, informal observations, questionnaires, monitoring approaches - anything used to gather assessment data."#;

pub fn assessments_guided(transcript: &Transcript, ctx: &PassContext) -> String {
    ASSESSMENTS_GUIDED_TEMPLATE
        .replace("{ontology}", &ontology_context(&[EntityKind::Assessment]))
        .replace("{constructs}", &comma_list(&construct_names(ctx)))
        .replace("{transcript}", &transcript.text)
}

const TECHNOLOGIES_METRICS_TEMPLATE: &str = r#"Extract ALL technologies and metrics mentioned in this interview.

ONTOLOGY FRAMEWORK:
{ontology}

ASSESSMENTS IDENTIFIED: {assessments}

TRANSCRIPT:
{transcript}

Hunt specifically for:
1. Equipment brands, models, software names
2. Specific measurable outputs with units
3. Any vendor or manufacturer names
4. Specific measurement values or ranges

Extract technologies and metrics:
{
    "technologies": [
        {
            "technology_name": "string (exact name/brand mentioned)",
            "vendor_manufacturer": "string (company name)",
            "technology_type": "string (hardware/software/device/service)",
            "specific_model": "string (if mentioned)",
            "used_for_assessments": ["which assessments use this"],
            "what_it_measures": ["capabilities it assesses"],
            "data_output_format": "string (PDF report/raw data/dashboard/etc)",
            "mentioned_advantages": ["benefits mentioned"],
            "mentioned_limitations": ["constraints mentioned"]
        }
    ],
    "metrics": [
        {
            "metric_name": "string (exact name used)",
            "measurement_unit": "string (cm, kg, mmHg, %, etc)",
            "assessment_source": "string (which assessment produces this)",
            "normal_ranges": "string (any reference values mentioned)",
            "interpretation_notes": "string (how values are interpreted)",
            "factors_affecting_values": ["what influences this measurement"],
            "reliability_notes": "string (confidence/validity mentioned)"
        }
    ]
}

Look for specific brand names, model numbers, measurement units, reference ranges, and any quantitative values mentioned."#;

pub fn technologies_metrics_guided(transcript: &Transcript, ctx: &PassContext) -> String {
    TECHNOLOGIES_METRICS_TEMPLATE
        .replace(
            "{ontology}",
            &ontology_context(&[EntityKind::Technology, EntityKind::Metric]),
        )
        .replace("{assessments}", &comma_list(&assessment_names(ctx)))
        .replace("{transcript}", &transcript.text)
}

const INTERVENTIONS_GUIDED_TEMPLATE: &str = r#"Extract ALL interventions using this specific definition.

ONTOLOGY FRAMEWORK:
{ontology}

CONSTRUCTS TO TARGET: {constructs}

TRANSCRIPT:
{transcript}

Look for ANY strategy, program, treatment, or approach used to improve the constructs above.

Extract all interventions:
{
    "interventions": [
        {
            "intervention_name": "string (exact name used)",
            "intervention_description": "string",
            "purpose": "string (what it aims to achieve)",
            "constructs_targeted": ["which constructs does this improve"],
            "intervention_types": ["Physical/Nutrition/Sleep/Stress Management/Medical/Education/Recovery"],
            "dosage_details": {
                "frequency": "string (how often)",
                "duration": "string (how long)",
                "intensity": "string (how hard/strong)",
                "volume": "string (how much)",
                "progression": "string (how it advances)"
            },
            "implementation_specifics": {
                "delivery_method": "string (how it's delivered)",
                "monitoring_approach": "string (how progress is tracked)",
                "adjustment_criteria": "string (when/how it's modified)"
            },
            "resource_requirements": {
                "equipment_needed": ["list"],
                "time_commitment": "string",
                "expertise_required": "string",
                "cost_level": "string (High/Moderate/Low if mentioned)"
            }
        }
    ]
}

Include exercise programs, nutrition plans, lifestyle modifications, medical treatments, education protocols - anything designed to improve health/performance outcomes."#;

pub fn interventions_guided(transcript: &Transcript, ctx: &PassContext) -> String {
    INTERVENTIONS_GUIDED_TEMPLATE
        .replace("{ontology}", &ontology_context(&[EntityKind::Intervention]))
        .replace("{constructs}", &comma_list(&construct_names(ctx)))
        .replace("{transcript}", &transcript.text)
}

const PROTOCOL_DETAILS_TEMPLATE: &str = r#"Elaborate the full protocol details for the assessments and interventions already identified in this interview.

ASSESSMENTS IDENTIFIED: {assessments}
INTERVENTIONS IDENTIFIED: {interventions}

TRANSCRIPT:
{transcript}

For each named assessment or intervention that the transcript describes in procedural detail, extract:
{
    "assessment_protocols": [
        {
            "assessment_name": "string (must match a name above)",
            "detailed_protocol": "string",
            "preparation_requirements": ["list"],
            "step_by_step_process": ["ordered list"],
            "quality_control_measures": ["how to ensure good data"]
        }
    ],
    "intervention_protocols": [
        {
            "intervention_name": "string (must match a name above)",
            "dosage_parameters": {
                "frequency": "string",
                "duration": "string",
                "intensity": "string",
                "progression_rules": "string"
            },
            "implementation_details": "string",
            "monitoring_requirements": ["what to track"]
        }
    ]
}

Only include entries where the transcript actually describes protocol specifics."#;

pub fn protocol_details_guided(transcript: &Transcript, ctx: &PassContext) -> String {
    PROTOCOL_DETAILS_TEMPLATE
        .replace("{assessments}", &comma_list(&assessment_names(ctx)))
        .replace("{interventions}", &comma_list(&intervention_names(ctx)))
        .replace("{transcript}", &transcript.text)
}
