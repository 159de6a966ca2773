//! Per-transcript pass context and name-forwarding helpers.
//!
//! The context is a write-once-per-pass accumulator: the sequencer records
//! each pass's output after it completes, so a prompt builder can only ever
//! see passes that ran before it. It is never shared across transcripts.
//!
//! Only entity NAMES are forwarded into later prompts, and only the first
//! [`MAX_CONTEXT_NAMES`] per category, in discovery order. Passes past the
//! cutoff receive incomplete context; that is the token-budget trade-off
//! this pipeline makes, not a bug to fix with smarter selection.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::extraction::models::{
    AssessmentsBlock, EntityInventory, GuidedDomainsConstructs, InterventionsBlock, KnowledgeMap,
    PassOutput, RobustAssessments, RobustInterventions, TechnologiesMetrics,
};
use crate::extraction::passes::PassId;

/// Hard cap on the names forwarded per entity category.
pub const MAX_CONTEXT_NAMES: usize = 10;

/// Accumulated pass outputs for one transcript.
#[derive(Debug, Default)]
pub struct PassContext {
    outputs: BTreeMap<PassId, PassOutput>,
}

impl PassContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed pass. Outputs are never overwritten — each pass
    /// runs exactly once per transcript.
    pub fn record(&mut self, id: PassId, output: PassOutput) {
        debug_assert!(!self.outputs.contains_key(&id), "pass recorded twice");
        self.outputs.insert(id, output);
    }

    pub fn get(&self, id: PassId) -> Option<&PassOutput> {
        self.outputs.get(&id)
    }

    /// Typed view of a recorded pass; defaults when the pass is absent,
    /// failed, or shaped unexpectedly.
    pub fn view<T: DeserializeOwned + Default>(&self, id: PassId) -> T {
        match self.outputs.get(&id) {
            Some(output) => output.view_or_default(id.as_str()),
            None => T::default(),
        }
    }

    pub fn outputs(&self) -> &BTreeMap<PassId, PassOutput> {
        &self.outputs
    }
}

fn truncate(mut names: Vec<String>) -> Vec<String> {
    names.truncate(MAX_CONTEXT_NAMES);
    names
}

fn non_empty(names: impl IntoIterator<Item = String>) -> Vec<String> {
    names.into_iter().filter(|n| !n.is_empty()).collect()
}

/// Construct names from the domain/construct discovery pass, bounded.
pub fn construct_names(ctx: &PassContext) -> Vec<String> {
    let view: GuidedDomainsConstructs = ctx.view(PassId::DomainsConstructs);
    truncate(non_empty(
        view.constructs_mentioned.into_iter().map(|c| c.construct_name),
    ))
}

/// Expertise areas from the robust knowledge-mapping pass, bounded.
pub fn expertise_areas(ctx: &PassContext) -> Vec<String> {
    let view: KnowledgeMap = ctx.view(PassId::KnowledgeMap);
    truncate(non_empty(
        view.primary_expertise.into_iter().map(|e| e.area),
    ))
}

/// Entity names from the robust inventory pass, bounded. Categories are
/// concatenated in schema order, so the cutoff favors measurable concepts.
pub fn entity_names(ctx: &PassContext) -> Vec<String> {
    let view: EntityInventory = ctx.view(PassId::Entities);
    let names = view
        .measurable_concepts
        .into_iter()
        .map(|c| c.concept_name)
        .chain(view.capabilities_and_attributes.into_iter().map(|c| c.capability))
        .chain(view.health_performance_states.into_iter().map(|s| s.state));
    truncate(non_empty(names))
}

/// Construct-ish names regardless of variant: the domain/construct pass if
/// it ran, otherwise the robust entity inventory.
pub fn biasing_names(ctx: &PassContext) -> Vec<String> {
    let constructs = construct_names(ctx);
    if constructs.is_empty() {
        entity_names(ctx)
    } else {
        constructs
    }
}

/// Assessment names from whichever assessment pass ran, bounded.
pub fn assessment_names(ctx: &PassContext) -> Vec<String> {
    let legacy: AssessmentsBlock = ctx.view(PassId::Assessments);
    let names = non_empty(legacy.assessments.into_iter().map(|a| a.assessment_name));
    if !names.is_empty() {
        return truncate(names);
    }
    let robust: RobustAssessments = ctx.view(PassId::Assessments);
    truncate(non_empty(
        robust.formal_assessments.into_iter().map(|a| a.assessment_name),
    ))
}

/// Intervention names from whichever intervention pass ran, bounded.
pub fn intervention_names(ctx: &PassContext) -> Vec<String> {
    let legacy: InterventionsBlock = ctx.view(PassId::Interventions);
    let names = non_empty(legacy.interventions.into_iter().map(|i| i.intervention_name));
    if !names.is_empty() {
        return truncate(names);
    }
    let robust: RobustInterventions = ctx.view(PassId::Interventions);
    truncate(non_empty(
        robust
            .intervention_strategies
            .into_iter()
            .map(|i| i.intervention_name),
    ))
}

/// The widest biasing context, used by the relationship pass.
#[derive(Debug, Default, PartialEq)]
pub struct NameInventory {
    pub constructs: Vec<String>,
    pub assessments: Vec<String>,
    pub interventions: Vec<String>,
}

pub fn known_names(ctx: &PassContext) -> NameInventory {
    NameInventory {
        constructs: biasing_names(ctx),
        assessments: assessment_names(ctx),
        interventions: intervention_names(ctx),
    }
}

/// True (unbounded) entity counts for the advisory validation pass.
#[derive(Debug, Default, PartialEq)]
pub struct CoverageCounts {
    pub constructs: usize,
    pub assessments: usize,
    pub interventions: usize,
    pub technologies: usize,
    pub metrics: usize,
}

pub fn coverage_counts(ctx: &PassContext) -> CoverageCounts {
    let entities: EntityInventory = ctx.view(PassId::Entities);
    let constructs = if entities.total() > 0 {
        entities.total()
    } else {
        let view: GuidedDomainsConstructs = ctx.view(PassId::DomainsConstructs);
        view.constructs_mentioned.len() + view.health_performance_factors.len()
    };

    let legacy_assessments: AssessmentsBlock = ctx.view(PassId::Assessments);
    let robust_assessments: RobustAssessments = ctx.view(PassId::Assessments);
    let legacy_interventions: InterventionsBlock = ctx.view(PassId::Interventions);
    let robust_interventions: RobustInterventions = ctx.view(PassId::Interventions);
    let tech_metrics: TechnologiesMetrics = ctx.view(PassId::TechnologiesMetrics);

    CoverageCounts {
        constructs,
        assessments: legacy_assessments.assessments.len()
            + robust_assessments.formal_assessments.len(),
        interventions: legacy_interventions.interventions.len()
            + robust_interventions.intervention_strategies.len(),
        technologies: tech_metrics.technologies.len(),
        metrics: tech_metrics.metrics.len(),
    }
}
