//! Pass descriptors and extractor variants.
//!
//! A variant is nothing more than a named, ordered list of pass descriptors
//! plus a legacy projection (see `projection`). Adding a variant means adding
//! a table here — not a new extractor type.

use clap::ValueEnum;

use crate::extraction::context::PassContext;
use crate::extraction::prompts;
use crate::extraction::Transcript;

/// Stable identifier for one pass. Doubles as the key under which the pass
/// output is stored in the pass context and in a file's native data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PassId {
    DomainsConstructs,
    KnowledgeMap,
    Entities,
    Assessments,
    TechnologiesMetrics,
    Interventions,
    ContextualFactors,
    Relationships,
    ProtocolDetails,
    Validation,
}

impl PassId {
    pub fn as_str(self) -> &'static str {
        match self {
            PassId::DomainsConstructs => "domains_constructs",
            PassId::KnowledgeMap => "knowledge_map",
            PassId::Entities => "entities",
            PassId::Assessments => "assessments",
            PassId::TechnologiesMetrics => "technologies_metrics",
            PassId::Interventions => "interventions",
            PassId::ContextualFactors => "contextual_factors",
            PassId::Relationships => "relationships",
            PassId::ProtocolDetails => "protocol_details",
            PassId::Validation => "validation",
        }
    }
}

pub type PromptBuilder = fn(&Transcript, &PassContext) -> String;

/// One prompt/response round-trip: which pass it is, how to build its prompt
/// from the transcript and earlier outputs, and the response-size ceiling.
pub struct PassDescriptor {
    pub id: PassId,
    pub build_prompt: PromptBuilder,
    pub max_tokens: u32,
}

const DEFAULT_MAX_TOKENS: u32 = 4000;
const VALIDATION_MAX_TOKENS: u32 = 3000;

const STANDARD_PASSES: &[PassDescriptor] = &[
    PassDescriptor {
        id: PassId::DomainsConstructs,
        build_prompt: prompts::domains_constructs_standard,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::Assessments,
        build_prompt: prompts::assessments_standard,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::Interventions,
        build_prompt: prompts::interventions_standard,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::Relationships,
        build_prompt: prompts::relationships_standard,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
];

const ROBUST_PASSES: &[PassDescriptor] = &[
    PassDescriptor {
        id: PassId::KnowledgeMap,
        build_prompt: prompts::knowledge_map,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::Entities,
        build_prompt: prompts::entities,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::Assessments,
        build_prompt: prompts::assessments_robust,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::Interventions,
        build_prompt: prompts::interventions_robust,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::ContextualFactors,
        build_prompt: prompts::contextual_factors,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::Relationships,
        build_prompt: prompts::relationships_robust,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::Validation,
        build_prompt: prompts::validation,
        max_tokens: VALIDATION_MAX_TOKENS,
    },
];

const GUIDED_PASSES: &[PassDescriptor] = &[
    PassDescriptor {
        id: PassId::DomainsConstructs,
        build_prompt: prompts::domains_constructs_guided,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::Assessments,
        build_prompt: prompts::assessments_guided,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::TechnologiesMetrics,
        build_prompt: prompts::technologies_metrics_guided,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::Interventions,
        build_prompt: prompts::interventions_guided,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::ContextualFactors,
        build_prompt: prompts::contextual_factors,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::Relationships,
        build_prompt: prompts::relationships_standard,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::ProtocolDetails,
        build_prompt: prompts::protocol_details_guided,
        max_tokens: DEFAULT_MAX_TOKENS,
    },
    PassDescriptor {
        id: PassId::Validation,
        build_prompt: prompts::validation,
        max_tokens: VALIDATION_MAX_TOKENS,
    },
];

/// The three extraction strategies. They differ only in their pass tables
/// and in how their native schemas project onto the legacy shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExtractorVariant {
    /// Four broad passes — the original strategy.
    Standard,
    /// Seven open-ended passes for maximum information capture.
    Robust,
    /// Eight narrow, ontology-guided passes.
    Guided,
}

impl ExtractorVariant {
    pub fn passes(self) -> &'static [PassDescriptor] {
        match self {
            ExtractorVariant::Standard => STANDARD_PASSES,
            ExtractorVariant::Robust => ROBUST_PASSES,
            ExtractorVariant::Guided => GUIDED_PASSES,
        }
    }

    pub fn pass_count(self) -> usize {
        self.passes().len()
    }

    /// Human-readable label persisted in the corpus summary.
    pub fn label(self) -> &'static str {
        match self {
            ExtractorVariant::Standard => "Standard (4-pass)",
            ExtractorVariant::Robust => "Robust (7-pass)",
            ExtractorVariant::Guided => "Ontology-Guided (8-pass)",
        }
    }
}

impl std::fmt::Display for ExtractorVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Matches the CLI value names.
        let name = match self {
            ExtractorVariant::Standard => "standard",
            ExtractorVariant::Robust => "robust",
            ExtractorVariant::Guided => "guided",
        };
        f.write_str(name)
    }
}
