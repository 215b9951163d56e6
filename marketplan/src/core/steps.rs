//! Step view descriptors.
//!
//! One [`StepView`] per plan section lists the editable fields a front end
//! should render, in display order. Field paths are the same paths accepted
//! by [`crate::core::field_update::update_field`].

use serde::Serialize;

use crate::core::types::SectionKey;

/// A sub-field of each entry in a list field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemField {
    pub name: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    /// Single-line input.
    Text,
    /// Multi-line input; list-like answers are written one `- item` per line.
    LongText,
    Choice {
        options: &'static [&'static str],
    },
    List {
        #[serde(rename = "itemFields")]
        item_fields: &'static [ItemField],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub path: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Offers a per-field AI suggestion.
    pub suggest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub step: usize,
    pub key: SectionKey,
    pub title: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldSpec],
}

impl StepView {
    pub fn field(&self, path: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.path == path)
    }
}

const fn text(path: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        path,
        label,
        kind: FieldKind::Text,
        suggest: false,
    }
}

const fn long(path: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        path,
        label,
        kind: FieldKind::LongText,
        suggest: true,
    }
}

const fn list(path: &'static str, label: &'static str, item_fields: &'static [ItemField]) -> FieldSpec {
    FieldSpec {
        path,
        label,
        kind: FieldKind::List { item_fields },
        suggest: true,
    }
}

const COMPETITOR_FIELDS: &[ItemField] = &[
    ItemField {
        name: "name",
        label: "Competitor Name",
    },
    ItemField {
        name: "analysis",
        label: "Analysis",
    },
];

const PERSONA_FIELDS: &[ItemField] = &[
    ItemField {
        name: "name",
        label: "Persona Name",
    },
    ItemField {
        name: "description",
        label: "Description",
    },
];

const OBJECTIVE_FIELDS: &[ItemField] = &[
    ItemField {
        name: "objective",
        label: "Objective",
    },
    ItemField {
        name: "kpi",
        label: "KPI",
    },
];

const DIRECTIONS: &[&str] = &["Growth", "Maintenance", "Retrenchment"];

const SITUATION_FIELDS: &[FieldSpec] = &[
    long("mission", "Mission"),
    long("resources", "Resources"),
    long("offerings", "Offerings"),
    long("previousResults", "Previous Results"),
    long("businessRelationships", "Business Relationships"),
    long("swot.strengths", "Strengths"),
    long("swot.weaknesses", "Weaknesses"),
    long("swot.opportunities", "Opportunities"),
    long("swot.threats", "Threats"),
    list("competitors", "Competitors", COMPETITOR_FIELDS),
];

const MARKETS_FIELDS: &[FieldSpec] = &[
    long("marketDefinition", "Market Definition"),
    text("marketShare", "Market Share"),
    long("consumerAnalysis", "Consumer Market Analysis"),
    long("businessAnalysis", "Business Market Analysis"),
    long("targetMarkets", "Target Markets"),
    list("customerPersonas", "Customer Personas", PERSONA_FIELDS),
];

const STP_FIELDS: &[FieldSpec] = &[
    long("segmentation", "Segmentation"),
    long("targeting", "Targeting"),
    long("positioning", "Positioning"),
];

const DIRECTION_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        path: "direction",
        label: "Strategic Direction",
        kind: FieldKind::Choice {
            options: DIRECTIONS,
        },
        suggest: false,
    },
    long("missionStatement", "Mission Statement"),
    long("visionStatement", "Vision Statement"),
    long("marketingObjectives", "Marketing Objectives"),
    long("financialObjectives", "Financial Objectives"),
    long("societalObjectives", "Societal Objectives"),
    long("customerService", "Customer Service"),
    long("internalMarketing", "Internal Marketing"),
    list("objectives", "SMART Objectives", OBJECTIVE_FIELDS),
];

const STRATEGY_FIELDS: &[FieldSpec] = &[
    long("product", "Product"),
    long("pricing", "Price"),
    long("place", "Place"),
    long("promotion", "Promotion"),
    long("aidaCopy.attention", "Attention"),
    long("aidaCopy.interest", "Interest"),
    long("aidaCopy.desire", "Desire"),
    long("aidaCopy.action", "Action"),
];

const METRICS_FIELDS: &[FieldSpec] = &[
    long("kpis", "KPIs & Metrics"),
    long("controlProcess", "Control Process"),
    text("budget", "Budget"),
    long("contingency", "Contingency Plans"),
];

pub fn step_view(key: SectionKey) -> StepView {
    let (description, fields) = match key {
        SectionKey::SituationAnalysis => (
            "Analyze your internal strengths and weaknesses, external opportunities and threats, and your main competitors.",
            SITUATION_FIELDS,
        ),
        SectionKey::MarketsAndCustomers => (
            "Define your target markets and understand your ideal customers through personas.",
            MARKETS_FIELDS,
        ),
        SectionKey::Stp => ("Define how you'll approach the market.", STP_FIELDS),
        SectionKey::DirectionAndObjectives => (
            "Set your marketing mission, vision, and measurable objectives.",
            DIRECTION_FIELDS,
        ),
        SectionKey::StrategiesAndPrograms => (
            "Detail your marketing mix (the 4 Ps) and copywriting approach (AIDA).",
            STRATEGY_FIELDS,
        ),
        SectionKey::MetricsAndControl => (
            "Define how you'll measure success and stay on track.",
            METRICS_FIELDS,
        ),
    };
    StepView {
        step: key.index() + 1,
        key,
        title: key.title(),
        description,
        fields,
    }
}

/// All six views in wizard order.
pub fn steps() -> Vec<StepView> {
    SectionKey::ALL.into_iter().map(step_view).collect()
}
