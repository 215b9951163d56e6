//! JSON Schemas constraining model output.

use std::sync::LazyLock;

use jsonschema::{Draft, Validator};
use serde_json::Value;

const COPY_OUTPUT_SCHEMA: &str = include_str!("../../schemas/copy_output.schema.json");
const PLAN_SUGGESTIONS_OUTPUT_SCHEMA: &str =
    include_str!("../../schemas/plan_suggestions_output.schema.json");
const SECTION_SUGGESTION_OUTPUT_SCHEMA: &str =
    include_str!("../../schemas/section_suggestion_output.schema.json");

type Compiled = Result<Validator, String>;

/// A named output schema shipped with the crate.
#[derive(Debug, Clone, Copy)]
pub struct OutputSchema {
    /// Use-case name, also sent to the model as the schema name.
    pub name: &'static str,
    raw: &'static str,
    compiled: fn() -> &'static Compiled,
}

pub const COPY_OUTPUT: OutputSchema = OutputSchema {
    name: "marketing_copy",
    raw: COPY_OUTPUT_SCHEMA,
    compiled: || {
        static COMPILED: LazyLock<Compiled> =
            LazyLock::new(|| compile("marketing_copy", COPY_OUTPUT_SCHEMA));
        LazyLock::force(&COMPILED)
    },
};

pub const PLAN_SUGGESTIONS_OUTPUT: OutputSchema = OutputSchema {
    name: "marketing_plan_suggestions",
    raw: PLAN_SUGGESTIONS_OUTPUT_SCHEMA,
    compiled: || {
        static COMPILED: LazyLock<Compiled> = LazyLock::new(|| {
            compile("marketing_plan_suggestions", PLAN_SUGGESTIONS_OUTPUT_SCHEMA)
        });
        LazyLock::force(&COMPILED)
    },
};

pub const SECTION_SUGGESTION_OUTPUT: OutputSchema = OutputSchema {
    name: "section_suggestion",
    raw: SECTION_SUGGESTION_OUTPUT_SCHEMA,
    compiled: || {
        static COMPILED: LazyLock<Compiled> =
            LazyLock::new(|| compile("section_suggestion", SECTION_SUGGESTION_OUTPUT_SCHEMA));
        LazyLock::force(&COMPILED)
    },
};

/// Compile a Draft 2020-12 schema document.
pub fn compile_schema(schema: &Value) -> Result<Validator, String> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|err| err.to_string())
}

fn parse(name: &str, raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|err| format!("parse {name} schema: {err}"))
}

fn compile(name: &str, raw: &str) -> Compiled {
    let value = parse(name, raw)?;
    compile_schema(&value).map_err(|err| format!("compile {name} schema: {err}"))
}

impl OutputSchema {
    /// Parsed schema document.
    pub fn value(&self) -> Result<Value, String> {
        parse(self.name, self.raw)
    }

    /// Validate `instance`, returning every violation message.
    ///
    /// The schema is compiled on first use and reused afterwards.
    pub fn check(&self, instance: &Value) -> Result<(), Vec<String>> {
        let compiled = (self.compiled)().as_ref().map_err(|err| vec![err.clone()])?;
        let messages: Vec<String> = compiled
            .iter_errors(instance)
            .map(|err| err.to_string())
            .collect();
        if messages.is_empty() {
            Ok(())
        } else {
            Err(messages)
        }
    }
}
