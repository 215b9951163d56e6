//! Pure field-level edits addressed by section key and field path.
//!
//! Field paths are dot-separated camelCase names with numeric list indices,
//! e.g. `mission`, `swot.strengths`, `competitors.0.name`. Every edit returns
//! a new plan; the input plan is never touched.

use serde_json::{Map, Value};

use crate::core::plan::MarketingPlan;
use crate::core::section::{PlanSection, get_section, with_section};
use crate::core::types::{PlanError, SectionKey};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Field(&'a str),
    Index(usize),
}

fn parse_path(section: SectionKey, path: &str) -> Result<Vec<Segment<'_>>, PlanError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(PlanError::UnknownField {
            section,
            path: path.to_string(),
        });
    }
    trimmed
        .split('.')
        .map(|raw| {
            if raw.is_empty() {
                return Err(PlanError::UnknownField {
                    section,
                    path: path.to_string(),
                });
            }
            Ok(match raw.parse::<usize>() {
                Ok(index) => Segment::Index(index),
                Err(_) => Segment::Field(raw),
            })
        })
        .collect()
}

fn resolve_mut<'v>(
    root: &'v mut Value,
    segments: &[Segment<'_>],
    section: SectionKey,
    path: &str,
) -> Result<&'v mut Value, PlanError> {
    let mut current = root;
    for segment in segments {
        current = match (segment, current) {
            (Segment::Field(name), Value::Object(map)) => {
                map.get_mut(*name).ok_or_else(|| PlanError::UnknownField {
                    section,
                    path: path.to_string(),
                })?
            }
            (Segment::Index(index), Value::Array(items)) => {
                let len = items.len();
                items
                    .get_mut(*index)
                    .ok_or_else(|| PlanError::IndexOutOfRange {
                        path: path.to_string(),
                        index: *index,
                        len,
                    })?
            }
            _ => {
                return Err(PlanError::UnknownField {
                    section,
                    path: path.to_string(),
                });
            }
        };
    }
    Ok(current)
}

fn section_value(plan: &MarketingPlan, key: SectionKey, path: &str) -> Result<Value, PlanError> {
    get_section(plan, key)
        .to_value()
        .map_err(|err| PlanError::InvalidValue {
            path: path.to_string(),
            reason: err.to_string(),
        })
}

/// Serialize the section, let `edit` change it, then parse it back.
///
/// Parsing back through the typed section is what rejects values of the
/// wrong shape (e.g. a number inside a competitor entry).
fn edit_section<F>(
    plan: &MarketingPlan,
    key: SectionKey,
    path: &str,
    edit: F,
) -> Result<MarketingPlan, PlanError>
where
    F: FnOnce(&mut Value) -> Result<(), PlanError>,
{
    let mut value = section_value(plan, key, path)?;
    edit(&mut value)?;
    let section = PlanSection::from_value(key, value).map_err(|err| PlanError::InvalidValue {
        path: path.to_string(),
        reason: err.to_string(),
    })?;
    Ok(with_section(plan, section))
}

/// Whether `value` may replace `slot` without changing its JSON kind.
///
/// `null` and string slots are interchangeable; the typed parse decides
/// whether the field may be unset (only `direction` can).
fn same_kind(slot: &Value, value: &Value) -> bool {
    matches!(
        (slot, value),
        (Value::String(_) | Value::Null, Value::String(_) | Value::Null)
            | (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_))
    )
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Read the value at `field_path`.
pub fn read_field(
    plan: &MarketingPlan,
    key: SectionKey,
    field_path: &str,
) -> Result<Value, PlanError> {
    let segments = parse_path(key, field_path)?;
    let mut value = section_value(plan, key, field_path)?;
    let slot = resolve_mut(&mut value, &segments, key, field_path)?;
    Ok(slot.take())
}

/// Return a new plan with exactly the addressed field replaced by `value`.
pub fn update_field(
    plan: &MarketingPlan,
    key: SectionKey,
    field_path: &str,
    value: Value,
) -> Result<MarketingPlan, PlanError> {
    let segments = parse_path(key, field_path)?;
    edit_section(plan, key, field_path, |section| {
        let slot = resolve_mut(section, &segments, key, field_path)?;
        if !same_kind(slot, &value) {
            return Err(PlanError::InvalidValue {
                path: field_path.to_string(),
                reason: format!(
                    "expected {}, got {}",
                    kind_name(slot),
                    kind_name(&value)
                ),
            });
        }
        *slot = value;
        Ok(())
    })
}

/// Return a new plan with an empty entry appended to the list at `list_path`.
pub fn append_item(
    plan: &MarketingPlan,
    key: SectionKey,
    list_path: &str,
) -> Result<MarketingPlan, PlanError> {
    let segments = parse_path(key, list_path)?;
    edit_section(plan, key, list_path, |section| {
        match resolve_mut(section, &segments, key, list_path)? {
            // Entry structs default every missing field.
            Value::Array(items) => {
                items.push(Value::Object(Map::new()));
                Ok(())
            }
            _ => Err(PlanError::NotAList {
                path: list_path.to_string(),
            }),
        }
    })
}

/// Return a new plan with entry `index` removed from the list at `list_path`.
pub fn remove_item(
    plan: &MarketingPlan,
    key: SectionKey,
    list_path: &str,
    index: usize,
) -> Result<MarketingPlan, PlanError> {
    let segments = parse_path(key, list_path)?;
    edit_section(plan, key, list_path, |section| {
        match resolve_mut(section, &segments, key, list_path)? {
            Value::Array(items) if index < items.len() => {
                items.remove(index);
                Ok(())
            }
            Value::Array(items) => Err(PlanError::IndexOutOfRange {
                path: list_path.to_string(),
                index,
                len: items.len(),
            }),
            _ => Err(PlanError::NotAList {
                path: list_path.to_string(),
            }),
        }
    })
}
