//! # Schema Compiler
//!
//! Authored JSON → [`LootSchema`]. Every error carries the asset name and the
//! JSON path of the offending value.
//!
//! ```json
//! {
//!   "type": "selection",
//!   "chance": 100,
//!   "count": {"min": 1, "max": 2},
//!   "components": [
//!     {"type": "item", "item": "gold", "count": 5, "limit": 1, "componentId": "gold"},
//!     {"type": "item", "item": "sword", "limit": 1, "componentTags": ["weapon"]}
//!   ]
//! }
//! ```

use std::collections::{BTreeSet, HashSet};

use hoard_core::Range;
use serde_json::{Map, Value};

use crate::condition::Condition;
use crate::error::{LootError, LootResult, Location};
use crate::schema::{
    ContentPreset, DrawLimit, DrawPolicy, LootSchema, NodeGate, NodeId, NodeKind, PoolChild,
    SchemaNode,
};
use crate::strict::parse_document;

/// Compiles a standalone node document.
///
/// # Errors
///
/// Returns the first syntax or authoring error found.
pub fn compile_str(asset: &str, text: &str) -> LootResult<LootSchema> {
    let document = parse_document(asset, text)?;
    compile_value(&Location::root(asset), &document)
}

/// Compiles an already-parsed node located at `at`.
///
/// # Errors
///
/// Returns the first authoring error found.
pub fn compile_value(at: &Location, value: &Value) -> LootResult<LootSchema> {
    let mut compiler = Compiler::default();
    compiler.node(at, value)?;

    let nodes = compiler
        .slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| LootError::MalformedTree {
            asset: at.asset.clone(),
            reason: "unfilled node slot".to_string(),
        })?;
    LootSchema::from_nodes(&at.asset, nodes)
}

#[derive(Default)]
struct Compiler {
    slots: Vec<Option<SchemaNode>>,
    component_ids: HashSet<String>,
}

impl Compiler {
    /// Pre-order: the parent's slot is reserved before any child is compiled,
    /// so children always receive larger ids.
    fn node(&mut self, at: &Location, value: &Value) -> LootResult<NodeId> {
        let object = as_object(at, value)?;
        let index = u32::try_from(self.slots.len()).map_err(|_| LootError::MalformedTree {
            asset: at.asset.clone(),
            reason: "too many nodes".to_string(),
        })?;
        let id = NodeId::new(index);
        self.slots.push(None);

        let gate = self.gate(at, object)?;

        let type_at = at.key("type");
        let node_type = object
            .get("type")
            .ok_or_else(|| LootError::MissingField {
                at: at.clone(),
                field: "type",
            })?
            .as_str()
            .ok_or_else(|| LootError::WrongType {
                at: type_at.clone(),
                expected: "string",
            })?;

        let kind = match node_type {
            "item" => NodeKind::Value {
                preset: ContentPreset::new(required_str(at, object, "item")?),
            },
            "collection" => self.pool(at, object, DrawPolicy::Collection)?,
            "selection" => self.pool(at, object, DrawPolicy::Selection)?,
            other => {
                return Err(LootError::UnknownNodeType {
                    at: type_at,
                    found: other.to_string(),
                })
            }
        };

        self.slots[id.index()] = Some(SchemaNode { gate, kind });
        Ok(id)
    }

    fn pool(
        &mut self,
        at: &Location,
        object: &Map<String, Value>,
        policy: DrawPolicy,
    ) -> LootResult<NodeKind> {
        let components_at = at.key("components");
        let components = object
            .get("components")
            .ok_or_else(|| LootError::MissingField {
                at: at.clone(),
                field: "components",
            })?
            .as_array()
            .ok_or_else(|| LootError::WrongType {
                at: components_at.clone(),
                expected: "array",
            })?;

        let mut children = Vec::with_capacity(components.len());
        for (i, component) in components.iter().enumerate() {
            let child_at = components_at.index(i);
            let limit = limit(&child_at, as_object(&child_at, component)?)?;
            let node = self.node(&child_at, component)?;
            children.push(PoolChild { node, limit });
        }

        Ok(NodeKind::Pool { policy, children })
    }

    fn gate(&mut self, at: &Location, object: &Map<String, Value>) -> LootResult<NodeGate> {
        let mut gate = NodeGate::default();

        if let Some(value) = present(object, "chance") {
            let chance_at = at.key("chance");
            let chance = value.as_f64().ok_or_else(|| LootError::WrongType {
                at: chance_at.clone(),
                expected: "number",
            })?;
            if !(chance > 0.0 && chance <= 100.0) {
                return Err(LootError::ChanceOutOfBounds {
                    at: chance_at,
                    value: chance,
                });
            }
            gate.chance = chance;
        }

        if let Some(value) = present(object, "count") {
            gate.count = count(&at.key("count"), value)?;
        }

        if let Some(value) = present(object, "conditions") {
            gate.conditions = conditions(&at.key("conditions"), value)?;
        }

        if let Some(value) = present(object, "componentId") {
            let id_at = at.key("componentId");
            let id = value.as_str().ok_or_else(|| LootError::WrongType {
                at: id_at.clone(),
                expected: "string",
            })?;
            if !self.component_ids.insert(id.to_string()) {
                return Err(LootError::DuplicateComponentId {
                    at: id_at,
                    id: id.to_string(),
                });
            }
            gate.component_id = Some(id.to_string());
        }

        if let Some(value) = present(object, "componentTags") {
            gate.component_tags = string_list(&at.key("componentTags"), value)?
                .into_iter()
                .collect::<BTreeSet<_>>();
        }

        Ok(gate)
    }
}

/// A field that is present and not `null`.
pub(crate) fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

pub(crate) fn as_object<'a>(
    at: &Location,
    value: &'a Value,
) -> LootResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| LootError::WrongType {
        at: at.clone(),
        expected: "object",
    })
}

fn required_str<'a>(
    at: &Location,
    object: &'a Map<String, Value>,
    field: &'static str,
) -> LootResult<&'a str> {
    present(object, field)
        .ok_or_else(|| LootError::MissingField {
            at: at.clone(),
            field,
        })?
        .as_str()
        .ok_or_else(|| LootError::WrongType {
            at: at.key(field),
            expected: "string",
        })
}

fn count_bound(at: &Location, value: &Value) -> LootResult<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| LootError::InvalidCount { at: at.clone() })
}

/// `5` or `{"min": 1, "max": 3}`.
fn count(at: &Location, value: &Value) -> LootResult<Range> {
    match value {
        Value::Number(_) => count_bound(at, value).map(Range::fixed),
        Value::Object(object) => {
            let bound = |field: &'static str| -> LootResult<u32> {
                let value = object.get(field).ok_or_else(|| LootError::MissingField {
                    at: at.clone(),
                    field,
                })?;
                count_bound(&at.key(field), value)
            };
            let (min, max) = (bound("min")?, bound("max")?);
            Range::new(min, max).ok_or_else(|| LootError::InvertedRange {
                at: at.clone(),
                min,
                max,
            })
        }
        _ => Err(LootError::WrongType {
            at: at.clone(),
            expected: "integer or {\"min\", \"max\"} object",
        }),
    }
}

/// A single predicate string or an array of them.
fn conditions(at: &Location, value: &Value) -> LootResult<Vec<Condition>> {
    if let Some(single) = value.as_str() {
        return Ok(vec![Condition::new(single)]);
    }
    Ok(string_list(at, value)?
        .into_iter()
        .map(Condition::new)
        .collect())
}

pub(crate) fn string_list(at: &Location, value: &Value) -> LootResult<Vec<String>> {
    let items = value.as_array().ok_or_else(|| LootError::WrongType {
        at: at.clone(),
        expected: "array of strings",
    })?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| LootError::WrongType {
                    at: at.index(i),
                    expected: "string",
                })
        })
        .collect()
}

fn limit(at: &Location, object: &Map<String, Value>) -> LootResult<DrawLimit> {
    let Some(value) = present(object, "limit") else {
        return Ok(DrawLimit::Unlimited);
    };
    let limit_at = at.key("limit");
    let authored = value.as_i64().ok_or_else(|| LootError::WrongType {
        at: limit_at.clone(),
        expected: "integer",
    })?;
    DrawLimit::from_authored(authored).ok_or(LootError::InvalidLimit {
        at: limit_at,
        value: authored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLD_OR_SWORD: &str = r#"{
        "type": "selection",
        "components": [
            {"type": "item", "item": "gold", "count": 5, "limit": 1, "componentId": "gold"},
            {"type": "item", "item": "sword", "limit": 1, "componentTags": ["weapon"],
             "conditions": "level >= 2"}
        ]
    }"#;

    fn error_of(text: &str) -> LootError {
        compile_str("chest.json", text).unwrap_err()
    }

    #[test]
    fn test_compiles_gold_or_sword() {
        let schema = compile_str("chest.json", GOLD_OR_SWORD).unwrap();
        assert_eq!(schema.len(), 3);

        let root = schema.node(schema.root());
        assert_eq!(root.gate.chance, 100.0);
        assert_eq!(root.gate.count, Range::fixed(1));
        let NodeKind::Pool { policy, children } = &root.kind else {
            panic!("root should be a pool");
        };
        assert_eq!(*policy, DrawPolicy::Selection);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].limit, DrawLimit::Limited(1));

        let gold = schema.node(children[0].node);
        assert_eq!(gold.gate.count, Range::fixed(5));
        assert_eq!(gold.gate.component_id.as_deref(), Some("gold"));

        let sword = schema.node(children[1].node);
        assert!(sword.gate.component_tags.contains("weapon"));
        assert_eq!(sword.gate.conditions, vec![Condition::new("level >= 2")]);
    }

    #[test]
    fn test_count_range_forms() {
        let schema =
            compile_str("t", r#"{"type": "item", "item": "coin", "count": {"min": 0, "max": 3}}"#)
                .unwrap();
        assert_eq!(schema.node(schema.root()).gate.count, Range::new(0, 3).unwrap());

        let err = error_of(r#"{"type": "item", "item": "coin", "count": {"min": 4, "max": 3}}"#);
        assert!(matches!(err, LootError::InvertedRange { min: 4, max: 3, .. }));

        let err = error_of(r#"{"type": "item", "item": "coin", "count": -1}"#);
        assert!(matches!(err, LootError::InvalidCount { .. }));

        let err = error_of(r#"{"type": "item", "item": "coin", "count": 1.5}"#);
        assert!(matches!(err, LootError::InvalidCount { .. }));

        let err = error_of(r#"{"type": "item", "item": "coin", "count": {"min": 1}}"#);
        assert!(matches!(err, LootError::MissingField { field: "max", .. }));
    }

    #[test]
    fn test_chance_bounds() {
        for bad in ["0", "-5", "100.5", "150"] {
            let text = format!(r#"{{"type": "item", "item": "coin", "chance": {bad}}}"#);
            let err = error_of(&text);
            let LootError::ChanceOutOfBounds { at, .. } = err else {
                panic!("expected chance error for {bad}");
            };
            assert_eq!(at.path, "$.chance");
        }
        assert!(compile_str("t", r#"{"type": "item", "item": "coin", "chance": 0.01}"#).is_ok());
        assert!(compile_str("t", r#"{"type": "item", "item": "coin", "chance": 100}"#).is_ok());
    }

    #[test]
    fn test_limit_validation() {
        let err = error_of(
            r#"{"type": "collection", "components": [{"type": "item", "item": "a", "limit": 0}]}"#,
        );
        let LootError::InvalidLimit { at, value } = err else {
            panic!("expected limit error");
        };
        assert_eq!(at.path, "$.components[0].limit");
        assert_eq!(value, 0);

        let schema = compile_str(
            "t",
            r#"{"type": "collection", "components": [{"type": "item", "item": "a", "limit": -1}]}"#,
        )
        .unwrap();
        let NodeKind::Pool { children, .. } = &schema.node(schema.root()).kind else {
            panic!("root should be a pool");
        };
        assert_eq!(children[0].limit, DrawLimit::Unlimited);
    }

    #[test]
    fn test_unknown_type_and_missing_fields() {
        let err = error_of(r#"{"type": "table"}"#);
        assert!(matches!(err, LootError::UnknownNodeType { ref found, .. } if found == "table"));

        let err = error_of(r#"{"item": "coin"}"#);
        assert!(matches!(err, LootError::MissingField { field: "type", .. }));

        let err = error_of(r#"{"type": "item"}"#);
        assert!(matches!(err, LootError::MissingField { field: "item", .. }));

        let err = error_of(r#"{"type": "selection"}"#);
        assert!(matches!(err, LootError::MissingField { field: "components", .. }));

        let err = error_of(r#"{"type": "selection", "components": {}}"#);
        assert!(matches!(err, LootError::WrongType { expected: "array", .. }));
    }

    #[test]
    fn test_duplicate_component_id_anywhere_in_tree() {
        let err = error_of(
            r#"{"type": "collection", "componentId": "root", "components": [
                {"type": "selection", "components": [
                    {"type": "item", "item": "a", "componentId": "root"}
                ]}
            ]}"#,
        );
        let LootError::DuplicateComponentId { at, id } = err else {
            panic!("expected duplicate id");
        };
        assert_eq!(id, "root");
        assert_eq!(at.path, "$.components[0].components[0].componentId");
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = error_of(r#"{"type": "item", "item": "a", "item": "b"}"#);
        assert!(matches!(err, LootError::Syntax { .. }));
    }

    #[test]
    fn test_wrong_types_report_path() {
        let err = error_of(
            r#"{"type": "collection", "components": [{"type": "item", "item": "a", "componentTags": ["x", 3]}]}"#,
        );
        let LootError::WrongType { at, expected } = err else {
            panic!("expected type error");
        };
        assert_eq!(at.path, "$.components[0].componentTags[1]");
        assert_eq!(expected, "string");
    }

    #[test]
    fn test_children_after_parents() {
        let schema = compile_str(
            "t",
            r#"{"type": "collection", "components": [
                {"type": "selection", "components": [
                    {"type": "item", "item": "a"},
                    {"type": "item", "item": "b"}
                ]},
                {"type": "item", "item": "c"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(schema.len(), 5);
        let presets: Vec<&str> = schema
            .referenced_presets()
            .into_iter()
            .map(ContentPreset::as_str)
            .collect();
        assert_eq!(presets, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_null_fields_take_defaults() {
        let schema = compile_str(
            "t",
            r#"{"type": "item", "item": "a", "chance": null, "conditions": null, "componentTags": null}"#,
        )
        .unwrap();
        let root = schema.node(schema.root());
        assert_eq!(root.gate, NodeGate::default());
    }
}
