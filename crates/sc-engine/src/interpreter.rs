//! Typed value transitions for `set` commands.
//!
//! Every function here is pure: it takes the current value and returns the
//! next one, or `Ok(None)` when the command is a no-op.

use serde::Deserialize;
use serde_json::{Number, Value};

use sc_core::{ArrayConfig, ItemType, ParameterDefinition, ParameterKind};
use sc_dsl::MutationIntent;

use crate::config::DeltaLadder;
use crate::error::{MutationError, MutationResult};

/// Compute the next value for `intent` given the value currently stored.
pub fn mutate(
    intent: &MutationIntent,
    param: &ParameterDefinition,
    current: Option<&Value>,
    ladder: &DeltaLadder,
) -> MutationResult<Option<Value>> {
    let op = intent.operator.as_str();
    match &param.kind {
        ParameterKind::Number { min, max, .. } => {
            number(op, param, current, ladder, (*min, *max)).map(Some)
        }
        ParameterKind::Enum { values } => enumeration(op, param, current, values),
        ParameterKind::Boolean => boolean(op).map(Some),
        ParameterKind::Text { .. } => Ok(Some(Value::String(op.to_string()))),
        ParameterKind::Array { config } => array(intent, param, current, config),
    }
}

fn number(
    op: &str,
    param: &ParameterDefinition,
    current: Option<&Value>,
    ladder: &DeltaLadder,
    bounds: (Option<f64>, Option<f64>),
) -> MutationResult<Value> {
    let raw = if let Some(delta) = ladder.delta(op) {
        let base = current
            .and_then(Value::as_f64)
            .or_else(|| param.default.as_ref().and_then(Value::as_f64))
            .unwrap_or(0.0);
        base + delta
    } else {
        op.trim().parse::<f64>().map_err(|_| MutationError::UnknownOperator {
            op: op.to_string(),
            kind: param.kind.label(),
        })?
    };
    if !raw.is_finite() {
        return Err(MutationError::NotANumber(op.to_string()));
    }

    let (min, max) = bounds;
    let clamped = match (min, max) {
        (Some(lo), _) if raw < lo => lo,
        (_, Some(hi)) if raw > hi => hi,
        _ => raw,
    };
    number_value(clamped).ok_or_else(|| MutationError::NotANumber(op.to_string()))
}

/// Whole numbers become JSON integers, everything else a float.
pub fn number_value(n: f64) -> Option<Value> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT {
        Some(Value::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number)
    }
}

fn enumeration(
    op: &str,
    param: &ParameterDefinition,
    current: Option<&Value>,
    values: &[String],
) -> MutationResult<Option<Value>> {
    let position = |v: &Value| {
        v.as_str()
            .and_then(|s| values.iter().position(|candidate| candidate == s))
    };

    let step = match op {
        "next" => 1isize,
        "prev" => -1isize,
        literal => {
            let wanted = literal.trim();
            return values
                .iter()
                .find(|v| v.as_str() == wanted)
                .or_else(|| values.iter().find(|v| v.eq_ignore_ascii_case(wanted)))
                .map(|v| Some(Value::String(v.clone())))
                .ok_or_else(|| MutationError::NotInEnum(literal.to_string()));
        }
    };

    let from = current
        .and_then(position)
        .or_else(|| param.default.as_ref().and_then(position));
    let target = match from {
        Some(idx) => idx.saturating_add_signed(step).min(values.len().saturating_sub(1)),
        None if step > 0 => 0,
        None => return Ok(None),
    };
    Ok(values.get(target).map(|v| Value::String(v.clone())))
}

fn boolean(op: &str) -> MutationResult<Value> {
    match op.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(MutationError::NotABoolean(op.to_string())),
    }
}

fn array(
    intent: &MutationIntent,
    param: &ParameterDefinition,
    current: Option<&Value>,
    config: &ArrayConfig,
) -> MutationResult<Option<Value>> {
    let op = intent.operator.as_str();
    let mut items: Vec<Value> = current
        .or(param.default.as_ref())
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let value = || {
        intent
            .value_literal
            .as_deref()
            .ok_or_else(|| MutationError::MissingValue(op.to_string()))
    };

    match op {
        "add_item" => {
            items.push(decode_item(value()?, config.item_type)?);
            trim_front(&mut items, config.max_length);
        }
        "clear" => items.clear(),
        "set" => {
            let decoded = decode(value()?)?;
            let Value::Array(list) = decoded else {
                return Err(MutationError::NotAList);
            };
            if let Some(bad) = list.iter().find(|item| !config.item_type.accepts(item)) {
                return Err(MutationError::ItemType(bad.to_string(), config.item_type));
            }
            items = list;
            trim_front(&mut items, config.max_length);
        }
        "remove_where" => {
            let condition = Condition::decode(value()?)?;
            items.retain(|item| !condition.matches(item));
        }
        _ => {
            if let Some(raw) = op.strip_prefix("remove_at:") {
                let idx = parse_index(raw, op)?;
                if idx >= items.len() {
                    return Ok(None);
                }
                items.remove(idx);
            } else if let Some(raw) = op.strip_prefix("update_at:") {
                let idx = parse_index(raw, op)?;
                let item = decode_item(value()?, config.item_type)?;
                match items.get_mut(idx) {
                    Some(slot) => *slot = item,
                    None => return Ok(None),
                }
            } else {
                return Err(MutationError::UnknownOperator {
                    op: op.to_string(),
                    kind: param.kind.label(),
                });
            }
        }
    }

    Ok(Some(Value::Array(items)))
}

fn parse_index(raw: &str, op: &str) -> MutationResult<usize> {
    raw.trim()
        .parse()
        .map_err(|_| MutationError::BadIndex(op.to_string()))
}

fn trim_front(items: &mut Vec<Value>, max_length: Option<usize>) {
    if let Some(max) = max_length
        && items.len() > max
    {
        items.drain(..items.len() - max);
    }
}

fn decode(literal: &str) -> MutationResult<Value> {
    serde_json::from_str(literal).map_err(|e| MutationError::Decode {
        literal: literal.to_string(),
        reason: e.to_string(),
    })
}

/// Decode one array element. String items may be written without JSON quotes.
fn decode_item(literal: &str, item_type: ItemType) -> MutationResult<Value> {
    let item = if item_type == ItemType::String && !literal.trim_start().starts_with('"') {
        Value::String(literal.to_string())
    } else {
        decode(literal)?
    };
    if item_type.accepts(&item) {
        Ok(item)
    } else {
        Err(MutationError::ItemType(item.to_string(), item_type))
    }
}

/// Comparison operator of a `remove_where` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// Equal after numeric coercion.
    #[serde(alias = "==", alias = "eq")]
    Equals,
    /// Not equal after numeric coercion.
    #[serde(alias = "!=", alias = "ne")]
    NotEquals,
    /// Substring or membership.
    Contains,
    /// Negated `contains`.
    NotContains,
    /// Numerically greater.
    #[serde(alias = ">")]
    Gt,
    /// Numerically greater or equal.
    #[serde(alias = ">=")]
    Gte,
    /// Numerically less.
    #[serde(alias = "<")]
    Lt,
    /// Numerically less or equal.
    #[serde(alias = "<=")]
    Lte,
}

/// A decoded `remove_where` predicate: `{field?, op, value}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    /// Object property to compare; absent for primitive arrays.
    #[serde(default)]
    pub field: Option<String>,
    /// Comparison operator.
    pub op: CompareOp,
    /// Right-hand operand.
    pub value: Value,
}

impl Condition {
    /// Decode a condition from its JSON literal.
    pub fn decode(literal: &str) -> MutationResult<Self> {
        serde_json::from_str(literal).map_err(|e| MutationError::Decode {
            literal: literal.to_string(),
            reason: e.to_string(),
        })
    }

    /// Whether `item` satisfies the condition.
    ///
    /// An item without the selected field, or a primitive item when a field
    /// is given, never matches.
    pub fn matches(&self, item: &Value) -> bool {
        let subject = match &self.field {
            Some(field) => match item.as_object().and_then(|obj| obj.get(field)) {
                Some(v) => v,
                None => return false,
            },
            None => item,
        };
        let rhs = &self.value;
        match self.op {
            CompareOp::Equals => loose_eq(subject, rhs),
            CompareOp::NotEquals => !loose_eq(subject, rhs),
            CompareOp::Contains => contains(subject, rhs),
            CompareOp::NotContains => !contains(subject, rhs),
            CompareOp::Gt => ordered(subject, rhs, |a, b| a > b),
            CompareOp::Gte => ordered(subject, rhs, |a, b| a >= b),
            CompareOp::Lt => ordered(subject, rhs, |a, b| a < b),
            CompareOp::Lte => ordered(subject, rhs, |a, b| a <= b),
        }
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Equality with numeric strings read as numbers and `"true"`/`"false"`
/// read as booleans when the other side is a boolean.
fn loose_eq(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x == y;
    }
    if (a.is_boolean() || b.is_boolean())
        && let (Some(x), Some(y)) = (as_bool(a), as_bool(b))
    {
        return x == y;
    }
    a == b
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match (haystack, needle) {
        (Value::String(h), Value::String(n)) => h.contains(n.as_str()),
        (Value::Array(items), _) => items.iter().any(|item| loose_eq(item, needle)),
        _ => false,
    }
}

fn ordered(a: &Value, b: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => cmp(x, y),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::{Coordinate, Scope};
    use serde_json::json;

    fn intent(op: &str, value: Option<&str>) -> MutationIntent {
        MutationIntent {
            path: "x".into(),
            operator: op.into(),
            value_literal: value.map(str::to_string),
            note: None,
            coordinate: Coordinate::global("x"),
        }
    }

    fn run(param: &ParameterDefinition, current: Option<Value>, op: &str) -> MutationResult<Option<Value>> {
        mutate(&intent(op, None), param, current.as_ref(), &DeltaLadder::default())
    }

    fn run_with(
        param: &ParameterDefinition,
        current: Option<Value>,
        op: &str,
        value: &str,
    ) -> MutationResult<Option<Value>> {
        mutate(
            &intent(op, Some(value)),
            param,
            current.as_ref(),
            &DeltaLadder::default(),
        )
    }

    #[test]
    fn number_deltas_follow_the_ladder() {
        let favor = ParameterDefinition::number("favor", Scope::Global);
        assert_eq!(run(&favor, Some(json!(10)), "up_small").unwrap(), Some(json!(11)));
        assert_eq!(run(&favor, Some(json!(10)), "down_large").unwrap(), Some(json!(5)));
        assert_eq!(run(&favor, None, "up_medium").unwrap(), Some(json!(3)));
    }

    #[test]
    fn number_delta_from_missing_starts_at_default() {
        let favor = ParameterDefinition::number("favor", Scope::Global).with_default(json!(50));
        assert_eq!(run(&favor, None, "down_small").unwrap(), Some(json!(49)));
    }

    #[test]
    fn number_literal_sets_and_clamps_only_when_bounded() {
        let open = ParameterDefinition::number("favor", Scope::Global);
        assert_eq!(run(&open, None, "250").unwrap(), Some(json!(250)));
        assert_eq!(run(&open, None, "2.5").unwrap(), Some(json!(2.5)));

        let bounded = open.with_bounds(Some(-100.0), Some(100.0));
        assert_eq!(run(&bounded, None, "250").unwrap(), Some(json!(100)));
        assert_eq!(run(&bounded, Some(json!(-99)), "down_large").unwrap(), Some(json!(-100)));
    }

    #[test]
    fn number_rejects_garbage() {
        let favor = ParameterDefinition::number("favor", Scope::Global);
        assert!(matches!(
            run(&favor, None, "a lot"),
            Err(MutationError::UnknownOperator { .. })
        ));
        assert!(matches!(run(&favor, None, "inf"), Err(MutationError::NotANumber(_))));
    }

    #[test]
    fn enum_steps_clamp_at_ends() {
        let stage = ParameterDefinition::enumeration("stage", Scope::Global, ["a", "b", "c"]);
        assert_eq!(run(&stage, Some(json!("a")), "next").unwrap(), Some(json!("b")));
        assert_eq!(run(&stage, Some(json!("c")), "next").unwrap(), Some(json!("c")));
        assert_eq!(run(&stage, Some(json!("a")), "prev").unwrap(), Some(json!("a")));
        assert_eq!(run(&stage, Some(json!("b")), "prev").unwrap(), Some(json!("a")));
    }

    #[test]
    fn enum_step_from_missing_value() {
        let stage = ParameterDefinition::enumeration("stage", Scope::Global, ["a", "b", "c"]);
        assert_eq!(run(&stage, None, "next").unwrap(), Some(json!("a")));
        assert_eq!(run(&stage, None, "prev").unwrap(), None);

        let defaulted = stage.with_default(json!("b"));
        assert_eq!(run(&defaulted, None, "next").unwrap(), Some(json!("c")));
        assert_eq!(run(&defaulted, None, "prev").unwrap(), Some(json!("a")));
    }

    #[test]
    fn enum_literal_must_be_declared() {
        let stage = ParameterDefinition::enumeration("stage", Scope::Global, ["calm", "angry"]);
        assert_eq!(run(&stage, None, "Angry").unwrap(), Some(json!("angry")));
        assert!(matches!(run(&stage, None, "sad"), Err(MutationError::NotInEnum(_))));
    }

    #[test]
    fn enum_literal_prefers_exact_spelling() {
        let mood = ParameterDefinition::enumeration("mood", Scope::Global, ["Calm", "calm", "Tense"]);
        assert_eq!(run(&mood, None, "calm").unwrap(), Some(json!("calm")));
        assert_eq!(run(&mood, None, "Calm").unwrap(), Some(json!("Calm")));
        assert_eq!(run(&mood, None, "tense").unwrap(), Some(json!("Tense")));
    }

    #[test]
    fn remove_where_matches_boolean_items_written_as_strings() {
        let done = ParameterDefinition::array("done", Scope::Global, ItemType::Boolean);
        let current = json!([true, false, true]);
        assert_eq!(
            run_with(&done, Some(current.clone()), "remove_where", r#"{"op":"equals","value":"false"}"#)
                .unwrap(),
            Some(json!([true, true]))
        );
        assert_eq!(
            run_with(&done, Some(current.clone()), "remove_where", r#"{"op":"not_equals","value":"TRUE"}"#)
                .unwrap(),
            Some(json!([true, true]))
        );
        assert_eq!(
            run_with(&done, Some(current), "remove_where", r#"{"op":"equals","value":false}"#).unwrap(),
            Some(json!([true, true]))
        );
    }

    #[test]
    fn boolean_literals_are_case_insensitive() {
        let met = ParameterDefinition::boolean("met", Scope::Global);
        assert_eq!(run(&met, None, "TRUE").unwrap(), Some(json!(true)));
        assert_eq!(run(&met, None, "false").unwrap(), Some(json!(false)));
        assert!(matches!(run(&met, None, "yes"), Err(MutationError::NotABoolean(_))));
    }

    #[test]
    fn text_replaces_wholesale() {
        let weather = ParameterDefinition::text("weather", Scope::Global);
        assert_eq!(run(&weather, Some(json!("rain")), "").unwrap(), Some(json!("")));
        assert_eq!(run(&weather, Some(json!("rain")), "snow").unwrap(), Some(json!("snow")));
    }

    #[test]
    fn array_add_item_and_max_length() {
        let bag = ParameterDefinition::array("bag", Scope::Global, ItemType::String).with_max_length(2);
        let one = run_with(&bag, None, "add_item", "rope").unwrap();
        assert_eq!(one, Some(json!(["rope"])));
        let two = run_with(&bag, one, "add_item", "\"lamp\"").unwrap();
        let three = run_with(&bag, two, "add_item", "key").unwrap();
        assert_eq!(three, Some(json!(["lamp", "key"])));
    }

    #[test]
    fn array_items_must_match_item_type() {
        let scores = ParameterDefinition::array("scores", Scope::Global, ItemType::Number);
        assert!(matches!(
            run_with(&scores, None, "add_item", "\"high\""),
            Err(MutationError::ItemType(..))
        ));
        assert!(matches!(
            run_with(&scores, None, "add_item", "{oops"),
            Err(MutationError::Decode { .. })
        ));
    }

    #[test]
    fn array_index_operators() {
        let bag = ParameterDefinition::array("bag", Scope::Global, ItemType::String);
        let current = Some(json!(["a", "b", "c"]));
        assert_eq!(run(&bag, current.clone(), "remove_at:1").unwrap(), Some(json!(["a", "c"])));
        assert_eq!(run(&bag, current.clone(), "remove_at:9").unwrap(), None);
        assert_eq!(
            run_with(&bag, current.clone(), "update_at:0", "z").unwrap(),
            Some(json!(["z", "b", "c"]))
        );
        assert_eq!(run_with(&bag, current.clone(), "update_at:3", "z").unwrap(), None);
        assert!(matches!(run(&bag, current.clone(), "remove_at:x"), Err(MutationError::BadIndex(_))));
        assert_eq!(run(&bag, current, "clear").unwrap(), Some(json!([])));
    }

    #[test]
    fn array_set_requires_a_list() {
        let bag = ParameterDefinition::array("bag", Scope::Global, ItemType::Number).with_max_length(2);
        assert_eq!(run_with(&bag, None, "set", "[1, 2, 3]").unwrap(), Some(json!([2, 3])));
        assert_eq!(run_with(&bag, None, "set", "7"), Err(MutationError::NotAList));
        assert!(matches!(run(&bag, None, "set"), Err(MutationError::MissingValue(_))));
    }

    #[test]
    fn remove_where_on_objects() {
        let bag = ParameterDefinition::array("bag", Scope::Global, ItemType::Object);
        let current = Some(json!([
            {"name": "sword", "qty": 1},
            {"name": "arrow", "qty": "20"},
            {"name": "shield"},
            {"name": "arrowhead", "qty": 3}
        ]));
        assert_eq!(
            run_with(&bag, current.clone(), "remove_where", r#"{"field":"qty","op":">","value":2}"#).unwrap(),
            Some(json!([{"name": "sword", "qty": 1}, {"name": "shield"}]))
        );
        assert_eq!(
            run_with(&bag, current.clone(), "remove_where", r#"{"field":"name","op":"contains","value":"arrow"}"#)
                .unwrap(),
            Some(json!([{"name": "sword", "qty": 1}, {"name": "shield"}]))
        );
        // Missing field never matches, even for not_equals.
        assert_eq!(
            run_with(&bag, current, "remove_where", r#"{"field":"qty","op":"not_equals","value":1}"#).unwrap(),
            Some(json!([{"name": "sword", "qty": 1}, {"name": "shield"}]))
        );
    }

    #[test]
    fn remove_where_on_primitives() {
        let tags = ParameterDefinition::array("tags", Scope::Global, ItemType::String);
        let current = Some(json!(["rain", "night", "rainbow"]));
        assert_eq!(
            run_with(&tags, current.clone(), "remove_where", r#"{"op":"equals","value":"rain"}"#).unwrap(),
            Some(json!(["night", "rainbow"]))
        );
        assert_eq!(
            run_with(&tags, current.clone(), "remove_where", r#"{"op":"not_contains","value":"rain"}"#).unwrap(),
            Some(json!(["rain", "rainbow"]))
        );
        // A field on primitive elements never matches.
        assert_eq!(
            run_with(&tags, current.clone(), "remove_where", r#"{"field":"x","op":"!=","value":"y"}"#).unwrap(),
            current
        );
        assert!(matches!(
            run_with(&tags, None, "remove_where", r#"{"op":"like","value":"r"}"#),
            Err(MutationError::Decode { .. })
        ));
    }

    #[test]
    fn unknown_array_operator_rejected() {
        let bag = ParameterDefinition::array("bag", Scope::Global, ItemType::String);
        assert!(matches!(
            run(&bag, None, "shuffle"),
            Err(MutationError::UnknownOperator { kind: "array", .. })
        ));
    }

    #[test]
    fn number_value_prefers_integers() {
        assert_eq!(number_value(4.0), Some(json!(4)));
        assert_eq!(number_value(-0.5), Some(json!(-0.5)));
        assert_eq!(number_value(f64::NAN), None);
    }
}
