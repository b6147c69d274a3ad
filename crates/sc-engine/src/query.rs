use serde::Serialize;

use sc_core::{
    CharacterCast, EngineState, LocationCast, ParameterKind, Phase, SceneMeta, Schema, Value,
};

use crate::error::{EngineError, EngineResult};

/// Read a parameter's value from a state, looking the parameter up by name or id.
///
/// `Ok(None)` means the value was never set. An unknown parameter or a
/// subject/target that does not fit the parameter's scope is an error.
pub fn parameter_value<'s>(
    state: &'s EngineState,
    schema: &Schema,
    name: &str,
    subject: Option<&str>,
    target: Option<&str>,
) -> EngineResult<Option<&'s Value>> {
    let param = schema
        .parameter(name)
        .ok_or_else(|| EngineError::UnknownParameter(name.to_string()))?;
    Ok(state
        .variables
        .read(param.scope, subject, &param.name, target)?)
}

/// The descriptive phase band a numeric parameter currently sits in.
pub fn current_phase<'a>(
    state: &EngineState,
    schema: &'a Schema,
    name: &str,
    subject: Option<&str>,
    target: Option<&str>,
) -> EngineResult<Option<&'a Phase>> {
    let value = parameter_value(state, schema, name, subject, target)?.and_then(Value::as_f64);
    let phases = match schema.parameter(name).map(|p| &p.kind) {
        Some(ParameterKind::Number { phases, .. }) => phases,
        _ => return Ok(None),
    };
    Ok(value.and_then(|v| phases.iter().find(|phase| phase.contains(v))))
}

/// Scene metadata plus both casts, borrowed from a state.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneInfo<'s> {
    /// Location hint and tags.
    pub scene: &'s SceneMeta,
    /// Character tiers.
    pub cast: &'s CharacterCast,
    /// Current and candidate locations.
    pub location_cast: &'s LocationCast,
}

/// Borrow the scene-level view of a state.
pub fn scene_info(state: &EngineState) -> SceneInfo<'_> {
    SceneInfo {
        scene: &state.scene,
        cast: &state.cast,
        location_cast: &state.location_cast,
    }
}
