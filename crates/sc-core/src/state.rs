use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cast::{CastTier, CharacterCast, LocationCast};
use crate::schema::{EntityKind, Schema, Scope};
use crate::store::VariableStore;

/// Scene-level metadata written by `scene(...)` commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMeta {
    /// Free-text hint about where the scene takes place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_hint: Option<String>,
    /// Ordered, duplicate-free scene tags.
    #[serde(default)]
    pub scene_tags: Vec<String>,
}

/// Per-entity runtime data that is not a parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRuntime {
    /// Free-text note, replaced wholesale by `note(...)` commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The dynamic state of a conversation at one history index.
///
/// A value of this type is never mutated once published: every transition
/// clones it and returns the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    /// Parameter values, partitioned by scope.
    pub variables: VariableStore,
    /// Character cast tiers.
    pub cast: CharacterCast,
    /// Current and candidate locations.
    pub location_cast: LocationCast,
    /// Scene metadata.
    pub scene: SceneMeta,
    /// Runtime data keyed by entity name.
    #[serde(default)]
    pub entities_runtime: BTreeMap<String, EntityRuntime>,
}

impl EngineState {
    /// The turn-0 state for a schema: declared defaults seeded, casts empty.
    ///
    /// Global and scene defaults are stored once. Character defaults are
    /// stored for each character entity that binds the parameter.
    /// Relationship parameters start unset.
    pub fn initial(schema: &Schema) -> Self {
        let mut state = Self::default();
        for param in schema.parameters() {
            let Some(default) = &param.default else {
                continue;
            };
            match param.scope {
                Scope::Global => {
                    state
                        .variables
                        .global
                        .insert(param.name.clone(), default.clone());
                }
                Scope::Scene => {
                    state
                        .variables
                        .scene
                        .insert(param.name.clone(), default.clone());
                }
                Scope::Character => {
                    for entity in schema
                        .bound_entities(param)
                        .filter(|e| e.kind == EntityKind::Character)
                    {
                        state
                            .variables
                            .character
                            .entry(entity.name.clone())
                            .or_default()
                            .insert(param.name.clone(), default.clone());
                    }
                }
                Scope::Relationship => {}
            }
        }
        state
    }

    /// Multi-line human-readable rendering, stable across runs.
    pub fn summary(&self) -> String {
        let mut out = String::new();

        out.push_str("variables:\n");
        let entries = self.variables.entries();
        if entries.is_empty() {
            out.push_str("  (none)\n");
        }
        for (at, value) in entries {
            out.push_str(&format!("  {} {at} = {value}\n", at.scope));
        }

        out.push_str("cast:\n");
        for tier in CastTier::ALL {
            out.push_str(&format!(
                "  {tier}: {}\n",
                join_or_dash(self.cast.members(tier))
            ));
        }

        out.push_str("location:\n");
        out.push_str(&format!(
            "  current: {}\n",
            self.location_cast.current().unwrap_or("-")
        ));
        out.push_str(&format!(
            "  candidate: {}\n",
            join_or_dash(self.location_cast.candidates())
        ));

        out.push_str("scene:\n");
        out.push_str(&format!(
            "  locationHint: {}\n",
            self.scene.location_hint.as_deref().unwrap_or("-")
        ));
        out.push_str(&format!(
            "  sceneTags: {}\n",
            join_or_dash(&self.scene.scene_tags)
        ));

        let notes: Vec<_> = self
            .entities_runtime
            .iter()
            .filter_map(|(name, rt)| rt.note.as_deref().map(|n| (name, n)))
            .collect();
        if !notes.is_empty() {
            out.push_str("notes:\n");
            for (name, note) in notes {
                out.push_str(&format!("  {name}: {note}\n"));
            }
        }

        out
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
