use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::schema::Scope;

/// The full address of one stored value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Namespace tier.
    pub scope: Scope,
    /// Subject entity (character and relationship scopes).
    pub subject: Option<String>,
    /// Parameter name.
    pub param: String,
    /// Target entity (relationship scope only).
    pub target: Option<String>,
}

impl Coordinate {
    /// A global-scope coordinate.
    pub fn global(param: impl Into<String>) -> Self {
        Self::bare(Scope::Global, param)
    }

    /// A scene-scope coordinate.
    pub fn scene(param: impl Into<String>) -> Self {
        Self::bare(Scope::Scene, param)
    }

    /// A character-scope coordinate.
    pub fn character(subject: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            scope: Scope::Character,
            subject: Some(subject.into()),
            param: param.into(),
            target: None,
        }
    }

    /// A relationship-scope coordinate.
    pub fn relationship(
        subject: impl Into<String>,
        param: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            scope: Scope::Relationship,
            subject: Some(subject.into()),
            param: param.into(),
            target: Some(target.into()),
        }
    }

    fn bare(scope: Scope, param: impl Into<String>) -> Self {
        Self {
            scope,
            subject: None,
            param: param.into(),
            target: None,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.subject, &self.target) {
            (Some(subject), Some(target)) => write!(f, "{subject}.{}.{target}", self.param),
            (Some(subject), None) => write!(f, "{subject}.{}", self.param),
            _ => write!(f, "{}", self.param),
        }
    }
}

/// Scope-partitioned storage of dynamic parameter values.
///
/// Maps are ordered so that snapshots compare and serialize deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableStore {
    /// `param -> value`.
    #[serde(default)]
    pub global: BTreeMap<String, Value>,
    /// `param -> value`.
    #[serde(default)]
    pub scene: BTreeMap<String, Value>,
    /// `subject -> param -> value`.
    #[serde(default)]
    pub character: BTreeMap<String, BTreeMap<String, Value>>,
    /// `subject -> param -> target -> value`.
    #[serde(default)]
    pub relationship: BTreeMap<String, BTreeMap<String, BTreeMap<String, Value>>>,
}

impl VariableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value. `Ok(None)` means the coordinate has never been written.
    ///
    /// Fails when `subject`/`target` presence does not match `scope`.
    pub fn read(
        &self,
        scope: Scope,
        subject: Option<&str>,
        param: &str,
        target: Option<&str>,
    ) -> StoreResult<Option<&Value>> {
        check_coordinate(scope, subject, param, target)?;
        Ok(match (scope, subject, target) {
            (Scope::Global, ..) => self.global.get(param),
            (Scope::Scene, ..) => self.scene.get(param),
            (Scope::Character, Some(subject), _) => self
                .character
                .get(subject)
                .and_then(|params| params.get(param)),
            (Scope::Relationship, Some(subject), Some(target)) => self
                .relationship
                .get(subject)
                .and_then(|params| params.get(param))
                .and_then(|targets| targets.get(target)),
            _ => None,
        })
    }

    /// Write a value, creating intermediate maps as needed.
    ///
    /// Fails when `subject`/`target` presence does not match `scope`.
    pub fn write(
        &mut self,
        scope: Scope,
        subject: Option<&str>,
        param: &str,
        target: Option<&str>,
        value: Value,
    ) -> StoreResult<()> {
        check_coordinate(scope, subject, param, target)?;
        match (scope, subject, target) {
            (Scope::Global, ..) => {
                self.global.insert(param.to_string(), value);
            }
            (Scope::Scene, ..) => {
                self.scene.insert(param.to_string(), value);
            }
            (Scope::Character, Some(subject), _) => {
                self.character
                    .entry(subject.to_string())
                    .or_default()
                    .insert(param.to_string(), value);
            }
            (Scope::Relationship, Some(subject), Some(target)) => {
                self.relationship
                    .entry(subject.to_string())
                    .or_default()
                    .entry(param.to_string())
                    .or_default()
                    .insert(target.to_string(), value);
            }
            _ => {}
        }
        Ok(())
    }

    /// Read the value at a coordinate.
    pub fn read_at(&self, at: &Coordinate) -> StoreResult<Option<&Value>> {
        self.read(
            at.scope,
            at.subject.as_deref(),
            &at.param,
            at.target.as_deref(),
        )
    }

    /// Write the value at a coordinate.
    pub fn write_at(&mut self, at: &Coordinate, value: Value) -> StoreResult<()> {
        self.write(
            at.scope,
            at.subject.as_deref(),
            &at.param,
            at.target.as_deref(),
            value,
        )
    }

    /// Deep, independent copy of the store.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Number of stored values across every scope.
    pub fn len(&self) -> usize {
        self.global.len()
            + self.scene.len()
            + self.character.values().map(BTreeMap::len).sum::<usize>()
            + self
                .relationship
                .values()
                .flat_map(BTreeMap::values)
                .map(BTreeMap::len)
                .sum::<usize>()
    }

    /// Whether no value has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stored value with its coordinate, in deterministic order.
    pub fn entries(&self) -> Vec<(Coordinate, &Value)> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(
            self.global
                .iter()
                .map(|(p, v)| (Coordinate::global(p.as_str()), v)),
        );
        out.extend(
            self.scene
                .iter()
                .map(|(p, v)| (Coordinate::scene(p.as_str()), v)),
        );
        for (subject, params) in &self.character {
            for (param, value) in params {
                out.push((Coordinate::character(subject.as_str(), param.as_str()), value));
            }
        }
        for (subject, params) in &self.relationship {
            for (param, targets) in params {
                for (target, value) in targets {
                    out.push((
                        Coordinate::relationship(subject.as_str(), param.as_str(), target.as_str()),
                        value,
                    ));
                }
            }
        }
        out
    }
}

fn check_coordinate(
    scope: Scope,
    subject: Option<&str>,
    param: &str,
    target: Option<&str>,
) -> StoreResult<()> {
    match scope {
        Scope::Global | Scope::Scene => {
            if subject.is_some() {
                return Err(StoreError::UnexpectedSubject {
                    scope,
                    param: param.to_string(),
                });
            }
            if target.is_some() {
                return Err(StoreError::UnexpectedTarget {
                    scope,
                    param: param.to_string(),
                });
            }
        }
        Scope::Character => {
            if subject.is_none() {
                return Err(StoreError::MissingSubject {
                    scope,
                    param: param.to_string(),
                });
            }
            if target.is_some() {
                return Err(StoreError::UnexpectedTarget {
                    scope,
                    param: param.to_string(),
                });
            }
        }
        Scope::Relationship => {
            if subject.is_none() {
                return Err(StoreError::MissingSubject {
                    scope,
                    param: param.to_string(),
                });
            }
            if target.is_none() {
                return Err(StoreError::MissingTarget(param.to_string()));
            }
        }
    }
    Ok(())
}
