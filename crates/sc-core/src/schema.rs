use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};

/// Name of the implicit player entity.
///
/// The player never needs a declaration: it may be a subject, a relationship
/// target, or a cast member in any configuration.
pub const PLAYER_ENTITY: &str = "{{user}}";

/// The namespace tier a parameter's values live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// One value for the whole narrative.
    Global,
    /// One value for the current scene.
    Scene,
    /// One value per subject entity.
    #[default]
    Character,
    /// One value per (subject, target) entity pair.
    Relationship,
}

impl Scope {
    /// Number of dot-separated segments a command path uses for this scope.
    pub fn path_segments(self) -> usize {
        match self {
            Self::Global | Self::Scene => 1,
            Self::Character => 2,
            Self::Relationship => 3,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Scene => write!(f, "scene"),
            Self::Character => write!(f, "character"),
            Self::Relationship => write!(f, "relationship"),
        }
    }
}

/// A named band of a numeric parameter, used when describing it in prompts.
///
/// Phases are descriptive only; values are never forced into a band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Display name of the band.
    pub name: String,
    /// Inclusive `[low, high]` range, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl Phase {
    /// Whether `value` falls inside this band.
    pub fn contains(&self, value: f64) -> bool {
        self.range
            .is_some_and(|[low, high]| value >= low && value <= high)
    }
}

/// Element type of an array parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// JSON strings.
    #[default]
    String,
    /// JSON numbers.
    Number,
    /// JSON booleans.
    Boolean,
    /// JSON objects.
    Object,
}

impl ItemType {
    /// Whether a decoded JSON value is a valid element of this type.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Object => write!(f, "object"),
        }
    }
}

/// Array element configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArrayConfig {
    /// Type every element must decode to.
    pub item_type: ItemType,
    /// Maximum number of elements; the oldest are dropped beyond it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// Value type of a parameter together with its type-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParameterKind {
    /// A number moved by symbolic deltas or set directly.
    Number {
        /// Optional lower bound; results are clamped to it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Optional upper bound; results are clamped to it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        /// Descriptive bands.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        phases: Vec<Phase>,
    },
    /// One value out of a declared ordered list.
    Enum {
        /// The ordered list of allowed values.
        #[serde(rename = "enumValues", default)]
        values: Vec<String>,
    },
    /// `true` or `false`.
    Boolean,
    /// Free text, always replaced wholesale.
    Text {
        /// Format hint shown to the generator.
        #[serde(rename = "textHint", default, skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },
    /// A list of typed elements edited with array operators.
    Array {
        /// Element configuration.
        #[serde(rename = "arrayConfig", default)]
        config: ArrayConfig,
    },
}

impl ParameterKind {
    /// Short type label (`number`, `enum`, ...).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::Enum { .. } => "enum",
            Self::Boolean => "boolean",
            Self::Text { .. } => "text",
            Self::Array { .. } => "array",
        }
    }

    /// Whether `value` is a well-typed value for this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Number { .. } => value.is_number(),
            Self::Enum { values } => value
                .as_str()
                .is_some_and(|s| values.iter().any(|v| v == s)),
            Self::Boolean => value.is_boolean(),
            Self::Text { .. } => value.is_string(),
            Self::Array { config } => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| config.item_type.accepts(item))),
        }
    }
}

/// A static, author-supplied parameter definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Unique name within the card configuration.
    pub name: String,
    /// Stable alias accepted wherever the name is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Namespace tier of the parameter's values.
    #[serde(default)]
    pub scope: Scope,
    /// Value type and its configuration.
    #[serde(flatten)]
    pub kind: ParameterKind,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Value seeded into the initial state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParameterDefinition {
    /// Create a definition with the given kind and no id, description or default.
    pub fn new(name: impl Into<String>, scope: Scope, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            id: None,
            scope,
            kind,
            description: String::new(),
            default: None,
        }
    }

    /// Unbounded number parameter.
    pub fn number(name: impl Into<String>, scope: Scope) -> Self {
        Self::new(
            name,
            scope,
            ParameterKind::Number {
                min: None,
                max: None,
                phases: Vec::new(),
            },
        )
    }

    /// Enum parameter over `values`, in order.
    pub fn enumeration<I, S>(name: impl Into<String>, scope: Scope, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            scope,
            ParameterKind::Enum {
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Boolean parameter.
    pub fn boolean(name: impl Into<String>, scope: Scope) -> Self {
        Self::new(name, scope, ParameterKind::Boolean)
    }

    /// Text parameter.
    pub fn text(name: impl Into<String>, scope: Scope) -> Self {
        Self::new(name, scope, ParameterKind::Text { hint: None })
    }

    /// Array parameter with the given element type.
    pub fn array(name: impl Into<String>, scope: Scope, item_type: ItemType) -> Self {
        Self::new(
            name,
            scope,
            ParameterKind::Array {
                config: ArrayConfig {
                    item_type,
                    max_length: None,
                },
            },
        )
    }

    /// Set the stable id alias.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the initial value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Set numeric bounds. No effect on non-number parameters.
    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        if let ParameterKind::Number { min, max, .. } = &mut self.kind {
            *min = lower;
            *max = upper;
        }
        self
    }

    /// Set the maximum array length. No effect on non-array parameters.
    pub fn with_max_length(mut self, max: usize) -> Self {
        if let ParameterKind::Array { config } = &mut self.kind {
            config.max_length = Some(max);
        }
        self
    }

    /// Whether `key` is this parameter's name or id.
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.id.as_deref() == Some(key)
    }
}

/// The kind of a declared entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A person or creature; may join character cast tiers.
    Character,
    /// A place; may occupy location cast tiers.
    Location,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character => write!(f, "character"),
            Self::Location => write!(f, "location"),
        }
    }
}

/// A static, author-supplied entity definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDefinition {
    /// Unique entity name.
    pub name: String,
    /// Character or location.
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Parameters bound to this entity; used to seed initial values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter_names: Vec<String>,
    /// For locations, the name of the enclosing location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_location: Option<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl EntityDefinition {
    /// A character entity.
    pub fn character(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Character)
    }

    /// A top-level location entity.
    pub fn location(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Location)
    }

    fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parameter_names: Vec::new(),
            parent_location: None,
            description: String::new(),
        }
    }

    /// Bind parameters to this entity.
    pub fn with_parameters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Nest this location under `parent`.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_location = Some(parent.into());
        self
    }
}

/// Ceilings for the three character tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterCastLimits {
    /// Maximum size of the focus tier.
    pub max_focus: usize,
    /// Maximum size of the present-supporting tier.
    pub max_present_supporting: usize,
    /// Maximum size of the offstage-related tier.
    pub max_offstage_related: usize,
}

impl Default for CharacterCastLimits {
    fn default() -> Self {
        Self {
            max_focus: 3,
            max_present_supporting: 5,
            max_offstage_related: 10,
        }
    }
}

/// Ceiling for the location candidate tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationCastLimits {
    /// Maximum number of candidate locations.
    pub max_candidate: usize,
}

impl Default for LocationCastLimits {
    fn default() -> Self {
        Self { max_candidate: 10 }
    }
}

/// Cast ceiling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CastConfig {
    /// Character tier ceilings.
    pub character_cast: CharacterCastLimits,
    /// Location tier ceilings.
    pub location_cast: LocationCastLimits,
}

impl CastConfig {
    /// Set the focus tier ceiling.
    pub fn with_max_focus(mut self, max: usize) -> Self {
        self.character_cast.max_focus = max;
        self
    }

    /// Set the present-supporting tier ceiling.
    pub fn with_max_present_supporting(mut self, max: usize) -> Self {
        self.character_cast.max_present_supporting = max;
        self
    }

    /// Set the offstage-related tier ceiling.
    pub fn with_max_offstage_related(mut self, max: usize) -> Self {
        self.character_cast.max_offstage_related = max;
        self
    }

    /// Set the candidate location ceiling.
    pub fn with_max_candidate(mut self, max: usize) -> Self {
        self.location_cast.max_candidate = max;
        self
    }
}

/// Card-level options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardOptions {
    /// Cast ceilings.
    pub cast_config: CastConfig,
}

/// The raw card configuration as authored (camelCase JSON).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Parameter definitions.
    pub parameters: Vec<ParameterDefinition>,
    /// Entity definitions.
    pub entities: Vec<EntityDefinition>,
    /// Card options.
    pub options: CardOptions,
}

/// A validated, indexed card configuration.
///
/// All name/id lookups go through this type so that every component
/// resolves parameters, entities and locations the same way.
#[derive(Debug, Clone)]
pub struct Schema {
    parameters: Vec<ParameterDefinition>,
    entities: Vec<EntityDefinition>,
    cast: CastConfig,

    // Indexes
    param_by_name: HashMap<String, usize>,
    param_by_id: HashMap<String, usize>,
    entity_by_name: HashMap<String, usize>,
    location_paths: BTreeMap<String, usize>,
}

impl Schema {
    /// Validate and index a set of definitions.
    pub fn new(
        parameters: Vec<ParameterDefinition>,
        entities: Vec<EntityDefinition>,
        cast: CastConfig,
    ) -> SchemaResult<Self> {
        let mut param_by_name = HashMap::new();
        let mut param_by_id = HashMap::new();
        for (idx, param) in parameters.iter().enumerate() {
            validate_parameter(param)?;
            if param_by_name.insert(param.name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateParameter(param.name.clone()));
            }
            if let Some(id) = &param.id
                && param_by_id.insert(id.clone(), idx).is_some()
            {
                return Err(SchemaError::DuplicateParameterId(id.clone()));
            }
        }

        let mut entity_by_name = HashMap::new();
        for (idx, entity) in entities.iter().enumerate() {
            if entity_by_name.insert(entity.name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateEntity(entity.name.clone()));
            }
            if entity.kind != EntityKind::Location && entity.parent_location.is_some() {
                return Err(SchemaError::ParentOnNonLocation(entity.name.clone()));
            }
        }

        let mut location_paths = BTreeMap::new();
        for (idx, entity) in entities.iter().enumerate() {
            if entity.kind == EntityKind::Location {
                let path = full_location_path(entity, &entities, &entity_by_name)?;
                location_paths.insert(path, idx);
            }
        }

        Ok(Self {
            parameters,
            entities,
            cast,
            param_by_name,
            param_by_id,
            entity_by_name,
            location_paths,
        })
    }

    /// Validate and index a decoded card configuration.
    pub fn from_card(card: CardConfig) -> SchemaResult<Self> {
        Self::new(card.parameters, card.entities, card.options.cast_config)
    }

    /// Decode and validate a card configuration from JSON.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let card: CardConfig = serde_json::from_str(json)?;
        Self::from_card(card)
    }

    /// All parameter definitions, in declaration order.
    pub fn parameters(&self) -> &[ParameterDefinition] {
        &self.parameters
    }

    /// All entity definitions, in declaration order.
    pub fn entities(&self) -> &[EntityDefinition] {
        &self.entities
    }

    /// Cast ceilings.
    pub fn cast_config(&self) -> &CastConfig {
        &self.cast
    }

    /// Resolve a parameter by name, falling back to its id.
    pub fn parameter(&self, key: &str) -> Option<&ParameterDefinition> {
        self.param_by_name
            .get(key)
            .or_else(|| self.param_by_id.get(key))
            .map(|&idx| &self.parameters[idx])
    }

    /// Find a declared entity by exact name.
    pub fn entity(&self, name: &str) -> Option<&EntityDefinition> {
        self.entity_by_name.get(name).map(|&idx| &self.entities[idx])
    }

    /// Whether `name` may act as a variable subject or relationship target.
    pub fn is_known_entity(&self, name: &str) -> bool {
        name == PLAYER_ENTITY || self.entity_by_name.contains_key(name)
    }

    /// Whether `name` may join the character cast tiers.
    pub fn is_character(&self, name: &str) -> bool {
        name == PLAYER_ENTITY
            || self
                .entity(name)
                .is_some_and(|e| e.kind == EntityKind::Character)
    }

    /// Resolve a location reference to its full dotted path.
    ///
    /// Accepts the full path (`Campus.Library`), the bare entity name
    /// (`Library`), or a unique dotted suffix of the full path.
    pub fn resolve_location(&self, name: &str) -> Option<&str> {
        if let Some((path, _)) = self.location_paths.get_key_value(name) {
            return Some(path.as_str());
        }
        if let Some(entity) = self.entity(name)
            && entity.kind == EntityKind::Location
        {
            return self
                .location_paths
                .iter()
                .find(|&(_, &idx)| self.entities[idx].name == entity.name)
                .map(|(path, _)| path.as_str());
        }
        let suffix = format!(".{name}");
        let mut matches = self
            .location_paths
            .keys()
            .filter(|path| path.ends_with(&suffix));
        match (matches.next(), matches.next()) {
            (Some(path), None) => Some(path.as_str()),
            _ => None,
        }
    }

    /// Full dotted paths of every declared location, sorted.
    pub fn location_paths(&self) -> impl Iterator<Item = &str> {
        self.location_paths.keys().map(String::as_str)
    }

    /// Entities that bind the given parameter.
    pub fn bound_entities<'a>(
        &'a self,
        param: &'a ParameterDefinition,
    ) -> impl Iterator<Item = &'a EntityDefinition> + 'a {
        self.entities.iter().filter(move |e| {
            e.parameter_names
                .iter()
                .any(|bound| param.matches(bound))
        })
    }
}

fn validate_parameter(param: &ParameterDefinition) -> SchemaResult<()> {
    match &param.kind {
        ParameterKind::Enum { values } if values.is_empty() => {
            return Err(SchemaError::EmptyEnum(param.name.clone()));
        }
        ParameterKind::Number {
            min: Some(min),
            max: Some(max),
            ..
        } if min > max => {
            return Err(SchemaError::InvertedBounds {
                name: param.name.clone(),
                min: *min,
                max: *max,
            });
        }
        _ => {}
    }
    if let Some(default) = &param.default
        && !param.kind.accepts(default)
    {
        return Err(SchemaError::InvalidDefault(param.name.clone()));
    }
    Ok(())
}

/// Walk `parentLocation` links up to the root and join the names with dots.
fn full_location_path(
    entity: &EntityDefinition,
    entities: &[EntityDefinition],
    by_name: &HashMap<String, usize>,
) -> SchemaResult<String> {
    let mut segments = vec![entity.name.as_str()];
    let mut seen = HashSet::from([entity.name.as_str()]);
    let mut current = entity;

    while let Some(parent_name) = current.parent_location.as_deref() {
        let parent = by_name
            .get(parent_name)
            .map(|&idx| &entities[idx])
            .filter(|p| p.kind == EntityKind::Location)
            .ok_or_else(|| SchemaError::UnknownParentLocation {
                location: current.name.clone(),
                parent: parent_name.to_string(),
            })?;
        if !seen.insert(parent.name.as_str()) {
            return Err(SchemaError::LocationCycle(entity.name.clone()));
        }
        segments.push(parent.name.as_str());
        current = parent;
    }

    segments.reverse();
    Ok(segments.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn campus_schema() -> Schema {
        Schema::new(
            vec![
                ParameterDefinition::number("favor", Scope::Character).with_id("affection"),
                ParameterDefinition::text("weather", Scope::Global),
            ],
            vec![
                EntityDefinition::character("Alice").with_parameters(["favor"]),
                EntityDefinition::location("Campus"),
                EntityDefinition::location("Library").with_parent("Campus"),
                EntityDefinition::location("Stacks").with_parent("Library"),
            ],
            CastConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn parameter_resolves_by_name_or_id() {
        let schema = campus_schema();
        assert_eq!(schema.parameter("favor").unwrap().name, "favor");
        assert_eq!(schema.parameter("affection").unwrap().name, "favor");
        assert!(schema.parameter("mood").is_none());
    }

    #[test]
    fn location_paths_walk_parents() {
        let schema = campus_schema();
        let paths: Vec<_> = schema.location_paths().collect();
        assert_eq!(paths, vec!["Campus", "Campus.Library", "Campus.Library.Stacks"]);
    }

    #[test]
    fn resolve_location_accepts_short_and_suffix_forms() {
        let schema = campus_schema();
        assert_eq!(schema.resolve_location("Library"), Some("Campus.Library"));
        assert_eq!(
            schema.resolve_location("Library.Stacks"),
            Some("Campus.Library.Stacks")
        );
        assert_eq!(
            schema.resolve_location("Campus.Library"),
            Some("Campus.Library")
        );
        assert_eq!(schema.resolve_location("Alice"), None);
        assert_eq!(schema.resolve_location("Moon"), None);
    }

    #[test]
    fn player_is_an_implicit_character() {
        let schema = campus_schema();
        assert!(schema.is_character(PLAYER_ENTITY));
        assert!(schema.is_character("Alice"));
        assert!(!schema.is_character("Campus"));
        assert!(schema.is_known_entity("Campus"));
    }

    #[test]
    fn duplicate_parameter_rejected() {
        let result = Schema::new(
            vec![
                ParameterDefinition::boolean("met", Scope::Global),
                ParameterDefinition::text("met", Scope::Scene),
            ],
            vec![],
            CastConfig::default(),
        );
        assert!(matches!(result, Err(SchemaError::DuplicateParameter(n)) if n == "met"));
    }

    #[test]
    fn location_cycle_rejected() {
        let result = Schema::new(
            vec![],
            vec![
                EntityDefinition::location("A").with_parent("B"),
                EntityDefinition::location("B").with_parent("A"),
            ],
            CastConfig::default(),
        );
        assert!(matches!(result, Err(SchemaError::LocationCycle(_))));
    }

    #[test]
    fn parent_must_be_a_location() {
        let result = Schema::new(
            vec![],
            vec![
                EntityDefinition::character("Alice"),
                EntityDefinition::location("Room").with_parent("Alice"),
            ],
            CastConfig::default(),
        );
        assert!(matches!(
            result,
            Err(SchemaError::UnknownParentLocation { parent, .. }) if parent == "Alice"
        ));
    }

    #[test]
    fn default_must_match_type() {
        let result = Schema::new(
            vec![
                ParameterDefinition::enumeration("stage", Scope::Character, ["a", "b"])
                    .with_default(json!("c")),
            ],
            vec![],
            CastConfig::default(),
        );
        assert!(matches!(result, Err(SchemaError::InvalidDefault(_))));
    }

    #[test]
    fn card_json_round_trips_through_serde() {
        let json = r#"{
            "parameters": [
                {"name": "favor", "id": "affection", "scope": "relationship", "type": "number",
                 "min": -100, "max": 100,
                 "phases": [{"name": "cold", "range": [-100, 0]}]},
                {"name": "stage", "type": "enum", "enumValues": ["stranger", "friend"]},
                {"name": "backpack", "type": "array",
                 "arrayConfig": {"itemType": "object", "maxLength": 5}}
            ],
            "entities": [
                {"name": "Alice", "type": "character", "parameterNames": ["favor"]}
            ],
            "options": {"castConfig": {"characterCast": {"maxFocus": 2}}}
        }"#;
        let schema = Schema::from_json(json).unwrap();

        let favor = schema.parameter("affection").unwrap();
        assert_eq!(favor.scope, Scope::Relationship);
        assert!(matches!(
            &favor.kind,
            ParameterKind::Number { min: Some(_), max: Some(_), phases } if phases.len() == 1
        ));

        let stage = schema.parameter("stage").unwrap();
        assert_eq!(stage.scope, Scope::Character);
        assert_eq!(stage.kind.label(), "enum");

        let backpack = schema.parameter("backpack").unwrap();
        assert!(matches!(
            &backpack.kind,
            ParameterKind::Array { config } if config.item_type == ItemType::Object
                && config.max_length == Some(5)
        ));

        let cast = schema.cast_config();
        assert_eq!(cast.character_cast.max_focus, 2);
        assert_eq!(cast.character_cast.max_present_supporting, 5);
        assert_eq!(cast.location_cast.max_candidate, 10);
    }

    #[test]
    fn phase_contains_is_inclusive() {
        let phase = Phase {
            name: "warm".into(),
            range: Some([10.0, 20.0]),
        };
        assert!(phase.contains(10.0));
        assert!(phase.contains(20.0));
        assert!(!phase.contains(20.5));
    }
}
