use sc_core::{CastTier, Coordinate, ParameterKind, Schema, Scope};

use crate::ast::{
    Arg, Call, CastCommand, Command, LocationCommand, MutationIntent, SceneCommand, Spanned, Verb,
};
use crate::diagnostics::{Diagnostic, DiagnosticCode};

/// Check a parsed call against the schema and assign argument roles.
///
/// Returns a warning diagnostic for every reason a well-formed call is
/// dropped: wrong arity, unknown parameter, scope mismatch, undeclared
/// entity or location, bad action or tier.
pub fn resolve(call: &Spanned<Call>, schema: &Schema) -> Result<Command, Diagnostic> {
    let ctx = Ctx { call, schema };
    match call.node.verb.node {
        Verb::Set => ctx.set(),
        Verb::Cast => ctx.cast(),
        Verb::Location => ctx.location(),
        Verb::Scene => ctx.scene(),
        Verb::Note => ctx.note(),
    }
}

/// Array operators whose third argument is a value rather than a note.
fn takes_value(kind: &ParameterKind, op: &str) -> bool {
    matches!(kind, ParameterKind::Array { .. })
        && (matches!(op, "add_item" | "remove_where" | "set") || op.starts_with("update_at:"))
}

/// Lowercase and drop `_`, `-` so `add_candidate` and `addCandidate` agree.
pub(crate) fn action_key(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Drop repeated tags, keeping first occurrences in order.
pub(crate) fn unique_tags(tags: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !unique.contains(&tag) {
            unique.push(tag);
        }
    }
    unique
}

/// Subject, parameter key and target of a `set` path.
type PathParts<'p> = (Option<&'p str>, &'p str, Option<&'p str>);

struct Ctx<'a> {
    call: &'a Spanned<Call>,
    schema: &'a Schema,
}

impl Ctx<'_> {
    fn verb(&self) -> Verb {
        self.call.node.verb.node
    }

    fn args(&self) -> &[Spanned<Arg>] {
        &self.call.node.args
    }

    fn arg(&self, idx: usize) -> Option<&str> {
        self.args().get(idx).map(|a| a.node.text.as_str())
    }

    fn arg_span(&self, idx: usize) -> std::ops::Range<usize> {
        self.args()
            .get(idx)
            .map_or_else(|| self.call.span.clone(), |a| a.span.clone())
    }

    fn reject(&self, code: DiagnosticCode, idx: usize, message: String) -> Diagnostic {
        Diagnostic::warning(code, self.arg_span(idx), message)
            .with_label(format!("{} call dropped", self.verb()))
    }

    fn arity(&self, min: usize, max: usize) -> Result<(), Diagnostic> {
        let n = self.args().len();
        if n < min || n > max {
            let expected = if min == max {
                format!("{min}")
            } else {
                format!("{min} to {max}")
            };
            return Err(Diagnostic::warning(
                DiagnosticCode::Arity,
                self.call.span.clone(),
                format!("{} takes {expected} arguments, got {n}", self.verb()),
            )
            .with_label(format!("{} call dropped", self.verb())));
        }
        Ok(())
    }

    fn required(&self, idx: usize, what: &str) -> Result<&str, Diagnostic> {
        self.arg(idx).ok_or_else(|| {
            Diagnostic::warning(
                DiagnosticCode::Arity,
                self.call.span.clone(),
                format!("{} is missing its {what}", self.verb()),
            )
        })
    }

    fn entity(&self, idx: usize, name: &str) -> Result<(), Diagnostic> {
        if self.schema.is_known_entity(name) {
            Ok(())
        } else {
            Err(self.reject(
                DiagnosticCode::UnknownEntity,
                idx,
                format!("unknown entity \"{name}\""),
            ))
        }
    }

    fn character(&self, idx: usize, name: &str) -> Result<String, Diagnostic> {
        if self.schema.is_character(name) {
            Ok(name.to_string())
        } else {
            Err(self.reject(
                DiagnosticCode::UnknownEntity,
                idx,
                format!("\"{name}\" is not a declared character"),
            ))
        }
    }

    fn location_path(&self, idx: usize, name: &str) -> Result<String, Diagnostic> {
        self.schema
            .resolve_location(name)
            .map(str::to_string)
            .ok_or_else(|| {
                self.reject(
                    DiagnosticCode::UnknownEntity,
                    idx,
                    format!("\"{name}\" is not a declared location"),
                )
            })
    }

    /// Split a path into subject, parameter and target.
    ///
    /// The subject is the longest declared entity name followed by `.`, so
    /// entity names may themselves contain dots. Without a declared prefix
    /// the path is split on every dot, and `None` means more than three
    /// segments.
    fn split_path<'p>(&self, path: &'p str) -> Option<PathParts<'p>> {
        if let Some(param) = self.schema.parameter(path)
            && param.scope.path_segments() == 1
        {
            return Some((None, path, None));
        }

        let subject = path
            .rmatch_indices('.')
            .map(|(i, _)| i)
            .find(|&i| self.schema.is_known_entity(&path[..i]));
        if let Some(i) = subject {
            let rest = &path[i + 1..];
            return Some(match rest.split_once('.') {
                Some((key, target)) => (Some(&path[..i]), key, Some(target)),
                None => (Some(&path[..i]), rest, None),
            });
        }

        let segments: Vec<&str> = path.split('.').collect();
        match segments.as_slice() {
            [param] => Some((None, *param, None)),
            [subject, param] => Some((Some(*subject), *param, None)),
            [subject, param, target] => Some((Some(*subject), *param, Some(*target))),
            _ => None,
        }
    }

    fn set(&self) -> Result<Command, Diagnostic> {
        self.arity(2, 4)?;
        let path = self.required(0, "path")?;
        if path.is_empty() {
            return Err(self.reject(DiagnosticCode::Syntax, 0, "empty path".to_string()));
        }

        let Some((subject, key, target)) = self.split_path(path) else {
            return Err(self.reject(
                DiagnosticCode::ScopeMismatch,
                0,
                format!("path \"{path}\" has {} segments", path.split('.').count()),
            ));
        };
        let given = 1 + usize::from(subject.is_some()) + usize::from(target.is_some());

        let param = self.schema.parameter(key).ok_or_else(|| {
            self.reject(
                DiagnosticCode::UnknownParameter,
                0,
                format!("unknown parameter \"{key}\""),
            )
        })?;
        if given != param.scope.path_segments() {
            return Err(self.reject(
                DiagnosticCode::ScopeMismatch,
                0,
                format!(
                    "\"{}\" has {} scope and needs {} path segment(s), got {}",
                    param.name,
                    param.scope,
                    param.scope.path_segments(),
                    given
                ),
            ));
        }
        if let Some(subject) = subject {
            self.entity(0, subject)?;
        }
        if let Some(target) = target {
            self.entity(0, target)?;
        }

        let operator = self.required(1, "operator")?.to_string();
        let (value_literal, note) = if takes_value(&param.kind, &operator) {
            let value = self.required(2, "value")?;
            (Some(value.to_string()), self.arg(3).map(str::to_string))
        } else {
            self.arity(2, 3)?;
            (None, self.arg(2).map(str::to_string))
        };

        let coordinate = match (param.scope, subject, target) {
            (Scope::Global, ..) => Coordinate::global(&param.name),
            (Scope::Scene, ..) => Coordinate::scene(&param.name),
            (Scope::Character, Some(subject), _) => Coordinate::character(subject, &param.name),
            (Scope::Relationship, Some(subject), Some(target)) => {
                Coordinate::relationship(subject, &param.name, target)
            }
            _ => {
                return Err(self.reject(
                    DiagnosticCode::ScopeMismatch,
                    0,
                    format!("path \"{path}\" does not match {} scope", param.scope),
                ));
            }
        };

        Ok(Command::Set(MutationIntent {
            path: path.to_string(),
            operator,
            value_literal,
            note,
            coordinate,
        }))
    }

    fn cast(&self) -> Result<Command, Diagnostic> {
        self.arity(2, 3)?;
        let action = self.required(0, "action")?;
        let name = self.required(1, "character")?;
        match action_key(action).as_str() {
            "enter" => {
                let tier = match self.arg(2) {
                    None => CastTier::Focus,
                    Some(raw) => CastTier::parse(raw).ok_or_else(|| {
                        self.reject(
                            DiagnosticCode::InvalidArgument,
                            2,
                            format!("unknown cast tier \"{raw}\""),
                        )
                    })?,
                };
                let name = self.character(1, name)?;
                Ok(Command::Cast(CastCommand::Enter { name, tier }))
            }
            "leave" => {
                self.arity(2, 2)?;
                let name = self.character(1, name)?;
                Ok(Command::Cast(CastCommand::Leave { name }))
            }
            _ => Err(self.reject(
                DiagnosticCode::InvalidArgument,
                0,
                format!("unknown cast action \"{action}\""),
            )),
        }
    }

    fn location(&self) -> Result<Command, Diagnostic> {
        self.arity(1, 2)?;
        let action = self.required(0, "action")?;
        let key = action_key(action);
        if key == "clearcurrent" {
            self.arity(1, 1)?;
            return Ok(Command::Location(LocationCommand::ClearCurrent));
        }

        let build: fn(String) -> LocationCommand = match key.as_str() {
            "current" | "setcurrent" => LocationCommand::SetCurrent,
            "addcandidate" | "candidate" => LocationCommand::AddCandidate,
            "removecandidate" => LocationCommand::RemoveCandidate,
            _ => {
                return Err(self.reject(
                    DiagnosticCode::InvalidArgument,
                    0,
                    format!("unknown location action \"{action}\""),
                ));
            }
        };
        let name = self.required(1, "location")?;
        let path = self.location_path(1, name)?;
        Ok(Command::Location(build(path)))
    }

    fn scene(&self) -> Result<Command, Diagnostic> {
        self.arity(2, 2)?;
        let field = self.required(0, "field")?;
        let value = self.required(1, "value")?.to_string();
        let command = match action_key(field).as_str() {
            "locationhint" => SceneCommand::LocationHint(value),
            "tags" | "scenetags" => {
                let tags: Vec<String> = serde_json::from_str(&value).map_err(|e| {
                    self.reject(
                        DiagnosticCode::InvalidArgument,
                        1,
                        format!("scene tags must be a JSON list of strings: {e}"),
                    )
                })?;
                SceneCommand::ReplaceTags(unique_tags(tags))
            }
            "addtag" => SceneCommand::AddTag(value),
            "removetag" => SceneCommand::RemoveTag(value),
            _ => {
                return Err(self.reject(
                    DiagnosticCode::InvalidArgument,
                    0,
                    format!("unknown scene field \"{field}\""),
                ));
            }
        };
        Ok(Command::Scene(command))
    }

    fn note(&self) -> Result<Command, Diagnostic> {
        self.arity(2, 2)?;
        let entity = self.required(0, "entity")?;
        self.entity(0, entity)?;
        let text = self.required(1, "text")?;
        Ok(Command::Note {
            entity: entity.to_string(),
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;
    use crate::parser;
    use sc_core::{CastConfig, EntityDefinition, ItemType, ParameterDefinition, PLAYER_ENTITY};

    fn schema() -> Schema {
        Schema::new(
            vec![
                ParameterDefinition::number("favor", Scope::Relationship).with_id("affection"),
                ParameterDefinition::enumeration("mood", Scope::Character, ["calm", "angry"]),
                ParameterDefinition::text("weather", Scope::Global),
                ParameterDefinition::array("inventory", Scope::Character, ItemType::String),
            ],
            vec![
                EntityDefinition::character("Alice"),
                EntityDefinition::character("Bob"),
                EntityDefinition::location("Campus"),
                EntityDefinition::location("Library").with_parent("Campus"),
            ],
            CastConfig::default(),
        )
        .unwrap()
    }

    fn resolve_src(source: &str) -> Result<Command, Diagnostic> {
        let (tokens, errors) = lexer::lex(source, 0);
        assert!(errors.is_empty(), "lex errors: {errors:?}");
        let call = parser::parse_call(&tokens).unwrap();
        resolve(&call, &schema())
    }

    fn code(source: &str) -> DiagnosticCode {
        resolve_src(source).unwrap_err().code
    }

    #[test]
    fn relationship_path_resolves_id_to_name() {
        let Command::Set(intent) = resolve_src("set('Alice.affection.Bob', 'up_small', 'helped')")
            .unwrap()
        else {
            panic!("expected set");
        };
        assert_eq!(intent.coordinate, Coordinate::relationship("Alice", "favor", "Bob"));
        assert_eq!(intent.operator, "up_small");
        assert_eq!(intent.value_literal, None);
        assert_eq!(intent.note.as_deref(), Some("helped"));
    }

    #[test]
    fn array_operators_take_a_value_argument() {
        let Command::Set(intent) =
            resolve_src(r#"set('Alice.inventory', 'add_item', '"rope"', 'found it')"#).unwrap()
        else {
            panic!("expected set");
        };
        assert_eq!(intent.value_literal.as_deref(), Some("\"rope\""));
        assert_eq!(intent.note.as_deref(), Some("found it"));

        let Command::Set(intent) = resolve_src("set('Alice.inventory', 'clear', 'lost it')").unwrap()
        else {
            panic!("expected set");
        };
        assert_eq!(intent.value_literal, None);
        assert_eq!(intent.note.as_deref(), Some("lost it"));
    }

    #[test]
    fn scope_mismatch_is_rejected() {
        assert_eq!(code("set('favor', 'up_small')"), DiagnosticCode::ScopeMismatch);
        assert_eq!(code("set('Alice.weather', 'rain')"), DiagnosticCode::ScopeMismatch);
        assert_eq!(code("set('a.b.c.d', 'x')"), DiagnosticCode::ScopeMismatch);
    }

    #[test]
    fn unknown_parameter_and_entity_are_rejected() {
        assert_eq!(code("set('Alice.hunger', 'up_small')"), DiagnosticCode::UnknownParameter);
        assert_eq!(code("set('Carol.mood', 'calm')"), DiagnosticCode::UnknownEntity);
    }

    #[test]
    fn entity_names_may_contain_dots() {
        let schema = Schema::new(
            vec![
                ParameterDefinition::number("favor", Scope::Relationship),
                ParameterDefinition::number("trust", Scope::Character),
            ],
            vec![
                EntityDefinition::character("Dr.Chen"),
                EntityDefinition::character("St. Mary"),
                EntityDefinition::character("Dr"),
            ],
            CastConfig::default(),
        )
        .unwrap();
        let coordinate = |source: &str| {
            let (tokens, _) = lexer::lex(source, 0);
            match resolve(&parser::parse_call(&tokens).unwrap(), &schema) {
                Ok(Command::Set(intent)) => Ok(intent.coordinate),
                Ok(other) => panic!("expected set, got {other:?}"),
                Err(diag) => Err(diag.code),
            }
        };

        assert_eq!(
            coordinate("set('Dr.Chen.trust', 'up_small')"),
            Ok(Coordinate::character("Dr.Chen", "trust"))
        );
        assert_eq!(
            coordinate("set('Dr.Chen.favor.St. Mary', 'up_small')"),
            Ok(Coordinate::relationship("Dr.Chen", "favor", "St. Mary"))
        );
        assert_eq!(
            coordinate("set('Dr.trust', 'up_small')"),
            Ok(Coordinate::character("Dr", "trust"))
        );
        assert_eq!(
            coordinate("set('Dr.Chen.favor.Nobody', 'up_small')"),
            Err(DiagnosticCode::UnknownEntity)
        );
    }

    #[test]
    fn player_is_a_valid_subject() {
        let source = format!("set('{PLAYER_ENTITY}.mood', 'calm')");
        assert!(resolve_src(&source).is_ok());
    }

    #[test]
    fn scalar_with_four_arguments_is_rejected() {
        assert_eq!(code("set('weather', 'rain', 'a', 'b')"), DiagnosticCode::Arity);
        assert_eq!(code("set('weather')"), DiagnosticCode::Arity);
    }

    #[test]
    fn cast_enter_defaults_to_focus() {
        assert_eq!(
            resolve_src("cast('enter', 'Alice')").unwrap(),
            Command::Cast(CastCommand::Enter {
                name: "Alice".into(),
                tier: CastTier::Focus
            })
        );
        assert_eq!(
            resolve_src("cast('enter', 'Bob', 'present_supporting')").unwrap(),
            Command::Cast(CastCommand::Enter {
                name: "Bob".into(),
                tier: CastTier::PresentSupporting
            })
        );
        assert_eq!(code("cast('enter', 'Campus')"), DiagnosticCode::UnknownEntity);
        assert_eq!(code("cast('enter', 'Bob', 'backstage')"), DiagnosticCode::InvalidArgument);
        assert_eq!(code("cast('wave', 'Bob')"), DiagnosticCode::InvalidArgument);
    }

    #[test]
    fn location_names_resolve_to_full_paths() {
        assert_eq!(
            resolve_src("location('current', 'Library')").unwrap(),
            Command::Location(LocationCommand::SetCurrent("Campus.Library".into()))
        );
        assert_eq!(
            resolve_src("location('addCandidate', 'Campus')").unwrap(),
            Command::Location(LocationCommand::AddCandidate("Campus".into()))
        );
        assert_eq!(
            resolve_src("location('clear_current')").unwrap(),
            Command::Location(LocationCommand::ClearCurrent)
        );
        assert_eq!(code("location('current', 'Alice')"), DiagnosticCode::UnknownEntity);
    }

    #[test]
    fn scene_tags_decode_json_and_dedupe() {
        assert_eq!(
            resolve_src(r#"scene('tags', '["rain", "night", "rain"]')"#).unwrap(),
            Command::Scene(SceneCommand::ReplaceTags(vec!["rain".into(), "night".into()]))
        );
        assert_eq!(code("scene('tags', 'rain')"), DiagnosticCode::InvalidArgument);
    }

    #[test]
    fn note_requires_known_entity() {
        assert_eq!(
            resolve_src("note('Bob', 'owes Alice money')").unwrap(),
            Command::Note {
                entity: "Bob".into(),
                text: "owes Alice money".into()
            }
        );
        assert_eq!(code("note('Zed', 'x')"), DiagnosticCode::UnknownEntity);
    }
}
