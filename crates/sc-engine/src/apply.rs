use std::fmt;

use tracing::debug;

use sc_core::{CastChange, EngineState, Schema};
use sc_dsl::{
    CastCommand, Command, Diagnostic, LocationCommand, MutationIntent, SceneCommand, Span, Spanned,
};

use crate::config::EngineConfig;
use crate::error::{MutationError, MutationResult};
use crate::interpreter;

/// Why a command was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// The parser or resolver dropped the call.
    Parse(Diagnostic),
    /// The command was well-formed but could not be applied.
    Mutation(MutationError),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(diag) => write!(f, "{diag}"),
            Self::Mutation(err) => write!(f, "rejected: {err}"),
        }
    }
}

/// A dropped command and where it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Byte range of the command in the block.
    pub span: Span,
    /// Why it was dropped.
    pub reason: RejectReason,
}

/// Everything that happened while applying one block.
#[derive(Debug, Clone)]
pub struct BlockReport {
    /// The resulting state.
    pub state: EngineState,
    /// Commands that took effect, in order.
    pub applied: Vec<Spanned<Command>>,
    /// Commands that were dropped, in order.
    pub rejections: Vec<Rejection>,
}

/// Apply every command in `text` to a copy of `base`.
///
/// `base` is left untouched. Commands apply in textual order; each sees the
/// effects of the ones before it.
pub fn apply_block(
    text: &str,
    base: &EngineState,
    schema: &Schema,
    config: &EngineConfig,
) -> EngineState {
    apply_block_report(text, base, schema, config).state
}

/// Like [`apply_block`], also reporting applied and dropped commands.
pub fn apply_block_report(
    text: &str,
    base: &EngineState,
    schema: &Schema,
    config: &EngineConfig,
) -> BlockReport {
    let parsed = sc_dsl::parse_block(text, schema);
    let mut state = base.clone();
    let mut applied = Vec::with_capacity(parsed.commands.len());
    let mut rejections: Vec<Rejection> = parsed
        .diagnostics
        .into_iter()
        .map(|diag| Rejection {
            span: diag.span.clone(),
            reason: RejectReason::Parse(diag),
        })
        .collect();

    for command in parsed.commands {
        match apply_command(&mut state, &command.node, schema, config) {
            Ok(()) => applied.push(command),
            Err(err) => rejections.push(Rejection {
                span: command.span.clone(),
                reason: RejectReason::Mutation(err),
            }),
        }
    }

    rejections.sort_by_key(|r| r.span.start);
    for rejection in &rejections {
        debug!(
            start = rejection.span.start,
            end = rejection.span.end,
            reason = %rejection.reason,
            "command_rejected"
        );
    }

    BlockReport {
        state,
        applied,
        rejections,
    }
}

/// Apply one resolved command in place.
pub fn apply_command(
    state: &mut EngineState,
    command: &Command,
    schema: &Schema,
    config: &EngineConfig,
) -> MutationResult<()> {
    match command {
        Command::Set(intent) => apply_set(state, intent, schema, config),
        Command::Cast(cast) => apply_cast(state, cast, schema),
        Command::Location(location) => apply_location(state, location, schema),
        Command::Scene(scene) => {
            apply_scene(state, scene);
            Ok(())
        }
        Command::Note { entity, text } => {
            state
                .entities_runtime
                .entry(entity.clone())
                .or_default()
                .note = Some(text.clone());
            Ok(())
        }
    }
}

fn apply_set(
    state: &mut EngineState,
    intent: &MutationIntent,
    schema: &Schema,
    config: &EngineConfig,
) -> MutationResult<()> {
    let at = &intent.coordinate;
    let param = schema
        .parameter(&at.param)
        .ok_or_else(|| MutationError::UnknownParameter(at.param.clone()))?;
    let current = state.variables.read_at(at)?;
    if let Some(next) = interpreter::mutate(intent, param, current, &config.ladder)? {
        state.variables.write_at(at, next)?;
    }
    Ok(())
}

fn apply_cast(state: &mut EngineState, cast: &CastCommand, schema: &Schema) -> MutationResult<()> {
    match cast {
        CastCommand::Enter { name, tier } => {
            let limits = &schema.cast_config().character_cast;
            match state.cast.enter(name, *tier, limits) {
                CastChange::Rejected => return Err(MutationError::TierClosed(tier.to_string())),
                CastChange::Inserted { evicted } | CastChange::Moved { evicted, .. }
                    if !evicted.is_empty() =>
                {
                    debug!(tier = %tier, entered = %name, evicted = ?evicted, "cast_tier_evicted");
                }
                _ => {}
            }
        }
        CastCommand::Leave { name } => {
            state.cast.leave(name);
        }
    }
    Ok(())
}

fn apply_location(
    state: &mut EngineState,
    location: &LocationCommand,
    schema: &Schema,
) -> MutationResult<()> {
    let cast = &mut state.location_cast;
    match location {
        LocationCommand::SetCurrent(path) => {
            cast.set_current(path);
        }
        LocationCommand::ClearCurrent => {
            cast.clear_current();
        }
        LocationCommand::AddCandidate(path) => {
            let max = schema.cast_config().location_cast.max_candidate;
            match cast.add_candidate(path, max) {
                CastChange::Rejected => {
                    return Err(MutationError::TierClosed("candidate".to_string()));
                }
                CastChange::Inserted { evicted } if !evicted.is_empty() => {
                    debug!(entered = %path, evicted = ?evicted, "location_candidate_evicted");
                }
                _ => {}
            }
        }
        LocationCommand::RemoveCandidate(path) => {
            cast.remove_candidate(path);
        }
    }
    Ok(())
}

fn apply_scene(state: &mut EngineState, scene: &SceneCommand) {
    let meta = &mut state.scene;
    match scene {
        SceneCommand::LocationHint(hint) => meta.location_hint = Some(hint.clone()),
        SceneCommand::ReplaceTags(tags) => meta.scene_tags = tags.clone(),
        SceneCommand::AddTag(tag) => {
            if !meta.scene_tags.contains(tag) {
                meta.scene_tags.push(tag.clone());
            }
        }
        SceneCommand::RemoveTag(tag) => meta.scene_tags.retain(|t| t != tag),
    }
}
