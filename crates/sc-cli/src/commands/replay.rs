use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use sc_core::{CastTier, EngineState};
use sc_engine::{EngineConfig, ReplayEngine, Role, Turn, scene_info};

pub fn run(
    card: &Path,
    history: &Path,
    index: Option<usize>,
    assistant_only: bool,
    json: bool,
) -> Result<(), String> {
    let schema = super::load_card(card)?;
    let turns = load_history(history)?;

    let mut config = EngineConfig::default();
    if assistant_only {
        config = config.with_apply_roles([Role::Assistant]);
    }

    let mut engine = ReplayEngine::new(schema, turns, config);
    let len = engine.history().len();
    let state = match index {
        Some(i) => engine.state_at(i),
        None => engine.latest_state(),
    }
    .map_err(|e| e.to_string())?;

    if json {
        let text = serde_json::to_string_pretty(&state).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }

    match index.or(len.checked_sub(1)) {
        Some(i) => println!("  {} {} of {len}", "state after turn".bold(), i),
        None => println!("  {}", "initial state (empty history)".bold()),
    }
    println!();
    print_state(&state);

    Ok(())
}

fn load_history(path: &Path) -> Result<Vec<Turn>, String> {
    let text = super::read_file(path)?;
    let turns: Vec<Turn> = serde_json::from_str(&text)
        .map_err(|e| format!("invalid history '{}': {e}", path.display()))?;
    Ok(turns
        .into_iter()
        .enumerate()
        .map(|(index, turn)| Turn { index, ..turn })
        .collect())
}

fn print_state(state: &EngineState) {
    let entries = state.variables.entries();
    if entries.is_empty() {
        println!("  No variables set.");
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Scope", "Variable", "Value"]);
        for (at, value) in &entries {
            table.add_row(vec![at.scope.to_string(), at.to_string(), value.to_string()]);
        }
        println!("{table}");
    }
    println!();

    let info = scene_info(state);
    println!("  {}", "cast".cyan().bold());
    for tier in CastTier::ALL {
        field(&format!("{tier}:"), &list(info.cast.members(tier)));
    }

    println!("  {}", "location".cyan().bold());
    field("current:", info.location_cast.current().unwrap_or("-"));
    field("candidate:", &list(info.location_cast.candidates()));

    println!("  {}", "scene".cyan().bold());
    field(
        "locationHint:",
        info.scene.location_hint.as_deref().unwrap_or("-"),
    );
    field("sceneTags:", &list(&info.scene.scene_tags));

    let notes: Vec<_> = state
        .entities_runtime
        .iter()
        .filter_map(|(name, rt)| rt.note.as_deref().map(|note| (name, note)))
        .collect();
    if !notes.is_empty() {
        println!("  {}", "notes".cyan().bold());
        for (name, note) in notes {
            println!("    {}: {note}", name.bold());
        }
    }
}

fn field(label: &str, value: &str) {
    println!("    {label:<18} {value}");
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "-".dimmed().to_string()
    } else {
        items.join(", ")
    }
}
