use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use sc_core::{CastTier, EntityKind};

use super::plural;

pub fn run(card: &Path) -> Result<(), String> {
    let schema = super::load_card(card)?;

    if !schema.parameters().is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Parameter", "Id", "Scope", "Type", "Default"]);
        for param in schema.parameters() {
            let default = param
                .default
                .as_ref()
                .map_or_else(|| "-".to_string(), |v| v.to_string());
            table.add_row(vec![
                param.name.clone(),
                param.id.clone().unwrap_or_else(|| "-".to_string()),
                param.scope.to_string(),
                param.kind.label().to_string(),
                default,
            ]);
        }
        println!("{table}");
    }

    if !schema.entities().is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Entity", "Kind", "Path", "Parameters"]);
        for entity in schema.entities() {
            let path = match entity.kind {
                EntityKind::Location => schema.resolve_location(&entity.name).unwrap_or("-"),
                EntityKind::Character => "-",
            };
            table.add_row(vec![
                entity.name.clone(),
                entity.kind.to_string(),
                path.to_string(),
                entity.parameter_names.join(", "),
            ]);
        }
        println!("{table}");
    }

    let limits = &schema.cast_config().character_cast;
    let ceilings: Vec<String> = CastTier::ALL
        .into_iter()
        .map(|tier| format!("{tier}={}", tier.limit(limits)))
        .collect();
    println!(
        "  cast ceilings: {}, candidate={}",
        ceilings.join(", "),
        schema.cast_config().location_cast.max_candidate
    );

    let params = schema.parameters().len();
    let entities = schema.entities().len();
    println!(
        "  Card OK: {params} parameter{}, {entities} entit{}",
        plural(params),
        if entities == 1 { "y" } else { "ies" }
    );

    Ok(())
}
