use std::path::Path;

use colored::Colorize;
use sc_dsl::render_diagnostics;

use super::plural;

pub fn run(card: &Path, file: Option<&Path>) -> Result<(), String> {
    let schema = super::load_card(card)?;
    let text = super::read_input(file)?;
    let output = sc_dsl::parse_block(&text, &schema);

    for command in &output.commands {
        let span = format!("{:>4}..{:<4}", command.span.start, command.span.end);
        println!(
            "  {} {:<8} {}",
            span.dimmed(),
            command.node.verb().to_string().bold(),
            command.node
        );
    }

    if !output.diagnostics.is_empty() {
        let filename = file.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
        eprint!("{}", render_diagnostics(&text, &filename, &output.diagnostics));
    }

    // Every diagnostic stands for one dropped call.
    let dropped = output.diagnostics.len();
    let parsed = output.commands.len();
    println!("  {parsed} command{}, {dropped} dropped", plural(parsed));

    Ok(())
}
