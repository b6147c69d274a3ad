pub mod check;
pub mod parse;
pub mod replay;

use std::io::Read;
use std::path::Path;

use sc_core::Schema;

/// Load and validate a card configuration.
fn load_card(path: &Path) -> Result<Schema, String> {
    let text = read_file(path)?;
    Schema::from_json(&text).map_err(|e| format!("invalid card '{}': {e}", path.display()))
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {e}", path.display()))
}

/// Read a file, or all of stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String, String> {
    match path {
        Some(path) => read_file(path),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("cannot read stdin: {e}"))?;
            Ok(text)
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
