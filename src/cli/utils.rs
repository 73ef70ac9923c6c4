//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fixedrec::{Schema, TemplateRegistry};

/// Resolve input for commands that read either a file or stdin.
pub fn read_input(from: Option<PathBuf>) -> Result<String> {
    match from {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => read_stdin(),
    }
}

/// Read the entire stdin stream into memory.
pub fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read from stdin")?;
    Ok(buffer)
}

/// Resolve a schema argument: a built-in template name, otherwise a JSON file.
pub fn load_schema(name_or_path: &str) -> Result<Schema> {
    if let Ok(template) = TemplateRegistry::get(name_or_path) {
        return Ok(template.schema());
    }
    let path = Path::new(name_or_path);
    if !path.exists() {
        anyhow::bail!("'{}' is neither a built-in schema nor a file", name_or_path);
    }
    Schema::load(path)
}
