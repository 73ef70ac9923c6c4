//! Schema discovery commands (`fixedrec schema ...`).

use anyhow::Result;
use clap::{Args, Subcommand};
use fixedrec::TemplateRegistry;

use crate::cli::utils::load_schema;

/// Schema subcommands.
#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// List all built-in schemas.
    List,
    /// Show the fields of a schema.
    Show(SchemaShowArgs),
}

/// Arguments for `fixedrec schema show`.
#[derive(Args, Debug)]
pub struct SchemaShowArgs {
    /// Built-in schema name or path to a schema JSON file.
    pub name: String,
}

/// Execute a schema command.
pub fn handle(command: SchemaCommand) -> Result<()> {
    match command {
        SchemaCommand::List => list(),
        SchemaCommand::Show(args) => show(args),
    }
}

fn list() -> Result<()> {
    println!("Built-in schemas:");
    for tpl in TemplateRegistry::list() {
        println!("  - {}: {}", tpl.name, tpl.description);
    }
    Ok(())
}

fn show(args: SchemaShowArgs) -> Result<()> {
    let schema = load_schema(&args.name)?;
    // Compile up front so a broken schema is reported instead of listed.
    schema.compile()?;
    println!("Schema: {}", schema.name);
    if !schema.description.is_empty() {
        println!("{}", schema.description);
    }
    for field in &schema.fields {
        let mut extras = Vec::new();
        if !field.tags.align.is_empty() {
            extras.push(format!("align={}", field.tags.align));
        }
        if !field.tags.decimals.is_empty() {
            extras.push(format!("decimals={}", field.tags.decimals));
        }
        if !field.tags.flags.is_empty() {
            extras.push(format!("flags={}", field.tags.flags));
        }
        println!(
            "  {:>7}  {:<6} {} {}",
            field.tags.range,
            field.kind,
            field.name,
            extras.join(" ")
        );
    }
    Ok(())
}
