use anyhow::{Result, anyhow};

use crate::layout::FieldTags;
use crate::schema::{Schema, SchemaField};

/// A built-in record layout shipped with the crate.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [TemplateField],
}

/// Field metadata for a [`Template`]. Empty strings mean "not set".
#[derive(Debug, Clone)]
pub struct TemplateField {
    pub name: &'static str,
    pub kind: &'static str,
    pub range: &'static str,
    pub align: &'static str,
    pub decimals: &'static str,
    pub flags: &'static str,
}

impl Template {
    /// Convert the template into an owned [`Schema`] ready to compile.
    pub fn schema(&self) -> Schema {
        Schema {
            name: self.name.to_string(),
            description: self.description.to_string(),
            fields: self
                .fields
                .iter()
                .map(|field| SchemaField {
                    name: field.name.to_string(),
                    kind: field.kind.to_string(),
                    tags: FieldTags {
                        range: field.range.to_string(),
                        align: field.align.to_string(),
                        decimals: field.decimals.to_string(),
                        flags: field.flags.to_string(),
                    },
                })
                .collect(),
        }
    }
}

/// Registry of built-in layouts recognised by the CLI.
pub struct TemplateRegistry;

impl TemplateRegistry {
    /// Return the set of available templates.
    pub fn list() -> Vec<&'static Template> {
        vec![&PERSON, &LEDGER]
    }

    /// Resolve a template by name (case-insensitive).
    pub fn get(name: &str) -> Result<&'static Template> {
        Self::list()
            .into_iter()
            .find(|tpl| tpl.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow!("unknown template '{}'", name))
    }
}

macro_rules! tpl_field {
    ($name:expr, $kind:expr, $range:expr) => {
        tpl_field!($name, $kind, $range, "", "", "")
    };
    ($name:expr, $kind:expr, $range:expr, $align:expr, $decimals:expr, $flags:expr) => {
        TemplateField {
            name: $name,
            kind: $kind,
            range: $range,
            align: $align,
            decimals: $decimals,
            flags: $flags,
        }
    };
}

static PERSON_FIELDS: &[TemplateField] = &[
    tpl_field!("full_name", "string", "0,20"),
    tpl_field!("birth_date", "date", "20,28"),
    tpl_field!("ssn", "string", "28,37"),
    tpl_field!("income", "float", "37,-1"),
];

static LEDGER_FIELDS: &[TemplateField] = &[
    tpl_field!("account", "string", "0,10"),
    tpl_field!("amount", "float", "10,21", "", "2", "zerofill"),
    tpl_field!("currency", "string", "21,24"),
    tpl_field!("posted", "date", "24,32"),
    tpl_field!("reversal", "bool", "32,37", "", "", "optional"),
];

static PERSON: Template = Template {
    name: "person",
    description: "Name, birth date, SSN and an open-ended income column.",
    fields: PERSON_FIELDS,
};

static LEDGER: Template = Template {
    name: "ledger",
    description: "Posting line with a signed-overpunch amount in cents.",
    fields: LEDGER_FIELDS,
};
