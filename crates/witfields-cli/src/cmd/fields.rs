//! `witf fields`: list field definitions.

use std::path::Path;

use clap::Args;
use serde::Serialize;
use witfields_core::field::storage::FieldType;
use witfields_core::field::{FieldDefinition, FieldUsage};

use crate::cmd::{MetadataArgs, load_context};
use crate::output::{OutputMode, pretty_rule, render_mode};

#[derive(Args, Debug)]
pub struct FieldsArgs {
    #[command(flatten)]
    pub source: MetadataArgs,

    /// Include link and type-extension fields.
    #[arg(long)]
    pub all: bool,

    /// Sort by display name instead of snapshot order.
    #[arg(long)]
    pub sort: bool,
}

#[derive(Debug, Clone, Serialize)]
struct FieldRow {
    id: i32,
    reference_name: String,
    name: String,
    field_type: FieldType,
    usage: FieldUsage,
    flags: Vec<&'static str>,
}

fn flags_of(def: &FieldDefinition) -> Vec<&'static str> {
    [
        (def.is_readonly(), "readonly"),
        (def.is_ignored(), "ignored"),
        (def.is_computed(), "computed"),
        (def.is_queryable(), "queryable"),
        (def.is_sortable(), "sortable"),
        (def.is_long_text(), "long_text"),
        (def.is_indexed(), "indexed"),
        (def.supports_text_query(), "text_query"),
        (def.can_copy(), "copyable"),
    ]
    .into_iter()
    .filter_map(|(on, flag)| on.then_some(flag))
    .collect()
}

pub fn run_fields(args: &FieldsArgs, output: OutputMode, config: Option<&Path>) -> anyhow::Result<()> {
    let ctx = load_context(&args.source, config)?;
    let mut defs = if args.all {
        ctx.registry().definitions()
    } else {
        ctx.registry().work_item_definitions()
    };
    if args.sort {
        defs.sort_by(|a, b| a.cmp_by_name(b));
    }

    let rows: Vec<FieldRow> = defs
        .iter()
        .map(|def| FieldRow {
            id: def.id(),
            reference_name: def.reference_name().to_string(),
            name: def.name().to_string(),
            field_type: def.field_type(),
            usage: def.usage(),
            flags: flags_of(def),
        })
        .collect();

    render_mode(
        output,
        &rows,
        |rows, w| {
            for row in rows {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}\t{}",
                    row.id,
                    row.reference_name,
                    row.name,
                    row.field_type,
                    row.flags.join(",")
                )?;
            }
            Ok(())
        },
        |rows, w| {
            if rows.is_empty() {
                return writeln!(w, "(no fields)");
            }
            writeln!(w, "{:>7}  {:<36} {:<24} {:<9} FLAGS", "ID", "REFERENCE NAME", "NAME", "TYPE")?;
            pretty_rule(w)?;
            for row in rows {
                writeln!(
                    w,
                    "{:>7}  {:<36} {:<24} {:<9} {}",
                    row.id,
                    row.reference_name,
                    row.name,
                    row.field_type.as_str(),
                    row.flags.join(" ")
                )?;
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: FieldsArgs,
    }

    #[test]
    fn parses_flags() {
        let w = Wrapper::parse_from(["test", "-m", "snap.json", "--all", "--sort"]);
        assert!(w.args.all);
        assert!(w.args.sort);
        assert_eq!(w.args.source.metadata, Path::new("snap.json"));
    }

    #[test]
    fn metadata_is_required() {
        assert!(Wrapper::try_parse_from(["test"]).is_err());
    }
}
