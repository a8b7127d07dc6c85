//! `witf allowed`: allowed values of one field.

use std::path::Path;

use clap::Args;
use serde::Serialize;

use crate::cmd::{MetadataArgs, load_context};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

#[derive(Args, Debug)]
pub struct AllowedArgs {
    #[command(flatten)]
    pub source: MetadataArgs,

    /// Field id, reference name or display name.
    pub field: String,
}

#[derive(Debug, Serialize)]
struct AllowedOutput {
    id: i32,
    reference_name: String,
    /// `None` when the values cannot be resolved from metadata.
    values: Option<Vec<String>>,
}

pub fn run_allowed(args: &AllowedArgs, output: OutputMode, config: Option<&Path>) -> anyhow::Result<()> {
    let ctx = load_context(&args.source, config)?;
    let key = args.field.trim();
    let lookup = match key.parse::<i32>() {
        Ok(id) => ctx.registry().require(id),
        Err(_) => ctx.registry().require(key),
    };
    let def = match lookup {
        Ok(def) => def,
        Err(e) => {
            render_error(output, &CliError::from(&e))?;
            return Err(e.into());
        }
    };

    let payload = AllowedOutput {
        id: def.id(),
        reference_name: def.reference_name().to_string(),
        values: ctx
            .allowed_values(&def)
            .map(|values| values.as_slice().to_vec()),
    };

    render_mode(
        output,
        &payload,
        |p, w| {
            for value in p.values.iter().flatten() {
                writeln!(w, "{value}")?;
            }
            Ok(())
        },
        |p, w| {
            pretty_section(w, &format!("Allowed values of {} ({})", p.reference_name, p.id))?;
            match &p.values {
                None => writeln!(w, "(not resolvable from metadata)"),
                Some(values) if values.is_empty() => writeln!(w, "(any value)"),
                Some(values) => {
                    for value in values {
                        writeln!(w, "  {value}")?;
                    }
                    pretty_kv(w, "Count", values.len().to_string())
                }
            }
        },
    )
}
