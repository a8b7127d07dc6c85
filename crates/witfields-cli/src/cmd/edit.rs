//! `witf edit`: load or create a work item, apply user edits and report the
//! resulting field states.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::Args;
use serde::Serialize;
use tracing::debug;
use witfields_core::field::{FieldModificationType, FieldRef, FieldStatus};
use witfields_core::work_item::WorkItemRecord;
use witfields_core::{FieldError, FieldValue, WorkItem};

use crate::cmd::{MetadataArgs, load_context};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

/// Source tag attached to every edit made from the command line.
const EDIT_SOURCE: &str = "witf";

#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub source: MetadataArgs,

    /// Work-item rows (JSON) as sent by the server.
    #[arg(long, value_name = "ITEM", conflicts_with = "project")]
    pub item: Option<PathBuf>,

    /// Start from a new, unsaved item in this project instead.
    #[arg(long, value_name = "PROJECT_ID")]
    pub project: Option<i32>,

    /// Field edit. An empty value clears the field.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub sets: Vec<(String, String)>,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))
}

#[derive(Debug, Serialize)]
struct FieldState {
    id: i32,
    reference_name: String,
    value: Option<String>,
    original: Option<String>,
    dirty: bool,
    status: FieldStatus,
    modification: Option<FieldModificationType>,
}

impl From<FieldRef<'_>> for FieldState {
    fn from(field: FieldRef<'_>) -> Self {
        Self {
            id: field.id(),
            reference_name: field.reference_name().to_string(),
            value: field.value().map(|v| v.to_string()),
            original: field.original_value().map(|v| v.to_string()),
            dirty: field.is_dirty(),
            status: field.status(),
            modification: field.modification_type(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EditOutput {
    fields: Vec<FieldState>,
    dirty: bool,
    valid: bool,
    invalid_fields: Vec<i32>,
}

fn apply(item: &mut WorkItem, name: &str, value: &str) -> Result<i32, FieldError> {
    let data = (!value.is_empty()).then(|| FieldValue::from(value));
    let mut field = match name.parse::<i32>() {
        Ok(id) => item.field_mut(id)?,
        Err(_) => item.field_mut(name)?,
    };
    field.set_value_from(Some(EDIT_SOURCE), data)?;
    Ok(field.view().id())
}

fn load_item(args: &EditArgs, output: OutputMode, config: Option<&Path>) -> anyhow::Result<WorkItem> {
    let ctx = load_context(&args.source, config)?;
    let result = match (&args.item, args.project) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read work item {}", path.display()))?;
            let record: WorkItemRecord = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse work item {}", path.display()))?;
            WorkItem::from_server(Arc::clone(&ctx), &record)
        }
        (None, Some(project)) => WorkItem::new_unsaved(Arc::clone(&ctx), project),
        (None, None) => anyhow::bail!("either --item or --project is required"),
    };
    result.or_else(|e| fail(output, &e))
}

fn fail<T>(output: OutputMode, err: &FieldError) -> anyhow::Result<T> {
    render_error(output, &CliError::from(err))?;
    Err(err.clone().into())
}

pub fn run_edit(args: &EditArgs, output: OutputMode, config: Option<&Path>) -> anyhow::Result<()> {
    let mut item = load_item(args, output, config)?;

    let mut touched: Vec<i32> = Vec::new();
    for (name, value) in &args.sets {
        match apply(&mut item, name, value) {
            Ok(id) => {
                debug!(field = %name, field_id = id, "applied edit");
                if !touched.contains(&id) {
                    touched.push(id);
                }
            }
            Err(e) => return fail(output, &e),
        }
    }
    for change in item.take_changes() {
        if !touched.contains(&change.field_id) {
            touched.push(change.field_id);
        }
    }
    if args.sets.is_empty() {
        touched = item.iter_fields().map(|f| f.id()).collect();
    }

    let mut fields = Vec::with_capacity(touched.len());
    for id in touched {
        let field = match item.peek(id) {
            Ok(field) => field,
            Err(e) => return fail(output, &e),
        };
        fields.push(FieldState::from(field));
    }

    let payload = EditOutput {
        fields,
        dirty: item.is_dirty(),
        valid: item.is_valid(),
        invalid_fields: item.fields().invalid_fields(),
    };

    render_mode(
        output,
        &payload,
        |p, w| {
            for f in &p.fields {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}",
                    f.reference_name,
                    f.value.as_deref().unwrap_or(""),
                    if f.dirty { "dirty" } else { "clean" },
                    f.status
                )?;
            }
            writeln!(w, "item\tdirty={}\tvalid={}", p.dirty, p.valid)
        },
        |p, w| {
            pretty_section(w, "Fields")?;
            for f in &p.fields {
                let marker = if f.dirty { "*" } else { " " };
                writeln!(
                    w,
                    "{marker} {:<32} {:<28} {}",
                    f.reference_name,
                    f.value.as_deref().unwrap_or("(null)"),
                    f.status
                )?;
            }
            writeln!(w)?;
            pretty_kv(w, "Dirty", p.dirty.to_string())?;
            pretty_kv(w, "Valid", p.valid.to_string())
        },
    )
}
