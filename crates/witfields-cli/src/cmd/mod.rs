pub mod allowed;
pub mod edit;
pub mod fields;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::Args;
use tracing::debug;
use witfields_core::WitContext;
use witfields_core::config::{self, EngineConfig};

/// Snapshot selection shared by every command.
#[derive(Args, Debug, Clone)]
pub struct MetadataArgs {
    /// Metadata snapshot (JSON) to load.
    #[arg(long, short = 'm', value_name = "SNAPSHOT")]
    pub metadata: PathBuf,
}

/// Explicit config file, or `.witfields/config.toml` under the current
/// directory when present.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match explicit {
        Some(path) => config::load_config_file(path),
        None => {
            let root = std::env::current_dir().context("Failed to resolve current directory")?;
            config::load_project_config(&root)
        }
    }
}

pub fn load_context(args: &MetadataArgs, config_path: Option<&Path>) -> anyhow::Result<Arc<WitContext>> {
    let config = load_config(config_path)?;
    debug!(?config, snapshot = %args.metadata.display(), "loading metadata");
    WitContext::from_json_file(&args.metadata, config)
}
