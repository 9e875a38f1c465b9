//! Compatibility query handler

use super::load_meta;
use crate::cli::CompatArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use tracing::instrument;
use verminator_core::VersionIdentifier;

/// Handle the compat command
#[instrument(skip(config, output), fields(version = %args.version))]
pub fn handle_compat(args: CompatArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let version = VersionIdentifier::parse(&args.version)?;
    let meta = load_meta(args.meta.as_deref(), config)?;

    let compatible = meta.get_compatible_versions(&version)?;
    tracing::info!(products = compatible.len(), "Resolved compatible versions");
    output.compatible_versions(&version, &compatible)
}
