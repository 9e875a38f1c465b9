//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod compat;
mod completions;
mod create_release;
mod validate;

pub use compat::handle_compat;
pub use completions::handle_completions;
pub use create_release::handle_create_release;
pub use validate::handle_validate;

use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use std::path::Path;
use verminator_core::ReleaseCompatibilityMeta;

/// Load the release matrix named by `--meta` or the config
fn load_meta(explicit: Option<&Path>, config: &Config) -> Result<ReleaseCompatibilityMeta> {
    let path = config.resolve_meta_file(explicit)?;
    let _timer = Timer::with_details("load_release_matrix", &path.display().to_string());
    tracing::debug!(path = %path.display(), "Loading release matrix");
    Ok(ReleaseCompatibilityMeta::load(&path, config.settings())?)
}
