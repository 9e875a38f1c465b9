//! Release cloning handler

use crate::cli::CreateReleaseArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use tracing::instrument;
use verminator_core::document::save_instance;
use verminator_core::{ProductInstance, VersionIdentifier};

/// Handle the create-release command
#[instrument(skip(_config, output), fields(instance = %args.instance.display(), target = %args.target))]
pub fn handle_create_release(
    args: CreateReleaseArgs,
    _config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("create_release", &args.target);

    if !args.instance.exists() {
        return Err(Error::FileNotFound {
            path: args.instance.clone(),
        });
    }

    let target = VersionIdentifier::parse(&args.target)?;
    let from = args
        .from
        .as_deref()
        .map(VersionIdentifier::parse)
        .transpose()?;

    let mut instance = ProductInstance::load(&args.instance)?;
    let release = instance.create_release(&target, from.as_ref())?.clone();

    if args.dry_run {
        output.info("Dry run: instance file left unchanged")?;
    } else {
        save_instance(&args.instance, &instance.to_document())?;
        output.success(&format!(
            "✓ Added {} to {}",
            release.version(),
            args.instance.display()
        ))?;
    }

    output.release(&release)
}
