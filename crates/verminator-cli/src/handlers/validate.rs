//! Validation command handler

use super::load_meta;
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};
use verminator_core::document::{discover_instance_files, save_instance};
use verminator_core::{InstanceValidator, ProductInstance, ValidationReport};

/// Handle the validate command.
///
/// Every instance is attempted; the command fails afterwards when any of
/// them had a fatal error.
#[instrument(skip_all, fields(paths = args.paths.len(), write = args.write))]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::new("validate_command");
    let meta = load_meta(args.meta.as_deref(), config)?;
    let validator = InstanceValidator::new(&meta, config.settings(), config.validator_options());

    let files = collect_files(&args.paths)?;
    info!(files = files.len(), "Validating instance files");
    output.info(&format!("Validating {} instance file(s)", files.len()))?;

    let progress = output.progress_bar(files.len() as u64, "validating");
    let mut rows = Vec::with_capacity(files.len());
    let mut failed = 0;

    for file in &files {
        if let Some(pb) = &progress {
            pb.set_message(file.display().to_string());
        }

        let status = match validate_file(&validator, file, args.write) {
            Ok(report) => {
                for warning in &report.warnings {
                    warn!(file = %file.display(), "{}", warning);
                }
                let status = match (report.warnings.len(), report.is_repaired() && args.write) {
                    (0, _) => "ok".to_string(),
                    (n, true) => format!("{} warning(s), written", n),
                    (n, false) => format!("{} warning(s)", n),
                };
                output.validation_report(&report)?;
                status
            }
            Err(e) => {
                failed += 1;
                error!(file = %file.display(), error = %e, "Instance failed validation");
                output.error(&format!("✗ {}: {}", file.display(), e))?;
                format!("failed ({})", error_kind(&e))
            }
        };
        rows.push(vec![file.display().to_string(), status]);

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    output.section("Summary")?;
    output.table(&["File", "Status"], rows)?;

    if failed > 0 {
        return Err(Error::ValidationFailed {
            failed,
            total: files.len(),
        });
    }
    output.success(&format!("✓ {} instance file(s) validated", files.len()))
}

/// Expand directories into the instance files below them
fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(Error::FileNotFound { path: path.clone() });
        }
        files.extend(discover_instance_files(path)?);
    }
    // overlapping arguments such as `dir dir/app.yml` name a file twice
    files.sort();
    files.dedup();
    debug!(files = files.len(), "Collected instance files");
    Ok(files)
}

fn validate_file(validator: &InstanceValidator<'_>, file: &Path, write: bool) -> Result<ValidationReport> {
    let _timer = Timer::with_details("validate_instance", &file.display().to_string());

    let instance = ProductInstance::load(file)?;
    let report = validator.validate(instance)?;

    if write && report.is_repaired() {
        info!(file = %file.display(), "Writing repaired instance");
        save_instance(file, &report.instance.to_document())?;
    }
    Ok(report)
}

fn error_kind(error: &Error) -> String {
    match error {
        Error::Core(core) => core.kind().to_string(),
        _ => "error".to_string(),
    }
}
