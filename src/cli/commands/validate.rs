use tracing::{info, warn};

use crate::cli::args::ValidateArgs;
use crate::config::ConfigLoader;
use crate::error::{ConfigError, GameError, Severity, ValidationIssue};

/// Validates each configuration file in turn, stopping at the first failure.
///
/// # Errors
///
/// Returns the first file's load or validation error. With `--strict`,
/// warnings fail validation too.
pub fn run(args: &ValidateArgs) -> Result<(), GameError> {
    let loader = ConfigLoader::with_defaults();

    for path in &args.files {
        let result = loader.load(path)?;

        for warning in &result.warnings {
            warn!(file = %path.display(), "{warning}");
        }

        if args.strict && !result.warnings.is_empty() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: result
                    .warnings
                    .iter()
                    .map(|w| ValidationIssue {
                        path: w.location.clone().unwrap_or_default(),
                        message: w.message.clone(),
                        severity: Severity::Error,
                    })
                    .collect(),
            }
            .into());
        }

        info!(
            file = %path.display(),
            targets = result.config.game.targets,
            "configuration valid"
        );
        println!(
            "{}: ok ({} warning{})",
            path.display(),
            result.warnings.len(),
            if result.warnings.len() == 1 { "" } else { "s" }
        );
    }

    Ok(())
}
