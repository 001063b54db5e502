mod args;
mod output;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use mailgate_lib::{
    EngineConfig, FileListSource, ValidationError, ValidationOptions, ValidationVerdict,
    Validator,
};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};
use crate::output::{any_invalid, write_reports};

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = EngineConfig::from_env().context("read MAILGATE_* environment")?;
    cli.apply_overrides(&mut config);

    let validator = match &cli.disposable_file {
        Some(path) => Validator::from_config_with_source(FileListSource::new(path), &config),
        None => Validator::from_config(&config),
    }
    .context("initialise DNS resolver")?;

    let options = cli.validation_options();
    let rows = match &cli.cmd {
        Commands::Validate { email } => vec![validate_single(&validator, email, &options)?],
        Commands::CheckDisposable { email } => vec![validator.check_disposable(email)],
        Commands::CheckMx { email } => vec![validator.check_mx(email, &options)],
        Commands::Bulk { file } => {
            let emails = read_lines(file.as_deref())?;
            validator
                .validate_many(&emails, &options)
                .context("bulk validation")?
        }
    };

    write_reports(&rows, &cli)?;

    // codes de sortie : 0 OK, 2 invalids, 1 fatal
    if any_invalid(&rows) {
        std::process::exit(2);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Classified rejections become a verdict carrying the precise reason; an
/// unexpected resolver error is fatal.
fn validate_single(
    validator: &Validator,
    email: &str,
    options: &ValidationOptions,
) -> Result<ValidationVerdict> {
    match validator.validate(email, options) {
        Ok(verdict) => Ok(verdict),
        Err(err @ ValidationError::Resolver(_)) => Err(err).context("MX lookup failed"),
        Err(err) => Ok(ValidationVerdict::new(email, false, err.to_string())),
    }
}

/// Une adresse par ligne, lignes vides ignorées.
fn read_lines(path: Option<&Path>) -> Result<Vec<String>> {
    let reader: Box<dyn BufRead> = match path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut emails = Vec::new();
    for line in reader.lines() {
        let line = line.context("read input")?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            emails.push(trimmed.to_string());
        }
    }
    Ok(emails)
}
