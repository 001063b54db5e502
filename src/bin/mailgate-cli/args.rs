use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mailgate_lib::{EngineConfig, ValidationOptions};

#[derive(Parser)]
#[command(name = "mailgate-cli", version, about = "Validation d'adresses e-mail")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    /// format: human|json|ndjson|csv
    #[arg(long, global = true, default_value = "human")]
    pub format: String,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// URL de la liste de domaines jetables (tableau JSON)
    #[arg(long, global = true)]
    pub disposable_url: Option<String>,

    /// lit la liste de domaines jetables depuis un fichier JSON local
    #[arg(long, global = true, conflicts_with = "disposable_url")]
    pub disposable_file: Option<PathBuf>,

    #[command(flatten)]
    pub options: OptionFlags,
}

#[derive(Subcommand)]
pub enum Commands {
    /// pipeline complet: jetable, syntaxe, littéral, MX
    Validate { email: String },
    /// vérifie uniquement si le domaine est jetable
    CheckDisposable { email: String },
    /// vérifie uniquement les enregistrements MX
    CheckMx { email: String },
    /// valide une adresse par ligne (stdin par défaut)
    Bulk {
        /// fichier d'entrée au lieu de stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct OptionFlags {
    /// autorise les caractères non-ASCII dans la partie locale
    #[arg(long, global = true)]
    pub allow_smtputf8: bool,

    /// autorise une partie locale vide
    #[arg(long, global = true)]
    pub allow_empty_local: bool,

    /// autorise une partie locale entre guillemets
    #[arg(long, global = true)]
    pub allow_quoted_local: bool,

    /// autorise un domaine littéral ([192.0.2.1])
    #[arg(long, global = true)]
    pub allow_domain_literal: bool,

    /// autorise la forme `Nom <adresse>`
    #[arg(long, global = true)]
    pub allow_display_name: bool,

    /// saute la vérification MX
    #[arg(long, global = true)]
    pub no_deliverability: bool,

    /// environnement de test (pas de requête DNS)
    #[arg(long, global = true)]
    pub test_environment: bool,

    /// n'exclut pas les TLD réservés (local, example, invalid, test)
    #[arg(long, global = true)]
    pub no_global_check: bool,

    /// timeout DNS par adresse (secondes)
    #[arg(long = "timeout", global = true, default_value_t = 10)]
    pub timeout_seconds: u64,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn validation_options(&self) -> ValidationOptions {
        let flags = &self.options;
        ValidationOptions {
            allow_smtp_utf8: flags.allow_smtputf8,
            allow_empty_local: flags.allow_empty_local,
            allow_quoted_local: flags.allow_quoted_local,
            allow_domain_literal: flags.allow_domain_literal,
            allow_display_name: flags.allow_display_name,
            check_deliverability: !flags.no_deliverability,
            test_environment: flags.test_environment,
            globally_deliverable: !flags.no_global_check,
            timeout_seconds: flags.timeout_seconds,
        }
    }

    /// CLI flags take precedence over the environment.
    pub fn apply_overrides(&self, config: &mut EngineConfig) {
        if let Some(url) = &self.disposable_url {
            config.disposable_url = url.clone();
        }
    }
}
