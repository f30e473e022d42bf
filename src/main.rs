//! xliff-l10n CLI - localization pipeline tools for XLIFF locale trees

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use xliff_l10n::{
    clean_reference, default_locale_overrides, extract_reference, prune_obsolete,
    set_language_all, update_locales, CheckExceptions, Checker, CleanupOptions, KeyPolicy,
    LconvertExtractor, PathRewrite, UpdateOptions,
};

#[derive(Parser)]
#[command(name = "xliff-l10n")]
#[command(about = "Localization pipeline tools for XLIFF 1.2 locale trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild locale files from the reference, keeping matching translations
    Update {
        /// Reference locale code
        #[arg(long)]
        reference: String,

        /// Root folder with one subfolder per locale
        #[arg(long)]
        path: PathBuf,

        /// XLIFF file name inside each locale folder
        #[arg(long)]
        file: String,

        /// How existing translations are matched
        #[arg(long = "type", value_enum, default_value = "standard")]
        policy: KeyPolicy,

        /// Locales to process (default: every subfolder except the reference)
        locales: Vec<String>,
    },

    /// Validate translated strings against the reference
    Check {
        /// Root folder with one subfolder per locale
        #[arg(long)]
        path: PathBuf,

        /// JSON exceptions file
        #[arg(long)]
        exceptions: Option<PathBuf>,

        /// Also save the report to a file
        #[arg(long)]
        dest: Option<PathBuf>,
    },

    /// Run the extraction tool and clean up the reference file
    Extract {
        /// Translation-source file (.ts) to extract from
        #[arg(long)]
        input: PathBuf,

        /// Root folder with one subfolder per locale
        #[arg(long)]
        path: PathBuf,

        /// Reference locale code
        #[arg(long, default_value = "en")]
        reference: String,

        /// XLIFF file name to write inside the reference folder
        #[arg(long)]
        file: String,

        /// Directory holding the Qt tools (default: PATH)
        #[arg(long)]
        tool_dir: Option<PathBuf>,

        /// Rewrite group path prefixes, FROM=TO (repeatable)
        #[arg(long = "rewrite", value_parser = PathRewrite::parse)]
        rewrites: Vec<PathRewrite>,

        /// Drop leading ../ segments from group paths
        #[arg(long)]
        collapse_parent_refs: bool,
    },

    /// Strip translations from a reference file and sort it
    Clean {
        /// XLIFF file to clean
        file: PathBuf,
    },

    /// Set the target-language of every XLIFF file under a folder
    SetLanguage {
        /// Folder to process recursively
        #[arg(long)]
        path: PathBuf,

        /// Language code to set
        #[arg(long)]
        language: String,
    },

    /// Remove locale files with no reference counterpart
    Prune {
        /// Reference locale code
        #[arg(long)]
        reference: String,

        /// Root folder with one subfolder per locale
        #[arg(long)]
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Update {
            reference,
            path,
            file,
            policy,
            locales,
        } => {
            let options = UpdateOptions {
                base_path: path,
                reference_locale: reference,
                filename: file,
                policy,
                locales,
                overrides: default_locale_overrides(),
            };

            let report = match update_locales(&options) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("{} {}", "ERROR:".red(), e);
                    return ExitCode::FAILURE;
                }
            };

            for (locale, reason) in &report.skipped {
                eprintln!("{} skipping {}: {}", "WARNING:".yellow(), locale, reason);
            }
            for outcome in &report.updated {
                let action = if outcome.created { "Created" } else { "Updated" };
                println!(
                    "{} {} ({} translated, {} untranslated)",
                    action.green(),
                    outcome.path.display(),
                    outcome.stats.carried,
                    outcome.stats.untranslated
                );
            }

            if report.updated.is_empty() {
                eprintln!("{}", "No locales updated.".red());
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }

        Commands::Check {
            path,
            exceptions,
            dest,
        } => {
            let exceptions = match exceptions {
                Some(ref file) => match CheckExceptions::load(file) {
                    Ok(exceptions) => exceptions,
                    Err(e) => {
                        eprintln!("{} {}", "ERROR:".red(), e);
                        return ExitCode::FAILURE;
                    }
                },
                None => CheckExceptions::default(),
            };

            let report = match Checker::new(exceptions).check_tree(&path) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("{} {}", "ERROR:".red(), e);
                    return ExitCode::FAILURE;
                }
            };

            for (path, reason) in &report.unreadable {
                eprintln!("{} can't parse {}: {}", "ERROR:".red(), path.display(), reason);
            }

            if report.is_clean() {
                println!("{}", "No issues found.".green());
                return ExitCode::SUCCESS;
            }

            let output = report.render();
            if let Some(ref dest) = dest {
                println!("Saving output to {}", dest.display());
                if let Err(e) = fs::write(dest, &output) {
                    eprintln!("{} can't write {}: {}", "ERROR:".red(), dest.display(), e);
                    return ExitCode::FAILURE;
                }
            }
            println!("{output}");
            ExitCode::FAILURE
        }

        Commands::Extract {
            input,
            path,
            reference,
            file,
            tool_dir,
            rewrites,
            collapse_parent_refs,
        } => {
            let output = path.join(&reference).join(&file);
            println!("Updating {}", output.display());

            let extractor = LconvertExtractor { tool_dir };
            let options = CleanupOptions {
                rewrites,
                collapse_parent_refs,
            };
            match extract_reference(&extractor, &input, &output, &options) {
                Ok(doc) => {
                    println!(
                        "{} {} strings in {} files",
                        "Extracted".green(),
                        doc.unit_count(),
                        doc.groups.len()
                    );
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("{} {}", "ERROR:".red(), e);
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Clean { file } => match clean_reference(&file) {
            Ok(()) => {
                println!("{} {}", "Cleaned".green(), file.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{} {}", "ERROR:".red(), e);
                ExitCode::FAILURE
            }
        },

        Commands::SetLanguage { path, language } => {
            match set_language_all(&path, &language) {
                Ok(count) => {
                    println!("{} target-language={} in {} files", "Set".green(), language, count);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("{} {}", "ERROR:".red(), e);
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Prune { reference, path } => match prune_obsolete(&path, &reference) {
            Ok(removed) => {
                for file in &removed {
                    println!("Removing {}", file.display());
                }
                println!("{} {} obsolete files", "Removed".green(), removed.len());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{} {}", "ERROR:".red(), e);
                ExitCode::FAILURE
            }
        },
    }
}
