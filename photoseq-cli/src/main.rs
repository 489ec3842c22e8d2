use anyhow::{Context, Result};
use clap::Parser;
use photoseq_core::config::DefaultsConfig;
use photoseq_core::preview::should_use_color;
use photoseq_core::{
    confirmation_prompt_active, AssumeYes, Config, Confirmation, ConvertOptions, OutputFormatter,
    PhotoseqError, Preview, PromptConfirmation, RunOptions, VersionResult,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod cli;
mod convert;
mod number;
mod order;
mod status;

use cli::{Cli, Commands, OutputFormat, PreviewArg};

/// How a command finished when it did not return an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed,
    /// Some renames or conversions failed while the rest went through
    ItemsFailed,
}

impl CommandOutcome {
    pub fn from_failures(failures: usize) -> Self {
        if failures == 0 {
            Self::Completed
        } else {
            Self::ItemsFailed
        }
    }

    fn exit_code(self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::ItemsFailed => 1,
        }
    }
}

fn main() {
    let interrupted = Arc::new(AtomicBool::new(false));

    // Handle SIGINT (Ctrl-C)
    let interrupted_clone = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || {
        // Nothing has been touched while we wait for an answer
        if confirmation_prompt_active() {
            eprintln!("\nCancelled - nothing was changed");
            process::exit(130);
        }
        eprintln!("\nReceived SIGINT. Finishing the current step...");
        interrupted_clone.store(true, Ordering::SeqCst);
    }) {
        eprintln!("Warning: failed to set Ctrl-C handler: {e}");
    }

    let cli = Cli::parse();

    // Handle -C directory flag
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to change to directory: {}", dir.display()))
            .unwrap_or_else(|e| {
                eprintln!("Error: {e:#}");
                process::exit(2);
            });
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        process::exit(2);
    });
    let use_color = !cli.no_color && should_use_color(config.defaults.use_color);

    let result = run_command(cli, &config.defaults, use_color, &interrupted);

    // Check if we were interrupted during execution
    if interrupted.load(Ordering::SeqCst) {
        eprintln!("Operation interrupted");
        process::exit(130);
    }

    match result {
        Ok(outcome) => process::exit(outcome.exit_code()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(exit_code_for(&e));
        },
    }
}

fn run_command(
    cli: Cli,
    defaults: &DefaultsConfig,
    use_color: bool,
    interrupted: &Arc<AtomicBool>,
) -> Result<CommandOutcome> {
    let run_options = |preview: Option<PreviewArg>,
                       dry_run: bool,
                       journal: Option<PathBuf>,
                       quiet: bool| RunOptions {
        preview: preview_format(preview, defaults),
        preview_limit: defaults.preview_limit,
        dry_run,
        use_color,
        quiet,
        journal,
        journal_dir: defaults.journal_dir.clone(),
        interrupt: Some(Arc::clone(interrupted)),
    };

    match cli.command {
        Commands::Order {
            manifest,
            overwrite,
            rename,
        } => {
            let directory = rename.dir.unwrap_or_else(|| defaults.photos_dir.clone());
            let manifest = manifest.unwrap_or_else(|| defaults.manifest.clone());
            let run = run_options(rename.preview, rename.dry_run, rename.journal, rename.quiet);
            let mut confirmation = confirmation_for(cli.yes, rename.output);
            order::handle_order(
                &directory,
                &manifest,
                overwrite,
                &run,
                confirmation.as_mut(),
                rename.output,
            )
        },

        Commands::Number { rename } => {
            let directory = rename.dir.unwrap_or_else(|| defaults.photos_dir.clone());
            let run = run_options(rename.preview, rename.dry_run, rename.journal, rename.quiet);
            let mut confirmation = confirmation_for(cli.yes, rename.output);
            number::handle_number(&directory, &run, confirmation.as_mut(), rename.output)
        },

        Commands::Convert {
            dir,
            out,
            quality,
            format,
            preview,
            dry_run,
            output,
            quiet,
        } => {
            let directory = dir.unwrap_or_else(|| defaults.photos_dir.clone());
            let mut options =
                ConvertOptions::new(out.unwrap_or_else(|| defaults.output_dir.clone()));
            options.quality = match quality {
                Some(quality) => quality,
                None => defaults.quality()?,
            };
            options.format = format.map_or(defaults.format, Into::into);

            let run = run_options(preview, dry_run, None, quiet);
            let mut confirmation = confirmation_for(cli.yes, output);
            convert::handle_convert(&directory, options, &run, confirmation.as_mut(), output)
        },

        Commands::Status { dir, out, output } => {
            let directory = dir.unwrap_or_else(|| defaults.photos_dir.clone());
            let gallery_dir = out.unwrap_or_else(|| defaults.output_dir.clone());
            status::handle_status(&directory, &gallery_dir, output)
        },

        Commands::Version { output } => handle_version(output),

        Commands::Completions { shell, dir } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            generate_completions(shell, &mut cmd, "photoseq", &dir)?;
            Ok(CommandOutcome::Completed)
        },
    }
}

/// Use preview format from CLI arg or config default
fn preview_format(arg: Option<PreviewArg>, defaults: &DefaultsConfig) -> Preview {
    arg.or_else(|| PreviewArg::from_str(&defaults.preview_format))
        .map_or(Preview::List, Into::into)
}

/// `--yes` skips the prompt. With JSON output the prompt goes to stderr so
/// stdout stays parseable.
fn confirmation_for(yes: bool, output: OutputFormat) -> Box<dyn Confirmation> {
    if yes {
        return Box::new(AssumeYes);
    }
    match output {
        OutputFormat::Summary => Box::new(PromptConfirmation::stdio()),
        OutputFormat::Json => Box::new(PromptConfirmation::new(io::stdin().lock(), io::stderr())),
    }
}

/// 2 for configuration errors, 3 for everything else
fn exit_code_for(err: &anyhow::Error) -> i32 {
    if PhotoseqError::find(err).is_some() {
        2
    } else {
        3
    }
}

pub fn generate_completions<G: clap_complete::Generator>(
    gen: G,
    cmd: &mut clap::Command,
    name: &str,
    out_dir: &Path,
) -> Result<()> {
    use clap_complete::generate_to;
    use std::fs;

    fs::create_dir_all(out_dir)?;
    let path = generate_to(gen, cmd, name, out_dir)?;
    println!("Generated completion file: {}", path.display());
    Ok(())
}

fn handle_version(output: OutputFormat) -> Result<CommandOutcome> {
    let version_result = VersionResult {
        name: "photoseq".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    println!("{}", version_result.format(output.into()));
    Ok(CommandOutcome::Completed)
}
