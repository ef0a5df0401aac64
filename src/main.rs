#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use smilcorpus::app_config::{Config, LogLevel};
use smilcorpus::app_controller::{Controller, RunOptions};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for smilcorpus
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// smilcorpus - speech corpora from EPUB 3 read-aloud books
///
/// Splits the narration of a media-overlay EPUB into sentence clips,
/// each paired with its transcript.
#[derive(Parser, Debug)]
#[command(name = "smilcorpus")]
#[command(version)]
#[command(about = "Build a text/audio aligned speech corpus from an EPUB 3 audiobook")]
#[command(long_about = "smilcorpus extracts an EPUB 3 read-aloud book, converts its narration to
16 kHz mono WAV, cuts it at the sentence boundaries given by the SMIL media
overlays and writes one clip and one transcript per sentence.

EXAMPLES:
    smilcorpus book.epub out/                   # Build the corpus in out/
    smilcorpus book.epub out/ --subs none       # Keep transcripts verbatim
    smilcorpus book.epub out/ --skip-extract    # Reuse already extracted content
    smilcorpus completions bash > smilcorpus.bash

OUTPUT:
    out/Align/<track>/<track>.TextGrid          # 'sentences' interval tier
    out/Align/<track>/wav/<track>_<n>.wav       # one clip per sentence
    out/Align/<track>/text/<track>_<n>.txt      # one transcript per sentence
    out/marytts/                                # MaryTTS voice-import links

CONFIGURATION:
    Configuration is stored in smilcorpus.json by default. You can specify a
    different file with --config. If the file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the EPUB 3 audiobook
    #[arg(value_name = "EPUB")]
    epub: Option<PathBuf>,

    /// Directory receiving the extracted book and the corpus
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Name of the regex substitution profile
    #[arg(long)]
    subs: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "smilcorpus.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Print DEBUG messages to the console
    #[arg(long, conflicts_with = "log_level")]
    debug: bool,

    /// Do not unpack the EPUB; OUTPUT_DIR already holds its content
    #[arg(long)]
    skip_extract: bool,

    /// Do not create the MaryTTS project links
    #[arg(long)]
    no_scaffold: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Accept everything here; the effective level is set once options are known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "smilcorpus", &mut std::io::stdout());
        return Ok(());
    }

    run_prepare(cli)
}

fn run_prepare(options: CommandLineOptions) -> Result<()> {
    let cli_log_level: Option<LogLevel> = if options.debug {
        Some(LogLevel::Debug)
    } else {
        options.log_level.clone().map(Into::into)
    };
    if let Some(level) = &cli_log_level {
        log::set_max_level(level.to_level_filter());
    }

    let epub_path = options
        .epub
        .clone()
        .ok_or_else(|| anyhow!("EPUB is required when no subcommand is specified"))?;
    let output_dir = options
        .output_dir
        .clone()
        .ok_or_else(|| anyhow!("OUTPUT_DIR is required when no subcommand is specified"))?;

    let mut config = load_or_create_config(Path::new(&options.config_path))?;

    // Command line options take precedence over the config file
    if let Some(subs) = &options.subs {
        config.substitution_profile = subs.clone();
    }
    if options.no_scaffold {
        config.scaffold_marytts = false;
    }
    match cli_log_level {
        Some(level) => config.log_level = level,
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    debug!("{:?}", options);
    debug!("{:?}", config);

    let controller = Controller::with_config(config)?;
    let run_options = RunOptions {
        skip_extract: options.skip_extract,
    };
    controller
        .run(&epub_path, &output_dir, &run_options)
        .with_context(|| format!("Failed to build corpus from {:?}", epub_path))?;

    Ok(())
}

fn load_or_create_config(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        return Config::load(config_path);
    }

    warn!("Config file not found at {:?}, creating default config.", config_path);
    let config = Config::default();
    config.save(config_path)?;
    Ok(config)
}
