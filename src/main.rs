// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use vocab_drill::app_config::{self, Config};
use vocab_drill::models::{SettingKey, Word, WordId};
use vocab_drill::{Controller, RoundOutcome};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum SettingCommand {
    /// Read a setting from the store
    Get {
        /// Setting key (max_repetitions, translation_direction, check_method, play_audio)
        key: SettingKey,
    },
    /// Write a setting to the store
    Set {
        /// Setting key
        key: SettingKey,
        /// New value
        value: String,
    },
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every word in the catalog
    Words,

    /// List the words in practice
    Selected,

    /// Add catalog words to practice
    Select {
        /// Word ids to promote
        #[arg(required = true)]
        ids: Vec<WordId>,
    },

    /// Remove a word from practice
    Unselect {
        /// Word id to remove
        id: WordId,
    },

    /// Remove every word from practice
    Clear,

    /// Read or write a setting
    #[command(subcommand)]
    Setting(SettingCommand),

    /// Drill the words in practice
    Practice {
        /// Stop after this many answers
        #[arg(short, long)]
        rounds: Option<usize>,
    },

    /// Generate shell completions for vocab-drill
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// vocab-drill - vocabulary practice against a remote word store
#[derive(Parser, Debug)]
#[command(name = "vocab-drill")]
#[command(version)]
#[command(about = "Vocabulary practice client")]
#[command(long_about = "vocab-drill keeps a practice list of words from a remote word store, drills them \
and tracks how often each one was remembered.

EXAMPLES:
    vocab-drill words                          # Show the whole catalog
    vocab-drill select 4 8 15                  # Add words to practice
    vocab-drill practice --rounds 20           # Drill twenty answers
    vocab-drill setting set max_repetitions 5  # Learn words after five repetitions
    vocab-drill completions bash > vocab-drill.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", alias = "config-path", default_value = "conf.json")]
    config_path: PathBuf,

    /// Word store URL, overrides the configuration
    #[arg(short, long, env = "VOCAB_DRILL_URL")]
    base_url: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Coloured stderr logger
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
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
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "vocab-drill", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(base_url) = &cli.base_url {
        config.store.base_url = base_url.clone();
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level.into();
    }
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::from_config(config)?;
    let result = run(&controller, cli.command).await;

    // Pending debounced writes must not be lost on exit
    if let Err(e) = controller.shutdown().await {
        warn!("Some settings could not be saved: {}", e);
    }
    result
}

async fn run(controller: &Controller, command: Commands) -> Result<()> {
    match command {
        Commands::Words => {
            pending("Loading catalog", controller.catalog().load()).await?;
            print_words(&controller.catalog().words());
        }
        Commands::Selected => {
            pending("Loading practice list", controller.session().load()).await?;
            print_words(&controller.session().words());
        }
        Commands::Select { ids } => {
            pending("Loading catalog", controller.catalog().load()).await?;
            pending("Loading practice list", controller.session().load()).await?;
            let promoted = pending("Selecting words", controller.promote(&ids)).await?;
            info!("{} word(s) added to practice", promoted);
        }
        Commands::Unselect { id } => {
            pending("Loading practice list", controller.session().load()).await?;
            if pending("Removing word", controller.demote(id)).await? {
                info!("Word {} removed from practice", id);
            }
        }
        Commands::Clear => {
            pending("Clearing practice list", controller.clear_practice()).await?;
        }
        Commands::Setting(SettingCommand::Get { key }) => {
            let value = pending("Loading setting", controller.settings().get_setting(key)).await?;
            println!("{} = {}", key, value);
        }
        Commands::Setting(SettingCommand::Set { key, value }) => {
            if !pending("Saving setting", controller.settings().set_setting(key, value)).await? {
                warn!("{} was not changed", key);
            }
            println!("{} = {}", key, controller.settings().value(key));
        }
        Commands::Practice { rounds } => practice(controller, rounds).await?,
        // Handled before the configuration is loaded
        Commands::Completions { .. } => {}
    }
    Ok(())
}

/// Show a spinner while a remote call is in flight
async fn pending<F, T, E>(message: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = future.await;
    spinner.finish_and_clear();
    result.with_context(|| format!("{} failed", message))
}

fn print_words(words: &[Word]) {
    for word in words {
        let marker = if word.selected { "*" } else { " " };
        println!(
            "{} {:>5}  {:<20} {:<20} reps: {}",
            marker,
            word.id,
            word.english,
            word.translation_text(),
            word.repetition_count
        );
    }
    println!("{} word(s)", words.len());
}

async fn practice(controller: &Controller, rounds: Option<usize>) -> Result<()> {
    pending("Loading", controller.bootstrap()).await?;
    let max = controller.settings().max_repetitions();
    info!("{} word(s) in practice, learned after {} repetitions", controller.session().len(), max);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut answered = 0;

    while rounds.is_none_or(|limit| answered < limit) {
        let Some(word) = controller.session().active_word() else {
            println!("Nothing left to practice.");
            break;
        };

        match &word.transcription {
            Some(transcription) => println!("\n{} [{}]", word.english, transcription),
            None => println!("\n{}", word.english),
        }
        println!("(press Enter to reveal, q to quit)");
        if matches!(read_line(&mut lines).await?.as_deref(), None | Some("q")) {
            break;
        }

        controller.session().set_right_answer(true);
        println!("  → {}", word.translation_text());
        println!("Did you remember it? [y/n/q]");

        let answer = loop {
            let line = read_line(&mut lines).await?;
            match parse_answer(line.as_deref()) {
                Some(answer) => break answer,
                None => println!("Please answer y, n or q"),
            }
        };
        let remembered = match answer {
            Answer::Remembered => true,
            Answer::Forgotten => false,
            Answer::Quit => break,
        };

        match pending("Saving answer", controller.record_answer(remembered)).await? {
            RoundOutcome::Repeated { count, .. } => println!("{}/{}", count, max),
            RoundOutcome::Reset { .. } => println!("Back to 0/{}", max),
            RoundOutcome::Learned { .. } => println!("Learned!"),
            RoundOutcome::Skipped { .. } | RoundOutcome::NoActiveWord => {}
        }
        answered += 1;
    }

    Ok(())
}

/// Reply to "did you remember it?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Remembered,
    Forgotten,
    Quit,
}

/// Interpret a trimmed, lowercased input line; `None` asks again
fn parse_answer(line: Option<&str>) -> Option<Answer> {
    match line {
        Some("y") | Some("yes") => Some(Answer::Remembered),
        Some("n") | Some("no") => Some(Answer::Forgotten),
        // End of input quits too
        None | Some("q") | Some("quit") => Some(Answer::Quit),
        Some(_) => None,
    }
}

async fn read_line<R>(lines: &mut tokio::io::Lines<R>) -> Result<Option<String>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let line = lines.next_line().await.context("Failed to read from stdin")?;
    Ok(line.map(|l| l.trim().to_lowercase()))
}
