//! Adventure: compose a personalised story from the terminal.
//!
//! Usage:
//!   adventure compose --name Mia --age 7 --theme confidence [--interest dinosaurs]
//!                     [--companion "Pip:talking squirrel"] [--mode interactive] [--json]
//!   adventure compose --request mia.json
//!   adventure compose            (asks for the details interactively)
//!   adventure themes             (lists loaded themes)

use adventure_engine::{
    Companion, NarrativeRole, Pronouns, StoryComposer, StoryMode, StoryRequest, Theme,
};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "adventure")]
#[command(about = "Compose personalised children's adventure stories")]
#[command(version)]
struct Cli {
    /// Extra theme pack file or directory; overrides built-in packs with the same theme.
    #[arg(long, global = true)]
    fragments: Vec<PathBuf>,

    /// Seed mixed into fragment selection.
    #[arg(long, global = true, default_value_t = 0)]
    seed: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a story from flags, a request file, or interactive prompts
    Compose(ComposeArgs),
    /// List the themes available to compose
    Themes,
}

#[derive(Args)]
struct ComposeArgs {
    /// Read the request from a .json or .ron file
    #[arg(long, conflicts_with_all = ["name", "age"])]
    request: Option<PathBuf>,

    /// The child's name
    #[arg(long)]
    name: Option<String>,

    /// The child's age
    #[arg(long, allow_negative_numbers = true)]
    age: Option<i32>,

    /// she, he or they
    #[arg(long, default_value = "they")]
    pronouns: Pronouns,

    /// Something the child loves; repeat for more
    #[arg(long = "interest")]
    interests: Vec<String>,

    /// confidence, empathy, fear or conflict-resolution
    #[arg(long, default_value = "confidence")]
    theme: Theme,

    /// What the child is struggling with, e.g. "being shy"
    #[arg(long)]
    challenge: Option<String>,

    /// How to describe the child, e.g. "brave and funny"
    #[arg(long)]
    personality: Option<String>,

    /// A companion as name:role; repeat for more
    #[arg(long = "companion")]
    companions: Vec<Companion>,

    /// linear or interactive
    #[arg(long, default_value = "linear")]
    mode: StoryMode,

    /// Print the story as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut builder = StoryComposer::builder().all_builtin_themes().seed(cli.seed);
    for path in &cli.fragments {
        builder = if path.is_dir() {
            builder.fragments_dir(path)
        } else {
            builder.fragments_file(path)
        };
    }
    let composer = builder.build().context("failed to load theme packs")?;

    match cli.command {
        Commands::Compose(args) => compose(&composer, args),
        Commands::Themes => {
            list_themes(&composer);
            Ok(())
        }
    }
}

fn compose(composer: &StoryComposer, args: ComposeArgs) -> Result<()> {
    let request = if let Some(ref path) = args.request {
        info!(path = %path.display(), "loading request file");
        StoryRequest::load(path)
            .with_context(|| format!("failed to read request from {}", path.display()))?
    } else if args.name.is_none() {
        prompt_request()?
    } else {
        StoryRequest {
            name: args.name.clone().unwrap_or_default(),
            age: args.age,
            pronouns: args.pronouns,
            interests: args.interests.iter().cloned().collect(),
            theme: args.theme.clone(),
            challenge: args.challenge.clone(),
            personality: args.personality.clone(),
            companions: args.companions.clone(),
            mode: args.mode,
        }
    };
    debug!(?request, "composing");

    let story = composer
        .compose(&request)
        .context("could not compose a story")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&story)?);
    } else {
        println!("{}", "=".repeat(50));
        println!("Here is your personalised story!");
        println!("{}", "=".repeat(50));
        println!();
        println!("{}", story);
    }
    Ok(())
}

fn list_themes(composer: &StoryComposer) {
    for pack in composer.fragments().packs() {
        let counts: Vec<String> = NarrativeRole::REQUIRED
            .iter()
            .map(|role| format!("{} {:>2}", role, pack.fragments_for(*role).count()))
            .collect();
        println!("{:<22} {}", pack.theme.key(), counts.join("  "));
    }
}

/// Ask for the request details on stdin, one question per line.
fn prompt_request() -> Result<StoryRequest> {
    println!("--- Welcome to the Interactive Children's Adventure Engine! ---");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut ask = |question: &str| -> Result<String> {
        print!("{} ", question);
        io::stdout().flush().ok();
        match lines.next() {
            Some(line) => Ok(line?.trim().to_string()),
            None => bail!("input ended before all questions were answered"),
        }
    };

    let name = ask("What is the child's name?")?;
    let age = ask("What is the child's age?")?;
    let age = age
        .parse::<i32>()
        .with_context(|| format!("'{}' is not a whole number", age))?;
    let pronouns: Pronouns = ask("Which pronouns should the story use (she/he/they)?")?
        .parse()
        .map_err(anyhow::Error::msg)?;
    let theme = ask("Which theme (confidence, empathy, fear, conflict-resolution)?")?;
    let theme = if theme.is_empty() {
        Theme::Confidence
    } else {
        Theme::from(theme)
    };
    let challenge = ask("What is a challenge they're facing (e.g., 'being shy')? [optional]")?;
    let personality = ask("How would you describe them (e.g., 'brave and funny')? [optional]")?;
    let interests = ask("What do they love? (comma separated) [optional]")?;
    let companion_role =
        ask("What kind of magical companion should they have (e.g., 'tiny robot')? [optional]")?;
    let companion_name = if companion_role.is_empty() {
        String::new()
    } else {
        ask("What is the companion's name?")?
    };
    let mode = ask("Linear or interactive story? [linear]")?;
    let mode = if mode.is_empty() {
        StoryMode::Linear
    } else {
        mode.parse::<StoryMode>().map_err(anyhow::Error::msg)?
    };

    let mut request = StoryRequest::new(name, age, theme)
        .with_pronouns(pronouns)
        .with_mode(mode);
    if !challenge.is_empty() {
        request = request.with_challenge(challenge);
    }
    if !personality.is_empty() {
        request = request.with_personality(personality);
    }
    for interest in interests.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        request = request.with_interest(interest);
    }
    if !companion_role.is_empty() {
        request = request.with_companion(Companion::new(companion_name, companion_role));
    }
    Ok(request)
}
