// src/main.rs

use anyhow::{anyhow, bail, Context};
use audio_cutter_lib::{
    init_tracing, probe_info, EditOp, EditorConfig, EditorSession, FileArtifact,
};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Region-based audio cutter with undo/redo
#[derive(Parser, Debug)]
#[command(name = "audio-cutter")]
#[command(about = "Select a region, cut or remove it, undo/redo, save as WAV", long_about = None)]
struct Cli {
    /// Editor settings (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Edit a file with commands read from a script or stdin
    Session {
        /// Input audio file (MP3 or WAV)
        input: PathBuf,

        /// Read commands from this file instead of stdin
        #[arg(short, long)]
        script: Option<PathBuf>,
    },

    /// Print duration, sample rate and format
    Info {
        /// Input audio file (MP3 or WAV)
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// One line of a session script
#[derive(Debug, Clone, PartialEq)]
enum Action {
    Select(f64, f64),
    Slider(f64, f64),
    StartForward,
    StartBack,
    EndBack,
    EndForward,
    Edit(EditOp),
    Undo,
    Redo,
    Status,
    Save(Option<PathBuf>),
    Quit,
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let mut seconds = |label: &str| -> anyhow::Result<f64> {
            let value = words
                .next()
                .ok_or_else(|| anyhow!("'{}' needs a {} time", name, label))?
                .parse::<f64>()
                .with_context(|| format!("'{}': bad {} time", name, label))?;
            if !value.is_finite() {
                bail!("'{}': {} time must be a finite number", name, label);
            }
            Ok(value)
        };

        let action = match name {
            "select" => Action::Select(seconds("start")?, seconds("end")?),
            "slider" => Action::Slider(seconds("start")?, seconds("end")?),
            "start+" => Action::StartForward,
            "start-" => Action::StartBack,
            "end-" => Action::EndBack,
            "end+" => Action::EndForward,
            "cut" => Action::Edit(EditOp::Cut),
            "remove" => Action::Edit(EditOp::Remove),
            "undo" => Action::Undo,
            "redo" => Action::Redo,
            "status" => Action::Status,
            "save" => Action::Save(words.next().map(PathBuf::from)),
            "quit" | "exit" => Action::Quit,
            other => bail!("unknown command '{}'", other),
        };
        Ok(action)
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing("info");
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Info { input, json } => info(&input, &config, json),
        Command::Session { input, script } => {
            let runtime = tokio::runtime::Builder::new_multi_thread().build()?;
            runtime.block_on(run_session(&input, script.as_deref(), config))
        }
    }
}

fn info(input: &Path, config: &EditorConfig, json: bool) -> anyhow::Result<()> {
    let artifact = FileArtifact::load(input, &config.accepted_extensions)?;
    let info = probe_info(&artifact)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("File: {}", input.display());
        println!("   Duration: {:.2} seconds ({:.2} minutes)",
            info.duration_seconds, info.duration_seconds / 60.0);
        println!("   Sample Rate: {} Hz", info.sample_rate);
        println!("   Channels: {}", info.channels);
        println!("   Format: {}", info.format);
        if let Some(bits) = info.bit_depth {
            println!("   Bit Depth: {}", bits);
        }
    }
    Ok(())
}

async fn run_session(
    input: &Path,
    script: Option<&Path>,
    config: EditorConfig,
) -> anyhow::Result<()> {
    let mut session = EditorSession::open(input, config)
        .with_context(|| format!("opening {}", input.display()))?;
    print_status(&session);

    let reader: Box<dyn BufRead> = match script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening script {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let action = match line.parse::<Action>() {
            Ok(action) => action,
            Err(e) => {
                eprintln!("line {}: {:#}", number + 1, e);
                continue;
            }
        };

        if action == Action::Quit {
            break;
        }

        // A failed command is reported and the session carries on
        if let Err(e) = run_action(&mut session, action).await {
            eprintln!("line {}: {:#}", number + 1, e);
        }
    }

    Ok(())
}

async fn run_action(session: &mut EditorSession, action: Action) -> anyhow::Result<()> {
    match action {
        Action::Select(start, end) => session.selection_mut().set_region(start, end),
        Action::Slider(start, end) => {
            let step = session.config().slider_step;
            session.selection_mut().set_from_slider([start, end], step);
        }
        Action::StartForward => session.selection_mut().nudge_start_forward(),
        Action::StartBack => session.selection_mut().nudge_start_back(),
        Action::EndBack => session.selection_mut().nudge_end_back(),
        Action::EndForward => session.selection_mut().nudge_end_forward(),
        Action::Edit(op) => {
            let outcome = session.apply(op).await?;
            println!("{} {} -> {:.2}s", outcome.op, outcome.region, outcome.duration_seconds);
        }
        Action::Undo => {
            if !session.undo()? {
                println!("nothing to undo");
            }
        }
        Action::Redo => {
            if !session.redo()? {
                println!("nothing to redo");
            }
        }
        Action::Status => {}
        Action::Save(target) => {
            let target = target.unwrap_or_else(|| PathBuf::from("."));
            let path = session.save(&target)?;
            println!("saved {}", path.display());
        }
        Action::Quit => return Ok(()),
    }

    print_status(session);
    Ok(())
}

fn print_status(session: &EditorSession) {
    let selection = session.selection();
    let history = session.history();
    println!(
        "region {} of {:.2}s | nudge {:.2}s | undo {} | redo {}",
        selection.region(),
        selection.duration(),
        selection.nudge_step(),
        history.undo_depth(),
        history.redo_depth()
    );
}
