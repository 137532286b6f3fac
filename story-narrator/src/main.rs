//! story-narrator: narrate cue-annotated stories to a WAV file.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use story_narrator::{parse_segments, strip_cues, Config, Narrator};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "story-narrator", about = "Cue-driven story narration")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synthesize the story into one WAV track and print its timeline
    Narrate {
        /// Annotated story text; stdin when omitted
        input: Option<PathBuf>,

        /// Where to write the WAV track
        #[arg(short, long, default_value = "narration.wav")]
        output: PathBuf,

        /// Write the timeline JSON here instead of stdout
        #[arg(short, long)]
        timeline: Option<PathBuf>,
    },
    /// Print the parsed segments as JSON
    Segments {
        input: Option<PathBuf>,
    },
    /// Print the story with every bracketed cue removed
    Strip {
        input: Option<PathBuf>,
    },
}

fn read_input(path: Option<&Path>) -> std::io::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr so JSON output on stdout stays clean
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Narrate {
            input,
            output,
            timeline,
        } => {
            let config = Config::load(args.config.as_deref());
            info!("Synthesizer: {}", config.synthesizer.program);

            let text = read_input(input.as_deref())?;
            let narrator = Arc::new(Narrator::from_config(&config));
            let narration = narrator.narrate_async(text).await?;

            narration.write_wav(&output)?;
            let json = serde_json::to_string_pretty(&narration.timeline)?;
            match timeline {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    info!("Saved timeline to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Segments { input } => {
            let text = read_input(input.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&parse_segments(&text))?);
        }
        Command::Strip { input } => {
            let text = read_input(input.as_deref())?;
            println!("{}", strip_cues(&text).trim());
        }
    }

    Ok(())
}
