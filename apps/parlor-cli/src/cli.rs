use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parlor_core::{Engine, EngineConfig, load_character, load_snapshot};
use parlor_pm::{Encoding, ExportTarget};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "parlor", about = "Role-play prompt construction for language models")]
pub struct Cli {
    /// Directory holding `.parlor/` (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Tokenizer vocabulary override: r50k, p50k, cl100k, o200k
    #[arg(short, long, global = true)]
    pub encoding: Option<Encoding>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create `.parlor/` with a default configuration
    Init,

    /// Build the prompt for a new message in a chat snapshot
    Prompt {
        /// Chat snapshot file (YAML or JSON)
        #[arg(short, long)]
        snapshot: PathBuf,

        /// The incoming message
        #[arg(short, long)]
        message: String,

        /// Print the token count after the prompt
        #[arg(long)]
        show_tokens: bool,
    },

    /// Render a character's persona
    Persona {
        /// Character file (YAML or JSON)
        #[arg(short, long)]
        character: PathBuf,
    },

    /// Export a character card as JSON
    Export {
        /// Character file (YAML or JSON)
        #[arg(short, long)]
        character: PathBuf,

        /// Card schema: tavern or ooba (defaults to config)
        #[arg(short, long)]
        target: Option<ExportTarget>,
    },

    /// Count the tokens in a text file
    Tokens {
        /// File to count
        #[arg(short, long)]
        file: PathBuf,
    },
}

impl Cli {
    /// Working directory and file-log slug for this invocation.
    ///
    /// Only `prompt` writes a log file, named after the snapshot.
    pub fn log_context(&self) -> (PathBuf, Option<String>) {
        let slug = match &self.command {
            Commands::Prompt { snapshot, .. } => snapshot
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned()),
            _ => None,
        };
        (self.dir.clone(), slug)
    }

    fn engine_config(&self) -> EngineConfig {
        match self.encoding {
            Some(encoding) => EngineConfig::builder()
                .work_dir(self.dir.clone())
                .encoding(encoding)
                .build(),
            None => EngineConfig::builder().work_dir(self.dir.clone()).build(),
        }
    }

    pub fn run(self) -> Result<()> {
        let engine = Engine::new(self.engine_config()).context("failed to start engine")?;

        match self.command {
            Commands::Init => {
                engine.init()?;
                println!(
                    "initialized {}",
                    engine.config().parlor_dir().display()
                );
            }
            Commands::Prompt {
                snapshot,
                message,
                show_tokens,
            } => {
                let snapshot = load_snapshot(&snapshot)?;
                let prompt = engine.prompt(&snapshot, &message);
                info!(tokens = prompt.tokens, "prompt built");
                println!("{}", prompt.text);
                if show_tokens {
                    println!("\n[{} tokens, {}]", prompt.tokens, engine.encoding());
                }
            }
            Commands::Persona { character } => {
                let character = load_character(&character)?;
                println!("{}", engine.persona(&character));
            }
            Commands::Export { character, target } => {
                println!("{}", export_json(&engine, &character, target)?);
            }
            Commands::Tokens { file } => {
                let text = fs::read_to_string(&file)
                    .with_context(|| format!("failed to read {}", file.display()))?;
                println!("{}", engine.count_tokens(&text));
            }
        }

        Ok(())
    }
}

/// Load the character at `path` and render its exported card as pretty JSON.
fn export_json(engine: &Engine, path: &Path, target: Option<ExportTarget>) -> Result<String> {
    let character = load_character(path)?;
    let exported = engine.export(&character, target);
    serde_json::to_string_pretty(&exported).context("failed to serialize exported character")
}
