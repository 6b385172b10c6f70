use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fingerprint::PermutationSet;
use recall::{RawSaveRequest, Recall, RecallConfig, SaveOutcome, UserId};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "recall", version, about = "Personal web page archive tools")]
struct Cli {
    /// YAML config; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a fresh MinHash permutation set.
    GenPermutations {
        /// Number of permutations; must match `fingerprint.num_minhashes`.
        count: usize,
        #[arg(long, default_value = "permutations.json")]
        out: PathBuf,
        /// Derive the set from a seed instead of system entropy.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the fingerprint similarity of one text file against others.
    Compare {
        master: PathBuf,
        #[arg(required = true)]
        others: Vec<PathBuf>,
    },
    /// Save a text file as a page.
    Save {
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        url: String,
        #[arg(long)]
        title: String,
        file: PathBuf,
    },
    /// Search a user's saved pages.
    Search {
        #[arg(long)]
        user: UserId,
        query: String,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> Result<RecallConfig> {
    match path {
        Some(path) => RecallConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(RecallConfig::default()),
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Command::GenPermutations { count, out, seed } => {
            if count == 0 {
                bail!("permutation count must be >= 1");
            }
            let set = match seed {
                Some(seed) => PermutationSet::generate_with_seed(count, seed),
                None => PermutationSet::generate(count),
            };
            set.save(&out)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("Generated {count} permutations to {}", out.display());
        }
        Command::Compare { master, others } => {
            let recall = Recall::from_config(&load_config(cli.config.as_deref())?)?;
            let base = read_text(&master)?;
            println!("Comparing with {}", master.display());
            for path in &others {
                let text = read_text(path)?;
                println!("{}: {:.4}", path.display(), recall.compare(&base, &text));
            }
        }
        Command::Save {
            user,
            url,
            title,
            file,
        } => {
            let recall = Recall::from_config(&load_config(cli.config.as_deref())?)?;
            let text = read_text(&file)?;
            match recall
                .save(RawSaveRequest::new(url, title, text, user))
                .await?
            {
                SaveOutcome::Saved {
                    document_id,
                    chunks,
                } => println!("saved {document_id} ({chunks} chunks)"),
                SaveOutcome::Skipped {
                    nearest,
                    similarity,
                } => println!("skipped: duplicate of {nearest} (similarity {similarity:.4})"),
            }
        }
        Command::Search { user, query } => {
            let recall = Recall::from_config(&load_config(cli.config.as_deref())?)?;
            for (rank, result) in recall.search(user, &query).await?.iter().enumerate() {
                println!(
                    "{:>2}. {:.4}  {}  {}",
                    rank + 1,
                    result.total_score,
                    result.title,
                    result.url
                );
            }
        }
    }

    Ok(())
}
