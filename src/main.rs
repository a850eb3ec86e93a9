use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use signage_player::config::Configuration;
use signage_player::overlay::load_overlay;
use signage_player::probe::FsProbe;
use signage_player::render::headless::HeadlessStage;
use signage_player::sequence::{ItemKind, Sequence};
use signage_player::tasks::engine::{Engine, PlaybackOptions};

#[derive(Debug, Parser)]
#[command(
    name = "signage-player",
    version,
    about = "Looping video and image playback for signage displays"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Print the first N planned slots of the loop without playing anything
    #[arg(long = "dry-run", value_name = "ITERATIONS")]
    dry_run: Option<usize>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(format!("signage_player={level}").parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        dry_run,
        verbose,
    } = Args::parse();
    init_tracing(verbose)?;

    let cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    let sequence = cfg.sequence().context("invalid playback sequence")?;
    tracing::info!(
        title = cfg.title.as_deref().unwrap_or("untitled"),
        items = sequence.len(),
        "loaded configuration from {}",
        config.display()
    );

    if let Some(iterations) = dry_run {
        print_plan(&sequence, iterations);
        return Ok(());
    }

    let overlay = load_overlay(&cfg)?;

    let (surface_tx, surface_rx) = mpsc::channel(16); // Stage -> Engine
    let stage = HeadlessStage::new(surface_tx, cfg.headless.video_duration);
    let probe = FsProbe::new(&cfg.media_root);
    let engine = Engine::new(
        sequence,
        stage,
        probe,
        overlay,
        surface_rx,
        PlaybackOptions::from(&cfg),
    );

    let cancel = CancellationToken::new();

    // Ctrl-D/Ctrl-C stop playback
    if io::stdin().is_terminal() {
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || {
            let mut sink = Vec::new();
            match io::stdin().read_to_end(&mut sink) {
                Ok(_) => tracing::info!("stdin closed; initiating shutdown"),
                Err(err) => tracing::warn!("stdin watcher failed: {err}"),
            }
            cancel.cancel();
        });
    } else {
        tracing::debug!("stdin is not a terminal; skipping shutdown watcher");
    }

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    engine.run(cancel).await.context("playback engine failed")
}

fn print_plan(sequence: &Sequence, iterations: usize) {
    println!("Planned loop ({iterations} slots):");
    for (slot, (index, item)) in sequence.plan(0, iterations).into_iter().enumerate() {
        let detail = match &item.kind {
            ItemKind::Known(_) if item.is_video() => "plays to end".to_string(),
            ItemKind::Known(_) => {
                let dwell = humantime::format_duration(item.dwell());
                match item.transition {
                    Some(style) => format!("dwell {dwell}, {style} entrance"),
                    None => format!("dwell {dwell}"),
                }
            }
            ItemKind::Unrecognized(kind) => format!("skipped (unknown kind '{kind}')"),
        };
        println!(
            "  {slot:>3}: [{index}] {kind:<5} {source} ({detail})",
            kind = kind_label(&item.kind),
            source = item.source_uri,
        );
    }
}

fn kind_label(kind: &ItemKind) -> &str {
    match kind {
        ItemKind::Known(kind) => kind.as_str(),
        ItemKind::Unrecognized(_) => "?",
    }
}
