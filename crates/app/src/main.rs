use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vinyl_visualiser_core::{
    AppConfig, AppEvent, EventBus, FrameInput, HeadlessRenderer, HttpCoverLoader,
    HttpSearchClient, PlaybackState, Visualiser,
};

mod silent;

use silent::SilentAudio;

fn main() -> vinyl_visualiser_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::DefaultConfig { output } => write_default_config(output.as_deref()),
    }
}

fn run(args: RunArgs) -> vinyl_visualiser_core::Result<()> {
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    tracing::info!(frames = args.frames, fps = args.fps, "starting headless run");

    let bus = EventBus::new();
    let audio = SilentAudio::new(bus.sender());
    let covers = HttpCoverLoader::new(
        bus.sender(),
        Duration::from_secs(config.search.timeout_secs),
    );
    let search = HttpSearchClient::new(&config.search, bus.sender());
    let sink = HeadlessRenderer::new(u64::from(args.fps.max(1)));
    let mut visualiser = Visualiser::new(&config, bus, audio, covers, search, sink)?;

    if let Some(hour) = args.hour {
        visualiser.post(AppEvent::TimeOverride(Some(hour)));
    }
    if let Some(query) = &args.query {
        visualiser.post(AppEvent::SearchInput(query.clone()));
    }

    let frame_budget = Duration::from_secs_f64(1.0 / f64::from(args.fps.max(1)));
    let start = Instant::now();
    let mut selected = false;

    for _ in 0..args.frames {
        let frame_start = Instant::now();
        visualiser.tick(FrameInput {
            elapsed: start.elapsed(),
            wall_time: chrono::Local::now().time(),
        });

        if args.play_first && !selected && !visualiser.results().rows().is_empty() {
            tracing::info!(
                title = %visualiser.results().rows()[0].title,
                "selecting first result"
            );
            visualiser.post(AppEvent::TrackSelected(0));
            selected = true;
        }

        if let Some(remaining) = frame_budget.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    let playing = visualiser.playback_state() == PlaybackState::Playing;
    visualiser.shutdown();
    tracing::info!(
        frames = visualiser.sink().frames_drawn(),
        rotation = visualiser.disc().rotation_z(),
        was_playing = playing,
        live_textures = visualiser.textures().live(),
        "run finished"
    );
    Ok(())
}

fn write_default_config(output: Option<&Path>) -> vinyl_visualiser_core::Result<()> {
    let json = AppConfig::default().to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(?path, "wrote default configuration");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio-synced particle and vinyl visualiser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the frame loop without a display for a fixed number of frames.
    Run(RunArgs),
    /// Print or write the default configuration as JSON.
    DefaultConfig {
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 600)]
    frames: u64,
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Search query typed at startup.
    #[arg(short, long)]
    query: Option<String>,
    /// Simulated hour of day (0-23).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=23))]
    hour: Option<u8>,
    /// Start the first search result once results arrive.
    #[arg(long)]
    play_first: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_arguments() {
        let cli = Cli::try_parse_from([
            "vinyl", "run", "--frames", "10", "--hour", "18", "-q", "tatsuro", "--play-first",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.frames, 10);
        assert_eq!(args.hour, Some(18));
        assert_eq!(args.query.as_deref(), Some("tatsuro"));
        assert!(args.play_first);
    }

    #[test]
    fn rejects_hour_out_of_range() {
        assert!(Cli::try_parse_from(["vinyl", "run", "--hour", "24"]).is_err());
    }
}
