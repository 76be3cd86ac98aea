use anyhow::Result;
use clap::Parser;
use poem_canvas::app::{App, GenerationState};
use poem_canvas::models::{GenerationResult, PoemImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "poem-canvas")]
#[command(about = "Turn a poem into a stylized poster background")]
struct CliArgs {
    /// Poem text to turn into a poster.
    #[arg(value_name = "POEM", required_unless_present = "image", conflicts_with = "image")]
    poem: Option<String>,

    /// Path to a photo or scan of a poem instead of typed text.
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Directory where the poster assets are written.
    #[arg(long, value_name = "DIR", default_value = "output")]
    output_dir: PathBuf,
}

struct PosterPaths {
    background: PathBuf,
    poster: PathBuf,
}

fn write_poster(result: &GenerationResult, output_dir: &Path) -> Result<PosterPaths> {
    fs::create_dir_all(output_dir)?;

    // Transport bytes are written as received; decoding is inspection only.
    match image::load_from_memory(&result.background_image) {
        Ok(decoded) => info!(
            "Background decoded at {}x{} px",
            decoded.width(),
            decoded.height()
        ),
        Err(e) => warn!("Background could not be decoded for inspection: {}", e),
    }

    let background = output_dir.join("background.jpg");
    fs::write(&background, &result.background_image)?;

    let poster = output_dir.join("poster.json");
    fs::write(&poster, serde_json::to_string_pretty(result)?)?;

    Ok(PosterPaths { background, poster })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poem_canvas=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting poem-canvas");

    let args = CliArgs::parse();

    let image = match &args.image {
        Some(path) => Some(PoemImage::from_bytes(fs::read(path)?)),
        None => None,
    };
    let poem_text = args.poem.unwrap_or_default();

    let app = match App::new() {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    // Surface stage messages while the workflow runs.
    let mut state_rx = app.subscribe();
    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow().clone();
            if let GenerationState::Loading(message) = state {
                if !message.is_empty() {
                    info!("{}", message);
                }
            }
        }
    });

    match app.generate(&poem_text, image).await {
        GenerationState::Success(result) => {
            info!(
                "Generated poster for {:?} by {} (placement: {}, style: {})",
                result.title, result.author, result.text_placement, result.text_style
            );
            let paths = write_poster(&result, &args.output_dir)?;
            info!("Background saved to {}", paths.background.display());
            info!("Poster data saved to {}", paths.poster.display());
            Ok(())
        }
        GenerationState::Failed(message) => {
            error!("Generation failed: {}", message);
            std::process::exit(1);
        }
        state => {
            error!("Generation ended in unexpected state: {:?}", state);
            std::process::exit(1);
        }
    }
}
