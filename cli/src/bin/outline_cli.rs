use clap::{Parser, Subcommand};
use cli::{resolve_output_path, OutlineBatch};
use color_eyre::eyre::{eyre, Result};
use outline::{
    algorithms::alpha_threshold, io, BlurMethod, OutlineParameters, OutlinePipeline,
    OutlineSession, RenderScheduler, RenderStatus, RgbColor, SessionCommand, DEFAULT_DEBOUNCE,
};
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Outline a single PNG image
    Render {
        /// Path to the input PNG
        #[arg(short, long)]
        input: PathBuf,
        /// Output PNG file, or a directory to get a generated file name
        #[arg(short, long)]
        output: PathBuf,
        /// Thickness in percent of the base thickness (1% of the longer side)
        #[arg(short, long, default_value_t = outline::DEFAULT_THICKNESS)]
        thickness: f64,
        /// Edge smoothing, 0-100
        #[arg(short, long, default_value_t = outline::DEFAULT_SMOOTHING)]
        smoothing: f64,
        /// Outline color as hex, e.g. "#ff0000" or "f00"
        #[arg(short, long, default_value = "#000000")]
        color: RgbColor,
        /// Blur implementation
        #[arg(long, default_value_t = BlurMethod::Gaussian)]
        blur: BlurMethod,
    },
    /// Process every job in a TOML or JSON batch file
    Batch {
        /// Path to the batch configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the working geometry for an image size without rendering
    Plan {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(short, long, default_value_t = outline::DEFAULT_THICKNESS)]
        thickness: f64,
        #[arg(short, long, default_value_t = outline::DEFAULT_SMOOTHING)]
        smoothing: f64,
    },
    /// Print JSON schemas for batch files and session commands
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            thickness,
            smoothing,
            color,
            blur,
        } => {
            let params = OutlineParameters::new(thickness, smoothing, color);
            render_single(&input, &output, params, blur).await?;
        }
        Commands::Batch { config } => {
            run_batch(&config).await?;
        }
        Commands::Plan {
            width,
            height,
            thickness,
            smoothing,
        } => {
            print_plan(width, height, thickness, smoothing)?;
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&schemars::schema_for!(OutlineBatch))?);
            println!("{}", serde_json::to_string_pretty(&SessionCommand::schema())?);
        }
    }

    Ok(())
}

async fn render_single(
    input: &Path,
    output: &Path,
    params: OutlineParameters,
    blur: BlurMethod,
) -> Result<()> {
    let pipeline = OutlinePipeline::builder().with_blur_method(blur).build();
    info!("{}", pipeline.info());

    let mut session = OutlineSession::with_renderer(pipeline);
    session.load_image(input)?;
    session.set_parameters(params);
    let session = Arc::new(Mutex::new(session));

    let scheduler = RenderScheduler::spawn(Arc::clone(&session), DEFAULT_DEBOUNCE);
    let mut status = scheduler.subscribe();
    scheduler.render_now();

    let finished = status
        .wait_for(|s| matches!(s, RenderStatus::Completed(_) | RenderStatus::Failed(_)))
        .await?
        .clone();
    scheduler.shutdown().await;

    match finished {
        RenderStatus::Completed(image) => {
            let path = resolve_output_path(output, &params);
            io::save_png(&image, &path)?;
            info!(
                "✅ Outlined {:?} -> {:?} ({}x{})",
                input,
                path,
                image.width(),
                image.height()
            );
            Ok(())
        }
        RenderStatus::Failed(message) => Err(eyre!("Failed to outline {:?}: {}", input, message)),
        RenderStatus::Idle | RenderStatus::Processing => unreachable!("waited for a final status"),
    }
}

async fn run_batch(config_path: &Path) -> Result<()> {
    let batch = OutlineBatch::from_file(config_path)?;
    info!("Loaded {} jobs from {:?}", batch.jobs.len(), config_path);

    // Create output directory if it doesn't exist
    std::fs::create_dir_all(&batch.output_dir)?;

    let pipeline = Arc::new(OutlinePipeline::builder().with_blur_method(batch.blur).build());
    let mut failures = 0usize;

    for job in &batch.jobs {
        let output_path = batch.output_path(job);
        info!("Processing job '{}' -> {:?}", job.name, output_path);

        let source = match io::load_png(&job.input) {
            Ok(source) => source,
            Err(e) => {
                error!("Skipping job '{}': {}", job.name, e);
                failures += 1;
                continue;
            }
        };

        let pipeline = Arc::clone(&pipeline);
        let params = job.parameters;
        let outcome = tokio::task::spawn_blocking(move || pipeline.process(&source, &params)).await?;

        match outcome {
            Ok(result) => {
                io::save_png(&result.image, &output_path)?;
                info!(
                    "Job '{}': radius {}, threshold {}, output {}x{}",
                    job.name,
                    result.plan.radius,
                    result.alpha_threshold,
                    result.image.width(),
                    result.image.height()
                );
            }
            Err(e) => {
                error!("Job '{}' failed: {}", job.name, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(eyre!("{} of {} jobs failed", failures, batch.jobs.len()));
    }

    info!("✅ Batch completed!");
    Ok(())
}

fn print_plan(width: u32, height: u32, thickness: f64, smoothing: f64) -> Result<()> {
    let params = OutlineParameters::default()
        .with_thickness(thickness)
        .with_smoothing(smoothing);
    let plan = OutlinePipeline::default().plan(width, height, &params)?;

    let report = serde_json::json!({
        "parameters": params,
        "plan": plan,
        "alpha_threshold": alpha_threshold(params.smoothing_factor),
        "exceeds_safe_thickness": params.exceeds_safe_thickness(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
