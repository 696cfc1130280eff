use cliclack::{input, intro, log, note, select, spinner};
use std::{fmt::Display, path::PathBuf, str::FromStr, sync::Arc, time::Instant};

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tune_a_video_core::{
    controls::{
        Slider, FPS, GUIDANCE_SCALE, MODEL_CHOICES, MODEL_ID, NUM_STEPS, SEED, VIDEO_LENGTH,
    },
    get_token, CommandPipeline, GenerationQueue, GenerationRequest, HubRegistry,
    ModelInfoResolver, TokenSource, DEFAULT_HF_ENDPOINT, EXAMPLES,
};

#[derive(Parser)]
#[command(name = "tune-a-video")]
#[command(version, about = "Generate Tune-A-Video clips from the terminal", long_about = None)]
struct Args {
    /// Inference program run once per generation, for example `python`.
    #[arg(long, env = "TAV_PIPELINE_PROGRAM")]
    pipeline_program: PathBuf,

    /// Argument passed to the inference program before the generation flags. Repeatable.
    #[arg(long = "pipeline-arg", allow_hyphen_values = true)]
    pipeline_args: Vec<String>,

    /// Directory where videos are written. Defaults to `<cache dir>/tune-a-video/videos`.
    #[arg(short, long, env = "TAV_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Where to read the Hugging Face token: `env[:NAME]`, `literal:<token>`, `path:<file>`, `cache` or `none`.
    #[arg(long, default_value = "env:HF_TOKEN")]
    token: TokenSource,

    /// Model registry endpoint.
    #[arg(long, env = "HF_ENDPOINT", default_value = DEFAULT_HF_ENDPOINT)]
    hf_endpoint: String,

    /// Replay the example preset at this index and exit.
    #[arg(short, long)]
    example: Option<usize>,
}

/// Ask for a slider value, prefilled with its default.
fn ask<T>(slider: &Slider<T>) -> std::io::Result<T>
where
    T: Copy + PartialOrd + Display + Into<f64> + FromStr + Send + Sync + 'static,
    T::Err: ToString,
{
    let contract = *slider;
    input(format!(
        "{} ({}..={}, step {}):",
        slider.label, slider.min, slider.max, slider.step
    ))
    .default_input(&slider.default.to_string())
    .validate(move |input: &String| {
        contract
            .parse(input)
            .map(|_| ())
            .map_err(|e| e.to_string())
    })
    .interact()
}

async fn generate(queue: &GenerationQueue, request: GenerationRequest) -> anyhow::Result<()> {
    let mut progress = spinner();
    progress.start(format!("Generating {:?}", request.prompt_preview()));
    let start = Instant::now();
    let result = queue.submit(request).await;
    let end = Instant::now();

    match result {
        Ok(video) => {
            progress.stop(format!(
                "Video generation took: {:.2}s",
                end.duration_since(start).as_secs_f32()
            ));
            log::success(format!("Saved to {}", video.path.display()))?;
            Ok(())
        }
        Err(err) => {
            progress.stop("Video generation failed");
            Err(err)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let token = get_token(&args.token)?;
    let output_dir = args.output_dir.unwrap_or_else(|| {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("tune-a-video")
            .join("videos")
    });
    let pipeline = CommandPipeline::new(
        args.pipeline_program,
        args.pipeline_args,
        output_dir,
        token.clone(),
    );
    let queue = GenerationQueue::new(Arc::new(pipeline), 1);

    if let Some(index) = args.example {
        let Some(example) = EXAMPLES.get(index) else {
            anyhow::bail!(
                "No example at index {index}, expected 0..{}.",
                EXAMPLES.len()
            )
        };
        return generate(&queue, example.to_request()).await;
    }

    let resolver = ModelInfoResolver::new(
        Arc::new(HubRegistry::new(&args.hf_endpoint)?),
        token,
    );

    intro("Tune-A-Video")?;

    loop {
        let mut model_select = select("Model ID:").initial_value(MODEL_ID.default);
        for choice in MODEL_CHOICES {
            model_select = model_select.item(*choice, choice, "");
        }
        let model_id: &str = model_select.interact()?;

        let (base_model, training_prompt) = resolver.resolve(model_id).await.display_fields();
        note(
            "Model info",
            format!("Base model: {base_model}\nTraining prompt: {training_prompt}"),
        )?;

        let prompt: String = input("Prompt:")
            .placeholder("A panda is surfing.")
            .validate(|input: &String| {
                if input.is_empty() {
                    Err("Prompt is required!")
                } else {
                    Ok(())
                }
            })
            .interact()?;

        let request = GenerationRequest {
            model_id: model_id.to_string(),
            prompt,
            video_length: ask(&VIDEO_LENGTH)?,
            fps: ask(&FPS)?,
            seed: ask(&SEED)?,
            num_steps: ask(&NUM_STEPS)?,
            guidance_scale: ask(&GUIDANCE_SCALE)?,
        };

        if let Err(err) = generate(&queue, request).await {
            log::error(format!("{err:#}"))?;
        }
    }
}
