use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result};
use tracing::{debug, info};
use uuid::Uuid;

use crate::request::GenerationRequest;

/// Number of stderr bytes kept when the inference program fails.
const STDERR_TAIL_BYTES: usize = 2048;

/// A finished video produced by an inference run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    pub path: PathBuf,
}

/// Text-to-video inference.
///
/// `run` blocks until the video is written and may take minutes. Callers on an async runtime
/// go through [`crate::GenerationQueue`], which moves it to the blocking pool.
pub trait InferencePipeline: Send + Sync {
    fn run(&self, request: &GenerationRequest) -> Result<VideoArtifact>;
}

/// Runs an external inference program once per request.
///
/// The program receives `<args..> --model-id M --prompt P --video-length N --fps F --seed S
/// --num-steps K --guidance-scale G --output FILE` and must write the video to `FILE`.
pub struct CommandPipeline {
    program: PathBuf,
    args: Vec<String>,
    output_dir: PathBuf,
    token: Option<String>,
}

impl Display for CommandPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl CommandPipeline {
    pub fn new<P: Into<PathBuf>, D: Into<PathBuf>>(
        program: P,
        args: Vec<String>,
        output_dir: D,
        token: Option<String>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            output_dir: output_dir.into(),
            token,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn command(&self, request: &GenerationRequest, output: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--model-id")
            .arg(&request.model_id)
            .arg("--prompt")
            .arg(&request.prompt)
            .arg("--video-length")
            .arg(request.video_length.to_string())
            .arg("--fps")
            .arg(request.fps.to_string())
            .arg("--seed")
            .arg(request.seed.to_string())
            .arg("--num-steps")
            .arg(request.num_steps.to_string())
            .arg("--guidance-scale")
            .arg(request.guidance_scale.to_string())
            .arg("--output")
            .arg(output);
        if let Some(token) = &self.token {
            command.env("HF_TOKEN", token);
        }
        command
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}

impl InferencePipeline for CommandPipeline {
    fn run(&self, request: &GenerationRequest) -> Result<VideoArtifact> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("creating output directory {}", self.output_dir.display())
        })?;
        let output = self.output_dir.join(format!("{}.mp4", Uuid::new_v4()));

        info!(pipeline = %self, %request, "running inference program");
        let result = self
            .command(request, &output)
            .output()
            .with_context(|| format!("launching {}", self.program.display()))?;
        debug!(status = %result.status, "inference program finished");

        if !result.status.success() {
            anyhow::bail!(
                "inference program exited with {}: {}",
                result.status,
                stderr_tail(&result.stderr)
            );
        }
        if !output.is_file() {
            anyhow::bail!(
                "inference program succeeded but wrote no video to {}",
                output.display()
            );
        }
        Ok(VideoArtifact { path: output })
    }
}
