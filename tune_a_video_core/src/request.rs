use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::controls::{
    ControlError, FPS, GUIDANCE_SCALE, MODEL_ID, NUM_STEPS, SEED, VIDEO_LENGTH,
};

/// Everything one generation needs. Built per submission and consumed by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model_id: String,
    pub prompt: String,
    /// Number of frames to generate.
    pub video_length: u32,
    pub fps: u32,
    pub seed: u32,
    /// The number of denoising steps.
    pub num_steps: u32,
    /// Higher guidance scale keeps the video closer to the prompt.
    pub guidance_scale: f64,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            model_id: MODEL_ID.default.to_string(),
            prompt: String::new(),
            video_length: VIDEO_LENGTH.default,
            fps: FPS.default,
            seed: SEED.default,
            num_steps: NUM_STEPS.default,
            guidance_scale: GUIDANCE_SCALE.default,
        }
    }
}

impl GenerationRequest {
    /// Check every field against its control.
    pub fn validate(&self) -> Result<(), ControlError> {
        MODEL_ID.accept(&self.model_id)?;
        VIDEO_LENGTH.accept(self.video_length)?;
        FPS.accept(self.fps)?;
        SEED.accept(self.seed)?;
        NUM_STEPS.accept(self.num_steps)?;
        GUIDANCE_SCALE.accept(self.guidance_scale)?;
        Ok(())
    }

    /// Short prompt excerpt for log lines.
    pub fn prompt_preview(&self) -> String {
        const PREVIEW_CHARS: usize = 50;
        let mut preview: String = self.prompt.chars().take(PREVIEW_CHARS).collect();
        if self.prompt.chars().count() > PREVIEW_CHARS {
            preview.push('…');
        }
        preview
    }
}

impl Display for GenerationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:?} (frames = {}, fps = {}, seed = {}, steps = {}, scale = {})",
            self.model_id,
            self.prompt_preview(),
            self.video_length,
            self.fps,
            self.seed,
            self.num_steps,
            self.guidance_scale
        )
    }
}
