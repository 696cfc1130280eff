use tracing::{info, warn};
use tune_a_video_common::NiceProgressBar;

use crate::{pipeline::VideoArtifact, queue::GenerationQueue, request::GenerationRequest};

/// Value of `SYSTEM` under which example outputs are generated at startup.
pub const CACHE_EXAMPLES_SYSTEM: &str = "spaces";

/// A preset request offered for one-click replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Example {
    pub model_id: &'static str,
    pub prompt: &'static str,
    pub video_length: u32,
    pub fps: u32,
    pub seed: u32,
    pub num_steps: u32,
    pub guidance_scale: f64,
}

impl Example {
    const fn new(model_id: &'static str, prompt: &'static str, seed: u32) -> Self {
        Self {
            model_id,
            prompt,
            video_length: 8,
            fps: 1,
            seed,
            num_steps: 50,
            guidance_scale: 7.5,
        }
    }

    pub fn to_request(&self) -> GenerationRequest {
        GenerationRequest {
            model_id: self.model_id.to_string(),
            prompt: self.prompt.to_string(),
            video_length: self.video_length,
            fps: self.fps,
            seed: self.seed,
            num_steps: self.num_steps,
            guidance_scale: self.guidance_scale,
        }
    }
}

const SURFING: &str = "Tune-A-Video-library/a-man-is-surfing";
const GUITAR: &str = "Tune-A-Video-library/mo-di-bear-guitar";
const SKIING: &str = "Tune-A-Video-library/redshift-man-skiing";

pub const EXAMPLES: [Example; 10] = [
    Example::new(SURFING, "A panda is surfing.", 3),
    Example::new(SURFING, "A racoon is surfing, cartoon style.", 3),
    Example::new(
        GUITAR,
        "a handsome prince is playing guitar, modern disney style.",
        123,
    ),
    Example::new(
        GUITAR,
        "a magical princess is playing guitar, modern disney style.",
        123,
    ),
    Example::new(GUITAR, "a rabbit is playing guitar, modern disney style.", 123),
    Example::new(GUITAR, "a baby is playing guitar, modern disney style.", 123),
    Example::new(SKIING, "(redshift style) spider man is skiing.", 123),
    Example::new(SKIING, "(redshift style) black widow is skiing.", 123),
    Example::new(SKIING, "(redshift style) batman is skiing.", 123),
    Example::new(SKIING, "(redshift style) hulk is skiing.", 123),
];

pub fn example_requests() -> Vec<GenerationRequest> {
    EXAMPLES.iter().map(Example::to_request).collect()
}

/// Whether the `SYSTEM` environment value asks for cached examples.
pub fn cache_examples_enabled(system: Option<&str>) -> bool {
    system == Some(CACHE_EXAMPLES_SYSTEM)
}

/// Example outputs generated ahead of time, indexed like [`EXAMPLES`].
#[derive(Debug, Default)]
pub struct ExampleCache {
    entries: Vec<Option<VideoArtifact>>,
}

impl ExampleCache {
    /// Generate every example through `queue`. Failed examples stay uncached.
    pub async fn build(queue: &GenerationQueue) -> Self {
        let mut entries = Vec::with_capacity(EXAMPLES.len());
        for (index, example) in
            NiceProgressBar::<_, 'g'>(EXAMPLES.iter().enumerate(), "Caching examples")
        {
            match queue.submit(example.to_request()).await {
                Ok(artifact) => entries.push(Some(artifact)),
                Err(err) => {
                    warn!(index, error = %err, "could not cache example");
                    entries.push(None);
                }
            }
        }
        let cache = Self { entries };
        info!(
            cached = cache.cached_count(),
            total = EXAMPLES.len(),
            "example cache ready"
        );
        cache
    }

    pub fn get(&self, index: usize) -> Option<&VideoArtifact> {
        self.entries.get(index).and_then(Option::as_ref)
    }

    pub fn cached_count(&self) -> usize {
        self.entries.iter().flatten().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::MODEL_CHOICES;

    #[test]
    fn first_example_matches_the_panda_preset() {
        assert_eq!(
            EXAMPLES[0].to_request(),
            GenerationRequest {
                model_id: "Tune-A-Video-library/a-man-is-surfing".to_string(),
                prompt: "A panda is surfing.".to_string(),
                video_length: 8,
                fps: 1,
                seed: 3,
                num_steps: 50,
                guidance_scale: 7.5,
            }
        );
    }

    #[test]
    fn every_example_is_a_valid_request() {
        for request in example_requests() {
            assert!(MODEL_CHOICES.contains(&request.model_id.as_str()));
            request.validate().unwrap();
        }
    }

    #[test]
    fn caching_only_on_spaces() {
        assert!(cache_examples_enabled(Some("spaces")));
        assert!(!cache_examples_enabled(Some("local")));
        assert!(!cache_examples_enabled(None));
    }

    #[test]
    fn empty_cache_has_no_entries() {
        let cache = ExampleCache::default();
        assert_eq!(cache.cached_count(), 0);
        assert!(cache.get(0).is_none());
    }
}
