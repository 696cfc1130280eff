//! Input control contracts.
//!
//! Every numeric input of the demo is a [`Slider`] with an inclusive range and a step. The browser
//! renders these as range inputs, and values decoded from a request are checked against the same
//! contract, so an out-of-range value can never reach the inference pipeline.

use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// Tolerance used when checking that a float lands on a step.
const STEP_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ControlError {
    #[error("{label} must be between {min} and {max}, got {value}")]
    OutOfRange {
        label: &'static str,
        min: String,
        max: String,
        value: String,
    },
    #[error("{label} must move in steps of {step} from {min}, got {value}")]
    OffStep {
        label: &'static str,
        min: String,
        step: String,
        value: String,
    },
    #[error("{label} expects a number, got {input:?}")]
    NotANumber { label: &'static str, input: String },
    #[error("model `{0}` is not one of the available choices")]
    UnknownChoice(String),
}

/// A bounded numeric input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider<T> {
    pub id: &'static str,
    pub label: &'static str,
    pub min: T,
    pub max: T,
    pub step: T,
    pub default: T,
}

impl<T> Slider<T>
where
    T: Copy + PartialOrd + Display + Into<f64>,
{
    /// Whether `value` is selectable with this control.
    pub fn contains(&self, value: T) -> bool {
        self.accept(value).is_ok()
    }

    pub fn accept(&self, value: T) -> Result<T, ControlError> {
        if value < self.min || value > self.max {
            return Err(ControlError::OutOfRange {
                label: self.label,
                min: self.min.to_string(),
                max: self.max.to_string(),
                value: value.to_string(),
            });
        }
        let steps = (value.into() - self.min.into()) / self.step.into();
        if (steps - steps.round()).abs() > STEP_EPSILON {
            return Err(ControlError::OffStep {
                label: self.label,
                min: self.min.to_string(),
                step: self.step.to_string(),
                value: value.to_string(),
            });
        }
        Ok(value)
    }
}

impl<T> Slider<T>
where
    T: Copy + PartialOrd + Display + Into<f64> + FromStr,
{
    /// Parse user text and check it against the control.
    pub fn parse(&self, input: &str) -> Result<T, ControlError> {
        let value = input
            .trim()
            .parse::<T>()
            .map_err(|_| ControlError::NotANumber {
                label: self.label,
                input: input.to_string(),
            })?;
        self.accept(value)
    }
}

/// A selector over a fixed list of strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dropdown {
    pub id: &'static str,
    pub label: &'static str,
    pub choices: &'static [&'static str],
    pub default: &'static str,
}

impl Dropdown {
    pub fn accept<'a>(&self, value: &'a str) -> Result<&'a str, ControlError> {
        if self.choices.contains(&value) {
            Ok(value)
        } else {
            Err(ControlError::UnknownChoice(value.to_string()))
        }
    }
}

pub const MODEL_CHOICES: &[&str] = &[
    "Tune-A-Video-library/a-man-is-surfing",
    "Tune-A-Video-library/mo-di-bear-guitar",
    "Tune-A-Video-library/redshift-man-skiing",
];

pub const MODEL_ID: Dropdown = Dropdown {
    id: "model_id",
    label: "Model ID",
    choices: MODEL_CHOICES,
    default: "Tune-A-Video-library/a-man-is-surfing",
};

pub const VIDEO_LENGTH: Slider<u32> = Slider {
    id: "video_length",
    label: "Video length",
    min: 4,
    max: 12,
    step: 1,
    default: 8,
};

pub const FPS: Slider<u32> = Slider {
    id: "fps",
    label: "FPS",
    min: 1,
    max: 12,
    step: 1,
    default: 1,
};

pub const SEED: Slider<u32> = Slider {
    id: "seed",
    label: "Seed",
    min: 0,
    max: 100_000,
    step: 1,
    default: 0,
};

pub const NUM_STEPS: Slider<u32> = Slider {
    id: "num_steps",
    label: "Number of Steps",
    min: 0,
    max: 100,
    step: 1,
    default: 50,
};

pub const GUIDANCE_SCALE: Slider<f64> = Slider {
    id: "guidance_scale",
    label: "CFG Scale",
    min: 0.0,
    max: 50.0,
    step: 0.1,
    default: 7.5,
};
