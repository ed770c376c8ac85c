//! Transformation parameters for hosted images
//!
//! The image host renders transformations; this module only describes
//! and validates the requested parameters.

use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Smallest accepted width/height in pixels
pub const MIN_DIMENSION: u32 = 100;
/// Largest accepted width/height in pixels
pub const MAX_DIMENSION: u32 = 2000;

/// How the image is fitted into the requested box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Fill,
    Fit,
    Limit,
    Pad,
    Scale,
    Thumb,
    Crop,
}

impl Crop {
    pub fn as_str(&self) -> &'static str {
        match self {
            Crop::Fill => "fill",
            Crop::Fit => "fit",
            Crop::Limit => "limit",
            Crop::Pad => "pad",
            Crop::Scale => "scale",
            Crop::Thumb => "thumb",
            Crop::Crop => "crop",
        }
    }
}

/// Visual effect applied by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Grayscale,
    Sepia,
    Blur,
    Pixelate,
    Negate,
    Cartoonify,
    Vignette,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Grayscale => "grayscale",
            Effect::Sepia => "sepia",
            Effect::Blur => "blur",
            Effect::Pixelate => "pixelate",
            Effect::Negate => "negate",
            Effect::Cartoonify => "cartoonify",
            Effect::Vignette => "vignette",
        }
    }
}

/// Requested transformation; at least one field must be set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
}

impl TransformParams {
    /// Square fill crop used for avatars
    pub fn avatar() -> Self {
        Self {
            width: Some(250),
            height: Some(250),
            crop: Some(Crop::Fill),
            effect: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.crop.is_none() && self.effect.is_none()
    }

    /// Require at least one parameter and keep dimensions within bounds
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.is_empty() {
            return Err(SharedError::validation(
                "params",
                "At least one transformation parameter is required",
            ));
        }
        for (field, value) in [("width", self.width), ("height", self.height)] {
            if let Some(px) = value {
                if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&px) {
                    return Err(SharedError::validation(
                        field,
                        format!("{} must be between {} and {}", field, MIN_DIMENSION, MAX_DIMENSION),
                    ));
                }
            }
        }
        Ok(())
    }
}
