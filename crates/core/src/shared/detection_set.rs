use serde::{Deserialize, Serialize};

use super::rectangle::Rectangle;

/// Raw detector output for one frame.
///
/// Each sequence comes from a different cascade (face, generic eye, left
/// eye, right eye) run over the same image. The monitor only reads it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionSet {
    #[serde(default)]
    pub faces: Vec<Rectangle>,
    #[serde(default)]
    pub eyes_general: Vec<Rectangle>,
    #[serde(default)]
    pub eyes_left: Vec<Rectangle>,
    #[serde(default)]
    pub eyes_right: Vec<Rectangle>,
    /// Source image `(width, height)`, when the producer knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_size: Option<(u32, u32)>,
}

impl DetectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faces(mut self, faces: Vec<Rectangle>) -> Self {
        self.faces = faces;
        self
    }

    pub fn with_eyes_general(mut self, eyes: Vec<Rectangle>) -> Self {
        self.eyes_general = eyes;
        self
    }

    pub fn with_eyes_left(mut self, eyes: Vec<Rectangle>) -> Self {
        self.eyes_left = eyes;
        self
    }

    pub fn with_eyes_right(mut self, eyes: Vec<Rectangle>) -> Self {
        self.eyes_right = eyes;
        self
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = Some((width, height));
        self
    }
}
