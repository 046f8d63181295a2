use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    FadeIn,
    FadeOut,
    CrossFade,
    Zoom,
    Slide,
    Disintegrate,
    Reintegrate,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextSlot {
    pub text: &'static str,
    pub position: &'static str,
    pub start: u32,
    pub duration: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub transitions: &'static [Effect],
    pub duration: u32,
    pub text_slots: &'static [TextSlot],
    pub image_slots: usize,
    pub effects: &'static [Effect],
    pub bg_color: [u8; 3],
}

/// A text slot after placeholder substitution, ready for composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOverlay {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}
