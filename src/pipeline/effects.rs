use crate::types::template::Effect;

/// Fade length for an effect the template assigns to a specific image.
pub const EFFECT_FADE_SECONDS: f64 = 1.0;
/// Fade length for transitions and the default image treatment.
pub const TRANSITION_FADE_SECONDS: f64 = 0.5;
pub const TEXT_FADE_SECONDS: f64 = 0.3;

const ZOOM_FACTOR: f64 = 1.5;
const INTEGRATE_MIN_SCALE: f64 = 0.5;
const INTEGRATE_ROTATION_DEG: f64 = 45.0;

/// Visual state of a clip at one instant, relative to its resting pose
/// (fully opaque, natural size, centred).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipState {
    pub opacity: f64,
    pub scale: f64,
    pub rotation_deg: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ClipState {
    pub const REST: ClipState = ClipState {
        opacity: 1.0,
        scale: 1.0,
        rotation_deg: 0.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    fn combine(self, other: ClipState) -> ClipState {
        ClipState {
            opacity: self.opacity * other.opacity,
            scale: self.scale * other.scale,
            rotation_deg: self.rotation_deg + other.rotation_deg,
            offset_x: self.offset_x + other.offset_x,
            offset_y: self.offset_y + other.offset_y,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > f64::EPSILON && self.scale > f64::EPSILON
    }
}

/// Horizontal travel of a sliding clip, as offsets of its centre from the
/// frame centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlidePath {
    pub from: f64,
    pub to: f64,
}

impl SlidePath {
    /// Left edge moves from `-clip_width` to `0`: `x = -w + w * p`.
    pub fn from_left(frame_width: f64, clip_width: f64) -> Self {
        let centred_left = (frame_width - clip_width) / 2.0;
        Self {
            from: -clip_width - centred_left,
            to: -centred_left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    FadeIn(f64),
    FadeOut(f64),
    Zoom { factor: f64 },
    /// Enters horizontally from the left.
    Slide(SlidePath),
    Disintegrate,
    Reintegrate,
}

impl Animation {
    /// State contribution at local time `t` of a clip lasting `duration` seconds.
    pub fn state_at(&self, t: f64, duration: f64) -> ClipState {
        let progress = if duration <= f64::EPSILON {
            1.0
        } else {
            (t / duration).clamp(0.0, 1.0)
        };

        match *self {
            Animation::FadeIn(fade) => ClipState {
                opacity: ramp(t, fade),
                ..ClipState::REST
            },
            Animation::FadeOut(fade) => ClipState {
                opacity: ramp(duration - t, fade),
                ..ClipState::REST
            },
            Animation::Zoom { factor } => ClipState {
                scale: 1.0 + (factor - 1.0) * progress,
                ..ClipState::REST
            },
            Animation::Slide(path) => ClipState {
                offset_x: path.from + (path.to - path.from) * progress,
                ..ClipState::REST
            },
            Animation::Disintegrate => ClipState {
                opacity: 1.0 - progress,
                scale: 1.0 - progress * (1.0 - INTEGRATE_MIN_SCALE),
                rotation_deg: progress * INTEGRATE_ROTATION_DEG,
                ..ClipState::REST
            },
            Animation::Reintegrate => ClipState {
                opacity: progress,
                scale: INTEGRATE_MIN_SCALE + progress * (1.0 - INTEGRATE_MIN_SCALE),
                rotation_deg: (1.0 - progress) * INTEGRATE_ROTATION_DEG,
                ..ClipState::REST
            },
        }
    }
}

fn ramp(elapsed: f64, fade: f64) -> f64 {
    if fade <= f64::EPSILON {
        return 1.0;
    }
    (elapsed / fade).clamp(0.0, 1.0)
}

pub fn evaluate(animations: &[Animation], t: f64, duration: f64) -> ClipState {
    animations
        .iter()
        .fold(ClipState::REST, |state, animation| {
            state.combine(animation.state_at(t, duration))
        })
}

/// Expands a catalog effect into concrete animations. `fade` is the edge-fade
/// length used by the fading variants; `slide` is the travel for `slide`.
pub fn animations_for(effect: Effect, fade: f64, slide: SlidePath) -> Vec<Animation> {
    match effect {
        Effect::FadeIn => vec![Animation::FadeIn(fade)],
        Effect::FadeOut => vec![Animation::FadeOut(fade)],
        Effect::CrossFade => vec![Animation::FadeIn(fade), Animation::FadeOut(fade)],
        Effect::Zoom => vec![
            Animation::Zoom {
                factor: ZOOM_FACTOR,
            },
            Animation::FadeIn(TRANSITION_FADE_SECONDS),
            Animation::FadeOut(TRANSITION_FADE_SECONDS),
        ],
        Effect::Slide => vec![
            Animation::Slide(slide),
            Animation::FadeOut(TRANSITION_FADE_SECONDS),
        ],
        Effect::Disintegrate => vec![Animation::Disintegrate],
        Effect::Reintegrate => vec![Animation::Reintegrate],
    }
}

/// Animations for the image in slot `index`: the template effect at that
/// index wins, then the transitions cycle, then a plain fade in and out.
pub fn image_animations(
    effects: &[Effect],
    transitions: &[Effect],
    index: usize,
    slide: SlidePath,
) -> Vec<Animation> {
    if let Some(effect) = effects.get(index) {
        return animations_for(*effect, EFFECT_FADE_SECONDS, slide);
    }
    if !transitions.is_empty() {
        let transition = transitions[index % transitions.len()];
        return animations_for(transition, TRANSITION_FADE_SECONDS, slide);
    }
    vec![
        Animation::FadeIn(TRANSITION_FADE_SECONDS),
        Animation::FadeOut(TRANSITION_FADE_SECONDS),
    ]
}

pub fn text_animations() -> Vec<Animation> {
    vec![
        Animation::FadeIn(TEXT_FADE_SECONDS),
        Animation::FadeOut(TEXT_FADE_SECONDS),
    ]
}
