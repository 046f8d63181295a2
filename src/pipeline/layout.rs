use crate::types::template::{Template, TextOverlay};

/// Fallback values for the catalog placeholders when no custom text is given.
const DEFAULT_PLACEHOLDERS: [(&str, &str); 5] = [
    ("[Business Name]", "Your Business"),
    ("[Product Name]", "Product"),
    ("[Service Type]", "Service"),
    ("[Event Name]", "Event"),
    ("[App Name]", "App"),
];

/// Image height as a fraction of the frame height.
const IMAGE_HEIGHT_RATIO: f64 = 0.6;
/// Image width cap as a fraction of the frame width, applied when the
/// height-fitted image is still wider than the frame.
const IMAGE_WIDTH_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotWindow {
    pub index: usize,
    pub start: f64,
    pub duration: f64,
}

impl SlotWindow {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

pub fn substitute_placeholders(text: &str, custom_text: &str) -> String {
    if !(text.contains('[') && text.contains(']')) {
        return text.to_string();
    }

    let custom_text = custom_text.trim();
    if !custom_text.is_empty() {
        let Some(open) = text.find('[') else {
            return text.to_string();
        };
        let Some(close) = text[open..].find(']').map(|offset| open + offset) else {
            return text.to_string();
        };
        let placeholder = &text[open..=close];
        return text.replace(placeholder, custom_text);
    }

    DEFAULT_PLACEHOLDERS
        .iter()
        .fold(text.to_string(), |acc, (placeholder, value)| {
            acc.replace(placeholder, value)
        })
}

pub fn resolve_text_overlays(template: &Template, custom_text: &str) -> Vec<TextOverlay> {
    template
        .text_slots
        .iter()
        .map(|slot| TextOverlay {
            text: substitute_placeholders(slot.text, custom_text),
            start: slot.start as f64,
            duration: slot.duration as f64,
        })
        .collect()
}

/// Clamps every overlay so that `start + duration` never exceeds the
/// template duration, dropping overlays left with no visible time.
pub fn clamp_overlays(overlays: Vec<TextOverlay>, template_duration: f64) -> Vec<TextOverlay> {
    overlays
        .into_iter()
        .filter_map(|mut overlay| {
            if overlay.start < 0.0 {
                overlay.duration += overlay.start;
                overlay.start = 0.0;
            }
            if overlay.start + overlay.duration > template_duration {
                overlay.duration = template_duration - overlay.start;
            }
            if overlay.duration <= 0.0 {
                tracing::warn!(
                    "Dropping text overlay '{}' outside the {:.1}s timeline",
                    overlay.text,
                    template_duration
                );
                return None;
            }
            Some(overlay)
        })
        .collect()
}

/// Splits the template duration evenly between `count` images.
pub fn image_slot_windows(count: usize, template_duration: f64) -> Vec<SlotWindow> {
    if count == 0 || template_duration <= 0.0 {
        return Vec::new();
    }
    let slot = template_duration / count as f64;
    (0..count)
        .filter_map(|index| {
            let start = index as f64 * slot;
            let duration = slot.min(template_duration - start);
            (duration > 0.0).then_some(SlotWindow {
                index,
                start,
                duration,
            })
        })
        .collect()
}

/// Target size for an uploaded image inside a `frame_width` x `frame_height`
/// frame, preserving aspect ratio.
pub fn fit_image(
    image_width: u32,
    image_height: u32,
    frame_width: u32,
    frame_height: u32,
) -> (u32, u32) {
    if image_width == 0 || image_height == 0 {
        return (0, 0);
    }
    let aspect = image_width as f64 / image_height as f64;

    let mut height = frame_height as f64 * IMAGE_HEIGHT_RATIO;
    let mut width = height * aspect;
    if width > frame_width as f64 {
        width = frame_width as f64 * IMAGE_WIDTH_RATIO;
        height = width / aspect;
    }

    (
        (width.round() as u32).max(1),
        (height.round() as u32).max(1),
    )
}

/// Parses `#rrggbb` (or `#rgb`) into an RGB triple.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some([channel(0)?, channel(2)?, channel(4)?])
        }
        3 => {
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 1], 16)
                    .ok()
                    .map(|v| v * 17)
            };
            Some([channel(0)?, channel(1)?, channel(2)?])
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn custom_text_replaces_first_placeholder() {
        assert_eq!(
            substitute_placeholders("Welcome to [Business Name]", "Acme Corp"),
            "Welcome to Acme Corp"
        );
        assert_eq!(
            substitute_placeholders("Introducing [Product Name]", "  Rocket  "),
            "Introducing Rocket"
        );
    }

    #[test]
    fn default_placeholders_apply_without_custom_text() {
        assert_eq!(
            substitute_placeholders("Welcome to [Business Name]", ""),
            "Welcome to Your Business"
        );
        assert_eq!(substitute_placeholders("Discover [App Name]", "   "), "Discover App");
        assert_eq!(substitute_placeholders("Expert [Service Type]", ""), "Expert Service");
    }

    #[test]
    fn text_without_placeholders_is_untouched() {
        assert_eq!(substitute_placeholders("Shop Now", "Acme"), "Shop Now");
        assert_eq!(substitute_placeholders("Odd ] [ brackets", "Acme"), "Odd ] [ brackets");
        assert_eq!(substitute_placeholders("[Unknown] thing", ""), "[Unknown] thing");
    }

    #[test]
    fn resolved_overlays_stay_within_template_duration() {
        for template in catalog::TEMPLATES {
            let duration = template.duration as f64;
            let overlays = clamp_overlays(resolve_text_overlays(template, "Acme"), duration);
            assert_eq!(overlays.len(), template.text_slots.len());
            for overlay in overlays {
                assert!(overlay.start + overlay.duration <= duration);
                assert!(!overlay.text.contains('['));
            }
        }
    }

    #[test]
    fn overrunning_overlays_are_clamped_or_dropped() {
        let overlays = vec![
            TextOverlay {
                text: "tail".to_string(),
                start: 8.0,
                duration: 5.0,
            },
            TextOverlay {
                text: "late".to_string(),
                start: 10.0,
                duration: 2.0,
            },
            TextOverlay {
                text: "early".to_string(),
                start: -1.0,
                duration: 3.0,
            },
        ];
        let clamped = clamp_overlays(overlays, 10.0);
        assert_eq!(clamped.len(), 2);
        assert_eq!(clamped[0].duration, 2.0);
        assert_eq!(clamped[1].start, 0.0);
        assert_eq!(clamped[1].duration, 2.0);
    }

    #[test]
    fn image_slots_tile_the_timeline() {
        let windows = image_slot_windows(3, 12.0);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start, 0.0);
        assert_eq!(windows[1].start, 4.0);
        assert!((windows[2].end() - 12.0).abs() < 1e-9);
        for pair in windows.windows(2) {
            assert!((pair[0].end() - pair[1].start).abs() < 1e-9);
        }
        assert!(image_slot_windows(0, 12.0).is_empty());
    }

    #[test]
    fn images_fit_height_then_width() {
        // 4:3 image fits on height: 432 px tall.
        assert_eq!(fit_image(800, 600, 1280, 720), (576, 432));
        // Panorama would overflow the frame, so it is capped at 80% width.
        assert_eq!(fit_image(4000, 1000, 1280, 720), (1024, 256));
        assert_eq!(fit_image(0, 100, 1280, 720), (0, 0));
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(parse_hex_color("#1e3c72"), Some([30, 60, 114]));
        assert_eq!(parse_hex_color("FFFFFF"), Some([255, 255, 255]));
        assert_eq!(parse_hex_color("#f80"), Some([255, 136, 0]));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }
}
