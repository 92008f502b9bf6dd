//! Original image with the explanation heatmap blended on top.

use crate::model::OverlayInput;
use crate::ui::{Component, Element};

pub const TAG: &str = "explanation-overlay";

pub const INTENSITY_MIN: f64 = 0.0;
pub const INTENSITY_MAX: f64 = 1.0;
pub const INTENSITY_STEP: f64 = 0.1;
pub const INTENSITY_DEFAULT: f64 = 0.5;

/// Heatmap opacity as set through the slider.
///
/// Always within `[0, 1]` and on a `0.1` step, the way a range input reports it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BlendIntensity(f64);

impl BlendIntensity {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        let steps = ((value.clamp(INTENSITY_MIN, INTENSITY_MAX) - INTENSITY_MIN) / INTENSITY_STEP).round();
        // 3.0 * 0.1 is 0.30000000000000004, 3.0 / 10.0 is 0.3
        Self(INTENSITY_MIN + steps / (1.0 / INTENSITY_STEP))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for BlendIntensity {
    fn default() -> Self {
        Self(INTENSITY_DEFAULT)
    }
}

impl std::fmt::Display for BlendIntensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn heatmap_src(heatmap_base64: &str) -> String {
    format!("data:image/png;base64,{}", heatmap_base64)
}

#[derive(Debug, Default, Clone)]
pub struct OverlayView {
    data: Option<OverlayInput>,
    intensity: BlendIntensity,
}

impl OverlayView {
    pub fn data(&self) -> Option<&OverlayInput> {
        self.data.as_ref()
    }

    /// Replaces the displayed images. The blend intensity is left alone.
    pub fn set_data(&mut self, data: Option<OverlayInput>) {
        self.data = data;
    }

    pub fn intensity(&self) -> BlendIntensity {
        self.intensity
    }

    /// Slider input. Returns the value actually applied.
    pub fn set_intensity(&mut self, value: f64) -> BlendIntensity {
        self.intensity = BlendIntensity::new(value);
        self.intensity
    }

    /// The heatmap to draw, if there is one. An empty string counts as none.
    pub fn heatmap(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.heatmap.as_deref())
            .filter(|h| !h.is_empty())
    }
}

impl Component for OverlayView {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn render(&self) -> Element {
        let Some(data) = &self.data else {
            return Element::empty();
        };

        let mut container = Element::new("div").with_class("container").with_child(
            Element::new("img")
                .with_class("original")
                .with_attr("src", data.original_image.clone())
                .with_attr("alt", "Original"),
        );

        if let Some(heatmap) = self.heatmap() {
            container = container.with_child(
                Element::new("img")
                    .with_class("overlay")
                    .with_attr("src", heatmap_src(heatmap))
                    .with_attr("alt", format!("Heatmap at {}", self.intensity))
                    .with_style("mix-blend-mode", "multiply")
                    .with_style("opacity", self.intensity.to_string()),
            );
        }

        let controls = Element::new("div")
            .with_class("controls")
            .with_child(Element::text("label", "Overlay Opacity").with_attr("for", "intensity"))
            .with_child(
                Element::new("input")
                    .with_id("intensity")
                    .with_attr("type", "range")
                    .with_attr("min", INTENSITY_MIN.to_string())
                    .with_attr("max", INTENSITY_MAX.to_string())
                    .with_attr("step", INTENSITY_STEP.to_string())
                    .with_attr("value", self.intensity.to_string()),
            );

        Element::new("section")
            .with_class(TAG)
            .with_child(container)
            .with_child(controls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(heatmap: Option<&str>) -> OverlayInput {
        OverlayInput {
            original_image: "data:image/jpeg;base64,/9j/".to_string(),
            heatmap: heatmap.map(str::to_string),
        }
    }

    #[test]
    fn intensity_defaults_to_half() {
        assert_eq!(OverlayView::default().intensity().value(), 0.5);
    }

    #[test]
    fn intensity_snaps_to_step_and_range() {
        assert_eq!(BlendIntensity::new(0.3).value(), 0.3);
        assert_eq!(BlendIntensity::new(0.26).value(), 0.3);
        assert_eq!(BlendIntensity::new(0.74).value(), 0.7);
        assert_eq!(BlendIntensity::new(1.7).value(), 1.0);
        assert_eq!(BlendIntensity::new(-2.0).value(), 0.0);
        assert_eq!(BlendIntensity::new(f64::NAN).value(), 0.5);
        assert_eq!(BlendIntensity::new(0.3).to_string(), "0.3");
    }

    #[test]
    fn nothing_is_rendered_without_data() {
        assert!(OverlayView::default().render().is_empty());
    }

    #[test]
    fn heatmap_is_blended_with_current_intensity() {
        let mut view = OverlayView::default();
        view.set_intensity(0.8);
        view.set_data(Some(input(Some("iVBORw0KGgo="))));

        let rendered = view.render();
        let images = rendered.find_by_tag("img");
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].attr("src"), Some("data:image/jpeg;base64,/9j/"));

        let overlay = rendered.find_by_class("overlay").unwrap();
        assert_eq!(overlay.attr("src"), Some("data:image/png;base64,iVBORw0KGgo="));
        assert_eq!(overlay.style("mix-blend-mode"), Some("multiply"));
        assert_eq!(overlay.style("opacity"), Some("0.8"));
    }

    #[test]
    fn without_heatmap_only_the_original_is_drawn() {
        let mut view = OverlayView::default();
        view.set_data(Some(input(None)));

        let rendered = view.render();
        assert_eq!(rendered.find_by_tag("img").len(), 1);
        assert!(rendered.find_by_class("overlay").is_none());

        let slider = rendered.find_by_id("intensity").unwrap();
        assert_eq!(slider.attr("type"), Some("range"));
        assert_eq!(slider.attr("step"), Some("0.1"));
        assert_eq!(slider.attr("value"), Some("0.5"));

        assert_eq!(view.set_intensity(0.2).value(), 0.2);
        assert_eq!(view.render().find_by_id("intensity").and_then(|s| s.attr("value")), Some("0.2"));
    }

    #[test]
    fn empty_heatmap_counts_as_absent() {
        let mut view = OverlayView::default();
        view.set_data(Some(input(Some(""))));
        assert!(view.heatmap().is_none());
        assert!(view.render().find_by_class("overlay").is_none());
    }

    #[test]
    fn new_data_keeps_the_intensity() {
        let mut view = OverlayView::default();
        view.set_data(Some(input(Some("first"))));
        view.set_intensity(0.9);
        view.set_data(Some(input(Some("second"))));

        assert_eq!(view.intensity().value(), 0.9);
        assert_eq!(view.heatmap(), Some("second"));
    }
}
