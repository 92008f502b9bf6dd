//! Classification and uncertainty panel.

use crate::model::ClientAugmentedResult;
use crate::ui::{Component, Element};

pub const TAG: &str = "results-panel";

/// Longest exact decimal expansion of an `f64`, reached by the smallest subnormal.
const MAX_FRACTION_DIGITS: usize = 1074;

/// Fixed-point formatting that rounds an exact tie away from zero.
///
/// `{:.N}` rounds ties to even, so `56.25` would print as `56.2`.
fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_finite() && is_exact_tie(value, digits) {
        // the neighbour away from zero is past the tie and still below the next digit
        let away = f64::from_bits(value.to_bits() + 1);
        return format!("{:.*}", digits, away);
    }
    format!("{:.*}", digits, value)
}

/// Whether the exact value of `value` ends in a single 5 right after `digits` places.
fn is_exact_tie(value: f64, digits: usize) -> bool {
    let exact = format!("{:.*}", MAX_FRACTION_DIGITS, value.abs());
    let Some(rest) = exact.split_once('.').and_then(|(_, fraction)| fraction.get(digits..)) else {
        return false;
    };
    let mut rest = rest.bytes();
    rest.next() == Some(b'5') && rest.all(|b| b == b'0')
}

/// `0.873` → `"87.3%"`. Values outside `0..=1` are formatted as given.
pub fn format_percent(fraction: f64) -> String {
    format!("{}%", to_fixed(fraction * 100.0, 1))
}

/// Always three decimals, `0.452` → `"0.452"`.
pub fn format_entropy(entropy: f64) -> String {
    to_fixed(entropy, 3)
}

/// CSS width of the confidence fill, unrounded.
pub fn fill_width(confidence: f64) -> String {
    format!("{}%", confidence * 100.0)
}

#[derive(Debug, Default, Clone)]
pub struct ResultsView {
    data: Option<ClientAugmentedResult>,
}

impl ResultsView {
    pub fn data(&self) -> Option<&ClientAugmentedResult> {
        self.data.as_ref()
    }

    /// Replaces the displayed result.
    pub fn set_data(&mut self, data: Option<ClientAugmentedResult>) {
        self.data = data;
    }
}

fn row(label: &str, value: String, value_class: &str) -> Element {
    Element::new("div")
        .with_class("row")
        .with_child(Element::text("span", label).with_class("label"))
        .with_child(Element::text("span", value).with_class("val").with_class(value_class))
}

impl Component for ResultsView {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn render(&self) -> Element {
        let Some(data) = &self.data else {
            return Element::empty();
        };

        let prediction = data.prediction();
        let uncertainty = data.uncertainty();

        Element::new("section").with_class(TAG).with_children([
            Element::text("h2", "Prediction"),
            row("Class:", prediction.label.clone(), "class-label"),
            row("Confidence:", format_percent(prediction.confidence), "confidence"),
            Element::new("div")
                .with_class("confidence-bar")
                .with_child(Element::new("div").with_class("fill").with_style("width", fill_width(prediction.confidence))),
            Element::text("h3", "Uncertainty"),
            row("Entropy:", format_entropy(uncertainty.predictive_entropy), "entropy"),
            row("Calibrated:", format_percent(uncertainty.calibrated_confidence), "calibrated"),
        ])
    }
}
