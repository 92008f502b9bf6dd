//! Fans completed uploads out to the result views.

use futures::{Stream, StreamExt};
use tracing::{debug, info};

use crate::events::{EventScope, UiEvent};
use crate::model::ClientAugmentedResult;
use crate::ui::components::overlay_view::{self, OverlayView};
use crate::ui::components::results_view::{self, ResultsView};
use crate::ui::registry::{ComponentRegistry, RegistryError};
use crate::ui::{Component, Element};

pub const REGION_ID: &str = "results-area";

/// The part of the page that stays hidden until the first result arrives.
#[derive(Debug)]
pub struct ResultsRegion {
    visible: bool,
    results: Box<ResultsView>,
    overlay: Box<OverlayView>,
}

impl ResultsRegion {
    pub fn mount(registry: &ComponentRegistry) -> Result<Self, RegistryError> {
        Ok(Self {
            visible: false,
            results: registry.create_as::<ResultsView>(results_view::TAG)?,
            overlay: registry.create_as::<OverlayView>(overlay_view::TAG)?,
        })
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns whether the region was hidden before.
    pub fn reveal(&mut self) -> bool {
        !std::mem::replace(&mut self.visible, true)
    }

    pub fn results(&self) -> &ResultsView {
        &self.results
    }

    pub fn overlay(&self) -> &OverlayView {
        &self.overlay
    }

    /// For the slider, the only writer besides the distributor.
    pub fn overlay_mut(&mut self) -> &mut OverlayView {
        &mut self.overlay
    }

    pub fn render(&self) -> Element {
        Element::new("div")
            .with_id(REGION_ID)
            .with_hidden(!self.visible)
            .with_child(self.results.render().with_id("results"))
            .with_child(self.overlay.render().with_id("overlay"))
    }
}

/// Listens for `file-uploaded` at the page scope and assigns each result to the views.
#[derive(Debug)]
pub struct ResultDistributor {
    region: ResultsRegion,
}

impl ResultDistributor {
    pub fn new(region: ResultsRegion) -> Self {
        Self { region }
    }

    pub fn region(&self) -> &ResultsRegion {
        &self.region
    }

    pub fn region_mut(&mut self) -> &mut ResultsRegion {
        &mut self.region
    }

    /// Completed uploads announced anywhere below `scope`.
    pub fn listen(scope: &EventScope) -> impl Stream<Item = ClientAugmentedResult> + Send + 'static {
        scope.listen().map(|notification| {
            debug!(origin = %notification.origin, event = notification.event.name(), "received");
            match notification.event {
                UiEvent::FileUploaded(result) => *result,
            }
        })
    }

    /// Shows `result`, replacing whatever was displayed before.
    pub fn distribute(&mut self, result: ClientAugmentedResult) {
        if self.region.reveal() {
            debug!("revealed results region");
        }

        info!(
            label = %result.prediction().label,
            confidence = result.prediction().confidence,
            heatmap = result.explanation().heatmap_base64.is_some(),
            "displaying prediction"
        );

        self.region.overlay.set_data(Some(result.overlay_input()));
        self.region.results.set_data(Some(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExplanationArtifacts, PredictionResponse, PredictionResult, UncertaintyMetrics};

    fn result(label: &str, heatmap: Option<&str>, image: &str) -> ClientAugmentedResult {
        ClientAugmentedResult::new(
            PredictionResponse {
                prediction: PredictionResult {
                    label: label.to_string(),
                    class_id: 1,
                    confidence: 0.7,
                },
                uncertainty: UncertaintyMetrics {
                    predictive_entropy: 0.3,
                    calibrated_confidence: 0.65,
                },
                explanation: ExplanationArtifacts {
                    heatmap_base64: heatmap.map(str::to_string),
                    overlay_base64: None,
                },
            },
            image.to_string(),
        )
    }

    fn distributor() -> ResultDistributor {
        let registry = ComponentRegistry::with_builtin().unwrap();
        ResultDistributor::new(ResultsRegion::mount(&registry).unwrap())
    }

    #[test]
    fn region_starts_hidden_and_empty() {
        let distributor = distributor();
        let rendered = distributor.region().render();

        assert!(!distributor.region().is_visible());
        assert!(rendered.hidden);
        assert_eq!(rendered.to_text(), "");
    }

    #[test]
    fn first_result_reveals_the_region() {
        let mut distributor = distributor();
        distributor.distribute(result("Fetal abdomen", Some("aGVhdA=="), "data:image/png;base64,b25l"));

        assert!(distributor.region().is_visible());
        assert!(!distributor.region_mut().reveal());
        let text = distributor.region().render().to_text();
        assert!(text.contains("Class: Fetal abdomen"));
    }

    #[test]
    fn each_result_fully_replaces_the_previous() {
        let mut distributor = distributor();
        distributor.distribute(result("Fetal abdomen", Some("Zmlyc3Q="), "data:image/png;base64,b25l"));
        distributor.distribute(result("Fetal femur", None, "data:image/png;base64,dHdv"));

        let region = distributor.region();
        assert_eq!(region.results().data().map(|d| d.prediction().label.as_str()), Some("Fetal femur"));

        let overlay = region.overlay().data().unwrap();
        assert_eq!(overlay.original_image, "data:image/png;base64,dHdv");
        assert_eq!(overlay.heatmap, None);

        let html = region.render().to_html();
        assert!(!html.contains("Fetal abdomen"));
        assert!(!html.contains("Zmlyc3Q="));
    }

    #[test]
    fn slider_value_survives_new_results() {
        let mut distributor = distributor();
        distributor.distribute(result("Fetal brain", Some("YQ=="), "data:image/png;base64,b25l"));
        distributor.region_mut().overlay_mut().set_intensity(0.2);
        distributor.distribute(result("Fetal thorax", Some("Yg=="), "data:image/png;base64,dHdv"));

        assert_eq!(distributor.region().overlay().intensity().value(), 0.2);
    }

    #[tokio::test]
    async fn listens_to_descendant_scopes() {
        let page = EventScope::root("page");
        let uploader = page.child("main").child("file-upload");
        let mut results = Box::pin(ResultDistributor::listen(&page));

        uploader.emit(UiEvent::FileUploaded(Box::new(result("Fetal brain", None, "data:,"))));

        let received = results.next().await.unwrap();
        assert_eq!(received.prediction().label, "Fetal brain");
    }
}
