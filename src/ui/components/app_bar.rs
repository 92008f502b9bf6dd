use crate::model::ServiceMetadata;
use crate::ui::{Component, Element};
use crate::APP_TITLE;

pub const TAG: &str = "app-bar";

#[derive(Debug, Clone)]
pub struct AppBar {
    title: String,
    service: Option<ServiceMetadata>,
}

impl Default for AppBar {
    fn default() -> Self {
        Self {
            title: APP_TITLE.to_string(),
            service: None,
        }
    }
}

impl AppBar {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_service(&mut self, service: Option<ServiceMetadata>) {
        self.service = service;
    }
}

impl Component for AppBar {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn render(&self) -> Element {
        let mut bar = Element::new("header")
            .with_class(TAG)
            .with_child(Element::text("h1", self.title.clone()));

        if let Some(service) = &self.service {
            bar = bar.with_child(
                Element::text("p", format!("{} v{} ({})", service.service, service.version, service.model_mode))
                    .with_class("service"),
            );
        }

        bar
    }
}
