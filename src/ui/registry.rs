//! Tag to constructor registry, defined once per process.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::ui::components::{app_bar, overlay_view, results_view, upload_prompt};
use crate::ui::Component;

pub type Constructor = fn() -> Box<dyn Component>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("\"{0}\" is not a valid component tag")]
    InvalidTag(String),

    #[error("component \"{0}\" has already been defined")]
    AlreadyDefined(String),

    #[error("no component is defined for \"{0}\"")]
    Undefined(String),

    #[error("component \"{tag}\" is not a {expected}")]
    TypeMismatch { tag: String, expected: &'static str },
}

#[derive(Default)]
pub struct ComponentRegistry {
    definitions: BTreeMap<&'static str, Constructor>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry").field("tags", &self.tags().collect::<Vec<_>>()).finish()
    }
}

/// Tags are lowercase ascii, start with a letter and contain a hyphen.
fn is_valid_tag(tag: &str) -> bool {
    tag.starts_with(|c: char| c.is_ascii_lowercase())
        && tag.contains('-')
        && tag.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every component the page uses.
    pub fn with_builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.define(app_bar::TAG, || Box::new(app_bar::AppBar::default()))?;
        registry.define(upload_prompt::TAG, || Box::new(upload_prompt::UploadPrompt::default()))?;
        registry.define(results_view::TAG, || Box::new(results_view::ResultsView::default()))?;
        registry.define(overlay_view::TAG, || Box::new(overlay_view::OverlayView::default()))?;
        Ok(registry)
    }

    pub fn define(&mut self, tag: &'static str, constructor: Constructor) -> Result<(), RegistryError> {
        if !is_valid_tag(tag) {
            return Err(RegistryError::InvalidTag(tag.to_string()));
        }
        if self.definitions.contains_key(tag) {
            return Err(RegistryError::AlreadyDefined(tag.to_string()));
        }

        debug!(tag, "defined component");
        self.definitions.insert(tag, constructor);
        Ok(())
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions.keys().copied()
    }

    pub fn create(&self, tag: &str) -> Result<Box<dyn Component>, RegistryError> {
        let constructor = self
            .definitions
            .get(tag)
            .ok_or_else(|| RegistryError::Undefined(tag.to_string()))?;
        Ok(constructor())
    }

    /// Creates the component for `tag` and recovers its concrete type.
    pub fn create_as<T: Component>(&self, tag: &str) -> Result<Box<T>, RegistryError> {
        self.create(tag)?.into_any().downcast::<T>().map_err(|_| RegistryError::TypeMismatch {
            tag: tag.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }
}

static REGISTRY: OnceLock<ComponentRegistry> = OnceLock::new();

/// Defines the builtin components on first call and returns the shared registry.
pub fn init() -> Result<&'static ComponentRegistry, RegistryError> {
    if let Some(registry) = REGISTRY.get() {
        return Ok(registry);
    }

    let registry = ComponentRegistry::with_builtin()?;
    Ok(REGISTRY.get_or_init(|| registry))
}
