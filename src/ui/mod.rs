//! Component layer.
//!
//! Components expose typed setters for their inputs and a `render` that is a pure
//! function of those inputs. Anything holding a component can assign new data and
//! re-render immediately; there is no diffing.
//!
//! - [`element`]: the render tree and its HTML / terminal writers
//! - [`registry`]: process-wide tag to constructor map
//! - [`components`]: the four page components
//! - [`page`]: page scaffold and HTML document
//! - [`composite`]: rasterised heatmap overlay

use std::any::Any;

pub mod components;
pub mod composite;
pub mod element;
pub mod page;
pub mod registry;

pub use element::Element;

/// Type erasure helpers so registry-created components can be recovered as their
/// concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

pub trait Component: AsAny {
    /// Tag the component is registered under
    fn tag(&self) -> &'static str;

    fn render(&self) -> Element;
}
