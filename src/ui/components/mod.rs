//! Page components, one per registered tag:
//!
//! - [`app_bar`]: title bar (`app-bar`)
//! - [`upload_prompt`]: drop target instructions (`file-upload`)
//! - [`results_view`]: classification and uncertainty (`results-panel`)
//! - [`overlay_view`]: original image with heatmap blend (`explanation-overlay`)

pub mod app_bar;
pub mod overlay_view;
pub mod results_view;
pub mod upload_prompt;
