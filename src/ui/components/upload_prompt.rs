//! Visible part of the file intake: where to drop a file and what it should be.

use crate::ui::{Component, Element};

pub const TAG: &str = "file-upload";

pub const INSTRUCTION: &str = "Drag & Drop Ultrasound Image Here";
pub const SUB_INSTRUCTION: &str = "or click to browse (PNG, JPG)";

/// MIME types the picker suggests. Other files are still accepted.
pub const ACCEPT: &str = "image/png, image/jpeg";

#[derive(Debug, Default, Clone)]
pub struct UploadPrompt;

impl Component for UploadPrompt {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn render(&self) -> Element {
        Element::new("div")
            .with_class(TAG)
            .with_child(Element::text("div", INSTRUCTION).with_class("instruction"))
            .with_child(Element::text("div", SUB_INSTRUCTION).with_class("sub"))
            .with_child(
                Element::new("input")
                    .with_id("fileInput")
                    .with_attr("type", "file")
                    .with_attr("accept", ACCEPT)
                    .with_hidden(true),
            )
    }
}
