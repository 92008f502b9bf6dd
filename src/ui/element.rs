//! Render tree produced by the components.
//!
//! An [`Element`] is a plain value: components build a fresh tree on every render and
//! the tree is then written out either as HTML or as terminal text.

use std::fmt::Write;

/// Elements that never have children or a closing tag.
const VOID_TAGS: &[&str] = &["img", "input", "br", "hr"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Empty for a fragment, which only groups its children
    pub tag: &'static str,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub styles: Vec<(String, String)>,
    pub text: Option<String>,
    pub hidden: bool,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Default::default()
        }
    }

    /// Renders as nothing at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(tag: &'static str, text: impl Into<String>) -> Self {
        Self::new(tag).with_text(text)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.push((property.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// True for a fragment with nothing in it.
    pub fn is_empty(&self) -> bool {
        self.tag.is_empty() && self.text.is_none() && self.children.iter().all(Element::is_empty)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.iter().find(|(p, _)| p == property).map(|(_, v)| v.as_str())
    }

    /// Depth-first search over this element and its descendants.
    pub fn find_all(&self, predicate: &impl Fn(&Element) -> bool) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect(predicate, &mut found);
        found
    }

    fn collect<'a>(&'a self, predicate: &impl Fn(&Element) -> bool, found: &mut Vec<&'a Element>) {
        if predicate(self) {
            found.push(self);
        }
        for child in &self.children {
            child.collect(predicate, found);
        }
    }

    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        self.find_all(&|e| e.has_class(class)).into_iter().next()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find_all(&|e| e.id.as_deref() == Some(id)).into_iter().next()
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<&Element> {
        self.find_all(&|e| e.tag == tag)
    }

    /// Concatenated text of this element and its descendants, skipping hidden ones.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        if self.hidden {
            return;
        }
        if let Some(text) = &self.text {
            parts.push(text);
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        if self.tag.is_empty() {
            if let Some(text) = &self.text {
                out.push_str(&escape(text));
            }
            for child in &self.children {
                child.write_html(out);
            }
            return;
        }

        let _ = write!(out, "<{}", self.tag);
        if let Some(id) = &self.id {
            let _ = write!(out, " id=\"{}\"", escape(id));
        }
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&self.classes.join(" ")));
        }
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if !self.styles.is_empty() {
            let style = self
                .styles
                .iter()
                .map(|(p, v)| format!("{}: {}", p, v))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(out, " style=\"{}\"", escape(&style));
        }
        if self.hidden {
            out.push_str(" hidden");
        }

        if VOID_TAGS.contains(&self.tag) {
            out.push_str(" />");
            return;
        }

        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }

    /// Plain text layout for the terminal. Hidden subtrees are left out.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(0, &mut out);
        out
    }

    fn write_text(&self, depth: usize, out: &mut String) {
        if self.hidden {
            return;
        }

        let indent = "  ".repeat(depth);
        match self.tag {
            "img" => {
                let alt = self.attr("alt").unwrap_or("image");
                let _ = writeln!(out, "{}[{}]", indent, alt);
            }
            "input" => {
                let kind = self.attr("type").unwrap_or("text");
                let value = self.attr("value").unwrap_or("");
                let _ = writeln!(out, "{}[{}: {}]", indent, kind, value);
            }
            _ if self.has_class("row") => {
                let _ = writeln!(out, "{}{}", indent, self.text_content());
            }
            "h1" | "h2" | "h3" => {
                let _ = writeln!(out, "{}== {} ==", indent, self.text_content());
            }
            _ => {
                if let Some(text) = &self.text {
                    let _ = writeln!(out, "{}{}", indent, text);
                }
                let depth = if self.tag == "section" { depth + 1 } else { depth };
                for child in &self.children {
                    child.write_text(depth, out);
                }
            }
        }
    }
}

/// Escapes text for use in HTML content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("section")
            .with_id("panel")
            .with_class("card")
            .with_child(Element::text("h2", "Prediction"))
            .with_child(
                Element::new("div")
                    .with_class("row")
                    .with_child(Element::text("span", "Class:"))
                    .with_child(Element::text("span", "Brain <trans-thalamic>")),
            )
            .with_child(Element::new("img").with_attr("src", "data:image/png;base64,AA").with_attr("alt", "Original"))
    }

    #[test]
    fn html_escapes_text_and_closes_void_tags() {
        let html = sample().to_html();
        assert!(html.starts_with("<section id=\"panel\" class=\"card\">"));
        assert!(html.contains("Brain &lt;trans-thalamic&gt;"));
        assert!(html.contains("<img src=\"data:image/png;base64,AA\" alt=\"Original\" />"));
        assert!(html.ends_with("</section>"));
    }

    #[test]
    fn styles_are_joined_into_one_attribute() {
        let html = Element::new("div").with_style("width", "50%").with_style("opacity", "0.5").to_html();
        assert_eq!(html, "<div style=\"width: 50%; opacity: 0.5\"></div>");
    }

    #[test]
    fn hidden_subtrees_are_skipped_in_text() {
        let tree = Element::new("div")
            .with_child(Element::text("p", "visible"))
            .with_child(Element::text("p", "secret").with_hidden(true));
        assert_eq!(tree.to_text(), "visible\n");
        assert_eq!(tree.text_content(), "visible");
        assert!(tree.to_html().contains("<p hidden>secret</p>"));
    }

    #[test]
    fn text_layout_joins_rows() {
        let text = sample().to_text();
        assert_eq!(text, "  == Prediction ==\n  Class: Brain <trans-thalamic>\n  [Original]\n");
    }

    #[test]
    fn queries_find_descendants() {
        let tree = sample();
        assert_eq!(tree.find_by_id("panel").map(|e| e.tag), Some("section"));
        assert_eq!(tree.find_by_class("row").map(|e| e.children.len()), Some(2));
        assert_eq!(tree.find_by_tag("img").len(), 1);
        assert!(tree.find_by_class("missing").is_none());
    }

    #[test]
    fn empty_fragment_renders_nothing() {
        assert!(Element::empty().is_empty());
        assert_eq!(Element::empty().to_html(), "");
        assert_eq!(Element::empty().to_text(), "");
    }
}
