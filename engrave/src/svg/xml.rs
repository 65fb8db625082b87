//! Minimal owned XML element tree with an indenting writer; enough DOM
//! for the lookback the SVG backend needs (`<defs>` insertion after the
//! body is built).

use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: &'static str,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(attr) = self.attributes.iter_mut().find(|(n, _)| *n == name) {
            attr.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn push_front(&mut self, child: Element) {
        self.children.insert(0, Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn write(&self, out: &mut dyn Write, depth: usize) -> io::Result<()> {
        let indent = "  ".repeat(depth);
        write!(out, "{indent}<{}", self.name)?;
        for (name, value) in &self.attributes {
            write!(out, " {name}=\"{}\"", escape(value, true))?;
        }
        if self.children.is_empty() {
            return writeln!(out, "/>");
        }
        // Text-only elements keep their content inline.
        if self.children.iter().all(|c| matches!(c, Node::Text(_))) {
            write!(out, ">")?;
            for child in &self.children {
                if let Node::Text(text) = child {
                    write!(out, "{}", escape(text, false))?;
                }
            }
            return writeln!(out, "</{}>", self.name);
        }
        writeln!(out, ">")?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(out, depth + 1)?,
                Node::Text(text) => writeln!(out, "{indent}  {}", escape(text, false))?,
            }
        }
        writeln!(out, "{indent}</{}>", self.name)
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
