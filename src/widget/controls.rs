//! Overlay content placed on top of the map: captions, the copyright notice
//! and the full-screen button.

use crate::{
    core::{
        config::{Caption, Copyright},
        constants::CAPTION_CSS_CLASS,
    },
    widget::traits::EventHandler,
};
use std::fmt;

/// Where a control is anchored on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlPosition {
    TopCenter,
    TopRight,
    BottomCenter,
    BottomRight,
}

/// Handle for a control added to a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlContent {
    Caption {
        text: String,
        css_class: String,
    },
    Copyright {
        text: String,
        url: Option<String>,
    },
    Button {
        label: String,
        title: String,
    },
}

/// One piece of overlay content
#[derive(Clone)]
pub struct Control {
    pub content: ControlContent,
    pub on_click: Option<EventHandler>,
}

pub(crate) fn escape_html(text: &str) -> String {
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

impl Control {
    /// Caption control, or `None` when there is no text to show
    pub fn caption(caption: &Caption) -> Option<Self> {
        if caption.is_empty() {
            return None;
        }
        Some(Self {
            content: ControlContent::Caption {
                text: caption.text.clone(),
                css_class: caption
                    .css_class
                    .clone()
                    .unwrap_or_else(|| CAPTION_CSS_CLASS.to_string()),
            },
            on_click: None,
        })
    }

    /// Copyright link, or `None` when no copyright text is configured
    pub fn copyright(copyright: &Copyright) -> Option<Self> {
        let text = copyright.text.as_ref()?;
        Some(Self {
            content: ControlContent::Copyright {
                text: text.clone(),
                url: copyright.url.clone(),
            },
            on_click: None,
        })
    }

    pub fn button(label: &str, title: &str, on_click: EventHandler) -> Self {
        Self {
            content: ControlContent::Button {
                label: label.to_string(),
                title: title.to_string(),
            },
            on_click: Some(on_click),
        }
    }

    /// Visible text of the control
    pub fn text(&self) -> &str {
        match &self.content {
            ControlContent::Caption { text, .. } => text,
            ControlContent::Copyright { text, .. } => text,
            ControlContent::Button { label, .. } => label,
        }
    }

    /// Inner markup for DOM-based widgets
    pub fn to_html(&self) -> String {
        match &self.content {
            ControlContent::Caption { text, css_class } => format!(
                "<span class=\"{}\">{}</span>",
                escape_html(css_class),
                escape_html(text)
            ),
            ControlContent::Copyright { text, url } => {
                let mut html = String::from("<a style=\"color: #aaa;\"");
                if let Some(url) = url {
                    html.push_str(&format!(" target=\"_blank\" href=\"{}\"", escape_html(url)));
                }
                html.push('>');
                html.push_str(&escape_html(text));
                html.push_str("</a>");
                html
            }
            ControlContent::Button { label, .. } => escape_html(label),
        }
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("content", &self.content)
            .field("clickable", &self.on_click.is_some())
            .finish()
    }
}
