//! The content area the shell mounts screens into, and the widget tree the
//! desktop front-end paints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::FontSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub title: String,
    pub widgets: Vec<Widget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Widget {
    Heading {
        text: String,
        font: FontSpec,
    },
    Label {
        text: String,
        font: FontSpec,
    },
    #[serde(rename_all = "camelCase")]
    Field {
        key: String,
        label: String,
        value: String,
        read_only: bool,
    },
    Choice {
        key: String,
        label: String,
        options: Vec<String>,
        selected: String,
    },
    DateField {
        key: String,
        label: String,
        value: String,
    },
    Radio {
        key: String,
        label: String,
        options: Vec<ChoiceOption>,
        selected: String,
    },
    Table {
        key: String,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Button {
        action: String,
        label: String,
    },
    Link {
        label: String,
        url: String,
    },
    Tabs {
        tabs: Vec<Tab>,
    },
    Message {
        level: MessageLevel,
        text: String,
    },
}

impl Widget {
    pub fn field(key: &str, label: &str, value: impl Into<String>, read_only: bool) -> Self {
        Self::Field {
            key: key.to_string(),
            label: label.to_string(),
            value: value.into(),
            read_only,
        }
    }

    pub fn button(action: &str, label: &str) -> Self {
        Self::Button {
            action: action.to_string(),
            label: label.to_string(),
        }
    }

    pub fn message(level: MessageLevel, text: impl Into<String>) -> Self {
        Self::Message {
            level,
            text: text.into(),
        }
    }
}

/// The mount point. Screens only ever append; the shell clears it before
/// mounting the next screen.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContentArea {
    widgets: Vec<Widget>,
    /// Bumped on every clear so the front-end can drop stale widgets.
    generation: u64,
}

impl ContentArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, widget: Widget) {
        self.widgets.push(widget);
    }

    pub fn extend(&mut self, widgets: impl IntoIterator<Item = Widget>) {
        self.widgets.extend(widgets);
    }

    pub fn clear(&mut self) {
        self.widgets.clear();
        self.generation += 1;
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = (MessageLevel, &str)> {
        self.widgets.iter().filter_map(|w| match w {
            Widget::Message { level, text } => Some((*level, text.as_str())),
            _ => None,
        })
    }
}

/// A user action forwarded from the front-end to the mounted screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenEvent {
    pub action: String,
    /// Current value of every form widget, keyed by widget key.
    pub form: BTreeMap<String, String>,
    /// Index of the selected row in the screen's table, if any.
    pub selection: Option<usize>,
}

impl ScreenEvent {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            ..Self::default()
        }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.form.insert(key.to_string(), value.to_string());
        self
    }

    pub fn selecting(mut self, row: usize) -> Self {
        self.selection = Some(row);
        self
    }

    pub fn value(&self, key: &str) -> &str {
        self.form.get(key).map(String::as_str).unwrap_or("")
    }
}
