//! UiDriver - Abstract UI Automation Trait
//!
//! The driver is the only component that touches a live UI. Locus asks it
//! for elements matching a constraint set, asks it to perform one closed set
//! of actions against a handle, and tells it to release every handle it
//! registered once a command finishes.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ActionExecutor                                              │
//! │     │ find_descendants(&[Constraint])  -> Vec<ElementHandle>  │
//! │     │ perform(&ElementHandle, &Action) -> ActionOutput        │
//! │     │ release_all()                                           │
//! │     ▼                                                         │
//! │  UiDriver (trait)  ── RFT bridge / accessibility API / mock   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::constraint::Constraint;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque handle to a UI element returned by the driver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned identifier
    pub id: String,
    /// Element class as reported by the driver (e.g. `Html.TABLE`)
    pub class: Option<String>,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class: None,
        }
    }

    /// Attach the element class
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}({})", class, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Actions a driver can perform against an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Single left click
    Click,
    /// Double left click
    DoubleClick,
    /// Click at element-relative coordinates
    ClickAt {
        /// X offset
        x: i32,
        /// Y offset
        y: i32,
    },
    /// Double click at element-relative coordinates
    DoubleClickAt {
        /// X offset
        x: i32,
        /// Y offset
        y: i32,
    },
    /// Move the pointer over the element
    Hover,
    /// Replace the element's text
    SetText(String),
    /// Send key tokens one by one (`A`, `ctrl`, `\n`, ...)
    KeyPress(Vec<String>),
    /// Select an option by its text
    Select(String),
    /// Read the text of every option of a select element
    ReadOptions,
    /// Read a named property
    ReadProperty(String),
    /// Read the element's visible text
    ReadText,
    /// Read the element's grid data
    ReadTable,
    /// Load a URL in a browser element
    LoadUrl(String),
    /// Navigate a browser element back
    Back,
}

impl Action {
    /// Short name used in diagnostics
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DoubleClick => "double_click",
            Self::ClickAt { .. } => "click_at",
            Self::DoubleClickAt { .. } => "double_click_at",
            Self::Hover => "hover",
            Self::SetText(_) => "set_text",
            Self::KeyPress(_) => "key_press",
            Self::Select(_) => "select",
            Self::ReadOptions => "read_options",
            Self::ReadProperty(_) => "read_property",
            Self::ReadText => "read_text",
            Self::ReadTable => "read_table",
            Self::LoadUrl(_) => "load_url",
            Self::Back => "back",
        }
    }
}

/// Grid data read from a table element, row-major
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    /// Cell text; missing cells are empty strings
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    /// Create table data from rows
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (widest row)
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Row `index`, padded to the column count
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Vec<String>> {
        let cols = self.column_count();
        self.rows.get(index).map(|r| {
            let mut row = r.clone();
            row.resize(cols, String::new());
            row
        })
    }

    /// Every cell, row by row, padded to the column count
    #[must_use]
    pub fn cells(&self) -> Vec<String> {
        (0..self.row_count())
            .filter_map(|i| self.row(i))
            .flatten()
            .collect()
    }
}

/// Value produced by an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionOutput {
    /// Action completed with nothing to return
    Done,
    /// Text value (`ReadText`, `ReadProperty`)
    Text(String),
    /// List of option texts (`ReadOptions`)
    Options(Vec<String>),
    /// Table data (`ReadTable`)
    Table(TableData),
}

impl ActionOutput {
    /// Text payload, if any
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Options payload, if any
    #[must_use]
    pub fn into_options(self) -> Option<Vec<String>> {
        match self {
            Self::Options(o) => Some(o),
            _ => None,
        }
    }

    /// Table payload, if any
    #[must_use]
    pub fn into_table(self) -> Option<TableData> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }
}

/// Raw error reported by a driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Element handle is stale or no longer in the UI tree
    #[error("element {0} is no longer available")]
    Stale(String),
    /// Element does not support the action
    #[error("action '{action}' not supported by {element}")]
    Unsupported {
        /// Action name
        action: String,
        /// Element description
        element: String,
    },
    /// Any other driver failure
    #[error("{0}")]
    Other(String),
}

impl DriverError {
    /// Create a generic driver error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Abstract UI driver.
///
/// Implementations are driven from a single thread; one command finishes
/// (including its polling) before the next starts.
pub trait UiDriver {
    /// Find every descendant of the UI root matching all constraints.
    ///
    /// Placeholder constraints (empty name) match everything.
    fn find_descendants(&mut self, constraints: &[Constraint]) -> Result<Vec<ElementHandle>, DriverError>;

    /// Perform `action` against `element`
    fn perform(&mut self, element: &ElementHandle, action: &Action) -> Result<ActionOutput, DriverError>;

    /// Release every handle registered since the last call
    fn release_all(&mut self);

    /// Launch `browser` on `url`
    fn start_browser(&mut self, browser: &str, url: &str) -> Result<(), DriverError> {
        let _ = url;
        Err(DriverError::Unsupported {
            action: "start_browser".to_string(),
            element: browser.to_string(),
        })
    }
}

impl<D: UiDriver + ?Sized> UiDriver for Box<D> {
    fn find_descendants(&mut self, constraints: &[Constraint]) -> Result<Vec<ElementHandle>, DriverError> {
        (**self).find_descendants(constraints)
    }

    fn perform(&mut self, element: &ElementHandle, action: &Action) -> Result<ActionOutput, DriverError> {
        (**self).perform(element, action)
    }

    fn release_all(&mut self) {
        (**self).release_all();
    }

    fn start_browser(&mut self, browser: &str, url: &str) -> Result<(), DriverError> {
        (**self).start_browser(browser, url)
    }
}
