//! Drawing content as seen by the content digest.
//!
//! Only the fields meaningful to a signed drawing are exposed: title-block
//! fields per sheet, and four document properties. Everything else the host
//! tracks (save timestamps, view state) is invisible here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Document-level properties that participate in the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DocumentProperty {
    Title,
    PartNumber,
    RevisionNumber,
    Description,
}

impl DocumentProperty {
    /// Digest order.
    pub const ALL: [DocumentProperty; 4] = [
        Self::Title,
        Self::PartNumber,
        Self::RevisionNumber,
        Self::Description,
    ];

    /// Property name in the host application.
    pub fn host_name(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::PartNumber => "Part Number",
            Self::RevisionNumber => "Revision Number",
            Self::Description => "Description",
        }
    }

    /// Line label used in the canonical digest text.
    pub fn digest_label(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::PartNumber => "Number",
            Self::RevisionNumber => "Revision",
            Self::Description => "Description",
        }
    }

    /// Resolve a user-supplied name (host name or digest label, any case).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| {
            p.host_name().eq_ignore_ascii_case(name) || p.digest_label().eq_ignore_ascii_case(name)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleBlockField {
    pub name: String,
    #[serde(default)]
    pub text: String,
}

impl TitleBlockField {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// One sheet with its title-block fields in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<TitleBlockField>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields.push(TitleBlockField::new(name, text));
        self
    }
}

/// Read-only document content accessor implemented by host adapters.
pub trait DrawingContent {
    /// Sheets in document order.
    fn sheets(&self) -> Vec<Sheet>;

    /// A document property, or `None` if the host does not have it.
    fn property(&self, property: DocumentProperty) -> Option<String>;
}

/// In-memory drawing. Properties are keyed by host property name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drawing {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn with_property(mut self, property: DocumentProperty, value: impl Into<String>) -> Self {
        self.set_property(property, value);
        self
    }

    pub fn set_property(&mut self, property: DocumentProperty, value: impl Into<String>) {
        self.properties
            .insert(property.host_name().to_string(), value.into());
    }

    /// Set the text of every title-block field called `name`.
    ///
    /// Returns the number of fields changed.
    pub fn set_field(&mut self, name: &str, text: &str) -> usize {
        let mut changed = 0;
        for sheet in &mut self.sheets {
            for field in sheet.fields.iter_mut().filter(|f| f.name == name) {
                field.text = text.to_string();
                changed += 1;
            }
        }
        changed
    }
}

impl DrawingContent for Drawing {
    fn sheets(&self) -> Vec<Sheet> {
        self.sheets.clone()
    }

    fn property(&self, property: DocumentProperty) -> Option<String> {
        self.properties.get(property.host_name()).cloned()
    }
}
