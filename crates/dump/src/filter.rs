//! Label and record-type filters

use serde::{Deserialize, Serialize};

/// Substring filters applied before any store access
///
/// An empty list matches everything; otherwise an item matches when it
/// contains any of the listed substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub labels: Vec<String>,
    pub types: Vec<String>,
}

impl Filters {
    /// Match everything
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_labels<I, T>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn allows_label(&self, label: &str) -> bool {
        allows(&self.labels, label)
    }

    pub fn allows_type(&self, record_type: &str) -> bool {
        allows(&self.types, record_type)
    }
}

fn allows(filter: &[String], item: &str) -> bool {
    filter.is_empty() || filter.iter().any(|f| item.contains(f.as_str()))
}
