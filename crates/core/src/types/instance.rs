use serde::{Deserialize, Serialize};

/// Tag key whose value overrides the instance id as the image label.
pub const NAME_TAG: &str = "Name";

/// Prefix reserved by the platform for its own tags.
const RESERVED_TAG_PREFIX: &str = "aws:";

/// A key/value resource tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether the tag lives in the platform-reserved namespace.
    pub fn is_reserved(&self) -> bool {
        self.key.starts_with(RESERVED_TAG_PREFIX)
    }
}

/// Tag selector marking resources that take part in backup rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Check whether a tag set carries this filter's key/value pair.
    pub fn matches(&self, tags: &[Tag]) -> bool {
        tags.iter().any(|t| t.key == self.key && t.value == self.value)
    }
}

impl Default for TagFilter {
    fn default() -> Self {
        Self::new("Backup", "true")
    }
}

impl std::fmt::Display for TagFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tag:{}={}", self.key, self.value)
    }
}

/// A compute instance selected for backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Platform-assigned instance identifier.
    pub id: String,
    /// Tags attached to the instance.
    pub tags: Vec<Tag>,
}

impl Instance {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tags: Vec::new(),
        }
    }

    /// Add a tag (builder style).
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    /// Label used when naming images: the `Name` tag, else the instance id.
    pub fn label(&self) -> &str {
        self.tags
            .iter()
            .find(|t| t.key == NAME_TAG)
            .map(|t| t.value.as_str())
            .unwrap_or(&self.id)
    }
}
