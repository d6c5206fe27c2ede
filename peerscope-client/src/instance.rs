use serde::{Deserialize, Deserializer, Serialize};

/// Profile record served by an instance's well-known profile endpoint.
///
/// Only `uri` is mandatory; servers differ wildly in which of the other
/// fields they fill in. Unknown fields are ignored and `null` reads as
/// the field's default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceProfile {
    pub uri: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<InstanceStats>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstanceStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain_count: u64,
}

impl InstanceProfile {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: String::new(),
            description: String::new(),
            thumbnail: None,
            version: None,
            email: None,
            stats: None,
            languages: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Joined result of one successful instance query.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSnapshot {
    pub profile: InstanceProfile,
    /// Raw peer addresses, exactly as the instance reported them.
    pub peers: Vec<String>,
}
