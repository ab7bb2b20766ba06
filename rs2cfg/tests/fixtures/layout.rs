use std::collections::HashMap;

/// Nested section.
#[derive(Default)]
pub struct SubStruct {
    /// Nested value.
    pub value: u32,
}

/// Declares its nested struct before the simple field and the map.
pub struct Layout {
    /// Nested section.
    #[serde(rename = "SubStruct")]
    pub sub_struct: SubStruct,
    /// Display name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Free-form tags.
    #[serde(rename = "Tags")]
    pub tags: HashMap<String, String>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            sub_struct: SubStruct { value: 7 },
            name: "svc".to_string(),
            tags: HashMap::from([("env".to_string(), "prod".to_string())]),
        }
    }
}
