use std::collections::BTreeMap;

/// Kind of constant.
pub enum ConstType {
    /// ConstTypeA doc block.
    ConstTypeA = 0,
    /// ConstTypeB comment.
    ConstTypeB = 1,
    /// ConstTypeD doc block.
    ConstTypeD = 32,
    ConstTypeF = 128,
}

/// Simple defines a simple user.
#[config(defaults = "simple_defaults")]
pub struct Simple {
    /// Name of the user documentation block.
    /// User name comment.
    pub name: String,
    /// User surname comment.
    pub surname: String,

    /// Age documentation block.
    /// User age.
    pub age: i32,
    /// Number of stars achieved.
    pub stars_count: i32,

    /// Addresses comment.
    pub addresses: Vec<String>,

    /// User tags.
    pub tags: BTreeMap<String, String>,

    /// Type documentation block.
    /// Type of constant.
    #[serde(rename = "type")]
    pub kind: ConstType,

    /// Coordinates.
    pub x: f64,
    pub y: f64,
}

pub fn simple_defaults() -> Simple {
    Simple {
        name: "John".to_string(),
        surname: String::new(),
        age: 30,
        stars_count: 5,
        addresses: vec![
            "Address 1".to_string(),
            "Address 2".to_string(),
            "Address 3".to_string(),
        ],
        tags: BTreeMap::from([
            ("Key1".to_string(), "Value1".to_string()),
            ("Key2".to_string(), "Value2".to_string()),
            ("Key3".to_string(), "Value3".to_string()),
        ]),
        kind: ConstType::ConstTypeA,
        x: 1.0,
        y: 2.0,
    }
}
