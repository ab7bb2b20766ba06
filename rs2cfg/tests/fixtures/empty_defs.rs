/// A struct with non-initialized fields.
#[derive(Default)]
pub struct EmptySubType {
    /// Field A
    pub a: String,
    /// Field B
    pub b: i32,
}

/// A struct without defaults.
pub struct EmptyDefs {
    pub test1: EmptySubType,
    pub test2: Vec<EmptySubType>,
}
