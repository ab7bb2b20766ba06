/// Embedded test struct.
#[derive(Default)]
pub struct Embedded {
    /// Identifier documentation block.
    #[serde(rename = "id")]
    pub identifier: i32,
    /// Enabled comment line.
    pub enabled: bool,

    pub reserved: u32,
}

/// Embedding test struct.
pub struct Embedding {
    /// Embedded documentation block.
    #[serde(flatten)]
    pub embedded: Embedded,

    /// Position comment line.
    pub position: f32,
    /// Velocity documentation block.
    pub velocity: f32,
    #[serde(rename = "accel")]
    pub acceleration: f32,

    /// Shadowing field.
    pub reserved: String,
}

impl Default for Embedding {
    fn default() -> Self {
        Self {
            embedded: Embedded {
                identifier: 1234,
                enabled: false,
                reserved: 0x10,
            },
            position: 1.0,
            velocity: 2.0,
            acceleration: 0.23,
            reserved: "Shadowing".into(),
        }
    }
}
