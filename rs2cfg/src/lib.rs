//! # rs2cfg
//!
//! Generate commented configuration templates in JSONC, TOML and YAML from
//! the Rust types that describe a configuration.
//!
//! ## Overview
//!
//! `rs2cfg` reads the declaration of a root struct, walks every nested,
//! embedded and collection element type, and renders a template in which each
//! field carries its doc comment and default value. Enums get an "Allowed
//! values:" table.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs2cfg::distiller::SourceSchemaProvider;
//! use rs2cfg::render::{OutputFormat, RenderOptions};
//! use rs2cfg::Generator;
//!
//! let provider = SourceSchemaProvider::from_source(r#"
//!     pub struct Server {
//!         /// Listen port.
//!         pub port: u16,
//!     }
//!
//!     impl Default for Server {
//!         fn default() -> Self {
//!             Self { port: 8080 }
//!         }
//!     }
//! "#).unwrap();
//!
//! let toml = Generator::new(RenderOptions::new(OutputFormat::Toml))
//!     .generate(&provider, "Server")
//!     .unwrap();
//! assert_eq!(toml, "# Listen port.\nport = 8080\n");
//! ```
//!
//! ## Container Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `#[config(rename_all = "kebab-case")]` | Rename all fields or variants |
//! | `#[config(defaults = "fn_name")]` | Use a free function instead of `impl Default` |
//!
//! ## Field Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `#[config(rename = "name")]` | Rename this field |
//! | `#[config(skip)]` | Leave this field out of the template |
//! | `#[config(embed)]` | Promote the fields of the nested struct |
//! | `#[config(tags = "key:\"value\"")]` | Attach free-form tags |
//!
//! `#[serde(rename, rename_all, skip, skip_serializing, flatten)]` are
//! honoured as well; `#[config]` wins when both are present.
//!
//! ## Type Mappings
//!
//! | Rust Type | Template value |
//! |-----------|----------------|
//! | `bool` | boolean |
//! | integers, floats | number |
//! | `String`, `&str`, `char`, `PathBuf` | string |
//! | `Option<T>`, `Box<T>`, `Rc<T>`, `Arc<T>` | same as `T` |
//! | `Vec<T>`, `[T; N]`, sets | array |
//! | `HashMap<K, V>`, `BTreeMap<K, V>` | table / object |
//! | unit-only enum | variant name, or discriminant when declared |
//! | struct | nested table / object |

pub mod distiller;
pub mod error;
pub mod generator;
pub mod jsonc;
pub mod registry;
pub mod render;
pub mod schema;

pub use distiller::{Distiller, SchemaProvider, SourceSchemaProvider, StaticSchemaProvider};
pub use error::{DistillError, GenerateError, GenerateResult, RenderError};
pub use generator::Generator;
pub use registry::{EnumRegistry, GenerationSession, StructRegistry};
pub use render::{DocTypesMode, OutputFormat, RenderOptions, Renderer};
