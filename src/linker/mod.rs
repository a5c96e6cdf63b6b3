pub mod script;
pub mod path;
pub mod config;
pub mod error;
pub mod registry;
pub mod fallback;
pub mod protect;
pub mod resolve;
pub mod render;
pub mod scan;
pub mod engine;

pub use config::*;
pub use error::*;
pub use registry::*;
pub use fallback::*;
pub use protect::*;
pub use resolve::*;
pub use render::*;
pub use scan::*;
pub use engine::*;
