pub mod error;
pub mod shader_watcher;
pub mod shaders;
pub mod util;

pub use error::{HeaderGenError, Result};
pub use shaders::build_tasks;
