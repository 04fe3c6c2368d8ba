use std::path::PathBuf;

use thiserror::Error;

use crate::shaders::ShaderStage;

/// Every way a single header generation can fail.
///
/// None of these are retried; the caller reports the message and gives up.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HeaderGenError {
    #[error("failed to initialize the shaderc compiler")]
    CompilerInit,

    /// glslang diagnostics, passed through unchanged
    #[error("failed to compile shader:\n{0}")]
    Compile(#[from] shaderc::Error),

    #[error("failed to build reflection: {0}")]
    Reflection(String),

    #[error("unsupported type for field '{field_name}' in struct '{struct_name}'")]
    UnsupportedType {
        struct_name: String,
        field_name: String,
    },

    #[error("field '{field_name}' in struct '{struct_name}' is too large to lay out")]
    LayoutOverflow {
        struct_name: String,
        field_name: String,
    },

    #[error("no compiled code for the {0} stage")]
    MissingStage(ShaderStage),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid type map '{0}', expected <glsl type>=<c type>")]
    InvalidTypeMap(String),

    #[error("failed to serialize reflection json")]
    Json(#[from] serde_json::Error),

    #[error("failed to render header template")]
    Template(#[from] askama::Error),
}

impl HeaderGenError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = HeaderGenError> = std::result::Result<T, E>;
