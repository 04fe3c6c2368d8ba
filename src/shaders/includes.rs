use std::path::{Path, PathBuf};

use log::*;
use shaderc::{IncludeType, ResolvedInclude};

/// Resolves `#include` directives for one compilation.
///
/// Relative includes are looked up next to the including file, or next to
/// the root input when glslang doesn't report an includer.
/// Standard includes are searched for in `include_dirs`, in order.
#[derive(Debug, Clone)]
pub struct IncludeResolver {
    root_path: PathBuf,
    include_dirs: Vec<PathBuf>,
}

impl IncludeResolver {
    pub fn new(root_path: impl Into<PathBuf>, include_dirs: Vec<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            include_dirs,
        }
    }

    pub fn resolve(
        &self,
        requested: &str,
        include_type: IncludeType,
        requesting: &str,
    ) -> Result<ResolvedInclude, String> {
        let header_path = match include_type {
            IncludeType::Relative => self.relative_path(requested, requesting),
            IncludeType::Standard => self.standard_path(requested)?,
        };

        let content = std::fs::read_to_string(&header_path).map_err(|e| {
            format!("failed to open include file {}: {e}", header_path.display())
        })?;

        debug!("resolved include {requested} -> {}", header_path.display());

        Ok(ResolvedInclude {
            resolved_name: header_path.to_string_lossy().into_owned(),
            content,
        })
    }

    fn relative_path(&self, requested: &str, requesting: &str) -> PathBuf {
        let lookup_base = if requesting.is_empty() {
            parent_dir(&self.root_path)
        } else {
            parent_dir(Path::new(requesting))
        };

        lookup_base.join(requested)
    }

    fn standard_path(&self, requested: &str) -> Result<PathBuf, String> {
        self.include_dirs
            .iter()
            .map(|dir| dir.join(requested))
            .find(|path| path.is_file())
            .ok_or_else(|| format!("include file {requested} not found in any include directory"))
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
