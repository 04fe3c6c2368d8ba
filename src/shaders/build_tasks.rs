use std::path::{Path, PathBuf};

use log::*;
use rustc_hash::FxHashMap;

use crate::error::{HeaderGenError, Result};
use crate::util::shader_name_from_path;

use super::header::{GeneratorConfig, generate_header};
use super::includes::IncludeResolver;
use super::reflection::reflection_json;
use super::{CompiledShader, ShaderStage, compile_glsl, load_spirv};

pub struct Config {
    /// glsl source, or a precompiled '.spv' module
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub stage: ShaderStage,
    pub struct_prefix: String,
    pub global_prefix: String,
    pub custom_type_overrides: FxHashMap<String, String>,
    pub extra_prelude: String,
    /// searched for `#include <...>` directives
    pub include_dirs: Vec<PathBuf>,
    /// where to also write the reflection view, if anywhere
    pub reflection_json_path: Option<PathBuf>,
}

impl Config {
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            struct_prefix: self.struct_prefix.clone(),
            global_prefix: self.global_prefix.clone(),
            shader_name: shader_name_from_path(&self.input_path),
            custom_type_overrides: self.custom_type_overrides.clone(),
            extra_prelude: self.extra_prelude.clone(),
        }
    }
}

/// Compiles, reflects and writes the header for one shader stage.
///
/// The header is rendered completely before anything is written, so a
/// failed run never leaves a partial header behind.
pub fn write_header(config: &Config) -> Result<()> {
    info!(
        "generating {} from {} ({})",
        config.output_path.display(),
        config.input_path.display(),
        config.stage
    );

    let compiled = compile_input(config)?;

    let source_file_name = config
        .input_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let reflection = reflection_json(&source_file_name, &compiled)?;

    let header = generate_header(&reflection, &compiled.words, &config.generator_config())?;

    let reflection_json = match &config.reflection_json_path {
        Some(_) => Some(serde_json::to_string_pretty(&reflection)?),
        None => None,
    };

    write_atomic(&config.output_path, &header)?;
    info!("wrote {}", config.output_path.display());

    // only ever describes a header that made it to disk
    if let (Some(json_path), Some(reflection_json)) =
        (&config.reflection_json_path, reflection_json)
    {
        write_atomic(json_path, &reflection_json)?;
        info!("wrote reflection json to {}", json_path.display());
    }

    Ok(())
}

fn compile_input(config: &Config) -> Result<CompiledShader> {
    let input_path = &config.input_path;

    if input_path.extension().is_some_and(|ext| ext == "spv") {
        return load_spirv(input_path, config.stage);
    }

    let source =
        std::fs::read_to_string(input_path).map_err(|e| HeaderGenError::io(input_path, e))?;
    let resolver = IncludeResolver::new(input_path, config.include_dirs.clone());

    compile_glsl(&source, input_path, config.stage, &resolver)
}

/// Parses a `<glsl type>=<c type>` override
pub fn parse_type_map(type_map: &str) -> Result<(String, String)> {
    match type_map.split_once('=') {
        Some((glsl_type, c_type)) if !glsl_type.is_empty() => {
            Ok((glsl_type.to_string(), c_type.to_string()))
        }
        _ => Err(HeaderGenError::InvalidTypeMap(type_map.to_string())),
    }
}

pub fn read_prelude(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| HeaderGenError::io(path, e))
}

/// writes next to the destination first, then renames over it
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| HeaderGenError::io(parent, e))?;
    }

    let mut tmp_file_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_file_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_file_name);

    std::fs::write(&tmp_path, contents).map_err(|e| HeaderGenError::io(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        HeaderGenError::io(path, e)
    })
}
