use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::*;
use serde::{Deserialize, Serialize};

use crate::error::{HeaderGenError, Result};

pub mod build_tasks;
pub mod header;
pub mod includes;
pub mod json;
pub mod reflection;

use includes::IncludeResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    /// guesses the stage from a '.vert', '.frag' or '.comp' anywhere in the file name,
    /// falling back to vertex
    pub fn guess_from_file_name(file_name: &str) -> Self {
        if file_name.contains(".vert") {
            Self::Vertex
        } else if file_name.contains(".frag") {
            Self::Fragment
        } else if file_name.contains(".comp") {
            Self::Compute
        } else {
            Self::Vertex
        }
    }

    fn shader_kind(self) -> shaderc::ShaderKind {
        match self {
            Self::Vertex => shaderc::ShaderKind::Vertex,
            Self::Fragment => shaderc::ShaderKind::Fragment,
            Self::Compute => shaderc::ShaderKind::Compute,
        }
    }

    pub fn execution_model(self) -> rspirv::spirv::ExecutionModel {
        match self {
            Self::Vertex => rspirv::spirv::ExecutionModel::Vertex,
            Self::Fragment => rspirv::spirv::ExecutionModel::Fragment,
            Self::Compute => rspirv::spirv::ExecutionModel::GLCompute,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
        };
        f.write_str(name)
    }
}

impl FromStr for ShaderStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vert" | "vertex" => Ok(Self::Vertex),
            "frag" | "fragment" => Ok(Self::Fragment),
            "comp" | "compute" => Ok(Self::Compute),
            other => Err(format!("unknown stage {other}")),
        }
    }
}

/// The spirv payload for one stage
pub struct CompiledShader {
    pub stage: ShaderStage,
    pub words: Vec<u32>,
}

impl fmt::Debug for CompiledShader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledShader")
            .field("stage", &self.stage)
            .field("word_count", &self.words.len())
            .finish()
    }
}

/// Compiles glsl source for a vulkan 1.2 target.
///
/// Optimization is disabled so that reflection sees every declared
/// resource with its original names.
pub fn compile_glsl(
    source: &str,
    input_path: &Path,
    stage: ShaderStage,
    resolver: &IncludeResolver,
) -> Result<CompiledShader> {
    let compiler = shaderc::Compiler::new().ok_or(HeaderGenError::CompilerInit)?;
    let mut options = shaderc::CompileOptions::new().ok_or(HeaderGenError::CompilerInit)?;

    options.set_source_language(shaderc::SourceLanguage::GLSL);
    options.set_target_env(
        shaderc::TargetEnv::Vulkan,
        shaderc::EnvVersion::Vulkan1_2 as u32,
    );
    options.set_target_spirv(shaderc::SpirvVersion::V1_5);
    options.set_optimization_level(shaderc::OptimizationLevel::Zero);
    options.set_include_callback(|requested, include_type, requesting, _depth| {
        resolver.resolve(requested, include_type, requesting)
    });

    let input_file_name = input_path.to_string_lossy();
    let artifact = compiler.compile_into_spirv(
        source,
        stage.shader_kind(),
        &input_file_name,
        "main",
        Some(&options),
    )?;

    if artifact.get_num_warnings() > 0 {
        warn!("{}", artifact.get_warning_messages());
    }

    let words = artifact.as_binary().to_vec();
    debug!("compiled {input_file_name} ({stage}): {} words", words.len());

    Ok(CompiledShader { stage, words })
}

/// Loads an already-compiled spirv module
pub fn load_spirv(path: &Path, stage: ShaderStage) -> Result<CompiledShader> {
    let bytes = std::fs::read(path).map_err(|e| HeaderGenError::io(path, e))?;
    let byte_reader = &mut std::io::Cursor::new(bytes.as_slice());
    let words = ash::util::read_spv(byte_reader).map_err(|e| HeaderGenError::io(path, e))?;

    Ok(CompiledShader { stage, words })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_from_file_name() {
        assert_eq!(ShaderStage::guess_from_file_name("basic.vert"), ShaderStage::Vertex);
        assert_eq!(
            ShaderStage::guess_from_file_name("lighting.frag.glsl"),
            ShaderStage::Fragment
        );
        assert_eq!(ShaderStage::guess_from_file_name("cull.comp"), ShaderStage::Compute);
        assert_eq!(ShaderStage::guess_from_file_name("shader.glsl"), ShaderStage::Vertex);
    }

    #[test]
    fn stage_from_str() {
        assert_eq!("vert".parse(), Ok(ShaderStage::Vertex));
        assert_eq!("fragment".parse(), Ok(ShaderStage::Fragment));
        assert_eq!("comp".parse(), Ok(ShaderStage::Compute));
        assert!("geom".parse::<ShaderStage>().is_err());
    }

    #[test]
    fn spirv_round_trips_through_disk() {
        let tmp_prefix = format!("spirv-test-{}", uuid::Uuid::new_v4());
        let tmp_dir_path = std::env::temp_dir().join(tmp_prefix);
        std::fs::create_dir_all(&tmp_dir_path).unwrap();

        let words: [u32; 5] = [0x0723_0203, 0x0001_0500, 0, 8, 0];
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let spv_path = tmp_dir_path.join("shader.spv");
        std::fs::write(&spv_path, bytes).unwrap();

        let loaded = load_spirv(&spv_path, ShaderStage::Fragment).unwrap();
        assert_eq!(loaded.words, words);
        assert_eq!(loaded.stage, ShaderStage::Fragment);
    }

    #[test]
    fn missing_spirv_names_the_path() {
        let err = load_spirv(Path::new("does/not/exist.spv"), ShaderStage::Vertex).unwrap_err();
        assert!(err.to_string().contains("exist.spv"));
    }
}
