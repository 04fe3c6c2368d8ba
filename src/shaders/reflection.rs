use log::*;
use rspirv::dr::{Module, Operand};
use rspirv::spirv::{Decoration, Op, StorageClass};

use crate::error::{HeaderGenError, Result};

use super::json::*;
use super::{CompiledShader, ShaderStage};

mod types;
use types::*;

/// Builds the reflection view for one compiled stage
pub fn reflection_json(source_file_name: &str, shader: &CompiledShader) -> Result<ReflectionJson> {
    let module = rspirv::dr::load_words(&shader.words)
        .map_err(|e| HeaderGenError::Reflection(format!("{e:?}")))?;

    reflect_module(source_file_name, &module, shader.stage)
}

pub fn reflect_module(
    source_file_name: &str,
    module: &Module,
    stage: ShaderStage,
) -> Result<ReflectionJson> {
    let has_stage = module.entry_points.iter().any(|entry_point| {
        entry_point.operands.first() == Some(&Operand::ExecutionModel(stage.execution_model()))
    });
    if !has_stage {
        return Err(HeaderGenError::MissingStage(stage));
    }

    let tables = SpirvTables::new(module);

    let mut reflection = ReflectionJson {
        source_file_name: source_file_name.to_string(),
        stage: Some(stage),
        ..Default::default()
    };

    for inst in &module.types_global_values {
        if inst.class.opcode != Op::Variable {
            continue;
        }

        let (Some(variable_id), Some(pointer_type)) = (inst.result_id, inst.result_type) else {
            continue;
        };
        let Some(&Operand::StorageClass(storage_class)) = inst.operands.first() else {
            continue;
        };
        let Some(pointee) = tables.pointee(pointer_type) else {
            continue;
        };

        let variable_name = || {
            tables
                .name(variable_id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("_var{variable_id}"))
        };
        let binding = tables
            .decoration_value(variable_id, Decoration::Binding)
            .map_or(-1, |binding| binding as i32);

        let symbol = match storage_class {
            StorageClass::Uniform | StorageClass::StorageBuffer | StorageClass::PushConstant => {
                let block_type = tables.strip_arrays(pointee);

                let category = if storage_class == StorageClass::StorageBuffer
                    || tables.has_decoration(block_type, Decoration::BufferBlock)
                {
                    SymbolCategory::BufferBlock
                } else {
                    SymbolCategory::UniformBlock
                };

                // blocks are known by their type name, like glslang's reflection
                let name = tables
                    .name(block_type)
                    .map(str::to_string)
                    .unwrap_or_else(variable_name);

                let binding = if storage_class == StorageClass::PushConstant {
                    -1
                } else {
                    binding
                };

                ReflectedSymbol::new(name, category, binding, tables.type_descriptor(pointee))
            }

            StorageClass::Input | StorageClass::Output => {
                if tables.has_decoration(variable_id, Decoration::BuiltIn)
                    || tables.has_builtin_members(tables.strip_arrays(pointee))
                {
                    continue;
                }
                let Some(location) = tables.decoration_value(variable_id, Decoration::Location)
                else {
                    continue;
                };

                let category = if storage_class == StorageClass::Input {
                    SymbolCategory::PipeInput
                } else {
                    SymbolCategory::PipeOutput
                };

                ReflectedSymbol::new(
                    variable_name(),
                    category,
                    location as i32,
                    tables.type_descriptor(pointee),
                )
            }

            StorageClass::UniformConstant => ReflectedSymbol::new(
                variable_name(),
                SymbolCategory::LooseUniform,
                binding,
                tables.type_descriptor(pointee),
            ),

            _ => continue,
        };

        reflection.push(symbol);
    }

    info!(
        "reflected {source_file_name} ({stage}): {} uniform blocks, {} buffer blocks, {} inputs, {} outputs, {} uniforms",
        reflection.uniform_blocks.len(),
        reflection.buffer_blocks.len(),
        reflection.pipe_inputs.len(),
        reflection.pipe_outputs.len(),
        reflection.loose_uniforms.len(),
    );

    Ok(reflection)
}
