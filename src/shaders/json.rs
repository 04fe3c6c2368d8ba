use serde::{Deserialize, Serialize};

mod symbols;
pub use symbols::*;

mod types;
pub use types::*;

use super::ShaderStage;

/// The read-only reflection view of one linked shader stage.
///
/// Each list keeps the order the symbols were declared in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReflectionJson {
    pub source_file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub stage: Option<ShaderStage>,
    pub uniform_blocks: Vec<ReflectedSymbol>,
    pub buffer_blocks: Vec<ReflectedSymbol>,
    pub pipe_inputs: Vec<ReflectedSymbol>,
    pub pipe_outputs: Vec<ReflectedSymbol>,
    pub loose_uniforms: Vec<ReflectedSymbol>,
}

impl ReflectionJson {
    pub fn push(&mut self, symbol: ReflectedSymbol) {
        let list = match symbol.category {
            SymbolCategory::UniformBlock => &mut self.uniform_blocks,
            SymbolCategory::BufferBlock => &mut self.buffer_blocks,
            SymbolCategory::PipeInput => &mut self.pipe_inputs,
            SymbolCategory::PipeOutput => &mut self.pipe_outputs,
            SymbolCategory::LooseUniform => &mut self.loose_uniforms,
        };

        list.push(symbol);
    }

    pub fn symbol_count(&self) -> usize {
        self.uniform_blocks.len()
            + self.buffer_blocks.len()
            + self.pipe_inputs.len()
            + self.pipe_outputs.len()
            + self.loose_uniforms.len()
    }
}
