use serde::{Deserialize, Serialize};

use super::TypeDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolCategory {
    UniformBlock,
    BufferBlock,
    PipeInput,
    PipeOutput,
    LooseUniform,
}

/// A named resource or interface variable with its binding (blocks and
/// uniforms) or location (pipe inputs and outputs).
///
/// Unassigned bindings are -1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectedSymbol {
    pub name: String,
    pub category: SymbolCategory,
    pub binding: i32,
    pub symbol_type: TypeDescriptor,
}

impl ReflectedSymbol {
    pub fn new(
        name: impl Into<String>,
        category: SymbolCategory,
        binding: i32,
        symbol_type: TypeDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            binding,
            symbol_type,
        }
    }
}
