use rustc_hash::FxHashSet;

use crate::shaders::json::*;

/// Distinct struct types, in an order where every struct comes after the
/// structs it contains by value.
#[derive(Debug, Default)]
pub struct EncounteredStructs<'r> {
    order: Vec<&'r StructType>,
    seen: FxHashSet<&'r str>,
}

impl<'r> EncounteredStructs<'r> {
    /// Registers a struct and every struct reachable from its members.
    /// Registering a name a second time is a no-op.
    pub fn register(&mut self, struct_type: &'r StructType) {
        if !self.seen.insert(struct_type.type_name.as_str()) {
            return;
        }

        for member in &struct_type.members {
            if let Some(member_struct) = member.field_type.as_struct() {
                self.register(member_struct);
            }
        }

        self.order.push(struct_type);
    }

    pub fn iter(&self) -> impl Iterator<Item = &'r StructType> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct CollectedSymbols<'r> {
    pub structs: EncounteredStructs<'r>,
    /// uniform names already covered by an emitted block
    pub handled_names: FxHashSet<String>,
    /// loose uniforms that still need a binding define, in reflected order
    pub unhandled_uniforms: Vec<&'r ReflectedSymbol>,
}

/// One pass over every block and uniform, gathering the struct set and the
/// names that blocks already account for.
pub fn collect_symbols(reflection: &ReflectionJson) -> CollectedSymbols<'_> {
    let mut collected = CollectedSymbols::default();

    for block in &reflection.uniform_blocks {
        let Some(block_struct) = block.symbol_type.as_struct() else {
            continue;
        };

        collected.structs.register(block_struct);
        for member in &block_struct.members {
            collected.handled_names.insert(member.field_name.clone());
        }
    }

    for block in &reflection.buffer_blocks {
        let Some(block_struct) = block.symbol_type.as_struct() else {
            continue;
        };

        collected.structs.register(block_struct);
        for member in &block_struct.members {
            let handled_name = if block.name.is_empty() {
                member.field_name.clone()
            } else {
                format!("{}.{}", block.name, member.field_name)
            };
            collected.handled_names.insert(handled_name);
        }
    }

    for uniform in &reflection.loose_uniforms {
        if collected.handled_names.contains(&uniform.name) {
            continue;
        }

        if let Some(uniform_struct) = uniform.symbol_type.as_struct() {
            collected.structs.register(uniform_struct);
        }
        collected.unhandled_uniforms.push(uniform);
    }

    collected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light() -> TypeDescriptor {
        TypeDescriptor::structure(
            "Light",
            vec![
                StructMember::new("position", TypeDescriptor::vector(BasicKind::Float, 3)),
                StructMember::new("intensity", TypeDescriptor::scalar(BasicKind::Float)),
            ],
        )
    }

    fn block(name: &str, category: SymbolCategory, members: Vec<StructMember>) -> ReflectedSymbol {
        ReflectedSymbol::new(name, category, 0, TypeDescriptor::structure(name, members))
    }

    fn struct_names(collected: &CollectedSymbols) -> Vec<String> {
        collected
            .structs
            .iter()
            .map(|s| s.type_name.clone())
            .collect()
    }

    #[test]
    fn shared_struct_is_registered_once() {
        let mut reflection = ReflectionJson::default();
        for name in ["Scene", "Shadow", "Probe"] {
            reflection.push(block(
                name,
                SymbolCategory::UniformBlock,
                vec![StructMember::new("light", light())],
            ));
        }

        let collected = collect_symbols(&reflection);

        assert_eq!(struct_names(&collected), ["Light", "Scene", "Shadow", "Probe"]);
    }

    #[test]
    fn nested_structs_come_before_their_containers() {
        let material = TypeDescriptor::structure(
            "Material",
            vec![StructMember::new("light", light().sized_array(4))],
        );

        let mut reflection = ReflectionJson::default();
        reflection.push(block(
            "Frame",
            SymbolCategory::BufferBlock,
            vec![
                StructMember::new("time", TypeDescriptor::scalar(BasicKind::Float)),
                StructMember::new("materials", material.unbounded_array()),
            ],
        ));

        let collected = collect_symbols(&reflection);

        assert_eq!(struct_names(&collected), ["Light", "Material", "Frame"]);
    }

    #[test]
    fn block_members_suppress_loose_uniforms() {
        let mut reflection = ReflectionJson::default();
        reflection.push(block(
            "Globals",
            SymbolCategory::UniformBlock,
            vec![StructMember::new(
                "time",
                TypeDescriptor::scalar(BasicKind::Float),
            )],
        ));
        reflection.push(block(
            "Particles",
            SymbolCategory::BufferBlock,
            vec![StructMember::new(
                "count",
                TypeDescriptor::scalar(BasicKind::Uint),
            )],
        ));
        reflection.push(block(
            "",
            SymbolCategory::BufferBlock,
            vec![StructMember::new(
                "seed",
                TypeDescriptor::scalar(BasicKind::Uint),
            )],
        ));

        let sampler = TypeDescriptor::scalar(BasicKind::Unknown);
        for name in ["time", "Particles.count", "count", "seed", "albedo"] {
            reflection.push(ReflectedSymbol::new(
                name,
                SymbolCategory::LooseUniform,
                1,
                sampler.clone(),
            ));
        }

        let collected = collect_symbols(&reflection);

        assert!(collected.handled_names.contains("time"));
        assert!(collected.handled_names.contains("Particles.count"));
        assert!(collected.handled_names.contains("seed"));
        assert!(!collected.handled_names.contains("count"));

        let unhandled: Vec<&str> = collected
            .unhandled_uniforms
            .iter()
            .map(|u| u.name.as_str())
            .collect();
        assert_eq!(unhandled, ["count", "albedo"]);
    }

    #[test]
    fn loose_struct_uniform_registers_its_struct() {
        let mut reflection = ReflectionJson::default();
        reflection.push(ReflectedSymbol::new(
            "sun",
            SymbolCategory::LooseUniform,
            2,
            light(),
        ));

        let collected = collect_symbols(&reflection);

        assert_eq!(struct_names(&collected), ["Light"]);
        assert_eq!(collected.unhandled_uniforms.len(), 1);
    }

    #[test]
    fn scalar_block_is_not_a_struct() {
        let mut reflection = ReflectionJson::default();
        reflection.push(ReflectedSymbol::new(
            "Alias",
            SymbolCategory::UniformBlock,
            0,
            TypeDescriptor::scalar(BasicKind::Float),
        ));

        let collected = collect_symbols(&reflection);

        assert!(collected.structs.is_empty());
        assert!(collected.handled_names.is_empty());
    }
}
