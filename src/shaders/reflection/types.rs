use rspirv::dr::{Instruction, Module, Operand};
use rspirv::spirv::{Decoration, Op, Word};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::shaders::json::*;

/// Lookup tables over a spirv module's debug names, annotations and
/// global type/constant declarations.
pub(super) struct SpirvTables<'m> {
    globals: FxHashMap<Word, &'m Instruction>,
    names: FxHashMap<Word, &'m str>,
    member_names: FxHashMap<(Word, u32), &'m str>,
    // (target, decoration) -> first literal operand, if any
    decorations: FxHashMap<(Word, u32), Option<u32>>,
    builtin_member_structs: FxHashSet<Word>,
}

impl<'m> SpirvTables<'m> {
    pub fn new(module: &'m Module) -> Self {
        let mut names = FxHashMap::default();
        let mut member_names = FxHashMap::default();

        for inst in &module.debug_names {
            match inst.class.opcode {
                Op::Name => {
                    if let (Some(target), Some(Operand::LiteralString(name))) =
                        (id_ref(inst, 0), inst.operands.get(1))
                    {
                        names.insert(target, name.as_str());
                    }
                }
                Op::MemberName => {
                    if let (Some(target), Some(member), Some(Operand::LiteralString(name))) =
                        (id_ref(inst, 0), literal(inst, 1), inst.operands.get(2))
                    {
                        member_names.insert((target, member), name.as_str());
                    }
                }
                _ => {}
            }
        }

        let mut decorations = FxHashMap::default();
        let mut builtin_member_structs = FxHashSet::default();

        for inst in &module.annotations {
            match inst.class.opcode {
                Op::Decorate => {
                    let (Some(target), Some(&Operand::Decoration(decoration))) =
                        (id_ref(inst, 0), inst.operands.get(1))
                    else {
                        continue;
                    };
                    decorations.insert((target, decoration as u32), literal(inst, 2));
                }
                Op::MemberDecorate => {
                    let (Some(target), Some(&Operand::Decoration(Decoration::BuiltIn))) =
                        (id_ref(inst, 0), inst.operands.get(2))
                    else {
                        continue;
                    };
                    builtin_member_structs.insert(target);
                }
                _ => {}
            }
        }

        let globals = module
            .types_global_values
            .iter()
            .filter_map(|inst| inst.result_id.map(|id| (id, inst)))
            .collect();

        Self {
            globals,
            names,
            member_names,
            decorations,
            builtin_member_structs,
        }
    }

    pub fn name(&self, id: Word) -> Option<&'m str> {
        self.names.get(&id).copied().filter(|name| !name.is_empty())
    }

    pub fn has_decoration(&self, id: Word, decoration: Decoration) -> bool {
        self.decorations.contains_key(&(id, decoration as u32))
    }

    pub fn decoration_value(&self, id: Word, decoration: Decoration) -> Option<u32> {
        self.decorations
            .get(&(id, decoration as u32))
            .copied()
            .flatten()
    }

    pub fn has_builtin_members(&self, type_id: Word) -> bool {
        self.builtin_member_structs.contains(&type_id)
    }

    /// the pointee type of an OpTypePointer
    pub fn pointee(&self, pointer_type: Word) -> Option<Word> {
        let inst = self.globals.get(&pointer_type)?;
        if inst.class.opcode != Op::TypePointer {
            return None;
        }
        id_ref(inst, 1)
    }

    /// follows array types down to their element type
    pub fn strip_arrays(&self, type_id: Word) -> Word {
        let mut current = type_id;
        while let Some(inst) = self.globals.get(&current) {
            match inst.class.opcode {
                Op::TypeArray | Op::TypeRuntimeArray => match id_ref(inst, 0) {
                    Some(element) => current = element,
                    None => break,
                },
                _ => break,
            }
        }
        current
    }

    fn constant_value(&self, id: Word) -> Option<u32> {
        let inst = self.globals.get(&id)?;
        match inst.class.opcode {
            Op::Constant | Op::SpecConstant => literal(inst, 0),
            _ => None,
        }
    }

    /// Copies a spirv type into a descriptor.
    ///
    /// Anything that has no c layout (images, samplers, pointers, 64 bit
    /// and 16 bit numbers) comes back as an unknown scalar.
    pub fn type_descriptor(&self, type_id: Word) -> TypeDescriptor {
        let unknown = TypeDescriptor::scalar(BasicKind::Unknown);

        let Some(inst) = self.globals.get(&type_id) else {
            return unknown;
        };

        match inst.class.opcode {
            Op::TypeFloat => match literal(inst, 0) {
                Some(32) => TypeDescriptor::scalar(BasicKind::Float),
                _ => unknown,
            },

            Op::TypeInt => match (literal(inst, 0), literal(inst, 1)) {
                (Some(32), Some(1)) => TypeDescriptor::scalar(BasicKind::Int),
                (Some(32), Some(0)) => TypeDescriptor::scalar(BasicKind::Uint),
                _ => unknown,
            },

            Op::TypeBool => TypeDescriptor::scalar(BasicKind::Bool),

            Op::TypeVector => {
                let (Some(component), Some(size)) = (id_ref(inst, 0), literal(inst, 1)) else {
                    return unknown;
                };
                let component = self.type_descriptor(component);
                if component.shape != Shape::Scalar {
                    return unknown;
                }
                TypeDescriptor::vector(component.kind, size)
            }

            Op::TypeMatrix => {
                let (Some(column), Some(cols)) = (id_ref(inst, 0), literal(inst, 1)) else {
                    return unknown;
                };
                let column = self.type_descriptor(column);
                match column.shape {
                    Shape::Vector { size: rows } => TypeDescriptor {
                        kind: column.kind,
                        shape: Shape::Matrix { cols, rows },
                        array: None,
                    },
                    _ => unknown,
                }
            }

            Op::TypeArray => {
                let (Some(element), Some(length)) = (id_ref(inst, 0), id_ref(inst, 1)) else {
                    return unknown;
                };
                let Some(extent) = self.constant_value(length) else {
                    return unknown;
                };

                let element = self.type_descriptor(element);
                // arrays of arrays flatten into one extent
                let array = match element.array {
                    None => ArrayInfo::Sized { extent },
                    Some(ArrayInfo::Sized { extent: inner }) => match inner.checked_mul(extent) {
                        Some(extent) => ArrayInfo::Sized { extent },
                        None => return unknown,
                    },
                    Some(ArrayInfo::Unbounded) => ArrayInfo::Unbounded,
                };

                TypeDescriptor {
                    array: Some(array),
                    ..element
                }
            }

            Op::TypeRuntimeArray => {
                let Some(element) = id_ref(inst, 0) else {
                    return unknown;
                };
                self.type_descriptor(element).unbounded_array()
            }

            Op::TypeStruct => {
                let members = inst
                    .operands
                    .iter()
                    .enumerate()
                    .filter_map(|(index, operand)| match operand {
                        Operand::IdRef(member_type) => Some((index as u32, *member_type)),
                        _ => None,
                    })
                    .map(|(index, member_type)| {
                        let field_name = self
                            .member_names
                            .get(&(type_id, index))
                            .map(|name| name.to_string())
                            .unwrap_or_else(|| format!("_member{index}"));

                        StructMember::new(field_name, self.type_descriptor(member_type))
                    })
                    .collect();

                let type_name = self
                    .name(type_id)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("_struct{type_id}"));

                TypeDescriptor::structure(type_name, members)
            }

            _ => unknown,
        }
    }
}

pub(super) fn literal(inst: &Instruction, index: usize) -> Option<u32> {
    match inst.operands.get(index) {
        Some(&Operand::LiteralBit32(value)) => Some(value),
        _ => None,
    }
}

pub(super) fn id_ref(inst: &Instruction, index: usize) -> Option<Word> {
    match inst.operands.get(index) {
        Some(&Operand::IdRef(id)) => Some(id),
        _ => None,
    }
}
