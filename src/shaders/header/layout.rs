use std::fmt;

use crate::error::{HeaderGenError, Result};
use crate::shaders::json::*;

use super::GeneratorConfig;
use super::names::field_declaration;

const SCALAR_SIZE: u32 = 4;

/// Packed byte size of a type, or `None` if it doesn't fit in a `u32`.
///
/// Struct sizes are the raw sum of their members; the padding a struct
/// body gets is not included. Unbounded arrays count as zero bytes.
pub fn size_of(ty: &TypeDescriptor) -> Option<u32> {
    let base_size = match &ty.kind {
        BasicKind::Float | BasicKind::Int | BasicKind::Uint | BasicKind::Bool => SCALAR_SIZE,
        BasicKind::Struct(struct_type) => {
            struct_type.members.iter().try_fold(0u32, |total, member| {
                total.checked_add(size_of(&member.field_type)?)
            })?
        }
        BasicKind::Unknown => 0,
    };

    let shape_count = match ty.shape {
        Shape::Scalar => 1,
        Shape::Vector { size } => size,
        Shape::Matrix { cols, rows } => cols.checked_mul(rows)?,
    };

    let array_count = match ty.array {
        None => 1,
        Some(ArrayInfo::Sized { extent }) => extent,
        Some(ArrayInfo::Unbounded) => 0,
    };

    base_size.checked_mul(shape_count)?.checked_mul(array_count)
}

/// The boundary a field of this type has to start on, or `None` if it
/// doesn't fit in a `u32`.
///
/// Struct alignment is the sum of the member alignments, not the largest
/// member alignment rounded up to 16.
pub fn alignment_of(ty: &TypeDescriptor) -> Option<u32> {
    let base_alignment = match &ty.kind {
        BasicKind::Float | BasicKind::Int | BasicKind::Uint | BasicKind::Bool => SCALAR_SIZE,
        BasicKind::Struct(struct_type) => {
            struct_type.members.iter().try_fold(0u32, |total, member| {
                total.checked_add(alignment_of(&member.field_type)?)
            })?
        }
        BasicKind::Unknown => 0,
    };

    match ty.shape {
        Shape::Scalar => Some(base_alignment),
        Shape::Vector { size: 3 } => Some(16),
        Shape::Vector { size } => base_alignment.checked_mul(size),
        Shape::Matrix { .. } => Some(16),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutEntry {
    Padding { name: String, bytes: u32 },
    Field { declaration: String },
}

impl fmt::Display for LayoutEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Padding { name, bytes } => write!(f, "uint8_t {name}[{bytes}]"),
            Self::Field { declaration } => f.write_str(declaration),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLayout {
    pub entries: Vec<LayoutEntry>,
    /// size including all inserted padding
    pub size: u32,
    /// the largest member alignment
    pub alignment: u32,
}

/// Lays out a struct's members in reflected order, inserting explicit
/// padding fields wherever a member would start off its alignment, and
/// after the last member to round the struct up to its largest alignment.
///
/// No trailing padding follows an unbounded array, since its real extent
/// is only known at runtime.
pub fn build_layout(struct_type: &StructType, config: &GeneratorConfig) -> Result<StructLayout> {
    let mut entries = vec![];
    let mut offset = 0;
    let mut max_alignment = 0;
    let mut padding_count = 0;

    let mut push_padding = |entries: &mut Vec<LayoutEntry>, bytes: u32| {
        entries.push(LayoutEntry::Padding {
            name: format!("_padding{padding_count}"),
            bytes,
        });
        padding_count += 1;
    };

    for member in &struct_type.members {
        let declaration = field_declaration(&member.field_type, &member.field_name, config)
            .ok_or_else(|| HeaderGenError::UnsupportedType {
                struct_name: struct_type.type_name.clone(),
                field_name: member.field_name.clone(),
            })?;

        let overflow = || HeaderGenError::LayoutOverflow {
            struct_name: struct_type.type_name.clone(),
            field_name: member.field_name.clone(),
        };

        let alignment = alignment_of(&member.field_type).ok_or_else(overflow)?;
        max_alignment = max_alignment.max(alignment);

        // empty nested structs have no alignment requirement
        if alignment != 0 && offset % alignment != 0 {
            let gap = alignment - offset % alignment;
            push_padding(&mut entries, gap);
            offset = offset.checked_add(gap).ok_or_else(overflow)?;
        }

        entries.push(LayoutEntry::Field { declaration });
        let size = size_of(&member.field_type).ok_or_else(overflow)?;
        offset = offset.checked_add(size).ok_or_else(overflow)?;
    }

    let ends_with_unbounded_array = struct_type
        .members
        .last()
        .is_some_and(|member| member.field_type.is_unbounded_array());

    if max_alignment != 0 && offset % max_alignment != 0 && !ends_with_unbounded_array {
        let gap = max_alignment - offset % max_alignment;
        push_padding(&mut entries, gap);
        offset = offset
            .checked_add(gap)
            .ok_or_else(|| HeaderGenError::LayoutOverflow {
                struct_name: struct_type.type_name.clone(),
                field_name: "_padding".to_string(),
            })?;
    }

    Ok(StructLayout {
        entries,
        size: offset,
        alignment: max_alignment,
    })
}
