use crate::shaders::json::*;

use super::GeneratorConfig;

pub const UNKNOWN_TYPE_NAME: &str = "unknown";

/// The glsl-level name of a type, used as the key for custom type overrides.
///
/// Struct types are just their struct name. Everything else is a base token
/// with the vector size or matrix dimensions appended, then the array
/// extent: `float`, `vec3`, `int2`, `mat4`, `mat2x3`, `vec4[8]`, `uint[]`.
pub fn canonical_name(ty: &TypeDescriptor) -> String {
    let scalar_name = match &ty.kind {
        BasicKind::Struct(struct_type) => return struct_type.type_name.clone(),
        BasicKind::Unknown => return UNKNOWN_TYPE_NAME.to_string(),
        BasicKind::Float => "float",
        BasicKind::Int => "int",
        BasicKind::Uint => "uint",
        BasicKind::Bool => "bool",
    };

    let mut type_name = match ty.shape {
        Shape::Scalar => scalar_name.to_string(),
        Shape::Vector { size } => {
            let base = if ty.kind == BasicKind::Float {
                "vec"
            } else {
                scalar_name
            };
            format!("{base}{size}")
        }
        Shape::Matrix { cols, rows } => {
            let base = if ty.kind == BasicKind::Float {
                "mat"
            } else {
                scalar_name
            };
            if cols == rows {
                format!("{base}{cols}")
            } else {
                format!("{base}{cols}x{rows}")
            }
        }
    };

    match ty.array {
        Some(ArrayInfo::Sized { extent }) => type_name += &format!("[{extent}]"),
        Some(ArrayInfo::Unbounded) => type_name += "[]",
        None => {}
    }

    type_name
}

/// The c declaration for one struct field, without the trailing semicolon.
///
/// Returns `None` for types with no c representation.
pub fn field_declaration(
    ty: &TypeDescriptor,
    field_name: &str,
    config: &GeneratorConfig,
) -> Option<String> {
    if ty.kind == BasicKind::Unknown {
        return None;
    }

    if let Some(override_type) = config.custom_type_overrides.get(&canonical_name(ty)) {
        return Some(format!("{override_type} {field_name}"));
    }

    let base_type = match &ty.kind {
        BasicKind::Float => "float".to_string(),
        BasicKind::Int => "int32_t".to_string(),
        // gpu bools are 4 bytes wide
        BasicKind::Uint | BasicKind::Bool => "uint32_t".to_string(),
        BasicKind::Struct(struct_type) => {
            format!("{}{}", config.struct_prefix, struct_type.type_name)
        }
        BasicKind::Unknown => return None,
    };

    let mut dimensions = match ty.array {
        Some(ArrayInfo::Sized { extent }) => format!("[{extent}]"),
        Some(ArrayInfo::Unbounded) => "[]".to_string(),
        None => String::new(),
    };

    match ty.shape {
        Shape::Scalar => {}
        Shape::Vector { size } => dimensions += &format!("[{size}]"),
        Shape::Matrix { cols, rows } => dimensions += &format!("[{cols}][{rows}]"),
    }

    Some(format!("{base_type} {field_name}{dimensions}"))
}
