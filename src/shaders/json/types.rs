use serde::{Deserialize, Serialize};

/// One reflected shader type, copied out of the reflection graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub kind: BasicKind,
    pub shape: Shape,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub array: Option<ArrayInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "basic", rename_all = "camelCase")]
pub enum BasicKind {
    Float,
    Int,
    Uint,
    Bool,
    Struct(StructType),
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Shape {
    Scalar,
    Vector { size: u32 },
    Matrix { cols: u32, rows: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ArrayInfo {
    Sized { extent: u32 },
    Unbounded,
}

/// Every occurrence of a struct with the same name has the same members,
/// in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructType {
    pub type_name: String,
    pub members: Vec<StructMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructMember {
    pub field_name: String,
    pub field_type: TypeDescriptor,
}

impl TypeDescriptor {
    pub fn scalar(kind: BasicKind) -> Self {
        Self {
            kind,
            shape: Shape::Scalar,
            array: None,
        }
    }

    pub fn vector(kind: BasicKind, size: u32) -> Self {
        Self {
            kind,
            shape: Shape::Vector { size },
            array: None,
        }
    }

    pub fn matrix(cols: u32, rows: u32) -> Self {
        Self {
            kind: BasicKind::Float,
            shape: Shape::Matrix { cols, rows },
            array: None,
        }
    }

    pub fn structure(type_name: impl Into<String>, members: Vec<StructMember>) -> Self {
        Self::scalar(BasicKind::Struct(StructType {
            type_name: type_name.into(),
            members,
        }))
    }

    pub fn sized_array(mut self, extent: u32) -> Self {
        self.array = Some(ArrayInfo::Sized { extent });
        self
    }

    pub fn unbounded_array(mut self) -> Self {
        self.array = Some(ArrayInfo::Unbounded);
        self
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match &self.kind {
            BasicKind::Struct(struct_type) => Some(struct_type),
            _ => None,
        }
    }

    pub fn is_unbounded_array(&self) -> bool {
        matches!(self.array, Some(ArrayInfo::Unbounded))
    }
}

impl StructMember {
    pub fn new(field_name: impl Into<String>, field_type: TypeDescriptor) -> Self {
        Self {
            field_name: field_name.into(),
            field_type,
        }
    }
}
