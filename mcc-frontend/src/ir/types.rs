//! IR Type System
//!
//! 32-bit integers, a 1-bit boolean produced by comparisons, pointers and
//! multi-dimensional arrays of those. Everything scalar occupies one
//! 4-byte word on the target.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of every scalar slot in bytes
pub const WORD_SIZE: u32 = 4;

/// IR Type system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrType {
    /// Void type
    Void,

    /// Boolean (comparison results)
    I1,

    /// 32-bit signed integer
    I32,

    /// Pointer to element type
    Ptr(Box<IrType>),

    /// Array of `element` with row-major dimensions
    Array { element: Box<IrType>, dims: Vec<u32> },
}

impl IrType {
    pub fn ptr(pointee: IrType) -> Self {
        IrType::Ptr(Box::new(pointee))
    }

    pub fn array(element: IrType, dims: Vec<u32>) -> Self {
        IrType::Array { element: Box::new(element), dims }
    }

    /// Get the size of this type in bytes
    pub fn size_in_bytes(&self) -> u32 {
        match self {
            IrType::Void => 0,
            IrType::I1 | IrType::I32 | IrType::Ptr(_) => WORD_SIZE,
            IrType::Array { element, dims } => dims
                .iter()
                .fold(element.size_in_bytes(), |bytes, &d| bytes.saturating_mul(d)),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, IrType::I1)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, IrType::Ptr(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, IrType::Array { .. })
    }

    /// Element type of an array, pointee of a pointer
    pub fn element_type(&self) -> Option<&IrType> {
        match self {
            IrType::Ptr(inner) => Some(inner),
            IrType::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Array dimensions, empty for everything else
    pub fn dims(&self) -> &[u32] {
        match self {
            IrType::Array { dims, .. } => dims,
            _ => &[],
        }
    }

    /// `[3][4]` suffix used by declare lines
    pub fn dims_suffix(&self) -> String {
        self.dims().iter().map(|d| format!("[{}]", d)).collect()
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => write!(f, "void"),
            IrType::I1 => write!(f, "i1"),
            IrType::I32 => write!(f, "i32"),
            IrType::Ptr(inner) => write!(f, "{}*", inner),
            IrType::Array { element, .. } => write!(f, "{}{}", element, self.dims_suffix()),
        }
    }
}
