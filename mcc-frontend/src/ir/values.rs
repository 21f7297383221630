//! IR Values
//!
//! Anything an instruction can read: constants, variables, temporaries,
//! parameters and instruction results. Values live in their function's
//! arena and are referred to by [`ValueId`].

use mcc_common::{MemoryAddr, RegId};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{InstId, IrType};

/// Index of a value in its function's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId(pub u32);

/// Index of a global variable in its module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// What a value is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueKind {
    /// Immutable 32-bit constant, interned per function
    ConstInt(i32),

    /// Named or compiler-introduced local variable.
    ///
    /// A decayed array parameter's local keeps the declared array type
    /// so indexing still knows the inner dimensions.
    Local { array_type: Option<IrType> },

    /// Temporary that always lives in memory
    Mem,

    /// Use of a module-level global inside this function
    Global(GlobalId),

    /// Incoming parameter number `index`
    Param { index: usize, array_type: Option<IrType> },

    /// Result of an instruction
    InstResult(InstId),

    /// A fixed physical register (calling-convention plumbing in the back end)
    Register(RegId),
}

/// A value plus the facts the back end attaches to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub kind: ValueKind,
    pub ty: IrType,
    /// Source-level name, if any
    pub name: Option<String>,
    /// Canonical name assigned by renaming
    pub ir_name: String,
    /// 0 = global
    pub scope_level: usize,
    /// Register the value permanently lives in
    pub reg: Option<RegId>,
    /// Backing memory slot
    pub mem: Option<MemoryAddr>,
}

impl Value {
    pub fn new(kind: ValueKind, ty: IrType) -> Self {
        Self {
            kind,
            ty,
            name: None,
            ir_name: String::new(),
            scope_level: 0,
            reg: None,
            mem: None,
        }
    }

    pub fn const_value(&self) -> Option<i32> {
        match self.kind {
            ValueKind::ConstInt(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_const(&self) -> bool {
        self.const_value().is_some()
    }

    /// Instruction producing this value, if it is a result
    pub fn producer(&self) -> Option<InstId> {
        match self.kind {
            ValueKind::InstResult(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn is_register_resident(&self) -> bool {
        self.reg.is_some()
    }

    /// Declared array type of an array parameter or its local copy
    pub fn array_param_type(&self) -> Option<&IrType> {
        match &self.kind {
            ValueKind::Local { array_type } | ValueKind::Param { array_type, .. } => {
                array_type.as_ref()
            }
            _ => None,
        }
    }

    /// Dimensions usable for indexing: the array's own, or a decayed parameter's
    pub fn index_dims(&self) -> Option<&[u32]> {
        if self.ty.is_array() {
            return Some(self.ty.dims());
        }
        self.array_param_type().map(|t| t.dims())
    }
}

/// Module-scope variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub name: String,
    pub ty: IrType,
    pub init: Option<i32>,
    /// Implicitly zero, so it can live in BSS
    pub in_bss: bool,
}

impl GlobalVariable {
    pub fn new(name: String, ty: IrType, init: Option<i32>) -> Self {
        let in_bss = matches!(init, None | Some(0));
        Self { name, ty, init, in_bss }
    }

    pub fn ir_name(&self) -> String {
        format!("@{}", self.name)
    }
}

impl fmt::Display for GlobalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ty {
            IrType::Array { element, .. } => {
                write!(f, "declare {} {}{}", element, self.ir_name(), self.ty.dims_suffix())
            }
            ty => {
                write!(f, "declare {} {}", ty, self.ir_name())?;
                if let Some(v) = self.init {
                    write!(f, " = {}", v)?;
                }
                Ok(())
            }
        }
    }
}
