//! IR Functions
//!
//! A function owns arenas for its values and instructions, the flat
//! instruction sequence, its declared variables and the facts the back
//! end computes about it.

use mcc_common::{CompilerError, RegId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use crate::ir::{
    GlobalId, InstId, InstKind, Instruction, IrType, LabelId, MoveKind, Value, ValueId, ValueKind,
};

/// A label's instruction and the number renaming gave it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LabelSlot {
    inst: InstId,
    number: Option<u32>,
}

/// IR Function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub return_type: IrType,
    /// Formal parameters in order
    pub params: Vec<ValueId>,
    /// Flat instruction sequence
    pub code: Vec<InstId>,
    /// Declared locals in declaration order
    pub locals: Vec<ValueId>,
    /// Memory temporaries in creation order
    pub mems: Vec<ValueId>,
    /// Label every `return` jumps to
    pub exit_label: Option<LabelId>,
    /// Local holding the return value of a non-void function
    pub return_value: Option<ValueId>,
    pub is_builtin: bool,
    /// Body generated without errors
    pub is_defined: bool,

    // Facts computed by the back end
    pub max_call_args: usize,
    pub has_call: bool,
    pub protected_regs: Vec<RegId>,
    pub max_depth: i32,

    values: Vec<Value>,
    insts: Vec<Instruction>,
    labels: Vec<LabelSlot>,
    consts: HashMap<i32, ValueId>,
    globals: HashMap<GlobalId, ValueId>,
    registers: HashMap<RegId, ValueId>,
}

impl Function {
    pub fn new(name: String, return_type: IrType) -> Self {
        Self {
            name,
            return_type,
            params: Vec::new(),
            code: Vec::new(),
            locals: Vec::new(),
            mems: Vec::new(),
            exit_label: None,
            return_value: None,
            is_builtin: false,
            is_defined: false,
            max_call_args: 0,
            has_call: false,
            protected_regs: Vec::new(),
            max_depth: 0,
            values: Vec::new(),
            insts: Vec::new(),
            labels: Vec::new(),
            consts: HashMap::new(),
            globals: HashMap::new(),
            registers: HashMap::new(),
        }
    }

    /// Runtime-provided function: signature only
    pub fn builtin(name: &str, return_type: IrType, param_types: &[IrType]) -> Self {
        let mut func = Self::new(name.to_string(), return_type);
        func.is_builtin = true;
        func.is_defined = true;
        for ty in param_types {
            func.new_param(None, ty.clone(), None);
        }
        func
    }

    // ----- values -----

    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.0 as usize]
    }

    pub fn value_mut(&mut self, id: ValueId) -> &mut Value {
        &mut self.values[id.0 as usize]
    }

    pub fn values(&self) -> impl Iterator<Item = (ValueId, &Value)> {
        self.values.iter().enumerate().map(|(i, v)| (ValueId(i as u32), v))
    }

    fn push_value(&mut self, value: Value) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(value);
        id
    }

    /// Interned integer constant
    pub fn const_int(&mut self, v: i32) -> ValueId {
        if let Some(&id) = self.consts.get(&v) {
            return id;
        }
        let mut value = Value::new(ValueKind::ConstInt(v), IrType::I32);
        value.ir_name = v.to_string();
        let id = self.push_value(value);
        self.consts.insert(v, id);
        id
    }

    /// Interned reference to a module global
    pub fn global_ref(&mut self, global: GlobalId, name: &str, ty: IrType) -> ValueId {
        if let Some(&id) = self.globals.get(&global) {
            return id;
        }
        let mut value = Value::new(ValueKind::Global(global), ty);
        value.name = Some(name.to_string());
        value.ir_name = format!("@{}", name);
        let id = self.push_value(value);
        self.globals.insert(global, id);
        id
    }

    /// Interned value pinned to a physical register
    pub fn register_value(&mut self, reg: RegId) -> ValueId {
        if let Some(&id) = self.registers.get(&reg) {
            return id;
        }
        let mut value = Value::new(ValueKind::Register(reg), IrType::I32);
        value.ir_name = format!("r{}", reg);
        value.reg = Some(reg);
        let id = self.push_value(value);
        self.registers.insert(reg, id);
        id
    }

    pub fn new_param(&mut self, name: Option<&str>, ty: IrType, array_type: Option<IrType>) -> ValueId {
        let index = self.params.len();
        let mut value = Value::new(ValueKind::Param { index, array_type }, ty);
        value.name = name.map(str::to_string);
        value.scope_level = 1;
        let id = self.push_value(value);
        self.params.push(id);
        id
    }

    pub fn new_local(
        &mut self,
        name: Option<&str>,
        ty: IrType,
        scope_level: usize,
        array_type: Option<IrType>,
    ) -> ValueId {
        let mut value = Value::new(ValueKind::Local { array_type }, ty);
        value.name = name.map(str::to_string);
        value.scope_level = scope_level;
        let id = self.push_value(value);
        self.locals.push(id);
        id
    }

    pub fn new_mem(&mut self, ty: IrType) -> ValueId {
        let id = self.push_value(Value::new(ValueKind::Mem, ty));
        self.mems.push(id);
        id
    }

    /// Memory temporary that is not a declared temporary of the IR
    /// (stack-passed call arguments created during selection)
    pub fn new_stack_slot(&mut self, ty: IrType) -> ValueId {
        self.push_value(Value::new(ValueKind::Mem, ty))
    }

    // ----- instructions -----

    pub fn inst(&self, id: InstId) -> &Instruction {
        &self.insts[id.0 as usize]
    }

    pub fn inst_mut(&mut self, id: InstId) -> &mut Instruction {
        &mut self.insts[id.0 as usize]
    }

    /// Create an instruction (and its result value) without placing it
    pub fn new_inst(&mut self, kind: InstKind, ty: IrType) -> InstId {
        let id = InstId(self.insts.len() as u32);
        let mut inst = Instruction::new(kind, ty.clone());
        if inst.produces_value() {
            inst.result = Some(self.push_value(Value::new(ValueKind::InstResult(id), ty)));
        }
        self.insts.push(inst);
        id
    }

    /// Result value of an instruction
    pub fn result_of(&self, id: InstId) -> Option<ValueId> {
        self.inst(id).result
    }

    /// The instruction producing `value`, if any
    pub fn producer(&self, value: ValueId) -> Option<&Instruction> {
        self.value(value).producer().map(|i| self.inst(i))
    }

    pub fn new_move(&mut self, dest: ValueId, src: ValueId, kind: MoveKind) -> InstId {
        self.new_inst(InstKind::Move { dest, src, kind }, IrType::Void)
    }

    pub fn new_goto(&mut self, target: LabelId) -> InstId {
        self.new_inst(InstKind::Goto(target), IrType::Void)
    }

    /// Allocate a label; it can be jumped to before it is placed
    pub fn new_label(&mut self) -> LabelId {
        let label = LabelId(self.labels.len() as u32);
        let inst = self.new_inst(InstKind::Label(label), IrType::Void);
        self.labels.push(LabelSlot { inst, number: None });
        label
    }

    /// The instruction that places `label`
    pub fn label_inst(&self, label: LabelId) -> InstId {
        self.labels[label.0 as usize].inst
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Append already-created instructions to the body
    pub fn append(&mut self, code: Vec<InstId>) {
        self.code.extend(code);
    }

    /// Position of each placed label in `code`
    pub fn label_positions(&self) -> HashMap<LabelId, usize> {
        self.code
            .iter()
            .enumerate()
            .filter_map(|(pos, &id)| match self.inst(id).kind {
                InstKind::Label(l) => Some((l, pos)),
                _ => None,
            })
            .collect()
    }

    /// Every jump target must be placed, and no label placed twice
    pub fn verify_labels(&self) -> Result<(), CompilerError> {
        let mut placed = vec![0usize; self.labels.len()];
        for &id in &self.code {
            if let InstKind::Label(l) = self.inst(id).kind {
                placed[l.0 as usize] += 1;
            }
        }
        if let Some(l) = placed.iter().position(|&n| n > 1) {
            return Err(CompilerError::internal(format!(
                "label {} placed {} times in function '{}'",
                l, placed[l], self.name
            )));
        }
        for &id in &self.code {
            for target in self.inst(id).jump_targets() {
                if placed[target.0 as usize] == 0 {
                    return Err(CompilerError::internal(format!(
                        "jump to label {} which is never placed in function '{}'",
                        target.0, self.name
                    )));
                }
            }
        }
        Ok(())
    }

    // ----- naming and text -----

    /// Assign canonical names: params `%tN`, locals `%lN`, temporaries and
    /// results `%tN`, labels `.LN`, all from one counter.
    pub fn rename_ir(&mut self) {
        let mut next = 0u32;
        let mut fresh = |prefix: &str| {
            let name = format!("{}{}", prefix, next);
            next += 1;
            name
        };

        for id in self.params.clone() {
            self.value_mut(id).ir_name = fresh("%t");
        }
        for id in self.locals.clone() {
            self.value_mut(id).ir_name = fresh("%l");
        }
        for id in self.mems.clone() {
            self.value_mut(id).ir_name = fresh("%t");
        }
        for inst in self.code.clone() {
            match self.inst(inst).kind {
                InstKind::Label(l) => {
                    let name = fresh(".L");
                    self.labels[l.0 as usize].number = name[2..].parse().ok();
                }
                _ => {
                    if let Some(result) = self.inst(inst).result {
                        self.value_mut(result).ir_name = fresh("%t");
                    }
                }
            }
        }
    }

    /// Number renaming gave to a label
    pub fn label_number(&self, label: LabelId) -> u32 {
        self.labels[label.0 as usize].number.unwrap_or(label.0)
    }

    pub fn label_name(&self, label: LabelId) -> String {
        format!(".L{}", self.label_number(label))
    }

    fn name_of(&self, id: ValueId) -> &str {
        &self.value(id).ir_name
    }

    /// Text form of one instruction
    pub fn inst_text(&self, id: InstId) -> String {
        let inst = self.inst(id);
        match &inst.kind {
            InstKind::Entry => "entry".to_string(),
            InstKind::Exit(None) => "exit".to_string(),
            InstKind::Exit(Some(v)) => format!("exit {}", self.name_of(*v)),
            InstKind::Label(l) => format!("{}:", self.label_name(*l)),
            InstKind::Goto(l) => format!("br label {}", self.label_name(*l)),
            InstKind::CondBranch { cond, on_true, on_false } => format!(
                "bc {}, label {}, label {}",
                self.name_of(*cond),
                self.label_name(*on_true),
                self.label_name(*on_false)
            ),
            InstKind::Move { dest, src, kind } => {
                let (d, s) = (self.name_of(*dest), self.name_of(*src));
                match kind {
                    MoveKind::Copy => format!("{} = {}", d, s),
                    MoveKind::Store => format!("*{} = {}", d, s),
                    MoveKind::Load => format!("{} = *{}", d, s),
                }
            }
            InstKind::Binary { op, lhs, rhs } => {
                let result = inst.result.map(|r| self.name_of(r)).unwrap_or("?");
                if op.is_comparison() {
                    format!("{} = cmp {} {},{}", result, op, self.name_of(*lhs), self.name_of(*rhs))
                } else {
                    format!("{} = {} {},{}", result, op, self.name_of(*lhs), self.name_of(*rhs))
                }
            }
            InstKind::Call { callee, args } => {
                let args: Vec<String> = args
                    .iter()
                    .map(|a| format!("{} {}", self.value(*a).ty, self.name_of(*a)))
                    .collect();
                match inst.result {
                    Some(r) => format!(
                        "{} = call {} @{}({})",
                        self.name_of(r),
                        inst.ty,
                        callee,
                        args.join(", ")
                    ),
                    None => format!("call void @{}({})", callee, args.join(", ")),
                }
            }
            InstKind::Arg(v) => format!("arg {}", self.name_of(*v)),
        }
    }

    fn declare_line(&self, id: ValueId) -> String {
        let value = self.value(id);
        let mut line = match (&value.ty, value.array_param_type()) {
            (IrType::Ptr(_), Some(IrType::Array { element, dims })) => {
                let mut suffix = String::from("[0]");
                for d in dims.iter().skip(1) {
                    suffix.push_str(&format!("[{}]", d));
                }
                format!("declare {} {}{}", element, value.ir_name, suffix)
            }
            (IrType::Array { element, .. }, _) => {
                format!("declare {} {}{}", element, value.ir_name, value.ty.dims_suffix())
            }
            (ty, _) => format!("declare {} {}", ty, value.ir_name),
        };
        if let Some(name) = &value.name {
            line.push_str(&format!(" ; variable: {}", name));
        }
        line
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_builtin {
            return Ok(());
        }

        let params: Vec<String> = self
            .params
            .iter()
            .map(|&p| format!("{} {}", self.value(p).ty, self.name_of(p)))
            .collect();
        writeln!(f, "define {} @{}({})", self.return_type, self.name, params.join(", "))?;
        writeln!(f, "{{")?;

        for &local in &self.locals {
            writeln!(f, "\t{}", self.declare_line(local))?;
        }
        for &mem in &self.mems {
            let value = self.value(mem);
            writeln!(f, "\tdeclare {} {}", value.ty, value.ir_name)?;
        }
        for &id in &self.code {
            if let Some(result) = self.inst(id).result {
                let value = self.value(result);
                writeln!(f, "\tdeclare {} {}", value.ty, value.ir_name)?;
            }
        }

        for &id in &self.code {
            let text = self.inst_text(id);
            if matches!(self.inst(id).kind, InstKind::Label(_)) {
                writeln!(f, "{}", text)?;
            } else {
                writeln!(f, "\t{}", text)?;
            }
        }

        writeln!(f, "}}")
    }
}
