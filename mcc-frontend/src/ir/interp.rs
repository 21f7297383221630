//! Reference interpreter for generated IR
//!
//! Executes a module word by word so tests can check what the generator
//! produced without a back end. Memory is byte-addressed but only whole
//! aligned words are ever touched. Division by zero and `INT_MIN / -1`
//! trap instead of picking a value.

use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use crate::ir::{
    Function, InstKind, IrBinaryOp, IrType, Module, MoveKind, ValueId, ValueKind, WORD_SIZE,
};

const STEP_LIMIT: usize = 1_000_000;
const HEAP_BASE: i32 = 0x1000;

#[derive(Debug, Error, Clone, PartialEq)]
pub(crate) enum Trap {
    #[error("division by zero")]
    DivideByZero,
    #[error("signed overflow in {0}")]
    Overflow(IrBinaryOp),
    #[error("step limit exceeded")]
    StepLimit,
    #[error("call to unknown function '{0}'")]
    UnknownFunction(String),
    #[error("read from unmapped address {0:#x}")]
    BadAddress(i32),
    #[error("input exhausted")]
    InputExhausted,
}

pub(crate) struct Interpreter<'m> {
    module: &'m Module,
    memory: HashMap<i32, i32>,
    next_addr: i32,
    global_addrs: Vec<i32>,
    steps: usize,
    pub input: VecDeque<i32>,
    /// Values written by `putint`, character codes written by `putch`
    pub output: Vec<i32>,
}

impl<'m> Interpreter<'m> {
    pub fn new(module: &'m Module) -> Self {
        let mut interp = Self {
            module,
            memory: HashMap::new(),
            next_addr: HEAP_BASE,
            global_addrs: Vec::new(),
            steps: 0,
            input: VecDeque::new(),
            output: Vec::new(),
        };
        for global in &module.globals {
            let addr = interp.allocate(&global.ty);
            if let Some(v) = global.init {
                interp.memory.insert(addr, v);
            }
            interp.global_addrs.push(addr);
        }
        interp
    }

    pub fn with_input(mut self, input: &[i32]) -> Self {
        self.input.extend(input.iter().copied());
        self
    }

    /// Zero-filled block for `ty`
    fn allocate(&mut self, ty: &IrType) -> i32 {
        let addr = self.next_addr;
        let size = ty.size_in_bytes().max(WORD_SIZE) as i32;
        for offset in (0..size).step_by(WORD_SIZE as usize) {
            self.memory.insert(addr + offset, 0);
        }
        self.next_addr += size;
        addr
    }

    pub fn load(&self, addr: i32) -> Result<i32, Trap> {
        self.memory.get(&addr).copied().ok_or(Trap::BadAddress(addr))
    }

    fn store(&mut self, addr: i32, value: i32) -> Result<(), Trap> {
        match self.memory.get_mut(&addr) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Trap::BadAddress(addr)),
        }
    }

    /// Base address of a global
    pub fn global_addr(&self, name: &str) -> Option<i32> {
        let index = self.module.globals.iter().position(|g| g.name == name)?;
        Some(self.global_addrs[index])
    }

    /// Current word of a scalar global
    pub fn global_value(&self, name: &str) -> Option<i32> {
        self.global_addr(name).and_then(|addr| self.load(addr).ok())
    }

    /// Call `name` with `args`; `None` for void functions
    pub fn run(&mut self, name: &str, args: &[i32]) -> Result<Option<i32>, Trap> {
        self.call(name, args)
    }

    fn call(&mut self, name: &str, args: &[i32]) -> Result<Option<i32>, Trap> {
        match name {
            "getint" | "getch" => return self.input.pop_front().map(Some).ok_or(Trap::InputExhausted),
            "putint" | "putch" => {
                self.output.extend(args.first().copied());
                return Ok(None);
            }
            _ => {}
        }
        let module = self.module;
        let func = module
            .get_function(name)
            .filter(|f| f.is_defined && !f.is_builtin)
            .ok_or_else(|| Trap::UnknownFunction(name.to_string()))?;
        self.execute(func, args)
    }

    fn execute(&mut self, func: &'m Function, args: &[i32]) -> Result<Option<i32>, Trap> {
        let mut frame: HashMap<ValueId, i32> = HashMap::new();
        for (&param, &arg) in func.params.iter().zip(args) {
            frame.insert(param, arg);
        }
        for &local in &func.locals {
            let ty = &func.value(local).ty;
            if ty.is_array() {
                let addr = self.allocate(ty);
                frame.insert(local, addr);
            }
        }
        let labels = func.label_positions();

        let mut pc = 0;
        while pc < func.code.len() {
            self.steps += 1;
            if self.steps > STEP_LIMIT {
                return Err(Trap::StepLimit);
            }
            let inst = func.inst(func.code[pc]);
            pc += 1;
            if inst.dead {
                continue;
            }
            match &inst.kind {
                InstKind::Entry | InstKind::Label(_) | InstKind::Arg(_) => {}
                InstKind::Exit(value) => {
                    return match value {
                        Some(v) => Ok(Some(self.read(func, &frame, *v)?)),
                        None => Ok(None),
                    };
                }
                InstKind::Goto(target) => pc = labels[target],
                InstKind::CondBranch { cond, on_true, on_false } => {
                    let taken = if self.read(func, &frame, *cond)? != 0 { on_true } else { on_false };
                    pc = labels[taken];
                }
                InstKind::Move { dest, src, kind } => match kind {
                    MoveKind::Copy => {
                        let v = self.read(func, &frame, *src)?;
                        self.write(func, &mut frame, *dest, v)?;
                    }
                    MoveKind::Store => {
                        let addr = self.read(func, &frame, *dest)?;
                        let v = self.read(func, &frame, *src)?;
                        self.store(addr, v)?;
                    }
                    MoveKind::Load => {
                        let addr = self.read(func, &frame, *src)?;
                        let v = self.load(addr)?;
                        self.write(func, &mut frame, *dest, v)?;
                    }
                },
                InstKind::Binary { op, lhs, rhs } => {
                    let a = self.read(func, &frame, *lhs)?;
                    let b = self.read(func, &frame, *rhs)?;
                    let v = evaluate(*op, a, b)?;
                    if let Some(result) = inst.result {
                        frame.insert(result, v);
                    }
                }
                InstKind::Call { callee, args } => {
                    let values = args
                        .iter()
                        .map(|&a| self.read(func, &frame, a))
                        .collect::<Result<Vec<_>, _>>()?;
                    let returned = self.call(callee, &values)?;
                    if let (Some(result), Some(v)) = (inst.result, returned) {
                        frame.insert(result, v);
                    }
                }
            }
        }
        Ok(None)
    }

    fn read(&self, func: &Function, frame: &HashMap<ValueId, i32>, id: ValueId) -> Result<i32, Trap> {
        let value = func.value(id);
        match &value.kind {
            ValueKind::ConstInt(v) => Ok(*v),
            ValueKind::Global(g) => {
                let addr = self.global_addrs[g.0 as usize];
                if value.ty.is_array() {
                    Ok(addr)
                } else {
                    self.load(addr)
                }
            }
            // Uninitialised locals read as zero
            _ => Ok(frame.get(&id).copied().unwrap_or(0)),
        }
    }

    fn write(&mut self, func: &Function, frame: &mut HashMap<ValueId, i32>, id: ValueId, v: i32) -> Result<(), Trap> {
        match func.value(id).kind {
            ValueKind::Global(g) => self.store(self.global_addrs[g.0 as usize], v),
            _ => {
                frame.insert(id, v);
                Ok(())
            }
        }
    }
}

/// 32-bit semantics of one binary operation
pub(crate) fn evaluate(op: IrBinaryOp, a: i32, b: i32) -> Result<i32, Trap> {
    let v = match op {
        IrBinaryOp::Add => a.wrapping_add(b),
        IrBinaryOp::Sub => a.wrapping_sub(b),
        IrBinaryOp::Mul => a.wrapping_mul(b),
        IrBinaryOp::Div | IrBinaryOp::Mod => {
            if b == 0 {
                return Err(Trap::DivideByZero);
            }
            let v = if op == IrBinaryOp::Div { a.checked_div(b) } else { a.checked_rem(b) };
            v.ok_or(Trap::Overflow(op))?
        }
        IrBinaryOp::Lt => (a < b) as i32,
        IrBinaryOp::Le => (a <= b) as i32,
        IrBinaryOp::Gt => (a > b) as i32,
        IrBinaryOp::Ge => (a >= b) as i32,
        IrBinaryOp::Eq => (a == b) as i32,
        IrBinaryOp::Ne => (a != b) as i32,
    };
    Ok(v)
}
