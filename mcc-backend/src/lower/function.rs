//! Function Lowering - Drives selection of one function
//!
//! Selection runs over the flat instruction list once per pass. The
//! protected register set feeds the frame layout (incoming stack
//! arguments sit above the saved registers) and is only known after
//! selection, so passes repeat until the set stops growing.

use mcc_codegen::{local_label, AsmInst, Frame, FunctionAsm, Reg};
use mcc_frontend::ir::{Function, GlobalVariable, InstId, LabelId, ValueId};
use log::{debug, info};
use crate::lower::frame::{self, MAX_FRAME_PASSES};
use crate::regmgmt::SimpleRegisterAllocator;
use crate::{SelectError, SelectOptions};

/// Selector state for one pass over one function
pub(crate) struct InstSelector<'f> {
    pub(crate) func: &'f mut Function,
    pub(crate) globals: &'f [GlobalVariable],
    pub(crate) options: &'f SelectOptions,
    pub(crate) frame: Frame,
    /// Homes of outgoing arguments 4, 5, ...
    pub(crate) arg_slots: &'f [ValueId],
    pub(crate) alloc: SimpleRegisterAllocator,
    pub(crate) code: Vec<AsmInst>,
    /// ARG markers seen since the last other instruction
    pub(crate) arg_count: usize,
    /// Last instruction translated; its flags are still live
    pub(crate) last_inst: Option<InstId>,
}

impl<'f> InstSelector<'f> {
    pub(crate) fn new(
        func: &'f mut Function,
        globals: &'f [GlobalVariable],
        options: &'f SelectOptions,
        frame: Frame,
        arg_slots: &'f [ValueId],
    ) -> Self {
        Self {
            func,
            globals,
            options,
            frame,
            arg_slots,
            alloc: SimpleRegisterAllocator::new(),
            code: Vec::new(),
            arg_count: 0,
            last_inst: None,
        }
    }

    pub(crate) fn emit(&mut self, inst: AsmInst) {
        self.code.push(inst);
    }

    pub(crate) fn emit_all(&mut self, insts: impl IntoIterator<Item = AsmInst>) {
        self.code.extend(insts);
    }

    /// Assembly label for an IR label of this function
    pub(crate) fn label_name(&self, label: LabelId) -> String {
        local_label(&self.func.name, self.func.label_number(label))
    }

    pub(crate) fn consistency(&self, message: impl Into<String>) -> SelectError {
        SelectError::consistency(&self.func.name, message)
    }

    pub(crate) fn unsupported(&self, what: impl Into<String>) -> SelectError {
        SelectError::unsupported(&self.func.name, what)
    }

    /// Scratch register from the pool, optionally bound to `value`
    pub(crate) fn alloc_reg(&mut self, value: Option<ValueId>) -> Result<Reg, SelectError> {
        self.alloc.allocate(value).ok_or_else(|| SelectError::RegistersExhausted {
            function: self.func.name.clone(),
        })
    }

    pub(crate) fn finish(self) -> (Vec<AsmInst>, SimpleRegisterAllocator) {
        (self.code, self.alloc)
    }
}

/// Select one function
///
/// Fills in the function's frame facts (`protected_regs`, `max_depth`,
/// value homes) and returns its assembly.
pub fn select_function(
    func: &mut Function,
    globals: &[GlobalVariable],
    options: &SelectOptions,
) -> Result<FunctionAsm, SelectError> {
    info!("Selecting function '{}' ({} IR instructions)", func.name, func.code.len());

    func.verify_labels()
        .map_err(|e| SelectError::consistency(&func.name, e.to_string()))?;

    frame::scan_calls(func);
    let arg_slots = frame::outgoing_arg_slots(func);
    let mut protected = frame::initial_protected(func);

    for pass in 1..=MAX_FRAME_PASSES {
        let frame = frame::layout_frame(func, &protected, options)?;
        debug!(
            "'{}' pass {}: protected {:?}, frame {} bytes",
            func.name, pass, frame.protected, frame.size
        );

        let mut selector = InstSelector::new(func, globals, options, frame, &arg_slots);
        selector.select_body()?;
        let (code, alloc) = selector.finish();
        debug!("'{}' scratch registers used: {:?}", func.name, alloc.used_registers());

        let needed = frame::protected_registers(&protected, &code);
        if needed == protected {
            return Ok(FunctionAsm { name: func.name.clone(), code });
        }
        protected = needed;
    }

    Err(SelectError::consistency(
        &func.name,
        format!("protected registers did not settle after {} passes", MAX_FRAME_PASSES),
    ))
}
