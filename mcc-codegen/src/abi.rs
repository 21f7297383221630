//! ARM32 ABI Implementation
//!
//! Calling convention constants, immediate/offset encodability checks and
//! the frame layout with its prologue and epilogue.
//!
//! Frame layout (stack grows down):
//!
//! ```text
//! incoming arg k>=4   [fp, #4*|protected| + 4*(k-4)]
//! saved registers     [fp, #0] .. pushed by the prologue
//! locals/temporaries  [fp, #-4] ..
//! outgoing args k>=4  [sp, #4*(k-4)]
//! ```

use crate::asm::{AsmInst, Reg};

/// AAPCS subset used by the selector
pub struct CallingConvention;

impl CallingConvention {
    /// Maximum number of parameters that can be passed in registers
    pub const MAX_REG_PARAMS: usize = 4;

    /// Registers used for passing parameters
    pub const PARAM_REGS: [Reg; 4] = [Reg::R0, Reg::R1, Reg::R2, Reg::R3];

    pub const RETURN_REG: Reg = Reg::R0;

    /// Registers that must be saved by callee (r4-r11)
    pub const CALLEE_SAVED: [Reg; 8] = [
        Reg::R4, Reg::R5, Reg::R6, Reg::R7, Reg::R8, Reg::R9, Reg::R10, Reg::Fp,
    ];

    /// Registers the simple allocator hands out, lowest first
    pub const SCRATCH_POOL: [Reg; 10] = [
        Reg::R0, Reg::R1, Reg::R2, Reg::R3, Reg::R4, Reg::R5, Reg::R6, Reg::R7, Reg::R8, Reg::R9,
    ];

    /// Reserved for address arithmetic that does not fit an immediate
    pub const TMP_REG: Reg = Reg::R10;

    pub const FRAME_PTR: Reg = Reg::Fp;
    pub const STACK_PTR: Reg = Reg::Sp;
    pub const LINK_REG: Reg = Reg::Lr;

    pub const WORD_SIZE: i32 = 4;
    pub const STACK_ALIGN: i32 = 8;

    /// Register carrying parameter `index`, if it is passed in one
    pub fn param_reg(index: usize) -> Option<Reg> {
        Self::PARAM_REGS.get(index).copied()
    }

    pub fn is_callee_saved(reg: Reg) -> bool {
        Self::CALLEE_SAVED.contains(&reg)
    }

    /// Offset of outgoing argument `index` (>= 4) from `sp`
    pub fn outgoing_arg_offset(index: usize) -> i32 {
        (index.saturating_sub(Self::MAX_REG_PARAMS) as i32) * Self::WORD_SIZE
    }
}

/// ARM modified immediate: an 8-bit value rotated right by an even amount
pub fn is_valid_imm(value: i32) -> bool {
    let bits = value as u32;
    (0..16).any(|rot| bits.rotate_left(2 * rot) <= 0xff)
}

/// `ldr`/`str` immediate offsets are 12 bits plus a sign
pub fn is_valid_mem_offset(offset: i32) -> bool {
    (-4095..=4095).contains(&offset)
}

/// Put `value` into `rd`: one `mov` if encodable, else `movw` (+ `movt`)
pub fn load_imm(rd: Reg, value: i32) -> Vec<AsmInst> {
    if is_valid_imm(value) {
        return vec![AsmInst::MovImm(rd, value)];
    }
    let bits = value as u32;
    let mut code = vec![AsmInst::Movw(rd, (bits & 0xffff) as u16)];
    if bits >> 16 != 0 {
        code.push(AsmInst::Movt(rd, (bits >> 16) as u16));
    }
    code
}

/// Round `size` up to a multiple of `align`
pub fn align_to(size: i32, align: i32) -> i32 {
    (size + align - 1) / align * align
}

/// Stack Frame Layout
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Registers saved by the prologue, in register order
    pub protected: Vec<Reg>,

    /// Bytes reserved below the saved registers
    pub size: i32,
}

impl Frame {
    pub fn new(mut protected: Vec<Reg>, size: i32) -> Self {
        protected.sort();
        protected.dedup();
        Self { protected, size }
    }

    /// Offset from `fp` of incoming argument `index` (>= 4)
    pub fn incoming_arg_offset(&self, index: usize) -> i32 {
        CallingConvention::WORD_SIZE * self.protected.len() as i32
            + CallingConvention::outgoing_arg_offset(index)
    }

    /// Generate function prologue
    ///
    /// 1. Saves the protected registers
    /// 2. Sets up the frame pointer
    /// 3. Allocates the frame, through the temporary register if the
    ///    size is not an immediate
    pub fn gen_prologue(&self) -> Vec<AsmInst> {
        let mut code = Vec::new();
        if !self.protected.is_empty() {
            code.push(AsmInst::Push(self.protected.clone()));
        }
        code.push(AsmInst::Mov(CallingConvention::FRAME_PTR, CallingConvention::STACK_PTR));

        if self.size > 0 {
            if is_valid_imm(self.size) {
                code.push(AsmInst::SubImm(
                    CallingConvention::STACK_PTR,
                    CallingConvention::STACK_PTR,
                    self.size,
                ));
            } else {
                code.extend(load_imm(CallingConvention::TMP_REG, self.size));
                code.push(AsmInst::Sub(
                    CallingConvention::STACK_PTR,
                    CallingConvention::STACK_PTR,
                    CallingConvention::TMP_REG,
                ));
            }
        }
        code
    }

    /// Generate function epilogue
    ///
    /// Restores `sp` from `fp`, pops the protected registers and returns.
    pub fn gen_epilogue(&self) -> Vec<AsmInst> {
        let mut code = vec![AsmInst::Mov(CallingConvention::STACK_PTR, CallingConvention::FRAME_PTR)];
        if !self.protected.is_empty() {
            code.push(AsmInst::Pop(self.protected.clone()));
        }
        code.push(AsmInst::Bx(CallingConvention::LINK_REG));
        code
    }
}
