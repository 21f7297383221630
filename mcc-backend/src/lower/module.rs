//! Module Lowering - Handles lowering of entire modules
//!
//! Selects every function that has code and turns the module's globals
//! into data directives.

use mcc_codegen::{generate_assembly, FunctionAsm, GlobalData};
use mcc_frontend::ir::Module;
use log::{debug, info};
use crate::{select_function, SelectError, SelectOptions};

/// Select every defined, non-builtin function of `module`
pub fn select_module(module: &mut Module, options: &SelectOptions) -> Result<Vec<FunctionAsm>, SelectError> {
    info!("Selecting module '{}'", module.name);
    let globals = &module.globals;
    let mut functions = Vec::new();

    for func in module.functions.iter_mut() {
        if func.is_builtin || !func.is_defined {
            debug!("Skipping function '{}'", func.name);
            continue;
        }
        functions.push(select_function(func, globals, options)?);
    }
    Ok(functions)
}

/// Data directives for the module's globals
pub fn global_data(module: &Module) -> Vec<GlobalData> {
    module
        .globals
        .iter()
        .map(|g| GlobalData {
            name: g.name.clone(),
            size: g.ty.size_in_bytes(),
            init: g.init,
            in_bss: g.in_bss,
        })
        .collect()
}

/// Lower a module to assembly text
pub fn lower_module_to_assembly(module: &mut Module, options: &SelectOptions) -> Result<String, SelectError> {
    let functions = select_module(module, options)?;
    Ok(generate_assembly(&global_data(module), &functions))
}
