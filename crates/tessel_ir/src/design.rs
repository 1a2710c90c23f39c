//! Top-level design container.

use crate::error::IrError;
use crate::ids::ModuleId;
use crate::module::Module;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessel_common::{Arena, Ident};

/// A set of modules keyed by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Design {
    /// All modules in insertion order.
    pub modules: Arena<ModuleId, Module>,
    by_name: BTreeMap<Ident, ModuleId>,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module, failing if its name is already present.
    pub fn add_module(&mut self, module: Module) -> Result<ModuleId, IrError> {
        if self.by_name.contains_key(&module.name) {
            return Err(IrError::DuplicateModule(module.name));
        }
        let name = module.name;
        let id = self.modules.alloc(module);
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Returns `true` if a module with this name exists.
    pub fn has_module(&self, name: Ident) -> bool {
        self.by_name.contains_key(&name)
    }

    /// Returns the module with this name.
    pub fn module_by_name(&self, name: Ident) -> Option<&Module> {
        self.by_name.get(&name).map(|id| &self.modules[*id])
    }

    /// Returns the number of modules in the design.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup() {
        let mut design = Design::new();
        let id = design.add_module(Module::new(Ident::from_raw(1))).unwrap();
        assert_eq!(id.as_raw(), 0);
        assert!(design.has_module(Ident::from_raw(1)));
        assert!(design.module_by_name(Ident::from_raw(2)).is_none());
        assert_eq!(design.module_count(), 1);
    }

    #[test]
    fn duplicate_module_rejected() {
        let mut design = Design::new();
        design.add_module(Module::new(Ident::from_raw(1))).unwrap();
        let err = design.add_module(Module::new(Ident::from_raw(1))).unwrap_err();
        assert_eq!(err, IrError::DuplicateModule(Ident::from_raw(1)));
        assert_eq!(design.module_count(), 1);
    }
}
