//! Name allocation and cell construction for the module being imported.

use crate::error::ImportError;
use tessel_common::{Ident, Interner, Logic};
use tessel_ir::{
    BinaryOp, CellId, CellKind, ConstValue, GateOp, Module, PortDirection, SigSpec, UnaryOp,
    WireId,
};

use PortDirection::{Input, Output};

/// Counters that live for a whole import run.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    auto: u32,
    init_priority: u32,
}

/// Owns a [`Module`] under construction and hands out fresh names.
///
/// All wire, cell and memory names go through [`unique_name`](Self::unique_name)
/// or [`auto_name`](Self::auto_name), so the `add_*` calls on the module never
/// see a taken name.
pub(crate) struct ModuleBuilder<'a> {
    module: Module,
    interner: &'a Interner,
    counters: &'a mut Counters,
}

impl<'a> ModuleBuilder<'a> {
    pub(crate) fn new(module: Module, interner: &'a Interner, counters: &'a mut Counters) -> Self {
        Self {
            module,
            interner,
            counters,
        }
    }

    pub(crate) fn module(&self) -> &Module {
        &self.module
    }

    pub(crate) fn module_mut(&mut self) -> &mut Module {
        &mut self.module
    }

    pub(crate) fn interner(&self) -> &'a Interner {
        self.interner
    }

    pub(crate) fn finish(self) -> Module {
        self.module
    }

    pub(crate) fn ident(&self, name: &str) -> Ident {
        self.interner.get_or_intern(name)
    }

    /// `base` if it is free in the module, else the first free `base_<n>`.
    pub(crate) fn unique_name(&self, base: &str) -> Ident {
        let ident = self.ident(base);
        if self.module.is_name_free(ident) {
            return ident;
        }
        let mut suffix = 1u32;
        loop {
            let candidate = self.ident(&format!("{base}_{suffix}"));
            if self.module.is_name_free(candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// A fresh anonymous name `$auto$<n>`.
    pub(crate) fn auto_name(&mut self) -> Ident {
        loop {
            self.counters.auto += 1;
            let candidate = self.ident(&format!("$auto${}", self.counters.auto));
            if self.module.is_name_free(candidate) {
                return candidate;
            }
        }
    }

    /// Priority for the next memory initializer; later initializers win.
    pub(crate) fn next_init_priority(&mut self) -> u32 {
        self.counters.init_priority += 1;
        self.counters.init_priority
    }

    /// Adds a wire named after `base`, uniquified.
    pub(crate) fn wire(&mut self, base: &str, width: u32) -> Result<WireId, ImportError> {
        let name = self.unique_name(base);
        Ok(self.module.add_wire(name, width)?)
    }

    /// Adds an anonymous wire and returns all of its bits.
    pub(crate) fn auto_wire(&mut self, width: u32) -> Result<SigSpec, ImportError> {
        let name = self.auto_name();
        let wire = self.module.add_wire(name, width)?;
        Ok(SigSpec::from_wire(wire, width))
    }

    pub(crate) fn set_wire_attribute(&mut self, wire: WireId, key: &str, value: ConstValue) {
        self.module.wires[wire].attributes.insert(key.to_string(), value);
    }

    /// Records that `value` drives `target`.
    pub(crate) fn connect(&mut self, target: SigSpec, value: SigSpec) -> Result<(), ImportError> {
        Ok(self.module.connect(target, value)?)
    }

    /// Adds a cell with the given port connections.
    pub(crate) fn cell<S: AsRef<str>>(
        &mut self,
        name: Ident,
        kind: CellKind,
        ports: impl IntoIterator<Item = (S, PortDirection, SigSpec)>,
    ) -> Result<CellId, ImportError> {
        let id = self.module.add_cell(name, kind)?;
        for (port, direction, signal) in ports {
            let port = self.interner.get_or_intern(port.as_ref());
            self.module.cells[id].set_port(port, direction, signal);
        }
        Ok(id)
    }

    pub(crate) fn logic_gate(
        &mut self,
        name: Ident,
        op: GateOp,
        a: SigSpec,
        b: SigSpec,
        y: SigSpec,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::Gate(op),
            [("A", Input, a), ("B", Input, b), ("Y", Output, y)],
        )
    }

    pub(crate) fn unary_gate(
        &mut self,
        name: Ident,
        op: GateOp,
        a: SigSpec,
        y: SigSpec,
    ) -> Result<CellId, ImportError> {
        self.cell(name, CellKind::Gate(op), [("A", Input, a), ("Y", Output, y)])
    }

    pub(crate) fn mux_gate(
        &mut self,
        name: Ident,
        a: SigSpec,
        b: SigSpec,
        s: SigSpec,
        y: SigSpec,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::Gate(GateOp::Mux),
            [("A", Input, a), ("B", Input, b), ("S", Input, s), ("Y", Output, y)],
        )
    }

    pub(crate) fn dff_gate(
        &mut self,
        name: Ident,
        clk: SigSpec,
        d: SigSpec,
        q: SigSpec,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::DffGate,
            [("CLK", Input, clk), ("D", Input, d), ("Q", Output, q)],
        )
    }

    pub(crate) fn adff_gate(
        &mut self,
        name: Ident,
        clk: SigSpec,
        arst: SigSpec,
        d: SigSpec,
        q: SigSpec,
        arst_value: Logic,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::AdffGate { arst_value },
            [
                ("CLK", Input, clk),
                ("ARST", Input, arst),
                ("D", Input, d),
                ("Q", Output, q),
            ],
        )
    }

    pub(crate) fn dffsr_gate(
        &mut self,
        name: Ident,
        clk: SigSpec,
        set: SigSpec,
        clr: SigSpec,
        d: SigSpec,
        q: SigSpec,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::DffsrGate,
            [
                ("CLK", Input, clk),
                ("SET", Input, set),
                ("CLR", Input, clr),
                ("D", Input, d),
                ("Q", Output, q),
            ],
        )
    }

    pub(crate) fn unary(
        &mut self,
        name: Ident,
        op: UnaryOp,
        signed: bool,
        a: SigSpec,
        y: SigSpec,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::Unary { op, signed },
            [("A", Input, a), ("Y", Output, y)],
        )
    }

    pub(crate) fn binary(
        &mut self,
        name: Ident,
        op: BinaryOp,
        signed: bool,
        a: SigSpec,
        b: SigSpec,
        y: SigSpec,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::Binary { op, signed },
            [("A", Input, a), ("B", Input, b), ("Y", Output, y)],
        )
    }

    /// Word-level multiplexer; the width is taken from `y`.
    pub(crate) fn mux(
        &mut self,
        name: Ident,
        a: SigSpec,
        b: SigSpec,
        s: SigSpec,
        y: SigSpec,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::Mux { width: y.width() },
            [("A", Input, a), ("B", Input, b), ("S", Input, s), ("Y", Output, y)],
        )
    }

    pub(crate) fn dff(
        &mut self,
        name: Ident,
        clk: SigSpec,
        d: SigSpec,
        q: SigSpec,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::Dff { width: q.width() },
            [("CLK", Input, clk), ("D", Input, d), ("Q", Output, q)],
        )
    }

    pub(crate) fn adff(
        &mut self,
        name: Ident,
        clk: SigSpec,
        arst: SigSpec,
        d: SigSpec,
        q: SigSpec,
        arst_value: Logic,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::Adff {
                width: q.width(),
                arst_value,
            },
            [
                ("CLK", Input, clk),
                ("ARST", Input, arst),
                ("D", Input, d),
                ("Q", Output, q),
            ],
        )
    }

    pub(crate) fn dffsr(
        &mut self,
        name: Ident,
        clk: SigSpec,
        set: SigSpec,
        clr: SigSpec,
        d: SigSpec,
        q: SigSpec,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::Dffsr { width: q.width() },
            [
                ("CLK", Input, clk),
                ("SET", Input, set),
                ("CLR", Input, clr),
                ("D", Input, d),
                ("Q", Output, q),
            ],
        )
    }

    pub(crate) fn dlatch(
        &mut self,
        name: Ident,
        en: SigSpec,
        d: SigSpec,
        q: SigSpec,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::Dlatch { width: q.width() },
            [("EN", Input, en), ("D", Input, d), ("Q", Output, q)],
        )
    }

    pub(crate) fn dlatchsr(
        &mut self,
        name: Ident,
        en: SigSpec,
        set: SigSpec,
        clr: SigSpec,
        d: SigSpec,
        q: SigSpec,
    ) -> Result<CellId, ImportError> {
        self.cell(
            name,
            CellKind::Dlatchsr { width: q.width() },
            [
                ("EN", Input, en),
                ("SET", Input, set),
                ("CLR", Input, clr),
                ("D", Input, d),
                ("Q", Output, q),
            ],
        )
    }

    /// Drives `target` from a fresh `Anyconst` or `Anyseq` cell of the same width.
    pub(crate) fn nondet_source(&mut self, target: SigSpec, fixed: bool) -> Result<(), ImportError> {
        let width = target.width();
        let y = self.auto_wire(width)?;
        let kind = if fixed {
            CellKind::Anyconst { width }
        } else {
            CellKind::Anyseq { width }
        };
        let name = self.auto_name();
        self.cell(name, kind, [("Y", Output, y.clone())])?;
        self.connect(target, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_ir::NamedItem;

    #[test]
    fn unique_names_get_suffixes() {
        let interner = Interner::new();
        let mut counters = Counters::default();
        let mut b = ModuleBuilder::new(Module::new(interner.get_or_intern("m")), &interner, &mut counters);
        b.wire("n", 1).unwrap();
        b.wire("n", 1).unwrap();
        let third = b.unique_name("n");
        assert_eq!(interner.resolve(third), "n_2");
        assert!(matches!(
            b.module().lookup(interner.get_or_intern("n_1")),
            Some(NamedItem::Wire(_))
        ));
    }

    #[test]
    fn auto_names_skip_taken() {
        let interner = Interner::new();
        let mut counters = Counters::default();
        let mut b = ModuleBuilder::new(Module::new(interner.get_or_intern("m")), &interner, &mut counters);
        b.wire("$auto$1", 1).unwrap();
        let name = b.auto_name();
        assert_eq!(interner.resolve(name), "$auto$2");
    }

    #[test]
    fn counters_outlive_modules() {
        let interner = Interner::new();
        let mut counters = Counters::default();
        {
            let mut b = ModuleBuilder::new(Module::new(interner.get_or_intern("a")), &interner, &mut counters);
            b.auto_name();
            assert_eq!(b.next_init_priority(), 1);
        }
        let mut b = ModuleBuilder::new(Module::new(interner.get_or_intern("b")), &interner, &mut counters);
        assert_eq!(interner.resolve(b.auto_name()), "$auto$2");
        assert_eq!(b.next_init_priority(), 2);
    }

    #[test]
    fn nondet_source_drives_target() {
        let interner = Interner::new();
        let mut counters = Counters::default();
        let mut b = ModuleBuilder::new(Module::new(interner.get_or_intern("m")), &interner, &mut counters);
        let w = b.wire("r", 3).unwrap();
        b.nondet_source(SigSpec::from_wire(w, 3), true).unwrap();
        let m = b.finish();
        assert_eq!(m.cells.len(), 1);
        assert!(m.cells.values().all(|c| c.kind == CellKind::Anyconst { width: 3 }));
        assert_eq!(m.assignments.len(), 1);
        assert_eq!(m.assignments[0].target, SigSpec::from_wire(w, 3));
    }
}
