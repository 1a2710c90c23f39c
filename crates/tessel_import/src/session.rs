//! Per-run import state and the single-netlist entry point.

use crate::builder::Counters;
use crate::error::ImportError;
use crate::importer::NetlistImporter;
use log::debug;
use std::collections::BTreeSet;
use tessel_common::Interner;
use tessel_config::{ImportConfig, LoweringMode};
use tessel_diagnostics::DiagnosticSink;
use tessel_ir::Design;
use tessel_netlist::{NetlistId, NetlistView};

/// Switches that select the lowering behavior of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Which lowering table is used.
    pub mode: LoweringMode,
    /// Keep unsupported primitives as opaque cells instead of failing.
    pub keep_going: bool,
}

impl From<&ImportConfig> for ImportOptions {
    fn from(config: &ImportConfig) -> Self {
        Self {
            mode: config.mode,
            keep_going: config.keep_going,
        }
    }
}

/// The name of the module a netlist is imported as.
///
/// Operator netlists get a `$operator$` prefix so their structural
/// expansions never collide with user modules.
pub fn module_name<V: NetlistView + ?Sized>(view: &V, nl: NetlistId) -> String {
    let name = view.netlist_name(nl);
    if view.netlist_type(nl).is_operator() {
        format!("$operator${name}")
    } else {
        name.to_string()
    }
}

/// State shared by every netlist imported in one run.
///
/// The anonymous-name and initializer-priority counters live here rather
/// than in globals, so independent sessions never interfere.
pub struct ImportSession<'a> {
    interner: &'a Interner,
    sink: &'a DiagnosticSink,
    options: ImportOptions,
    counters: Counters,
}

impl<'a> ImportSession<'a> {
    /// Creates a session.
    pub fn new(interner: &'a Interner, sink: &'a DiagnosticSink, options: ImportOptions) -> Self {
        Self {
            interner,
            sink,
            options,
            counters: Counters::default(),
        }
    }

    /// The options of this run.
    pub fn options(&self) -> ImportOptions {
        self.options
    }

    /// Imports `nl` as one module of `design`.
    ///
    /// Sub-circuits referenced by opaque cells are added to `pending`. An
    /// operator netlist whose module already exists is skipped; any other
    /// existing name is a [`ImportError::Redefinition`]. On error nothing is
    /// added to the design.
    pub fn import_netlist<V: NetlistView + ?Sized>(
        &mut self,
        view: &V,
        design: &mut Design,
        nl: NetlistId,
        pending: &mut BTreeSet<NetlistId>,
    ) -> Result<(), ImportError> {
        let name = module_name(view, nl);
        let ident = self.interner.get_or_intern(&name);
        if design.has_module(ident) {
            if view.netlist_type(nl).is_operator() {
                debug!("operator module `{name}` already imported");
                return Ok(());
            }
            return Err(ImportError::Redefinition { module: name });
        }

        let importer = NetlistImporter::new(
            view,
            nl,
            ident,
            self.interner,
            self.sink,
            self.options,
            &mut self.counters,
        );
        let module = importer.run(pending)?;
        design.add_module(module)?;
        Ok(())
    }
}
