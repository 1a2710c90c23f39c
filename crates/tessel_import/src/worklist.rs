//! The hierarchical worklist driver.
//!
//! Starting from the selected top sub-circuits, every sub-circuit reachable
//! through opaque cells is imported exactly once. The worklist is an ordered
//! set, so the import order depends only on the netlist handles.

use crate::error::ImportError;
use crate::extnets::ExtNetHoister;
use crate::session::{ImportOptions, ImportSession};
use log::info;
use std::collections::BTreeSet;
use tessel_common::Interner;
use tessel_config::ImportConfig;
use tessel_diagnostics::DiagnosticSink;
use tessel_ir::Design;
use tessel_netlist::{InstanceType, NetlistEdit, NetlistId, NetlistView};

/// The top sub-circuits selected by `config`.
///
/// With `all`, every user sub-circuit whose name does not start with `$` is
/// selected; otherwise each name in `top` must exist.
pub fn resolve_tops<V: NetlistView + ?Sized>(
    view: &V,
    config: &ImportConfig,
) -> Result<BTreeSet<NetlistId>, ImportError> {
    let mut tops = BTreeSet::new();
    if config.all {
        for nl in view.netlists() {
            if view.netlist_type(nl) == InstanceType::User && !view.netlist_name(nl).starts_with('$') {
                tops.insert(nl);
            }
        }
    }
    for name in &config.top {
        let nl = view
            .netlist_by_name(name)
            .ok_or_else(|| ImportError::UnknownTop { name: name.clone() })?;
        tops.insert(nl);
    }
    Ok(tops)
}

/// Imports `pending` and everything it references into `design`.
///
/// Each sub-circuit is imported at most once per call, even when it is
/// queued again by a later module.
pub fn drain_worklist<V: NetlistView + ?Sized>(
    view: &V,
    session: &mut ImportSession<'_>,
    design: &mut Design,
    mut pending: BTreeSet<NetlistId>,
) -> Result<(), ImportError> {
    let mut done = BTreeSet::new();
    while let Some(nl) = pending.pop_first() {
        if !done.insert(nl) {
            continue;
        }
        session.import_netlist(view, design, nl, &mut pending)?;
    }
    Ok(())
}

/// Imports the sub-circuits selected by `config` into a fresh design.
///
/// When `config.extnets` is set, external net references below each top are
/// hoisted first. Warnings go to `sink`; the first fatal error aborts the run.
pub fn import_design<V: NetlistEdit + ?Sized>(
    netlist: &mut V,
    config: &ImportConfig,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> Result<Design, ImportError> {
    let tops = resolve_tops(&*netlist, config)?;
    info!("importing {} top sub-circuit(s)", tops.len());

    if config.extnets {
        let mut hoister = ExtNetHoister::new();
        for &nl in &tops {
            hoister.run(&mut *netlist, nl);
        }
        info!("hoisted {} external net reference(s)", hoister.rewritten());
    }

    let mut design = Design::new();
    let mut session = ImportSession::new(interner, sink, ImportOptions::from(config));
    drain_worklist(&*netlist, &mut session, &mut design, tops)?;
    info!("imported {} module(s)", design.module_count());
    Ok(design)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_netlist::NetlistDb;

    fn config(top: &[&str], all: bool) -> ImportConfig {
        ImportConfig {
            top: top.iter().map(|s| s.to_string()).collect(),
            all,
            ..ImportConfig::default()
        }
    }

    #[test]
    fn tops_by_name() {
        let mut db = NetlistDb::new();
        let a = db.add_netlist("a");
        db.add_netlist("b");
        let tops = resolve_tops(&db, &config(&["a"], false)).unwrap();
        assert_eq!(tops.into_iter().collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn unknown_top() {
        let db = NetlistDb::new();
        let err = resolve_tops(&db, &config(&["cpu"], false)).unwrap_err();
        assert_eq!(err, ImportError::UnknownTop { name: "cpu".into() });
    }

    #[test]
    fn all_skips_generated_and_primitives() {
        let mut db = NetlistDb::new();
        let a = db.add_netlist("a");
        db.add_netlist("$paramod");
        db.primitive(InstanceType::And);
        let b = db.add_netlist("b");
        let tops = resolve_tops(&db, &config(&[], true)).unwrap();
        assert_eq!(tops.into_iter().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn shared_child_imported_once() {
        let mut db = NetlistDb::new();
        let top = db.add_netlist("top");
        let child = db.add_netlist("child");
        db.add_instance(top, "u0", child);
        db.add_instance(top, "u1", child);

        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let design = import_design(&mut db, &config(&["top"], false), &interner, &sink).unwrap();
        assert_eq!(design.module_count(), 2);
        assert!(design.has_module(interner.get_or_intern("child")));
    }
}
