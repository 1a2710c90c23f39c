//! Clocked sampling and verification directives.
//!
//! Edge detectors are indexed in a scan of their own before any instance is
//! lowered, so a sampler finds its clock regardless of instance order.

use crate::error::ImportError;
use crate::importer::NetlistImporter;
use tessel_common::{Logic, LogicVec};
use tessel_ir::{CellKind, ConstValue, PortDirection};
use tessel_netlist::{InstanceId, InstanceType, NetlistView, PortRole};

impl<V: NetlistView + ?Sized> NetlistImporter<'_, '_, V> {
    /// Records the input net of every edge detector under its output net.
    pub(crate) fn scan_edge_detectors(&mut self) {
        let view = self.view;
        for &inst in view.instances(self.nl) {
            if view.instance_type(inst) != InstanceType::SvaPosedge {
                continue;
            }
            if let (Some(output), Some(input)) = (
                view.pin(inst, PortRole::Output),
                view.pin(inst, PortRole::Input),
            ) {
                self.edges.insert(output, input);
            }
        }
    }

    /// A sampler becomes a register clocked by the detected edge whose output
    /// starts at 1.
    pub(crate) fn lower_sampler(&mut self, inst: InstanceId) -> Result<(), ImportError> {
        let mut edge = self.pin_net(inst, PortRole::Input1)?;
        let mut data = self.pin_net(inst, PortRole::Input2)?;
        let out = self.pin_net(inst, PortRole::Output)?;
        if self.edges.contains_key(&data) {
            std::mem::swap(&mut edge, &mut data);
        }
        let no_clock = || ImportError::MissingClockPattern {
            instance: self.view.instance_name(inst).to_string(),
        };
        let clk = *self.edges.get(&edge).ok_or_else(no_clock)?;

        let q = self.net(out)?;
        let wire = match q.as_wire() {
            Some((wire, _)) if self.b.module().wires[wire].width == 1 => wire,
            _ => return Err(no_clock()),
        };
        self.b
            .set_wire_attribute(wire, "init", ConstValue::Logic(LogicVec::from_u64(1, 1)));

        let clk = self.net(clk)?.into();
        let d = self.net(data)?.into();
        let name = self.b.auto_name();
        self.b.dff(name, clk, d, q.into())?;
        Ok(())
    }

    /// Assert, assume and cover check their input against constant true.
    pub(crate) fn lower_check(&mut self, inst: InstanceId, kind: CellKind) -> Result<(), ImportError> {
        let a = self.pin_sig(inst, PortRole::Input)?;
        let name = self.b.auto_name();
        self.b.cell(
            name,
            kind,
            [
                ("A", PortDirection::Input, a),
                ("EN", PortDirection::Input, Logic::One.into()),
            ],
        )?;
        Ok(())
    }
}
