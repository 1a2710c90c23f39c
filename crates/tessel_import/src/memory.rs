//! Memory inference: RAM nets become [`Memory`](tessel_ir::Memory) entities,
//! their read and write ports become memory pseudo-cells, and a binary
//! initializer becomes one `MemInit` cell per word that has a defined bit.

use crate::error::ImportError;
use crate::importer::NetlistImporter;
use log::debug;
use tessel_common::{Logic, LogicVec};
use tessel_ir::{CellKind, PortDirection, SigSpec};
use tessel_netlist::{InstanceId, InstanceType, NetId, NetlistView, PortRole};

use PortDirection::{Input, Output};

/// Splits a wide initial value into words.
///
/// Everything up to and including the first `'` is a size prefix and is
/// skipped. An optional `b` radix follows; any other radix letter yields
/// `None`. Words are read most significant bit first, `width` characters at
/// a time. Only `0` and `1` define a bit. A word with at least one defined
/// bit is returned with its index; parsing stops at the end of the text.
pub fn parse_wide_init(text: &str, width: u32, size: u32) -> Option<Vec<(u32, LogicVec)>> {
    let digits = match text.find('\'') {
        Some(pos) => &text[pos + 1..],
        None => text,
    };
    let mut chars = digits.chars().peekable();
    match chars.peek() {
        Some('b' | 'B') => {
            chars.next();
        }
        Some(c) if c.is_ascii_alphabetic() && !matches!(c, 'x' | 'X' | 'z' | 'Z') => return None,
        _ => {}
    }

    let mut words = Vec::new();
    for word in 0..size {
        let mut value = LogicVec::all_x(width);
        let mut valid = false;
        for bit in (0..width).rev() {
            let Some(c) = chars.next() else { break };
            let logic = match c {
                '0' => Logic::Zero,
                '1' => Logic::One,
                _ => continue,
            };
            value.set(bit, logic);
            valid = true;
        }
        if valid {
            words.push((word, value));
        }
    }
    Some(words)
}

impl<V: NetlistView + ?Sized> NetlistImporter<'_, '_, V> {
    /// Creates the memory for a RAM net together with its initializers.
    pub(crate) fn infer_memory(&mut self, net: NetId) -> Result<(), ImportError> {
        let view = self.view;
        let bits = view.net_size(net);
        let mut width = bits;
        for pr in view.net_port_refs(net) {
            match view.instance_type(pr.instance) {
                InstanceType::ReadPort => {
                    width = width.min(view.pins(pr.instance, PortRole::Output).len() as u32);
                }
                InstanceType::WritePort | InstanceType::ClockedWritePort => {
                    width = width.min(view.pins(pr.instance, PortRole::Input2).len() as u32);
                }
                other => {
                    return Err(ImportError::UnsupportedMemoryAccess {
                        net: view.net_name(net).to_string(),
                        instance: view.instance_name(pr.instance).to_string(),
                        kind: other.to_string(),
                    })
                }
            }
        }
        let size = if width == 0 { 0 } else { bits / width };

        let name = self.b.unique_name(view.net_name(net));
        debug!(
            "importing memory `{}` ({size} x {width})",
            self.b.interner().resolve(name)
        );
        let memory = self.b.module_mut().add_memory(name, width, size)?;
        self.memories.insert(net, memory);

        let Some(text) = view.net_wide_init_value(net) else {
            return Ok(());
        };
        let words = parse_wide_init(text, width, size).ok_or_else(|| {
            ImportError::UnsupportedInitValue {
                net: view.net_name(net).to_string(),
                value: text.to_string(),
            }
        })?;
        let ascending = view.net_is_ascending(net);
        for (word, value) in words {
            let address = if ascending { word } else { size - 1 - word };
            let priority = self.b.next_init_priority();
            let cell = self.b.auto_name();
            self.b.cell(
                cell,
                CellKind::MemInit {
                    memory: name,
                    abits: 32,
                    width,
                    words: 1,
                    priority,
                },
                [
                    ("ADDR", Input, SigSpec::from_const(&LogicVec::from_u64(u64::from(address), 32))),
                    ("DATA", Input, SigSpec::from_const(&value)),
                ],
            )?;
        }
        Ok(())
    }

    /// The memory a port instance accesses through the RAM net on `role`.
    fn port_memory(
        &self,
        inst: InstanceId,
        role: PortRole,
    ) -> Result<(NetId, tessel_ir::MemoryId), ImportError> {
        let net = self.pin_net(inst, role)?;
        match self.memories.get(&net) {
            Some(memory) => Ok((net, *memory)),
            None => Err(ImportError::UnmappedNet {
                net: self.view.net_name(net).to_string(),
                scope: tessel_netlist::hierarchical_name(self.view, self.nl),
            }),
        }
    }

    fn check_width(
        &self,
        inst: InstanceId,
        net: NetId,
        memory: tessel_ir::MemoryId,
        port_width: u32,
    ) -> Result<(), ImportError> {
        let word_width = self.b.module().memories[memory].width;
        if word_width != port_width {
            return Err(ImportError::UnsupportedAsymmetricMemory {
                instance: self.view.instance_name(inst).to_string(),
                memory: self.view.net_name(net).to_string(),
                port_width,
                word_width,
            });
        }
        Ok(())
    }

    pub(crate) fn lower_read_port(&mut self, inst: InstanceId) -> Result<(), ImportError> {
        let (net, memory) = self.port_memory(inst, PortRole::Input)?;
        let data_width = self.view.pins(inst, PortRole::Output).len() as u32;
        self.check_width(inst, net, memory, data_width)?;

        let addr = self.operand(inst, PortRole::Input1)?;
        let data = self.operator_output(inst)?;
        let kind = CellKind::MemRead {
            memory: self.b.module().memories[memory].name,
            abits: addr.width(),
            width: data.width(),
            clk_enable: false,
            clk_polarity: true,
            transparent: false,
        };
        let name = self.instance_ident(inst);
        self.b.cell(
            name,
            kind,
            [
                ("CLK", Input, Logic::X.into()),
                ("EN", Input, Logic::X.into()),
                ("ADDR", Input, addr),
                ("DATA", Output, data),
            ],
        )?;
        Ok(())
    }

    pub(crate) fn lower_write_port(&mut self, inst: InstanceId, clocked: bool) -> Result<(), ImportError> {
        let (net, memory) = self.port_memory(inst, PortRole::Output)?;
        let data_width = self.view.pins(inst, PortRole::Input2).len() as u32;
        self.check_width(inst, net, memory, data_width)?;

        let addr = self.operand(inst, PortRole::Input1)?;
        let data = self.operand(inst, PortRole::Input2)?;
        let enable = self.pin_sig(inst, PortRole::Control)?.repeat(data.width());
        let clk = if clocked {
            self.pin_sig(inst, PortRole::Clock)?
        } else {
            Logic::Zero.into()
        };
        let kind = CellKind::MemWrite {
            memory: self.b.module().memories[memory].name,
            abits: addr.width(),
            width: data.width(),
            clk_enable: clocked,
            clk_polarity: true,
            priority: 0,
        };
        let name = self.instance_ident(inst);
        self.b.cell(
            name,
            kind,
            [
                ("CLK", Input, clk),
                ("EN", Input, enable),
                ("ADDR", Input, addr),
                ("DATA", Input, data),
            ],
        )?;
        Ok(())
    }
}
