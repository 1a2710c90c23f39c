//! Mapping from external nets to signal bits of the module being imported.
//!
//! The first binding of a net wins; later references to the same net either
//! resolve to that bit or are joined to it with an explicit connection by the
//! caller. A net owned by another sub-circuit never resolves.

use crate::error::ImportError;
use std::collections::HashMap;
use tessel_ir::SigBit;
use tessel_netlist::{hierarchical_name, NetId, NetlistId, NetlistView};

/// Per-import net-identity map.
#[derive(Debug, Default)]
pub struct NetMap {
    bits: HashMap<NetId, SigBit>,
}

impl NetMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bit bound to `net`, if any.
    pub fn get(&self, net: NetId) -> Option<SigBit> {
        self.bits.get(&net).copied()
    }

    /// Returns `true` if `net` is bound.
    pub fn contains(&self, net: NetId) -> bool {
        self.bits.contains_key(&net)
    }

    /// Binds `net` to `bit` unless it is already bound.
    ///
    /// Returns the existing binding when there is one; the map is unchanged
    /// in that case.
    pub fn bind(&mut self, net: NetId, bit: SigBit) -> Option<SigBit> {
        match self.bits.get(&net) {
            Some(existing) => Some(*existing),
            None => {
                self.bits.insert(net, bit);
                None
            }
        }
    }

    /// Number of bound nets.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// The signal bit of `net` as seen from `scope`.
    pub fn resolve<V: NetlistView + ?Sized>(
        &self,
        view: &V,
        scope: NetlistId,
        net: NetId,
    ) -> Result<SigBit, ImportError> {
        if let Some(bit) = self.get(net) {
            return Ok(bit);
        }
        let owner = view.net_owner(net);
        if view.is_external_to(net, scope) {
            return Err(ImportError::ExternalReference {
                net: format!("{}.{}", view.netlist_name(owner), view.net_name(net)),
                owner: hierarchical_name(view, owner),
                scope: hierarchical_name(view, scope),
            });
        }
        Err(ImportError::UnmappedNet {
            net: view.net_name(net).to_string(),
            scope: hierarchical_name(view, scope),
        })
    }
}
