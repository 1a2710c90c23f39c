//! Opaque ID newtypes for IR entities.
//!
//! Wire, cell and memory IDs are local to their [`Module`](crate::Module);
//! module IDs are local to the [`Design`](crate::Design).

tessel_common::define_id! {
    /// ID of a module in a design.
    ModuleId;
    /// ID of a wire within a module.
    WireId;
    /// ID of a cell within a module.
    CellId;
    /// ID of a memory within a module.
    MemoryId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_equality_and_hash() {
        let mut set = HashSet::new();
        set.insert(WireId::from_raw(1));
        set.insert(WireId::from_raw(2));
        set.insert(WireId::from_raw(1));
        assert_eq!(set.len(), 2);
        assert!(CellId::from_raw(1) < CellId::from_raw(2));
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = MemoryId::from_raw(99);
        let json = serde_json::to_string(&id).unwrap();
        let restored: MemoryId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }
}
