//! Smoke tests through the top-level re-exports

use ibc_snapshot::engine::testing::populate_all;
use ibc_snapshot::{IbcStores, MemoryStore, SnapshotConfig, SubsystemCoordinator};
use tempfile::TempDir;

#[test]
fn test_legacy_and_envelope_through_facade() {
    let dir = TempDir::new().unwrap();
    let source = MemoryStore::new();
    populate_all(&source, 3).unwrap();

    let coordinator = SubsystemCoordinator::new(SnapshotConfig::for_testing());
    coordinator
        .export_to(&IbcStores::shared(&source), dir.path())
        .unwrap();
    coordinator
        .export_genesis_to(&IbcStores::shared(&source), dir.path())
        .unwrap();

    let from_legacy = MemoryStore::new();
    coordinator
        .import_legacy_from(&IbcStores::shared(&from_legacy), dir.path())
        .unwrap();
    let from_envelope = MemoryStore::new();
    coordinator
        .init_genesis_from(&IbcStores::shared(&from_envelope), dir.path())
        .unwrap();

    assert_eq!(from_legacy.entries(), source.entries());
    assert_eq!(from_envelope.entries(), source.entries());
}
