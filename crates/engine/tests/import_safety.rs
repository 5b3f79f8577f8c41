//! Import safety tests
//!
//! Allowlist enforcement, metadata-before-state ordering, corrupt input,
//! cancellation and subsystem ordering in the coordinator.

use std::fs;

use ibc_snapshot_core::{
    ClientParams, ClientState, ClientStore, GenesisMetadata, IdentifiedClientState,
    IdentifiedGenesisMetadata,
};
use ibc_snapshot_durability::{write_envelope, CancellationToken, SnapshotConfig, SnapshotError};
use ibc_snapshot_engine::testing::{client_id, populate_all, populate_clients, TENDERMINT};
use ibc_snapshot_engine::{
    ClientGenesis, ClientSubsystem, IbcStores, SnapshotImporter, Subsystem, SubsystemCoordinator,
};
use ibc_snapshot_storage::MemoryStore;
use tempfile::TempDir;

fn coordinator() -> SubsystemCoordinator {
    SubsystemCoordinator::new(SnapshotConfig::for_testing())
}

fn exported_clients(n: usize) -> ClientGenesis {
    let store = MemoryStore::new();
    populate_clients(&store, n).unwrap();
    ClientSubsystem::export_genesis(&store).unwrap()
}

#[test]
fn test_allowlist_violation_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    let mut genesis = exported_clients(3);
    genesis.clients.push(IdentifiedClientState::new(
        "09-localhost",
        ClientState::new("09-localhost", vec![0]),
    ));
    write_envelope(dir.path(), "client", &genesis).unwrap();

    let target = MemoryStore::new();
    let err = SnapshotImporter::<ClientSubsystem>::new()
        .init_genesis_from(&target, dir.path())
        .unwrap_err();
    assert!(matches!(err, SnapshotError::InvalidState(ref msg) if msg.contains("09-localhost")));
    assert!(err.is_fatal());
    assert!(target.is_empty());
}

#[test]
fn test_allowlist_is_taken_from_imported_params() {
    let mut genesis = exported_clients(2);
    genesis.params = ClientParams::new(["06-solomachine"]);

    let target = MemoryStore::new();
    target
        .set_client_params(&ClientParams::new([TENDERMINT]))
        .unwrap();
    let err = ClientSubsystem::init_genesis(&target, &genesis).unwrap_err();
    assert!(matches!(err, SnapshotError::InvalidState(_)));
    assert_eq!(target.len(), 1);
}

#[test]
fn test_legacy_import_enforces_allowlist() {
    let dir = TempDir::new().unwrap();
    let source = MemoryStore::new();
    populate_all(&source, 2).unwrap();
    // Clients installed directly bypass the allowlist; the import must not
    source
        .set_client_params(&ClientParams::new(["06-solomachine"]))
        .unwrap();
    coordinator()
        .export_to(&IbcStores::shared(&source), dir.path())
        .unwrap();

    let target = MemoryStore::new();
    let err = coordinator()
        .import_legacy_from(&IbcStores::shared(&target), dir.path())
        .unwrap_err();
    assert!(matches!(err, SnapshotError::InvalidState(_)));
    assert!(target.is_empty());
}

#[test]
fn test_metadata_written_before_client_state() {
    let mut genesis = exported_clients(1);
    let original = genesis.clients[0].client_state.clone();
    // Metadata aliasing the reserved client state key
    genesis.clients_metadata = vec![IdentifiedGenesisMetadata {
        client_id: client_id(0),
        client_metadata: vec![GenesisMetadata::new("clientState", vec![0xde, 0xad])],
    }];

    let target = MemoryStore::new();
    ClientSubsystem::init_genesis(&target, &genesis).unwrap();
    let clients = target.get_all_clients().unwrap();
    assert_eq!(clients[0].client_state, original);

    // The same writes in the opposite order corrupt the client state
    let reversed = MemoryStore::new();
    reversed
        .set_client_state(&client_id(0), &original)
        .unwrap();
    reversed
        .set_all_client_metadata(&genesis.clients_metadata)
        .unwrap();
    assert!(reversed.get_all_clients().is_err());
}

#[test]
fn test_create_localhost_flag_ignored_on_import() {
    let dir = TempDir::new().unwrap();
    let mut genesis = exported_clients(1);
    genesis.create_localhost = true;
    write_envelope(dir.path(), "client", &genesis).unwrap();

    let target = MemoryStore::new();
    SnapshotImporter::<ClientSubsystem>::new()
        .init_genesis_from(&target, dir.path())
        .unwrap();
    let exported = ClientSubsystem::export_genesis(&target).unwrap();
    assert!(!exported.create_localhost);
    assert_eq!(exported.clients, genesis.clients);
}

#[test]
fn test_corrupt_envelope_stops_later_subsystems() {
    let dir = TempDir::new().unwrap();
    let source = MemoryStore::new();
    populate_all(&source, 2).unwrap();
    coordinator()
        .export_genesis_to(&IbcStores::shared(&source), dir.path())
        .unwrap();

    let path = dir.path().join("genesis_connection.bin");
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] = b'{';
    fs::write(&path, bytes).unwrap();

    let target = MemoryStore::new();
    let err = coordinator()
        .init_genesis_from(&IbcStores::shared(&target), dir.path())
        .unwrap_err();
    assert!(matches!(err, SnapshotError::CorruptSnapshot { ref path, .. } if path.ends_with("genesis_connection.bin")));

    // Client import completed and is not rolled back; channels never ran
    assert_eq!(target.get_all_clients().unwrap().len(), 2);
    assert!(target.scan_prefix("channelEnds/").is_empty());
    assert!(target.scan_prefix("connections/").is_empty());
}

#[test]
fn test_missing_legacy_files_are_io_errors() {
    let dir = TempDir::new().unwrap();
    let target = MemoryStore::new();
    let err = coordinator()
        .import_legacy_from(&IbcStores::shared(&target), dir.path())
        .unwrap_err();
    assert!(matches!(err, SnapshotError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    assert!(!err.is_fatal());
}

#[test]
fn test_cancelled_export_stops_at_first_subsystem() {
    let dir = TempDir::new().unwrap();
    let source = MemoryStore::new();
    populate_all(&source, 3).unwrap();

    let cancel = CancellationToken::new();
    let coordinator =
        SubsystemCoordinator::with_cancellation(SnapshotConfig::for_testing(), cancel.clone());
    cancel.cancel();

    let err = coordinator
        .export_to(&IbcStores::shared(&source), dir.path())
        .unwrap_err();
    match err {
        SnapshotError::Cancelled { section, index } => {
            assert_eq!(section, "client");
            assert_eq!(index, 0);
        }
        other => panic!("expected Cancelled, got {other:?}"),
    }
    // Cancelled before the store was read; nothing written
    assert!(!dir.path().join("client0").exists());
    assert!(!dir.path().join("connection0").exists());
    assert!(!dir.path().join("channel0").exists());
}

#[test]
fn test_cancelled_envelope_export_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let source = MemoryStore::new();
    populate_all(&source, 2).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = SubsystemCoordinator::with_cancellation(SnapshotConfig::for_testing(), cancel)
        .export_genesis_to(&IbcStores::shared(&source), dir.path())
        .unwrap_err();
    assert!(matches!(err, SnapshotError::Cancelled { ref section, index: 0 } if section == "client"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_duplicate_clients_rejected_on_import() {
    let dir = TempDir::new().unwrap();
    let mut genesis = exported_clients(2);
    genesis.clients.push(genesis.clients[1].clone());
    write_envelope(dir.path(), "client", &genesis).unwrap();

    let target = MemoryStore::new();
    let err = SnapshotImporter::<ClientSubsystem>::new()
        .init_genesis_from(&target, dir.path())
        .unwrap_err();
    assert!(matches!(err, SnapshotError::InvalidGenesis(_)));
    assert!(target.is_empty());
}
