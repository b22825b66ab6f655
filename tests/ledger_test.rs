use voxel_ngin::resources::ledger::{ResourceKind, ResourceLedger};

#[test]
fn guards_record_release_on_drop() {
    let ledger = ResourceLedger::new();

    let program = ledger.track(ResourceKind::Program);
    let buffers = [
        ledger.track(ResourceKind::VertexBuffer),
        ledger.track(ResourceKind::VertexBuffer),
    ];
    assert_eq!(program.kind(), ResourceKind::Program);
    assert_eq!(ledger.live(ResourceKind::Program), 1);
    assert_eq!(ledger.live(ResourceKind::VertexBuffer), 2);
    assert_eq!(ledger.total_live(), 3);

    drop(buffers);
    assert_eq!(ledger.allocated(ResourceKind::VertexBuffer), 2);
    assert_eq!(ledger.released(ResourceKind::VertexBuffer), 2);
    assert_eq!(ledger.total_live(), 1);

    drop(program);
    assert_eq!(ledger.total_live(), 0);
    for kind in ResourceKind::ALL {
        assert_eq!(ledger.allocated(kind), ledger.released(kind), "{}", kind);
    }
}

#[test]
fn guard_keeps_its_ledger_alive() {
    let ledger = ResourceLedger::new();
    let guard = ledger.track(ResourceKind::IndexBuffer);
    let observer = ledger.clone();
    drop(ledger);

    drop(guard);
    assert_eq!(observer.released(ResourceKind::IndexBuffer), 1);
    assert_eq!(observer.live(ResourceKind::IndexBuffer), 0);
}
