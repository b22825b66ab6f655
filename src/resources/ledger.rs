//! Book-keeping for GPU objects owned by the engine's wrappers.
//!
//! Every wrapper registers what it allocates with the [`ResourceLedger`] of the
//! [`Gpu`](crate::context::Gpu) it was created from and holds a [`Tracked`]
//! guard per object. Dropping the guard records the release, so a ledger with
//! zero live entries means nothing leaked.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Program,
    VertexArray,
    VertexBuffer,
    IndexBuffer,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Program,
        ResourceKind::VertexArray,
        ResourceKind::VertexBuffer,
        ResourceKind::IndexBuffer,
    ];

    fn slot(self) -> usize {
        match self {
            ResourceKind::Program => 0,
            ResourceKind::VertexArray => 1,
            ResourceKind::VertexBuffer => 2,
            ResourceKind::IndexBuffer => 3,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Program => "program",
            ResourceKind::VertexArray => "vertex array",
            ResourceKind::VertexBuffer => "vertex buffer",
            ResourceKind::IndexBuffer => "index buffer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
pub struct ResourceLedger {
    allocated: [AtomicUsize; 4],
    released: [AtomicUsize; 4],
}

impl ResourceLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record one allocation of `kind`. The returned guard records the release.
    pub fn track(self: &Arc<Self>, kind: ResourceKind) -> Tracked {
        self.allocated[kind.slot()].fetch_add(1, Ordering::Relaxed);
        log::trace!("allocated {}", kind);
        Tracked {
            ledger: Arc::clone(self),
            kind,
        }
    }

    pub fn allocated(&self, kind: ResourceKind) -> usize {
        self.allocated[kind.slot()].load(Ordering::Relaxed)
    }

    pub fn released(&self, kind: ResourceKind) -> usize {
        self.released[kind.slot()].load(Ordering::Relaxed)
    }

    /// Allocated minus released. The two counters are read separately, so a
    /// guard dropped on another thread in between must not underflow.
    pub fn live(&self, kind: ResourceKind) -> usize {
        let released = self.released(kind);
        self.allocated(kind).saturating_sub(released)
    }

    pub fn total_live(&self) -> usize {
        ResourceKind::ALL.iter().map(|kind| self.live(*kind)).sum()
    }
}

/// Proof of one live GPU object. Released exactly once, on drop.
#[derive(Debug)]
pub struct Tracked {
    ledger: Arc<ResourceLedger>,
    kind: ResourceKind,
}

impl Tracked {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.released[self.kind.slot()].fetch_add(1, Ordering::Relaxed);
        log::trace!("released {}", self.kind);
    }
}
