use tokio::sync::{RwLock, RwLockWriteGuard};

/// A value plus the commit version that produced it.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Single record with optimistic concurrency control.
///
/// Readers take cheap snapshots carrying the version they observed. Writers
/// open an exclusive section, compare the version against their snapshot and
/// either commit (bumping the version) or back off and retry against fresh
/// state. Every committed write bumps the version, so a stale snapshot can
/// never be committed over a concurrent write.
pub struct VersionedCell<T> {
    inner: RwLock<Versioned<T>>,
}

impl<T: Clone> VersionedCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(Versioned { value, version: 0 }),
        }
    }

    /// Clone out the current value and its version.
    pub async fn snapshot(&self) -> Versioned<T> {
        self.inner.read().await.clone()
    }

    /// Read a projection of the current value without cloning the whole record.
    pub async fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.read().await.value)
    }

    /// Unconditional exclusive update. Bumps the version.
    ///
    /// For single-writer paths (aggregation, directory upserts) where
    /// last-write-wins is the intended semantics.
    pub async fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.write().await;
        let out = f(&mut guard.value);
        guard.version += 1;
        out
    }

    /// Open an exclusive write section.
    ///
    /// The caller checks [`CellWrite::version`] against its snapshot before
    /// mutating; a mismatch means a concurrent commit won the race. The guard
    /// may be held across companion-record writes so a multi-record sequence
    /// commits as one atomic unit.
    pub async fn begin_write(&self) -> CellWrite<'_, T> {
        CellWrite {
            guard: self.inner.write().await,
        }
    }
}

pub struct CellWrite<'a, T> {
    guard: RwLockWriteGuard<'a, Versioned<T>>,
}

impl<T> CellWrite<'_, T> {
    pub fn version(&self) -> u64 {
        self.guard.version
    }

    pub fn get(&self) -> &T {
        &self.guard.value
    }

    /// Apply a mutation and bump the version.
    pub fn mutate<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.guard.value);
        self.guard.version += 1;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_tracks_commits() {
        let cell = VersionedCell::new(0u64);
        let before = cell.snapshot().await;

        cell.update(|v| *v += 5).await;

        let after = cell.snapshot().await;
        assert_eq!(before.version, 0);
        assert_eq!(after.version, 1);
        assert_eq!(after.value, 5);
    }

    #[tokio::test]
    async fn stale_write_section_is_detectable() {
        let cell = VersionedCell::new(0u64);
        let snap = cell.snapshot().await;

        cell.update(|v| *v = 10).await;

        let write = cell.begin_write().await;
        assert_ne!(write.version(), snap.version);
    }

    #[tokio::test]
    async fn mutate_bumps_version_once() {
        let cell = VersionedCell::new(String::new());
        let mut write = cell.begin_write().await;
        write.mutate(|v| v.push('a'));
        drop(write);

        let snap = cell.snapshot().await;
        assert_eq!(snap.version, 1);
        assert_eq!(snap.value, "a");
    }
}
