//! Background writer for learned aliases.
//!
//! Matching is synchronous, so remote alias inserts are queued to a single
//! task instead of awaited inline.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::store::{AliasRecord, VesselStore};

/// Queue depth before new aliases are dropped.
const QUEUE_CAPACITY: usize = 256;

enum WriterCommand {
    Insert {
        store: Arc<dyn VesselStore>,
        alias: AliasRecord,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle to the alias writer task. Clones share the task.
#[derive(Clone)]
pub(crate) struct AliasWriter {
    tx: mpsc::Sender<WriterCommand>,
}

impl AliasWriter {
    /// Spawn the writer task on the current tokio runtime.
    pub(crate) fn spawn(timeout: Duration) -> Self {
        let (tx, mut rx) = mpsc::channel(QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    WriterCommand::Insert { store, alias } => {
                        match tokio::time::timeout(timeout, store.insert_alias(&alias)).await {
                            Ok(Ok(())) => {
                                debug!(store = store.label(), alias = %alias.alias, "Alias written")
                            }
                            Ok(Err(e)) => {
                                warn!(store = store.label(), alias = %alias.alias, error = %e, "Alias write failed")
                            }
                            Err(_) => {
                                warn!(store = store.label(), alias = %alias.alias, "Alias write timed out")
                            }
                        }
                    }
                    WriterCommand::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });

        Self { tx }
    }

    /// Queue an alias insert. Returns false if the queue is full or closed.
    pub(crate) fn insert(&self, store: Arc<dyn VesselStore>, alias: AliasRecord) -> bool {
        match self.tx.try_send(WriterCommand::Insert { store, alias }) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Alias write dropped");
                false
            }
        }
    }

    /// Wait until every insert queued before this call has been attempted.
    pub(crate) async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(WriterCommand::Flush(done)).await.is_ok() {
            let _ = wait.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessels::memory::MemoryVesselStore;
    use crate::vessels::store::AliasSource;

    #[tokio::test]
    async fn flush_waits_for_queued_inserts() {
        let store = MemoryVesselStore::new("memory");
        let id = store.add("SKY PEACE", &[]);
        let writer = AliasWriter::spawn(Duration::from_secs(1));

        for alias in ["SKY PEAC", "SKYPEACE"] {
            assert!(writer.insert(
                Arc::new(store.clone()),
                AliasRecord {
                    vessel_id: id.clone(),
                    alias: alias.to_string(),
                    source: AliasSource::Learned,
                    confidence: 90,
                },
            ));
        }
        writer.flush().await;

        assert_eq!(store.aliases().len(), 2);
    }

    #[tokio::test]
    async fn failed_insert_does_not_stop_writer() {
        let store = MemoryVesselStore::new("memory");
        let writer = AliasWriter::spawn(Duration::from_secs(1));
        let alias = AliasRecord {
            vessel_id: "1".into(),
            alias: "X".into(),
            source: AliasSource::Learned,
            confidence: 90,
        };

        store.set_available(false);
        writer.insert(Arc::new(store.clone()), alias.clone());
        writer.flush().await;
        assert!(store.aliases().is_empty());

        store.set_available(true);
        writer.insert(Arc::new(store.clone()), alias);
        writer.flush().await;
        assert_eq!(store.aliases().len(), 1);
    }
}
