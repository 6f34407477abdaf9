use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use trainai_core::{CoreError, Flow, FlowId, FlowInput, FlowRepository, FlowSummary, StoredFlow};

/// Map entry: the stored flow plus its insertion sequence number
struct Entry {
    stored: StoredFlow,
    seq: u64,
}

#[derive(Default)]
struct FlowTable {
    rows: HashMap<String, Entry>,
    next_seq: u64,
}

/// In-memory implementation of the FlowRepository
///
/// Clones share the same underlying table.
#[derive(Clone, Default)]
pub struct InMemoryFlowRepository {
    table: Arc<RwLock<FlowTable>>,
}

impl InMemoryFlowRepository {
    /// Create a new, empty in-memory flow repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored flows
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl FlowRepository for InMemoryFlowRepository {
    async fn persist(&self, flow: FlowInput) -> Result<FlowId, CoreError> {
        let mut table = self.table.write().await;

        let mut id = FlowId::generate();
        while table.rows.contains_key(&id.0) {
            warn!(%id, "Generated flow id already in use, regenerating");
            id = FlowId::generate();
        }

        let seq = table.next_seq;
        table.next_seq += 1;

        let stored = StoredFlow {
            flow: Flow::new(id.clone(), flow),
            created_at: Utc::now(),
        };
        table.rows.insert(id.0.clone(), Entry { stored, seq });

        debug!(%id, seq, "Stored flow in memory");
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<FlowSummary>, CoreError> {
        let table = self.table.read().await;

        // seq is the creation order
        let mut entries: Vec<&Entry> = table.rows.values().collect();
        entries.sort_by(|a, b| b.seq.cmp(&a.seq));

        Ok(entries.iter().map(|e| e.stored.flow.summary()).collect())
    }

    async fn find_by_id(&self, id: &FlowId) -> Result<Option<Flow>, CoreError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id.0).map(|e| e.stored.flow.clone()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
