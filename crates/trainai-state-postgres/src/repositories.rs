use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;
use tracing::debug;

use trainai_core::{CoreError, Flow, FlowId, FlowInput, FlowRepository, FlowStep, FlowSummary};

use crate::{map_sqlx_error, PostgresConnection};

const INSERT_FLOW: &str = "
    INSERT INTO flows (id, app, task, confidence, sources, steps, fallbacks, role, prerequisites)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
";

const LIST_FLOWS: &str = "
    SELECT id, app, task, confidence
    FROM flows
    ORDER BY created_at DESC, seq DESC
";

const SELECT_FLOW: &str = "
    SELECT id, app, task, confidence, sources, steps, fallbacks, role, prerequisites
    FROM flows
    WHERE id = $1
";

/// Postgres implementation of the FlowRepository
#[derive(Clone)]
pub struct PostgresFlowRepository {
    conn: PostgresConnection,
}

impl PostgresFlowRepository {
    /// Create a new Postgres flow repository
    pub fn new(conn: PostgresConnection) -> Self {
        Self { conn }
    }

    fn summary_from_row(row: &PgRow) -> Result<FlowSummary, sqlx::Error> {
        Ok(FlowSummary {
            id: FlowId(row.try_get("id")?),
            app: row.try_get("app")?,
            task: row.try_get("task")?,
            confidence: row.try_get("confidence")?,
        })
    }

    fn flow_from_row(row: &PgRow) -> Result<Flow, sqlx::Error> {
        let sources: Json<Vec<Map<String, Value>>> = row.try_get("sources")?;
        let steps: Json<Vec<FlowStep>> = row.try_get("steps")?;
        let fallbacks: Json<Map<String, Value>> = row.try_get("fallbacks")?;

        Ok(Flow::new(
            FlowId(row.try_get("id")?),
            FlowInput {
                app: row.try_get("app")?,
                task: row.try_get("task")?,
                confidence: row.try_get("confidence")?,
                sources: sources.0,
                steps: steps.0,
                fallbacks: fallbacks.0,
                role: row.try_get("role")?,
                prerequisites: row.try_get("prerequisites")?,
            },
        ))
    }
}

#[async_trait]
impl FlowRepository for PostgresFlowRepository {
    async fn persist(&self, flow: FlowInput) -> Result<FlowId, CoreError> {
        let id = FlowId::generate();

        sqlx::query(INSERT_FLOW)
            .bind(&id.0)
            .bind(&flow.app)
            .bind(&flow.task)
            .bind(flow.confidence)
            .bind(Json(&flow.sources))
            .bind(Json(&flow.steps))
            .bind(Json(&flow.fallbacks))
            .bind(&flow.role)
            .bind(&flow.prerequisites)
            .execute(self.conn.pool())
            .await
            .map_err(|e| map_sqlx_error("Failed to save flow", e))?;

        debug!(%id, "Inserted flow row");
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<FlowSummary>, CoreError> {
        let rows = sqlx::query(LIST_FLOWS)
            .fetch_all(self.conn.pool())
            .await
            .map_err(|e| map_sqlx_error("Failed to list flows", e))?;

        rows.iter()
            .map(Self::summary_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("Failed to decode flow summary", e))
    }

    async fn find_by_id(&self, id: &FlowId) -> Result<Option<Flow>, CoreError> {
        let row = sqlx::query(SELECT_FLOW)
            .bind(&id.0)
            .fetch_optional(self.conn.pool())
            .await
            .map_err(|e| map_sqlx_error("Failed to load flow", e))?;

        row.as_ref()
            .map(Self::flow_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("Failed to decode flow", e))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<bool, CoreError> {
        sqlx::query("SELECT 1")
            .execute(self.conn.pool())
            .await
            .map(|_| true)
            .map_err(|e| map_sqlx_error("Health check failed", e))
    }
}
