/// SQL migrations for the PostgreSQL flow store
///
/// Each entry is `(name, sql)`. Statements are idempotent so they can be
/// replayed on every startup.
pub fn generate_migrations() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "20250101000000_create_flows",
            r#"
            CREATE TABLE IF NOT EXISTS flows (
                id TEXT PRIMARY KEY,
                app TEXT NOT NULL,
                task TEXT NOT NULL,
                confidence DOUBLE PRECISION NOT NULL,
                sources JSONB NOT NULL DEFAULT '[]'::jsonb,
                steps JSONB NOT NULL DEFAULT '[]'::jsonb,
                fallbacks JSONB NOT NULL DEFAULT '{}'::jsonb,
                role TEXT[] NOT NULL DEFAULT '{}',
                prerequisites TEXT[] NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        ),
        (
            "20250102000000_flows_ordering",
            r#"
            ALTER TABLE flows ADD COLUMN IF NOT EXISTS seq BIGSERIAL;
            CREATE INDEX IF NOT EXISTS idx_flows_created_at ON flows(created_at DESC, seq DESC);
            "#,
        ),
    ]
}
