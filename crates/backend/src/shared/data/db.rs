use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

const CREATE_DOCUMENTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        data TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (collection, id)
    );
"#;

const CREATE_DOCUMENTS_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_documents_collection_created
        ON documents (collection, created_at);
"#;

fn build_sqlite_url(path: &Path) -> String {
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Open (or create) the sqlite file and bootstrap the documents table
pub async fn initialize_database(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    let db_url = build_sqlite_url(&absolute_path);
    tracing::info!("Opening document database at {}", absolute_path.display());

    let conn = Database::connect(&db_url).await?;
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        CREATE_DOCUMENTS_TABLE.to_string(),
    ))
    .await?;
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        CREATE_DOCUMENTS_INDEX.to_string(),
    ))
    .await?;

    Ok(conn)
}
