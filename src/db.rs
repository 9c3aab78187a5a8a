use sea_orm::sea_query::{Index, IndexCreateStatement, LikeExpr, TableCreateStatement};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, Schema,
    Statement,
};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::{board, menu, menu_permission, user};

/// `%term%` with `\`, `%` and `_` matched literally
pub fn contains_pattern(term: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(term.len() + 2);
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    LikeExpr::new(format!("%{}%", escaped)).escape('\\')
}

/// Initialize database connection and auto-migrate tables
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let database_url = config.connection_url();

    info!("Connecting to database: {}:{}/{}", config.host, config.port, config.name);

    let mut opt = ConnectOptions::new(&database_url);
    opt.max_connections(config.max_connections)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug)
        .set_schema_search_path("public");

    let db = Database::connect(opt).await?;
    info!("Database connection established");

    auto_migrate(&db).await?;

    Ok(db)
}

/// Create missing tables and indexes
async fn auto_migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    info!("Running auto-migration for all entities...");

    create_table_if_not_exists(db, backend, schema.create_table_from_entity(user::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(board::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(menu::Entity)).await?;
    create_table_if_not_exists(
        db,
        backend,
        schema.create_table_from_entity(menu_permission::Entity),
    )
    .await?;

    for index in indexes() {
        create_index_if_not_exists(db, backend, index).await?;
    }

    info!("Auto-migration completed successfully");
    Ok(())
}

/// Sibling ordering and permission lookups
fn indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_menu_parent_sort")
            .table(menu::Entity)
            .col(menu::Column::ParentId)
            .col(menu::Column::SortOrder)
            .to_owned(),
        Index::create()
            .name("idx_menu_permission_menu")
            .table(menu_permission::Entity)
            .col(menu_permission::Column::MenuId)
            .col(menu_permission::Column::RoleId)
            .to_owned(),
    ]
}

/// Create a table if it doesn't exist
async fn create_table_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    mut stmt: TableCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists();

    let sql = backend.build(&stmt);

    db.execute(Statement::from_string(backend, sql.to_string())).await?;

    Ok(())
}

async fn create_index_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    mut stmt: IndexCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}
