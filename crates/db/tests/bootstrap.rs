use sqlx::PgPool;

/// Connect, migrate, and find every table in place and empty.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    docbuilder_db::health_check(&pool).await.unwrap();

    for table in [
        "users",
        "refresh_tokens",
        "template_categories",
        "templates",
        "template_fields",
        "documents",
        "document_field_values",
    ] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "{table} should start empty");
    }
}

/// The role column only accepts known roles.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_role_check_constraint(pool: PgPool) {
    let err = sqlx::query(
        "INSERT INTO users (username, email, password_hash, role)
         VALUES ('x', 'x@example.com', 'h', 'superuser')",
    )
    .execute(&pool)
    .await
    .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("ck_users_role"));
}

/// `updated_at` is maintained by trigger.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_updated_at_trigger(pool: PgPool) {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO template_categories (name, updated_at) VALUES ('Legal', NOW() - INTERVAL '1 day') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    sqlx::query("UPDATE template_categories SET description = 'x' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let fresh: bool = sqlx::query_scalar(
        "SELECT updated_at > NOW() - INTERVAL '1 minute' FROM template_categories WHERE id = $1",
    )
    .bind(id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(fresh);
}
