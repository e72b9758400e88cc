//! Repository tests for documents and their field values.

mod common;

use common::{create_template, create_user};
use docbuilder_db::models::document::{
    CreateDocument, DocumentListParams, DocumentStatus, FieldValueInput, UpdateDocument,
};
use docbuilder_db::repositories::{
    DashboardRepo, DocumentFieldValueRepo, DocumentRepo, TemplateFieldRepo, TemplateRepo,
};
use sqlx::PgPool;

fn list_params() -> DocumentListParams {
    DocumentListParams {
        limit: 12,
        ..Default::default()
    }
}

/// Create a template with fields `nom` and `ville`, returning
/// `(template_id, nom_field_id, ville_field_id)`.
async fn letter_template(pool: &PgPool, owner_id: i64) -> (i64, i64, i64) {
    let template = create_template(pool, owner_id, "Letter", "Dear {{nom}} from {{ville}}").await;
    let fields = TemplateFieldRepo::list_for_template(pool, template.id).await.unwrap();
    let id_of = |name: &str| fields.iter().find(|f| f.name == name).unwrap().id;
    (template.id, id_of("nom"), id_of("ville"))
}

fn new_document(title: &str, template_id: i64, user_id: i64, values: Vec<FieldValueInput>) -> CreateDocument {
    CreateDocument {
        title: title.to_string(),
        template_id,
        created_by: user_id,
        is_completed: false,
        values,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_document_with_values(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let (template_id, nom, ville) = letter_template(&pool, alice.id).await;

    let doc = DocumentRepo::create(
        &pool,
        &new_document(
            "For Ada",
            template_id,
            alice.id,
            vec![
                FieldValueInput { field_id: nom, value: "Ada".to_string() },
                FieldValueInput { field_id: ville, value: "Paris".to_string() },
            ],
        ),
    )
    .await
    .unwrap();

    let named = DocumentFieldValueRepo::list_named(&pool, doc.id).await.unwrap();
    let pairs: Vec<(&str, &str)> = named.iter().map(|v| (v.name.as_str(), v.value.as_str())).collect();
    assert_eq!(pairs, vec![("nom", "Ada"), ("ville", "Paris")]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_replaces_values(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let (template_id, nom, ville) = letter_template(&pool, alice.id).await;
    let doc = DocumentRepo::create(
        &pool,
        &new_document(
            "Draft",
            template_id,
            alice.id,
            vec![FieldValueInput { field_id: nom, value: "Ada".to_string() }],
        ),
    )
    .await
    .unwrap();

    let updated = DocumentRepo::update(
        &pool,
        doc.id,
        &UpdateDocument {
            title: None,
            is_completed: Some(true),
            values: Some(vec![FieldValueInput { field_id: ville, value: "Lyon".to_string() }]),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(updated.is_completed);
    assert_eq!(updated.title, "Draft");

    let values = DocumentFieldValueRepo::list_for_document(&pool, doc.id).await.unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].field_id, ville);
    assert_eq!(values[0].value, "Lyon");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_documents_are_private(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let (template_id, _, _) = letter_template(&pool, alice.id).await;
    let doc = DocumentRepo::create(&pool, &new_document("Mine", template_id, alice.id, vec![]))
        .await
        .unwrap();

    assert!(DocumentRepo::find_for_user(&pool, doc.id, bob.id).await.unwrap().is_none());
    assert!(!DocumentRepo::delete(&pool, doc.id, bob.id).await.unwrap());
    assert!(DocumentRepo::duplicate(&pool, doc.id, bob.id).await.unwrap().is_none());
    assert!(DocumentRepo::list_for_user(&pool, bob.id, &list_params()).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_and_stats(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let (template_id, _, _) = letter_template(&pool, alice.id).await;
    DocumentRepo::create(&pool, &new_document("Quarterly report", template_id, alice.id, vec![]))
        .await
        .unwrap();
    let mut done = new_document("Invoice", template_id, alice.id, vec![]);
    done.is_completed = true;
    DocumentRepo::create(&pool, &done).await.unwrap();

    let drafts = DocumentListParams {
        status: Some(DocumentStatus::Draft),
        ..list_params()
    };
    let drafts = DocumentRepo::list_for_user(&pool, alice.id, &drafts).await.unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title, "Quarterly report");
    assert_eq!(drafts[0].template_title, "Letter");

    // Search matches the template title too.
    let by_template_title = DocumentListParams {
        search: Some("letter".to_string()),
        ..list_params()
    };
    assert_eq!(
        DocumentRepo::count_for_user(&pool, alice.id, &by_template_title).await.unwrap(),
        2
    );

    let stats = DocumentRepo::stats_for_user(&pool, alice.id).await.unwrap();
    assert_eq!((stats.total, stats.completed, stats.draft, stats.recent), (2, 1, 1, 2));

    let template_stats = TemplateRepo::document_stats(&pool, template_id).await.unwrap();
    assert_eq!(template_stats.completed_documents, 1);
    assert_eq!(template_stats.draft_documents, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_copies_values_as_draft(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let (template_id, nom, _) = letter_template(&pool, alice.id).await;
    let mut input = new_document(
        "Signed",
        template_id,
        alice.id,
        vec![FieldValueInput { field_id: nom, value: "Ada".to_string() }],
    );
    input.is_completed = true;
    let doc = DocumentRepo::create(&pool, &input).await.unwrap();

    let copy = DocumentRepo::duplicate(&pool, doc.id, alice.id).await.unwrap().unwrap();
    assert_eq!(copy.title, "Signed (copy)");
    assert!(!copy.is_completed);
    let values = DocumentFieldValueRepo::list_named(&pool, copy.id).await.unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].value, "Ada");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_template_delete_cascades_to_documents(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let (template_id, nom, _) = letter_template(&pool, alice.id).await;
    let doc = DocumentRepo::create(
        &pool,
        &new_document(
            "Doomed",
            template_id,
            alice.id,
            vec![FieldValueInput { field_id: nom, value: "x".to_string() }],
        ),
    )
    .await
    .unwrap();

    assert!(TemplateRepo::delete(&pool, template_id).await.unwrap());
    assert!(DocumentRepo::find_for_user(&pool, doc.id, alice.id).await.unwrap().is_none());
    let orphan_values: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM document_field_values WHERE document_id = $1")
            .bind(doc.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(orphan_values, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_stats(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let (template_id, _, _) = letter_template(&pool, alice.id).await;
    DocumentRepo::create(&pool, &new_document("One", template_id, alice.id, vec![]))
        .await
        .unwrap();

    let site = DashboardRepo::site_stats(&pool).await.unwrap();
    assert_eq!(site.public_templates, 0);
    assert_eq!(site.template_authors, 1);
    assert_eq!(site.total_documents, 1);

    let user = DashboardRepo::user_stats(&pool, alice.id).await.unwrap();
    assert_eq!(user.templates, 1);
    assert_eq!(user.documents, 1);
    assert_eq!(user.recent_templates.len(), 1);
    assert_eq!(user.recent_documents.len(), 1);
    assert!(user.is_new_user);
}
