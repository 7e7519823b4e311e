//! Integration tests for orders, applicants and attachments.
//!
//! Exercises the repository layer against a real database:
//! - Order creation with applicant rows in one transaction
//! - Applicant ownership immutability
//! - Passport designation and attachment deletion
//! - Applicant deletion returning storage keys
//! - Sticky payment confirmation

use fgvistos_core::roles::ROLE_ID_CLIENT;
use fgvistos_db::models::applicant::{ApplicantFilter, UpdateApplicant};
use fgvistos_db::models::attachment::CreateAttachment;
use fgvistos_db::models::order::CreateOrder;
use fgvistos_db::models::plan::CreatePlan;
use fgvistos_db::models::user::CreateUser;
use fgvistos_db::models::visa_type::CreateVisaType;
use fgvistos_db::repositories::{
    ApplicantRepo, AttachmentRepo, OrderRepo, PlanRepo, UserRepo, VisaTypeRepo,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Test Client".to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role_id: ROLE_ID_CLIENT,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_plan(pool: &PgPool) -> i64 {
    let visa_type = VisaTypeRepo::create(
        pool,
        &CreateVisaType {
            name: "Tourist".to_string(),
            description: None,
            form_questions: Some(json!({
                "sections": [{
                    "id": "personal",
                    "title": "Personal",
                    "fields": [{ "id": "full_name", "label": "Full name", "type": "text", "required": true }]
                }]
            })),
        },
    )
    .await
    .unwrap();

    PlanRepo::create(
        pool,
        &CreatePlan {
            visa_type_id: visa_type.id,
            name: "Standard".to_string(),
            description: None,
            price_cents: 49_900,
        },
    )
    .await
    .unwrap()
    .id
}

fn new_order(user_id: i64, plan_id: i64, names: &[&str]) -> CreateOrder {
    CreateOrder {
        user_id,
        plan_id,
        applicant_names: names.iter().map(|n| n.to_string()).collect(),
    }
}

fn new_attachment(applicant_id: i64, document_type: &str, key: &str) -> CreateAttachment {
    CreateAttachment {
        applicant_id,
        document_type: document_type.to_string(),
        file_name: "doc.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        size_bytes: 1024,
        storage_key: key.to_string(),
        uploaded_by: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_order_creates_owned_applicants(pool: PgPool) {
    let user_id = seed_user(&pool, "ana@example.com").await;
    let plan_id = seed_plan(&pool).await;

    let (order, applicants) =
        OrderRepo::create_with_applicants(&pool, &new_order(user_id, plan_id, &["Ana", "Bruno"]))
            .await
            .unwrap();

    assert_eq!(order.applicant_count, 2);
    assert_eq!(order.payment_status, "pending");
    assert_eq!(applicants.len(), 2);
    assert!(applicants[0].is_responsible);
    assert!(!applicants[1].is_responsible);
    for a in &applicants {
        assert_eq!(a.user_id, user_id);
        assert_eq!(a.order_id, order.id);
        assert_eq!(a.form_status, "not_started");
        assert_eq!(a.process_status, "pending");
    }

    let listed = ApplicantRepo::list(
        &pool,
        &ApplicantFilter {
            order_id: Some(order.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(listed.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_applicant_owner_cannot_change(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com").await;
    let other = seed_user(&pool, "other@example.com").await;
    let plan_id = seed_plan(&pool).await;
    let (_, applicants) =
        OrderRepo::create_with_applicants(&pool, &new_order(owner, plan_id, &["Ana"]))
            .await
            .unwrap();

    let result = sqlx::query("UPDATE applicants SET user_id = $2 WHERE id = $1")
        .bind(applicants[0].id)
        .bind(other)
        .execute(&pool)
        .await;
    assert!(result.is_err(), "Changing applicant owner should fail");

    let renamed = ApplicantRepo::update(
        &pool,
        applicants[0].id,
        &UpdateApplicant {
            name: Some("Ana Maria".to_string()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(renamed.name, "Ana Maria");
    assert_eq!(renamed.user_id, owner);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_form_questions_resolve_through_order(pool: PgPool) {
    let user_id = seed_user(&pool, "ana@example.com").await;
    let plan_id = seed_plan(&pool).await;
    let (_, applicants) =
        OrderRepo::create_with_applicants(&pool, &new_order(user_id, plan_id, &["Ana"]))
            .await
            .unwrap();

    let doc = ApplicantRepo::find_form_questions(&pool, applicants[0].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc["sections"][0]["id"], "personal");
    assert_eq!(
        PlanRepo::find_form_questions(&pool, plan_id).await.unwrap(),
        Some(doc)
    );
    assert!(ApplicantRepo::find_form_questions(&pool, 999_999)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_passport_upload_is_designated_and_cleared_on_delete(pool: PgPool) {
    let user_id = seed_user(&pool, "ana@example.com").await;
    let plan_id = seed_plan(&pool).await;
    let (_, applicants) =
        OrderRepo::create_with_applicants(&pool, &new_order(user_id, plan_id, &["Ana"]))
            .await
            .unwrap();
    let applicant_id = applicants[0].id;

    let other = AttachmentRepo::create(&pool, &new_attachment(applicant_id, "other", "k/1.pdf"))
        .await
        .unwrap();
    let passport =
        AttachmentRepo::create(&pool, &new_attachment(applicant_id, "passport", "k/2.pdf"))
            .await
            .unwrap();

    let applicant = ApplicantRepo::find_by_id(&pool, applicant_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(applicant.passport_attachment_id, Some(passport.id));

    let deleted = AttachmentRepo::delete(&pool, passport.id).await.unwrap();
    assert_eq!(deleted.map(|a| a.storage_key), Some("k/2.pdf".to_string()));

    let applicant = ApplicantRepo::find_by_id(&pool, applicant_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(applicant.passport_attachment_id, None);

    let remaining = AttachmentRepo::list_by_applicant(&pool, applicant_id)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, other.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_storage_key_rejected(pool: PgPool) {
    let user_id = seed_user(&pool, "ana@example.com").await;
    let plan_id = seed_plan(&pool).await;
    let (_, applicants) =
        OrderRepo::create_with_applicants(&pool, &new_order(user_id, plan_id, &["Ana"]))
            .await
            .unwrap();

    AttachmentRepo::create(&pool, &new_attachment(applicants[0].id, "other", "k/dup.pdf"))
        .await
        .unwrap();
    let result =
        AttachmentRepo::create(&pool, &new_attachment(applicants[0].id, "other", "k/dup.pdf"))
            .await;
    assert!(result.is_err(), "Duplicate storage key should fail");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_applicant_returns_storage_keys(pool: PgPool) {
    let user_id = seed_user(&pool, "ana@example.com").await;
    let plan_id = seed_plan(&pool).await;
    let (_, applicants) =
        OrderRepo::create_with_applicants(&pool, &new_order(user_id, plan_id, &["Ana"]))
            .await
            .unwrap();
    let applicant_id = applicants[0].id;

    AttachmentRepo::create(&pool, &new_attachment(applicant_id, "passport", "k/a.pdf"))
        .await
        .unwrap();
    AttachmentRepo::create(&pool, &new_attachment(applicant_id, "other", "k/b.png"))
        .await
        .unwrap();

    let mut keys = ApplicantRepo::delete(&pool, applicant_id)
        .await
        .unwrap()
        .unwrap();
    keys.sort();
    assert_eq!(keys, vec!["k/a.pdf".to_string(), "k/b.png".to_string()]);

    assert!(ApplicantRepo::find_by_id(&pool, applicant_id)
        .await
        .unwrap()
        .is_none());
    assert!(ApplicantRepo::delete(&pool, applicant_id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_paid_is_sticky(pool: PgPool) {
    let user_id = seed_user(&pool, "ana@example.com").await;
    let plan_id = seed_plan(&pool).await;
    let (order, applicants) =
        OrderRepo::create_with_applicants(&pool, &new_order(user_id, plan_id, &["Ana"]))
            .await
            .unwrap();

    let paid = OrderRepo::mark_paid(&pool, order.id, &json!({ "transaction_nsu": "t-1" }))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paid.payment_status, "paid");

    let replay = OrderRepo::mark_paid(&pool, order.id, &json!({ "transaction_nsu": "t-2" }))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(replay.payment_status, "paid");
    assert_eq!(replay.payment_details.unwrap()["transaction_nsu"], "t-1");

    // Payment never moves the applicant pipeline.
    let applicant = ApplicantRepo::find_by_id(&pool, applicants[0].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(applicant.process_status, "pending");

    assert!(OrderRepo::mark_paid(&pool, 999_999, &json!({}))
        .await
        .unwrap()
        .is_none());
}
