//! Integration tests for users, roles and refresh sessions.

use chrono::{Duration, Utc};
use fgvistos_core::roles::{ROLE_ID_CLIENT, ROLE_ID_STAFF};
use fgvistos_db::models::session::CreateSession;
use fgvistos_db::models::user::CreateUser;
use fgvistos_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use sqlx::PgPool;

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        name: "Someone".to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        role_id: ROLE_ID_CLIENT,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_roles_are_seeded(pool: PgPool) {
    let names: Vec<String> = RoleRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["admin", "staff", "client"]);
    assert_eq!(RoleRepo::resolve_name(&pool, 999).await.unwrap(), "unknown");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_email_is_unique_and_case_insensitive_lookup(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("Ana@Example.com")).await.unwrap();
    assert!(UserRepo::create(&pool, &new_user("Ana@Example.com")).await.is_err());

    let found = UserRepo::find_by_email(&pool, "ana@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_role_and_deactivate(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("staff@example.com")).await.unwrap();

    let updated = UserRepo::update_role(&pool, user.id, ROLE_ID_STAFF)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.role_id, ROLE_ID_STAFF);
    assert!(UserRepo::update_role(&pool, 999_999, ROLE_ID_STAFF)
        .await
        .unwrap()
        .is_none());

    assert!(UserRepo::deactivate(&pool, user.id).await.unwrap());
    assert!(!UserRepo::deactivate(&pool, user.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_session_is_consumed_once(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("ana@example.com")).await.unwrap();

    for (hash, expires_at) in [
        ("live", Utc::now() + Duration::days(1)),
        ("expired", Utc::now() - Duration::minutes(1)),
        ("spare", Utc::now() + Duration::days(1)),
    ] {
        SessionRepo::create(
            &pool,
            &CreateSession {
                user_id: user.id,
                refresh_token_hash: hash.to_string(),
                expires_at,
            },
        )
        .await
        .unwrap();
    }

    let consumed = SessionRepo::consume(&pool, "live").await.unwrap().unwrap();
    assert_eq!(consumed.user_id, user.id);
    assert!(consumed.is_revoked);
    assert!(SessionRepo::consume(&pool, "live").await.unwrap().is_none());
    assert!(SessionRepo::consume(&pool, "expired").await.unwrap().is_none());
    assert!(SessionRepo::consume(&pool, "missing").await.unwrap().is_none());

    // Only "spare" and "expired" are still unrevoked.
    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user.id).await.unwrap(), 2);
    assert!(SessionRepo::consume(&pool, "spare").await.unwrap().is_none());
}
