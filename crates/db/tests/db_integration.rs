//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `powerlink_test`)
//!   `TEST_DB_PASSWORD` (default: `powerlink_test`)
//!   `TEST_DB_NAME` (default: `powerlink_test`)

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Duration, Utc};
use powerlink_common::AppError;
use powerlink_db::entities::{
    announcement,
    service_request::{self, Priority, RequestStatus},
    user::{self, Role},
};
use powerlink_db::repositories::{
    AnnouncementRepository, ServiceRequestRepository, ServiceRequestUpdate, UserRepository,
};
use powerlink_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::Set;

fn request_model(
    id: &str,
    ticket_id: &str,
    status: RequestStatus,
    priority: Priority,
    created_at: DateTime<Utc>,
) -> service_request::ActiveModel {
    service_request::ActiveModel {
        id: Set(id.to_string()),
        ticket_id: Set(ticket_id.to_string()),
        service_type: Set("new_connection".to_string()),
        full_name: Set("Almaz Tesfaye".to_string()),
        phone: Set("+251911000000".to_string()),
        city: Set(None),
        woreda: Set(None),
        kebele: Set(None),
        house_plot_number: Set(None),
        nearby_landmark: Set(None),
        full_address: Set("Bole, Addis Ababa".to_string()),
        documents: Set(serde_json::json!([])),
        status: Set(status),
        priority: Set(priority),
        assigned_to: Set(None),
        created_by: Set(None),
        supervisor_notes: Set(None),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
}

fn announcement_model(
    id: &str,
    priority: i32,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
) -> announcement::ActiveModel {
    announcement::ActiveModel {
        id: Set(id.to_string()),
        title: Set(format!("Announcement {id}")),
        content: Set("Body".to_string()),
        kind: Set("info".to_string()),
        priority: Set(priority),
        is_active: Set(is_active),
        expires_at: Set(expires_at),
        created_by: Set(None),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
}

fn user_model(id: &str, email: &str, username: &str) -> user::ActiveModel {
    let now = Utc::now();
    user::ActiveModel {
        id: Set(id.to_string()),
        email: Set(email.to_string()),
        username: Set(username.to_string()),
        password_hash: Set("hash".to_string()),
        first_name: Set("Abebe".to_string()),
        last_name: Set("Kebede".to_string()),
        role: Set(Role::Customer),
        is_active: Set(true),
        is_verified: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let result = TestDatabase::new().await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_pending_queue_order() {
    let db = TestDatabase::create_unique().await.unwrap();
    let repo = ServiceRequestRepository::new(db.shared_connection());
    let t1 = Utc::now() - Duration::minutes(30);
    let t2 = t1 + Duration::minutes(10);
    let t3 = t2 + Duration::minutes(10);

    repo.create(request_model("r1", "T-1", RequestStatus::Pending, Priority::Low, t1))
        .await
        .unwrap();
    repo.create(request_model("r2", "T-2", RequestStatus::UnderReview, Priority::High, t2))
        .await
        .unwrap();
    repo.create(request_model("r3", "T-3", RequestStatus::Pending, Priority::High, t3))
        .await
        .unwrap();
    repo.create(request_model("r4", "T-4", RequestStatus::Approved, Priority::High, t1))
        .await
        .unwrap();

    let pending = repo.find_pending().await.unwrap();
    let ids: Vec<_> = pending.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["r2", "r3", "r1"]);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_ticket_is_conflict() {
    let db = TestDatabase::create_unique().await.unwrap();
    let repo = ServiceRequestRepository::new(db.shared_connection());
    let now = Utc::now();

    repo.create(request_model("r1", "T-1", RequestStatus::Pending, Priority::Medium, now))
        .await
        .unwrap();

    let mut duplicate = request_model("r2", "T-1", RequestStatus::Pending, Priority::High, now);
    duplicate.full_name = Set("Someone Else".to_string());
    let result = repo.create(duplicate).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let original = repo.find_by_ticket_id("T-1").await.unwrap().unwrap();
    assert_eq!(original.id, "r1");
    assert_eq!(original.full_name, "Almaz Tesfaye");
    assert_eq!(original.priority, Priority::Medium);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_status_update_keeps_other_fields() {
    let db = TestDatabase::create_unique().await.unwrap();
    let repo = ServiceRequestRepository::new(db.shared_connection());
    let created_at = Utc::now() - Duration::hours(1);

    repo.create(request_model("r1", "T-1", RequestStatus::Pending, Priority::High, created_at))
        .await
        .unwrap();

    let updated = repo
        .update(
            "r1",
            ServiceRequestUpdate {
                status: Some(RequestStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, RequestStatus::Approved);
    assert_eq!(updated.priority, Priority::High);
    assert_eq!(updated.full_name, "Almaz Tesfaye");
    assert!(updated.updated_at > created_at);

    let missing = repo
        .update(
            "nope",
            ServiceRequestUpdate {
                status: Some(RequestStatus::Approved),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_public_announcements_visibility_and_cap() {
    let db = TestDatabase::create_unique().await.unwrap();
    let repo = AnnouncementRepository::new(db.shared_connection());
    let now = Utc::now();

    repo.create(announcement_model("inactive", 9, false, None, now))
        .await
        .unwrap();
    repo.create(announcement_model("expired", 9, true, Some(now - Duration::hours(1)), now))
        .await
        .unwrap();
    repo.create(announcement_model("future", 5, true, Some(now + Duration::days(1)), now))
        .await
        .unwrap();
    repo.create(announcement_model("newer", 3, true, None, now))
        .await
        .unwrap();
    repo.create(announcement_model("older", 3, true, None, now - Duration::hours(2)))
        .await
        .unwrap();

    let visible = repo.find_public(10).await.unwrap();
    let ids: Vec<_> = visible.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["future", "newer", "older"]);

    for i in 0..15 {
        repo.create(announcement_model(
            &format!("bulk{i:02}"),
            1,
            true,
            None,
            now - Duration::minutes(i),
        ))
        .await
        .unwrap();
    }
    assert_eq!(repo.find_public(10).await.unwrap().len(), 10);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_email_and_username_are_conflicts() {
    let db = TestDatabase::create_unique().await.unwrap();
    let repo = UserRepository::new(db.shared_connection());

    repo.create(user_model("u1", "abebe@example.com", "abebe"))
        .await
        .unwrap();

    let same_email = repo
        .create(user_model("u2", "abebe@example.com", "other"))
        .await;
    assert!(matches!(same_email, Err(AppError::Conflict(_))));

    let same_username = repo
        .create(user_model("u3", "other@example.com", "abebe"))
        .await;
    assert!(matches!(same_username, Err(AppError::Conflict(_))));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_double_toggle_restores_flag() {
    let db = TestDatabase::create_unique().await.unwrap();
    let repo = UserRepository::new(db.shared_connection());

    repo.create(user_model("u1", "abebe@example.com", "abebe"))
        .await
        .unwrap();

    let once = repo.toggle_active("u1").await.unwrap();
    assert!(!once.is_active);
    let twice = repo.toggle_active("u1").await.unwrap();
    assert!(twice.is_active);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
