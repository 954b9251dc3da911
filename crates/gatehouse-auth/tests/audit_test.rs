//! Integration tests for audit entries written by the services.

mod helpers;

use gatehouse_auth::admin::UserChanges;
use gatehouse_auth::{AuditOutcome, AuditRecorder};
use gatehouse_core::types::Actor;
use gatehouse_entity::audit::AuditAction;

use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_email_change_records_only_changed_field() {
    let app = TestApp::new();
    let (_, admin) = app.create_admin("root").await;
    let mut user = app.create_user("ann", PASSWORD).await;
    user.email = "a@x.com".to_string();
    app.stores.users.update(&user).await.unwrap();
    let baseline = app.audit.entries().await.len();

    let updated = app
        .admin
        .update_user(
            &admin,
            user.id,
            UserChanges {
                email: Some("b@x.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(updated.audit, AuditOutcome::Written(_)));

    let entries = app.audit.entries().await;
    assert_eq!(entries.len(), baseline + 1);
    let entry = entries.last().unwrap();
    assert_eq!(entry.action, AuditAction::Update);
    assert_eq!(entry.table_name, "Users");
    assert_eq!(entry.record_id, user.id.to_string());
    assert_eq!(entry.actor_id, admin.user_id.into_uuid());
    let before = entry.before.as_ref().unwrap();
    let after = entry.after.as_ref().unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(before.get("Email").map(String::as_str), Some("a@x.com"));
    assert_eq!(after.len(), 1);
    assert_eq!(after.get("Email").map(String::as_str), Some("b@x.com"));
}

#[tokio::test]
async fn test_noop_update_writes_nothing() {
    let app = TestApp::new();
    let (_, admin) = app.create_admin("root").await;
    let user = app.create_user("ann", PASSWORD).await;
    let baseline = app.audit.entries().await.len();

    let updated = app
        .admin
        .update_user(
            &admin,
            user.id,
            UserChanges {
                email: Some(user.email.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.audit, AuditOutcome::Skipped);
    assert_eq!(app.audit.entries().await.len(), baseline);
}

#[tokio::test]
async fn test_system_actor_create_and_delete() {
    let app = TestApp::new();
    let recorder = AuditRecorder::new(app.stores.audit.clone());
    let role = app.create_role("Auditors").await;

    let created = recorder.record_create(Actor::System, &role).await;
    let deleted = recorder.record_delete(Actor::System, &role).await;
    assert!(matches!(created, AuditOutcome::Written(_)));
    assert!(matches!(deleted, AuditOutcome::Written(_)));

    let entries = app.audit.entries().await;
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.actor_id == uuid::Uuid::nil()));
    assert_eq!(entries[0].action, AuditAction::Create);
    assert!(entries[0].before.is_none());
    assert!(entries[0].after.as_ref().is_some_and(|after| !after.is_empty()));
    assert_eq!(entries[1].action, AuditAction::Delete);
    assert!(entries[1].after.is_none());
}
