mod common;

use common::TestApp;
use serde_json::json;
use withdrawal_notifier::models::{PushTarget, UserAccount};

fn ama() -> UserAccount {
    UserAccount::new("user-ama", "ACC1").with_fcm_token("TOK123")
}

// =============================================================================
// Created
// =============================================================================

#[tokio::test]
async fn new_withdrawal_alerts_admin_topic() {
    let app = TestApp::spawn().await;

    let response = app
        .post_created(
            "req-1",
            json!({ "value": { "susuAccountId": "ACC1", "amount": 50 } }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 204);

    let sent = app.push.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].target, PushTarget::Topic("new_withdrawal".to_string()));
    assert_eq!(sent[0].title, "New Withdrawal Request");
    assert_eq!(sent[0].body, "Account ACC1 has requested GH¢50.");
    assert_eq!(app.directory.lookup_count(), 0);
}

#[tokio::test]
async fn created_event_without_snapshot_is_acknowledged_silently() {
    let app = TestApp::spawn().await;

    let response = app.post_created("req-1", json!({ "value": null })).await;

    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(app.push.send_count(), 0);
}

#[tokio::test]
async fn admin_send_failure_still_acknowledges() {
    let app = TestApp::spawn().await;
    app.push.fail_sends(true);

    let response = app
        .post_created(
            "req-1",
            json!({ "value": { "susuAccountId": "ACC1", "amount": 50 } }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(app.push.send_count(), 1);
}

#[tokio::test]
async fn malformed_event_is_rejected_before_handling() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/triggers/withdrawals/req-1/created", app.address))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_client_error());
    assert_eq!(app.push.send_count(), 0);
}

// =============================================================================
// Updated
// =============================================================================

#[tokio::test]
async fn approval_notifies_owning_user() {
    let app = TestApp::spawn_with_users(vec![ama()]).await;

    let response = app
        .post_updated(
            "req-1",
            json!({
                "before": { "status": "pending", "susuAccountId": "ACC1", "amount": 50 },
                "after": { "status": "approved", "susuAccountId": "ACC1", "amount": 50 }
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 204);

    let sent = app.push.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].target, PushTarget::Token("TOK123".to_string()));
    assert_eq!(sent[0].title, "Request Approved! ✅");
    assert_eq!(
        sent[0].body,
        "Great news! Your withdrawal of GH¢50 has been approved."
    );
}

#[tokio::test]
async fn rejection_notifies_owning_user() {
    let app = TestApp::spawn_with_users(vec![ama()]).await;

    app.post_updated(
        "req-2",
        json!({
            "before": { "status": "processing", "susuAccountId": "ACC1", "amount": 200 },
            "after": { "status": "rejected", "susuAccountId": "ACC1", "amount": 200 }
        }),
    )
    .await;

    let sent = app.push.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Request Declined ❌");
    assert_eq!(
        sent[0].body,
        "Your withdrawal request for GH¢200 was declined. Please check the app for details."
    );
}

#[tokio::test]
async fn unchanged_status_sends_nothing() {
    let app = TestApp::spawn_with_users(vec![ama()]).await;

    let response = app
        .post_updated(
            "req-1",
            json!({
                "before": { "status": "processing", "susuAccountId": "ACC1", "amount": 50 },
                "after": { "status": "processing", "susuAccountId": "ACC1", "amount": 75 }
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(app.directory.lookup_count(), 0);
    assert_eq!(app.push.send_count(), 0);
}

#[tokio::test]
async fn unknown_status_is_uppercased() {
    let app = TestApp::spawn_with_users(vec![ama()]).await;

    app.post_updated(
        "req-1",
        json!({
            "before": { "status": "pending", "susuAccountId": "ACC1", "amount": 50 },
            "after": { "status": "cancelled", "susuAccountId": "ACC1", "amount": 50 }
        }),
    )
    .await;

    let sent = app.push.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Withdrawal Update");
    assert_eq!(sent[0].body, "Your request status has changed to: CANCELLED");
}

#[tokio::test]
async fn no_matching_user_sends_nothing() {
    let app = TestApp::spawn().await;

    let response = app
        .post_updated(
            "req-1",
            json!({
                "before": { "status": "pending", "susuAccountId": "ACC1" },
                "after": { "status": "approved", "susuAccountId": "ACC1" }
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(app.directory.lookup_count(), 1);
    assert_eq!(app.push.send_count(), 0);
}

#[tokio::test]
async fn user_without_token_sends_nothing() {
    let app = TestApp::spawn_with_users(vec![UserAccount::new("user-kofi", "ACC1")]).await;

    let response = app
        .post_updated(
            "req-1",
            json!({
                "before": { "status": "pending", "susuAccountId": "ACC1" },
                "after": { "status": "approved", "susuAccountId": "ACC1" }
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(app.push.send_count(), 0);
}

#[tokio::test]
async fn missing_before_snapshot_sends_nothing() {
    let app = TestApp::spawn_with_users(vec![ama()]).await;

    let response = app
        .post_updated(
            "req-1",
            json!({ "after": { "status": "approved", "susuAccountId": "ACC1" } }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(app.directory.lookup_count(), 0);
    assert_eq!(app.push.send_count(), 0);
}

#[tokio::test]
async fn directory_outage_is_swallowed() {
    let app = TestApp::spawn_with_users(vec![ama()]).await;
    app.directory.set_unavailable(true);

    let response = app
        .post_updated(
            "req-1",
            json!({
                "before": { "status": "pending", "susuAccountId": "ACC1" },
                "after": { "status": "approved", "susuAccountId": "ACC1" }
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(app.push.send_count(), 0);
}
