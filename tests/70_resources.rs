mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Registers an agent and books one customer and one pending sale for them.
async fn setup_sale(
    server: &common::TestServer,
    client: &reqwest::Client,
    name: &str,
) -> Result<(String, Value, Value)> {
    let (token, _) = common::register_agent(server, client, name).await?;
    let res = client
        .post(server.url("/api/customers"))
        .bearer_auth(&token)
        .json(&json!({"name": format!("{} Customer", name)}))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED);
    let customer: Value = res.json().await?;

    let res = client
        .post(server.url("/api/sales"))
        .bearer_auth(&token)
        .json(&json!({"customerID": customer["id"], "amount": 300.0}))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED);
    let sale: Value = res.json().await?;
    Ok((token, customer, sale))
}

#[tokio::test]
async fn payment_creation_validates_in_order() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, customer, sale) = setup_sale(server, &client, "Payment Order").await?;

    // Field checks run before the sale lookup, so a junk id works here.
    let junk = "00000000-0000-0000-0000-0000000000dd";
    let cases = [
        (json!({}), "saleID is required"),
        (json!({"saleID": junk}), "Payment amount is required"),
        (
            json!({"saleID": junk, "amount": 0}),
            "Payment amount must be greater than zero",
        ),
        (
            json!({"saleID": junk, "amount": 25.0}),
            "Payment method is required",
        ),
    ];
    for (payload, message) in cases {
        let res = client
            .post(server.url("/api/payments"))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "payload: {}", payload);
        let body: Value = res.json().await?;
        assert_eq!(body["message"], message);
    }

    let res = client
        .post(server.url("/api/payments"))
        .bearer_auth(&token)
        .json(&json!({"saleID": junk, "amount": 25.0, "method": "cash"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Sale not found");

    // With no customerID in the payload, the sale supplies one.
    let res = client
        .post(server.url("/api/payments"))
        .bearer_auth(&token)
        .json(&json!({"saleID": sale["id"], "amount": 25.0, "method": "credit_card"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let payment: Value = res.json().await?;
    assert_eq!(payment["customerID"], customer["id"]);
    assert_eq!(payment["status"], "pending");

    Ok(())
}

#[tokio::test]
async fn payments_are_not_owner_scoped() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token_a, _, sale) = setup_sale(server, &client, "Payment Maker").await?;
    let (token_b, _) = common::register_agent(server, &client, "Payment Reader").await?;

    let res = client
        .post(server.url("/api/payments"))
        .bearer_auth(&token_a)
        .json(&json!({"saleID": sale["id"], "amount": 80.0, "method": "bank_transfer"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let payment: Value = res.json().await?;
    let payment_id = common::id_of(&payment);
    let url = server.url(&format!("/api/payments/{}", payment_id));

    // A different agent sees it in the list and can work with it directly.
    let res = client
        .get(server.url("/api/payments"))
        .bearer_auth(&token_b)
        .send()
        .await?;
    let listed: Vec<Value> = res.json().await?;
    assert!(listed.iter().any(|p| common::id_of(p) == payment_id));

    let res = client
        .put(&url)
        .bearer_auth(&token_b)
        .json(&json!({"status": "completed"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["amount"], 80.0);

    let res = client.delete(&url).bearer_auth(&token_b).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Payment deleted");

    let res = client.get(&url).bearer_auth(&token_b).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Payment not found");

    Ok(())
}

#[tokio::test]
async fn revenue_writes_are_manager_gated_before_anything_else() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (agent_token, _) = common::register_agent(server, &client, "Revenue Agent").await?;

    // The rank check fires before validation and before the row lookup, so
    // even an empty body or a nonexistent id answers 403.
    let res = client
        .post(server.url("/api/revenues"))
        .bearer_auth(&agent_token)
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Manager access required");

    let missing = server.url("/api/revenues/00000000-0000-0000-0000-0000000000ee");
    let res = client
        .put(&missing)
        .bearer_auth(&agent_token)
        .json(&json!({"amount": 1.0}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(&missing)
        .bearer_auth(&agent_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Manager access required");

    Ok(())
}

#[tokio::test]
async fn revenue_records_round_trip() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let admin_token = common::admin_token(server, &client).await?;
    let (agent_token, _, sale) = setup_sale(server, &client, "Revenue Source").await?;

    let res = client
        .post(server.url("/api/revenues"))
        .bearer_auth(&admin_token)
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "saleID is required");

    let res = client
        .post(server.url("/api/revenues"))
        .bearer_auth(&admin_token)
        .json(&json!({"saleID": sale["id"]}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Revenue amount is required");

    let res = client
        .post(server.url("/api/revenues"))
        .bearer_auth(&admin_token)
        .json(&json!({"saleID": sale["id"], "amount": 300.0, "category": "license"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let revenue: Value = res.json().await?;
    assert_eq!(revenue["category"], "license");
    let url = server.url(&format!("/api/revenues/{}", common::id_of(&revenue)));

    // Reads are open to agents even though writes are not.
    let res = client.get(&url).bearer_auth(&agent_token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(&url)
        .bearer_auth(&admin_token)
        .json(&json!({"source": "renewal"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["source"], "renewal");
    assert_eq!(body["amount"], 300.0);

    let res = client.delete(&url).bearer_auth(&admin_token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Revenue record deleted");

    let res = client.get(&url).bearer_auth(&agent_token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Revenue record not found");

    Ok(())
}

#[tokio::test]
async fn performance_rows_are_minted_by_managers() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let admin_token = common::admin_token(server, &client).await?;
    let (agent_token, _) = common::register_agent(server, &client, "Perf Agent").await?;

    let res = client
        .post(server.url("/api/performances"))
        .bearer_auth(&agent_token)
        .json(&json!({"period": "monthly"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Manager access required");

    let res = client
        .post(server.url("/api/performances"))
        .bearer_auth(&admin_token)
        .json(&json!({"totalSales": 4}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "period is required");

    // Assigning a snapshot to an unknown user fails the lookup.
    let res = client
        .post(server.url("/api/performances"))
        .bearer_auth(&admin_token)
        .json(&json!({
            "period": "weekly",
            "userID": "00000000-0000-0000-0000-0000000000ff"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "User not found");

    Ok(())
}

#[tokio::test]
async fn performance_reads_are_scoped_to_the_owning_agent() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let admin_token = common::admin_token(server, &client).await?;
    let (token_a, agent_a) = common::register_agent(server, &client, "Perf Owner").await?;
    let (token_b, _) = common::register_agent(server, &client, "Perf Outsider").await?;

    let res = client
        .post(server.url("/api/performances"))
        .bearer_auth(&admin_token)
        .json(&json!({
            "userID": agent_a["id"],
            "period": "monthly",
            "totalSales": 7,
            "totalRevenue": 4200.0,
            "conversionRate": 0.35
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let row: Value = res.json().await?;
    assert_eq!(row["userID"], agent_a["id"]);
    let url = server.url(&format!("/api/performances/{}", common::id_of(&row)));

    // The owner sees the row in their list; another agent does not.
    let res = client
        .get(server.url("/api/performances"))
        .bearer_auth(&token_a)
        .send()
        .await?;
    let own: Vec<Value> = res.json().await?;
    assert!(own.iter().any(|r| common::id_of(r) == common::id_of(&row)));

    let res = client
        .get(server.url("/api/performances"))
        .bearer_auth(&token_b)
        .send()
        .await?;
    let foreign: Vec<Value> = res.json().await?;
    assert!(foreign.iter().all(|r| r["userID"] != agent_a["id"]));

    let res = client.get(&url).bearer_auth(&token_b).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(
        body["message"],
        "Not authorized to access this performance record"
    );

    let res = client
        .put(&url)
        .bearer_auth(&admin_token)
        .json(&json!({"totalSales": 9}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["totalSales"], 9);
    assert_eq!(body["totalRevenue"], 4200.0, "untouched fields survive");

    let res = client.delete(&url).bearer_auth(&admin_token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Performance record deleted");

    Ok(())
}

#[tokio::test]
async fn comments_validate_and_filter_by_entity() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _) = common::register_agent(server, &client, "Commenter").await?;

    let entity = "00000000-0000-0000-0000-00000000c0de";
    let cases = [
        (json!({}), "entityType is required"),
        (json!({"entityType": "customer"}), "entityID is required"),
        (
            json!({"entityType": "customer", "entityID": entity, "body": "   "}),
            "Comment body is required",
        ),
    ];
    for (payload, message) in cases {
        let res = client
            .post(server.url("/api/comments"))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await?;
        assert_eq!(body["message"], message);
    }

    for text in ["called, no answer", "follow up friday"] {
        let res = client
            .post(server.url("/api/comments"))
            .bearer_auth(&token)
            .json(&json!({"entityType": "customer", "entityID": entity, "body": text}))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }
    let res = client
        .post(server.url("/api/comments"))
        .bearer_auth(&token)
        .json(&json!({
            "entityType": "sale",
            "entityID": "00000000-0000-0000-0000-00000000cafe",
            "body": "invoice sent"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // The query string narrows the list to one entity.
    let res = client
        .get(server.url(&format!(
            "/api/comments?entityType=customer&entityID={}",
            entity
        )))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let filtered: Vec<Value> = res.json().await?;
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|c| c["entityID"] == entity));

    Ok(())
}

#[tokio::test]
async fn comment_edits_are_author_or_admin() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let admin_token = common::admin_token(server, &client).await?;
    let (author_token, author) = common::register_agent(server, &client, "Comment Author").await?;
    let (other_token, _) = common::register_agent(server, &client, "Comment Other").await?;

    let res = client
        .post(server.url("/api/comments"))
        .bearer_auth(&author_token)
        .json(&json!({
            "entityType": "customer",
            "entityID": "00000000-0000-0000-0000-00000000beef",
            "body": "first draft"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let comment: Value = res.json().await?;
    assert_eq!(comment["userID"], author["id"]);
    let url = server.url(&format!("/api/comments/{}", common::id_of(&comment)));

    // Anyone may read it, only the author or an admin may change it.
    let res = client.get(&url).bearer_auth(&other_token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(&url)
        .bearer_auth(&other_token)
        .json(&json!({"body": "vandalized"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Not authorized to access this comment");

    let res = client
        .put(&url)
        .bearer_auth(&author_token)
        .json(&json!({"body": ""}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Comment body is required");

    let res = client
        .put(&url)
        .bearer_auth(&author_token)
        .json(&json!({"body": "second draft"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["body"], "second draft");

    let res = client
        .delete(&url)
        .bearer_auth(&other_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client.delete(&url).bearer_auth(&admin_token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Comment deleted");

    Ok(())
}

#[tokio::test]
async fn notifications_land_in_the_callers_own_feed() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token_a, agent_a) = common::register_agent(server, &client, "Notified A").await?;
    let (_, agent_b) = common::register_agent(server, &client, "Notified B").await?;

    let res = client
        .post(server.url("/api/notifications"))
        .bearer_auth(&token_a)
        .json(&json!({"message": "no title here"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Notification title is required");

    let res = client
        .post(server.url("/api/notifications"))
        .bearer_auth(&token_a)
        .json(&json!({"title": "untexted"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Notification message is required");

    // A non-admin cannot address someone else; the userID is ignored.
    let res = client
        .post(server.url("/api/notifications"))
        .bearer_auth(&token_a)
        .json(&json!({
            "userID": agent_b["id"],
            "title": "misdirected",
            "message": "this stays with the sender"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let notification: Value = res.json().await?;
    assert_eq!(notification["userID"], agent_a["id"]);
    assert_eq!(notification["read"], false);

    Ok(())
}

#[tokio::test]
async fn admins_address_notifications_to_anyone() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let admin_token = common::admin_token(server, &client).await?;
    let (agent_token, agent) = common::register_agent(server, &client, "Addressee").await?;
    let (outsider_token, _) = common::register_agent(server, &client, "Eavesdropper").await?;

    let res = client
        .post(server.url("/api/notifications"))
        .bearer_auth(&admin_token)
        .json(&json!({
            "userID": "00000000-0000-0000-0000-00000000dead",
            "title": "lost",
            "message": "nobody lives here"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "User not found");

    let res = client
        .post(server.url("/api/notifications"))
        .bearer_auth(&admin_token)
        .json(&json!({
            "userID": agent["id"],
            "title": "target raised",
            "message": "monthly target moved to 5000"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let notification: Value = res.json().await?;
    let url = server.url(&format!(
        "/api/notifications/{}",
        common::id_of(&notification)
    ));

    // It shows up in the recipient's feed, not in anyone else's.
    let res = client
        .get(server.url("/api/notifications"))
        .bearer_auth(&agent_token)
        .send()
        .await?;
    let feed: Vec<Value> = res.json().await?;
    assert!(feed
        .iter()
        .any(|n| common::id_of(n) == common::id_of(&notification)));

    let res = client.get(&url).bearer_auth(&outsider_token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Not authorized to access this notification");

    // The recipient flips the read flag with the shortcut route.
    let res = client
        .put(server.url(&format!(
            "/api/notifications/{}/read",
            common::id_of(&notification)
        )))
        .bearer_auth(&agent_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["read"], true);
    assert_eq!(body["title"], "target raised");

    let res = client.delete(&url).bearer_auth(&agent_token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Notification deleted");

    let res = client.get(&url).bearer_auth(&agent_token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Notification not found");

    Ok(())
}

#[tokio::test]
async fn settings_are_scoped_or_global() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let admin_token = common::admin_token(server, &client).await?;
    let (agent_token, agent) = common::register_agent(server, &client, "Settings Owner").await?;
    let (other_token, other) = common::register_agent(server, &client, "Settings Other").await?;

    let res = client
        .post(server.url("/api/settings"))
        .bearer_auth(&agent_token)
        .json(&json!({"value": {"theme": "dark"}}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Setting key is required");

    let res = client
        .post(server.url("/api/settings"))
        .bearer_auth(&agent_token)
        .json(&json!({"key": "theme"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Setting value is required");

    // A non-admin cannot pick a scope; the setting is theirs no matter what.
    let res = client
        .post(server.url("/api/settings"))
        .bearer_auth(&agent_token)
        .json(&json!({"key": "theme", "value": "dark", "userID": other["id"]}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let own_setting: Value = res.json().await?;
    assert_eq!(own_setting["userID"], agent["id"]);

    // An admin omitting userID makes a global entry.
    let res = client
        .post(server.url("/api/settings"))
        .bearer_auth(&admin_token)
        .json(&json!({"key": "currency", "value": "EUR"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let global_setting: Value = res.json().await?;
    assert!(global_setting["userID"].is_null());

    // The owner's list holds their settings plus the global ones, and never
    // another user's.
    let res = client
        .get(server.url("/api/settings"))
        .bearer_auth(&agent_token)
        .send()
        .await?;
    let listed: Vec<Value> = res.json().await?;
    assert!(listed
        .iter()
        .any(|s| common::id_of(s) == common::id_of(&own_setting)));
    assert!(listed
        .iter()
        .any(|s| common::id_of(s) == common::id_of(&global_setting)));
    assert!(listed
        .iter()
        .all(|s| s["userID"] == agent["id"] || s["userID"].is_null()));

    // Globals are readable by anyone, another user's setting is not.
    let res = client
        .get(server.url(&format!(
            "/api/settings/{}",
            common::id_of(&global_setting)
        )))
        .bearer_auth(&other_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(server.url(&format!("/api/settings/{}", common::id_of(&own_setting))))
        .bearer_auth(&other_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Not authorized to access this setting");

    Ok(())
}

#[tokio::test]
async fn global_settings_are_mutable_by_admins_only() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let admin_token = common::admin_token(server, &client).await?;
    let (agent_token, _) = common::register_agent(server, &client, "Settings Tinkerer").await?;

    let res = client
        .post(server.url("/api/settings"))
        .bearer_auth(&admin_token)
        .json(&json!({"key": "fiscal_year_start", "value": "04-01"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let global_setting: Value = res.json().await?;
    let global_url = server.url(&format!(
        "/api/settings/{}",
        common::id_of(&global_setting)
    ));

    let res = client
        .put(&global_url)
        .bearer_auth(&agent_token)
        .json(&json!({"value": "01-01"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Admin access required");

    let res = client
        .delete(&global_url)
        .bearer_auth(&agent_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(&global_url)
        .bearer_auth(&admin_token)
        .json(&json!({"value": "01-01"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["value"], "01-01");

    // Personal settings stay in the owner's hands.
    let res = client
        .post(server.url("/api/settings"))
        .bearer_auth(&agent_token)
        .json(&json!({"key": "locale", "value": "de-DE"}))
        .send()
        .await?;
    let own_setting: Value = res.json().await?;
    let own_url = server.url(&format!("/api/settings/{}", common::id_of(&own_setting)));

    let res = client
        .put(&own_url)
        .bearer_auth(&agent_token)
        .json(&json!({"key": "  "}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Setting key is required");

    let res = client
        .put(&own_url)
        .bearer_auth(&agent_token)
        .json(&json!({"value": "en-GB"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["value"], "en-GB");

    let res = client
        .delete(&own_url)
        .bearer_auth(&agent_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Setting deleted");

    let res = client
        .delete(&global_url)
        .bearer_auth(&admin_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}
