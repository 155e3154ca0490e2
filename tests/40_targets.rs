mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn valid_target() -> Value {
    json!({
        "targetAmount": 5000.0,
        "period": "monthly",
        "startDate": "2026-08-01T00:00:00Z",
        "endDate": "2026-09-01T00:00:00Z"
    })
}

#[tokio::test]
async fn creation_checks_fail_fast_in_order() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _) = common::register_agent(server, &client, "Target Validation").await?;

    // Each case removes or breaks exactly one more field; the first failing
    // check in the fixed order decides the message.
    let cases = [
        (json!({}), "targetAmount is required and must be greater than zero"),
        (
            json!({"targetAmount": 0}),
            "targetAmount is required and must be greater than zero",
        ),
        (json!({"targetAmount": 5000.0}), "period is required"),
        (
            json!({"targetAmount": 5000.0, "period": "monthly"}),
            "startDate is required",
        ),
        (
            json!({"targetAmount": 5000.0, "period": "monthly", "startDate": "2026-08-01T00:00:00Z"}),
            "endDate is required",
        ),
        (
            json!({
                "targetAmount": 5000.0,
                "period": "monthly",
                "startDate": "2026-08-01T00:00:00Z",
                "endDate": "2026-08-01T00:00:00Z"
            }),
            "endDate must be after startDate",
        ),
    ];

    for (payload, message) in cases {
        let res = client
            .post(server.url("/api/targets"))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "payload: {}", payload);
        let body: Value = res.json().await?;
        assert_eq!(body["message"], message);
    }

    Ok(())
}

#[tokio::test]
async fn valid_target_defaults_to_the_caller() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, agent) = common::register_agent(server, &client, "Target Owner").await?;

    let res = client
        .post(server.url("/api/targets"))
        .bearer_auth(&token)
        .json(&valid_target())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let target: Value = res.json().await?;
    assert_eq!(target["userID"], agent["id"]);
    assert_eq!(target["achieved"], 0.0);
    assert_eq!(target["status"], "in_progress");

    Ok(())
}

#[tokio::test]
async fn assigning_to_others_needs_manager_rank() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _) = common::register_agent(server, &client, "Lowly Agent").await?;
    let (_, colleague) = common::register_agent(server, &client, "Target Colleague").await?;
    let admin = common::admin_token(server, &client).await?;

    let mut body = valid_target();
    body["userID"] = colleague["id"].clone();

    // An agent cannot hand out targets.
    let res = client
        .post(server.url("/api/targets"))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let err: Value = res.json().await?;
    assert_eq!(err["message"], "Manager access required");

    // An admin can, but the assignee must exist.
    let res = client
        .post(server.url("/api/targets"))
        .bearer_auth(&admin)
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let target: Value = res.json().await?;
    assert_eq!(target["userID"], colleague["id"]);

    body["userID"] = json!("00000000-0000-0000-0000-0000000000cc");
    let res = client
        .post(server.url("/api/targets"))
        .bearer_auth(&admin)
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let err: Value = res.json().await?;
    assert_eq!(err["message"], "User not found");

    Ok(())
}

#[tokio::test]
async fn finalized_targets_refuse_further_transitions() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _) = common::register_agent(server, &client, "Finalizing Agent").await?;

    let res = client
        .post(server.url("/api/targets"))
        .bearer_auth(&token)
        .json(&valid_target())
        .send()
        .await?;
    let target: Value = res.json().await?;
    let url = server.url(&format!("/api/targets/{}", target["id"].as_str().unwrap()));

    // in_progress -> completed is an allowed explicit transition.
    let res = client
        .put(&url)
        .bearer_auth(&token)
        .json(&json!({"status": "completed", "achieved": 5000.0}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["status"], "completed");

    // completed -> failed is not.
    let res = client
        .put(&url)
        .bearer_auth(&token)
        .json(&json!({"status": "failed"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await?;
    assert_eq!(err["message"], "Target is already finalized");

    // Non-status fields on a finalized target still merge.
    let res = client
        .put(&url)
        .bearer_auth(&token)
        .json(&json!({"achieved": 5200.0}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["achieved"], 5200.0);

    Ok(())
}

#[tokio::test]
async fn update_validation_catches_amount_and_dates() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _) = common::register_agent(server, &client, "Target Editor").await?;

    let res = client
        .post(server.url("/api/targets"))
        .bearer_auth(&token)
        .json(&valid_target())
        .send()
        .await?;
    let target: Value = res.json().await?;
    let url = server.url(&format!("/api/targets/{}", target["id"].as_str().unwrap()));

    let res = client
        .put(&url)
        .bearer_auth(&token)
        .json(&json!({"targetAmount": -1}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await?;
    assert_eq!(err["message"], "targetAmount must be greater than zero");

    // Moving endDate before the stored startDate is caught after the merge
    // is considered, even though startDate itself is untouched.
    let res = client
        .put(&url)
        .bearer_auth(&token)
        .json(&json!({"endDate": "2026-07-01T00:00:00Z"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await?;
    assert_eq!(err["message"], "endDate must be after startDate");

    Ok(())
}

#[tokio::test]
async fn targets_are_owner_scoped() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token_a, _) = common::register_agent(server, &client, "Target Keeper").await?;
    let (token_b, _) = common::register_agent(server, &client, "Target Snoop").await?;

    let res = client
        .post(server.url("/api/targets"))
        .bearer_auth(&token_a)
        .json(&valid_target())
        .send()
        .await?;
    let target: Value = res.json().await?;
    let url = server.url(&format!("/api/targets/{}", target["id"].as_str().unwrap()));

    let res = client.get(&url).bearer_auth(&token_b).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let err: Value = res.json().await?;
    assert_eq!(err["message"], "Not authorized to access this target");

    let res = client
        .get(server.url("/api/targets"))
        .bearer_auth(&token_b)
        .send()
        .await?;
    let listed: Vec<Value> = res.json().await?;
    assert!(listed.iter().all(|t| t["id"] != target["id"]));

    Ok(())
}
