mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn setup_agent_with_customer(
    server: &common::TestServer,
    client: &reqwest::Client,
    name: &str,
) -> Result<(String, Value, Value)> {
    let (token, agent) = common::register_agent(server, client, name).await?;
    let res = client
        .post(server.url("/api/customers"))
        .bearer_auth(&token)
        .json(&json!({"name": format!("{} Customer", name)}))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED);
    let customer: Value = res.json().await?;
    Ok((token, agent, customer))
}

#[tokio::test]
async fn creation_validates_in_order() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, _, customer) =
        setup_agent_with_customer(server, &client, "Sale Validation").await?;

    let cases = [
        (json!({}), "customerID is required"),
        (
            json!({"customerID": customer["id"]}),
            "Sale amount is required",
        ),
        (
            json!({"customerID": customer["id"], "amount": 0}),
            "Sale amount must be greater than zero",
        ),
        (
            json!({"customerID": customer["id"], "amount": -5}),
            "Sale amount must be greater than zero",
        ),
    ];

    for (payload, message) in cases {
        let res = client
            .post(server.url("/api/sales"))
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
async fn agent_id_is_set_from_the_caller() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, agent, customer) = setup_agent_with_customer(server, &client, "Sale Owner").await?;

    let res = client
        .post(server.url("/api/sales"))
        .bearer_auth(&token)
        .json(&json!({
            "customerID": customer["id"],
            "amount": 250.0,
            "agentID": "00000000-0000-0000-0000-000000000001"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let sale: Value = res.json().await?;
    assert_eq!(sale["agentID"], agent["id"]);
    assert_eq!(sale["customerID"], customer["id"]);
    assert_eq!(sale["status"], "pending", "status defaults to pending");

    Ok(())
}

#[tokio::test]
async fn cross_customer_creation_is_rejected_and_not_persisted() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (_, _, foreign_customer) =
        setup_agent_with_customer(server, &client, "Victim Agent").await?;
    let (token, _) = common::register_agent(server, &client, "Poaching Agent").await?;

    let res = client
        .post(server.url("/api/sales"))
        .bearer_auth(&token)
        .json(&json!({"customerID": foreign_customer["id"], "amount": 100.0}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Not authorized to access this customer");

    // The rejected sale never reached the store.
    let res = client
        .get(server.url("/api/sales"))
        .bearer_auth(&token)
        .send()
        .await?;
    let sales: Vec<Value> = res.json().await?;
    assert!(sales.is_empty(), "rejected sale was persisted: {:?}", sales);

    // Unknown customer is a 404, reported before any ownership question.
    let res = client
        .post(server.url("/api/sales"))
        .bearer_auth(&token)
        .json(&json!({"customerID": "00000000-0000-0000-0000-0000000000bb", "amount": 100.0}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Customer not found");

    Ok(())
}

#[tokio::test]
async fn updates_cannot_move_a_sale_between_owners() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token, agent, customer) =
        setup_agent_with_customer(server, &client, "Sticky Sale").await?;

    let res = client
        .post(server.url("/api/sales"))
        .bearer_auth(&token)
        .json(&json!({"customerID": customer["id"], "amount": 80.0}))
        .send()
        .await?;
    let sale: Value = res.json().await?;

    let res = client
        .put(server.url(&format!("/api/sales/{}", sale["id"].as_str().unwrap())))
        .bearer_auth(&token)
        .json(&json!({
            "status": "completed",
            "agentID": "00000000-0000-0000-0000-000000000001",
            "customerID": "00000000-0000-0000-0000-000000000002"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["agentID"], agent["id"], "agentID is immutable");
    assert_eq!(
        updated["customerID"], customer["id"],
        "customerID is fixed at creation"
    );

    Ok(())
}

#[tokio::test]
async fn foreign_sales_stay_hidden_until_admin() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (token_a, _, customer) = setup_agent_with_customer(server, &client, "Selling Agent").await?;
    let (token_b, _) = common::register_agent(server, &client, "Curious Agent").await?;
    let admin = common::admin_token(server, &client).await?;

    let res = client
        .post(server.url("/api/sales"))
        .bearer_auth(&token_a)
        .json(&json!({"customerID": customer["id"], "amount": 40.0}))
        .send()
        .await?;
    let sale: Value = res.json().await?;
    let sale_url = server.url(&format!("/api/sales/{}", sale["id"].as_str().unwrap()));

    let res = client.get(&sale_url).bearer_auth(&token_b).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Not authorized to access this sale");

    let res = client.get(&sale_url).bearer_auth(&admin).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.delete(&sale_url).bearer_auth(&admin).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Sale deleted");

    let res = client.get(&sale_url).bearer_auth(&admin).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Sale not found");

    Ok(())
}
