mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    // OK with a database, SERVICE_UNAVAILABLE without one
    assert!(
        res.status() == StatusCode::OK || res.status() == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        res.status()
    );

    let body = res.json::<serde_json::Value>().await?;
    assert!(body.get("success").is_some());
    Ok(())
}

#[tokio::test]
async fn about_page_needs_no_database() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    for res in [
        client.get(format!("{}/about", server.base_url)).send().await?,
        client.post(format!("{}/about", server.base_url)).send().await?,
    ] {
        assert_eq!(res.status(), StatusCode::OK);
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Punocracy");
    }
    Ok(())
}

#[tokio::test]
async fn static_files_are_served_after_routes() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/robots.txt", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/no-such-file.css", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn server_stops_when_handle_drops() -> Result<()> {
    let server = common::spawn_server().await?;
    let url = format!("{}/health", server.base_url);
    drop(server);

    let client = reqwest::Client::new();
    assert!(client.get(&url).send().await.is_err());
    Ok(())
}
