use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use shaderdex::{CacheStore, CorpusLayout, ShaderSearcher, web};
use tower::ServiceExt;

fn setup() -> Result<(tempfile::TempDir, Router), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let json_dir = tmp.path().join("json");
    let archive = tmp.path().join("archive");
    std::fs::create_dir_all(&json_dir)?;
    std::fs::create_dir_all(&archive)?;

    for i in 0..25 {
        let id = format!("shader{i:02}");
        let username = if i % 2 == 0 { "jon" } else { "ann" };
        let requires = if i == 4 { json!(["soundbuf"]) } else { json!([]) };
        let doc = json!({
            "info": {
                "id": id,
                "name": format!("Wave {i:02}"),
                "username": username,
                "description": "ocean",
                "requires": requires
            }
        });
        std::fs::write(json_dir.join(format!("{id}.json")), doc.to_string())?;
    }
    std::fs::write(archive.join("requires_keyboard.txt"), "set/shader03\n")?;

    let searcher = ShaderSearcher::new(
        CorpusLayout::new(json_dir, vec![archive]),
        CacheStore::open(&tmp.path().join("cache.redb")),
    );
    Ok((tmp, web::router(searcher)))
}

async fn get(
    app: &Router,
    uri: &str,
) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn search_endpoint() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, app) = setup()?;

    let (status, body) = get(&app, "/api/search?author=jon&requires=sound").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["shaders"][0]["id"], "shader04");

    let (_, body) = get(&app, "/api/search?requires=keyboard").await?;
    assert_eq!(body["total"], 1);
    assert_eq!(body["shaders"][0]["id"], "shader03");

    let (_, body) = get(&app, "/api/search").await?;
    assert_eq!(body["total"], 0);
    Ok(())
}

#[tokio::test]
async fn unknown_capability_is_bad_request() -> Result<(), Box<dyn std::error::Error>>
{
    let (_tmp, app) = setup()?;

    let (status, body) = get(&app, "/api/search?requires=smell").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("smell"));
    Ok(())
}

#[tokio::test]
async fn shaders_are_paginated() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, app) = setup()?;

    let (status, body) = get(&app, "/api/shaders").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 25);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["shaders"].as_array().map(Vec::len), Some(20));
    assert_eq!(body["shaders"][0]["id"], "shader00");

    let (_, body) = get(&app, "/api/shaders?page=2&query=wave%2024").await?;
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 2);
    assert_eq!(body["shaders"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn shader_lookup() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, app) = setup()?;

    let (status, body) = get(&app, "/api/shader/shader07").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["name"], "Wave 07");

    let (status, _) = get(&app, "/api/shader/missing").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
