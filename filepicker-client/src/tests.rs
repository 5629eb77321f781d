use crate::reqwest::{ReqwestClient, ReqwestClientBuilder};
use filepicker_api::{BlobClient, BlobRef, Error, Params, TextOrJson};
use mockito::{Matcher, Server};

fn client_for(api_root: &str) -> ReqwestClient {
    ReqwestClientBuilder::new("TESTKEY")
        .api_root(api_root)
        .build()
        .expect("client should be successfully built")
}

/// Every request must authenticate and cache-bust via the query string.
fn auth_matchers() -> Vec<Matcher> {
    vec![
        Matcher::UrlEncoded("key".into(), "TESTKEY".into()),
        Matcher::Regex("_cacheBust=\\d+".into()),
    ]
}

#[tokio::test]
async fn read_fetches_the_blob_body() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::new_async().await;
    let body: &[u8] = &[0x89, b'P', b'N', b'G', 0x00, 0xff];
    let mut matchers = auth_matchers();
    matchers.push(Matcher::UrlEncoded("base64encode".into(), "true".into()));
    let mock = server
        .mock("GET", "/file/objA")
        .match_query(Matcher::AllOf(matchers))
        .match_header("x-no-stream", "true")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let blob = BlobRef::new(format!("{}/file/objA", server.url()));
    let bytes = client.read(&blob, None, None).await?;

    assert_eq!(bytes, body);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn stat_returns_metadata_with_the_url() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/file/objA/metadata")
        .match_query(Matcher::AllOf(auth_matchers()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"size": 10, "mimetype": "text/plain"}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let url = format!("{}/file/objA", server.url());
    let metadata = client.stat(&BlobRef::new(&url), None, None).await?;

    assert_eq!(metadata.get("size"), Some(&serde_json::json!(10)));
    assert_eq!(metadata.get("url"), Some(&serde_json::json!(url)));
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn store_posts_the_payload_to_s3() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::new_async().await;
    let mut matchers = auth_matchers();
    matchers.push(Matcher::UrlEncoded("filename".into(), "f.txt".into()));
    matchers.push(Matcher::UrlEncoded("mimetype".into(), "text/plain".into()));
    matchers.push(Matcher::UrlEncoded("base64decode".into(), "true".into()));
    let mock = server
        .mock("POST", "/store/S3")
        .match_query(Matcher::AllOf(matchers))
        .match_header("content-type", "application/json")
        .match_body(Matcher::Exact("abc".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"url": "https://x/objNew", "size": 3}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let stored = client.store(b"abc".to_vec(), "f.txt", "text/plain", None, None).await?;

    assert_eq!(
        stored,
        TextOrJson::Json(serde_json::json!({"url": "https://x/objNew", "size": 3}))
    );
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn remove_posts_the_key_once_per_call() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/file/objA/remove")
        .match_query(Matcher::AllOf(auth_matchers()))
        .match_body(Matcher::JsonString(r#"{"key": "TESTKEY"}"#.into()))
        .with_status(200)
        .with_body("success")
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let blob = BlobRef::new(format!("{}/file/objA", server.url()));
    let first = client.remove(&blob, None).await?;
    let second = client.remove(&blob, None).await?;

    assert_eq!(first, TextOrJson::Text("success".into()));
    assert_eq!(second, TextOrJson::Text("success".into()));
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn convert_returns_headers_and_payload() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::new_async().await;
    let body: &[u8] = b"resized bytes";
    let mut matchers = auth_matchers();
    matchers.push(Matcher::UrlEncoded("w".into(), "300".into()));
    let mock = server
        .mock("GET", "/file/objA/convert")
        .match_query(Matcher::AllOf(matchers))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(body)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let blob = BlobRef::new(format!("{}/file/objA", server.url()));
    let converted =
        client.convert(&blob, Some(Params::from([("w", "300")])), None).await?;

    assert_eq!(
        converted.headers.get("content-type").and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    assert_eq!(converted.payload, body);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn remote_errors_carry_the_status() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/file/objA/metadata")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let blob = BlobRef::new(format!("{}/file/objA", server.url()));
    let err = client.stat(&blob, None, None).await.expect_err("stat should fail");

    match err {
        Error::Remote { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body.as_deref(), Some("internal error"));
        }
        _ => panic!("must be Error::Remote, got {err:?}"),
    }
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn validation_failures_never_reach_the_server() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.read(&BlobRef::new(""), None, None).await.expect_err("read should fail");

    match err {
        Error::Validation(message) => assert_eq!(message, "blob.url missing"),
        _ => panic!("must be Error::Validation, got {err:?}"),
    }
    mock.assert_async().await;
    Ok(())
}
