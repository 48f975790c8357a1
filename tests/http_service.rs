//! Wire-level tests for `HttpOcrService` against a local mock server.

use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;
use visionary_text::service::HttpOcrService;
use visionary_text::{
    AiData, OcrData, OcrService, PageController, ServiceError, ServiceResponse, VisionConfig,
};

#[tokio::test]
async fn ocr_posts_base64_image() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/ocr")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({ "image": "iVBORw0KGgo=" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"data":{"text":"Hello World"}}"#)
        .create_async()
        .await;

    let service = HttpOcrService::new(server.url()).unwrap();
    let response = service.perform_ocr(Some("iVBORw0KGgo="), None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(
        response,
        ServiceResponse::ok(OcrData {
            text: "Hello World".into()
        })
    );
}

#[tokio::test]
async fn ocr_posts_image_url_in_camel_case() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/ocr")
        .match_body(Matcher::Json(
            json!({ "imageUrl": "https://example.com/sign.png" }),
        ))
        .with_status(200)
        .with_body(r#"{"success":true,"data":{"text":"STOP"}}"#)
        .create_async()
        .await;

    let service = HttpOcrService::new(format!("{}/", server.url())).unwrap();
    let response = service
        .perform_ocr(None, Some("https://example.com/sign.png"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.into_result().unwrap().text, "STOP");
}

#[tokio::test]
async fn error_envelope_on_500_is_returned_as_response() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/ocr")
        .with_status(500)
        .with_body(r#"{"success":false,"error":"Model overloaded"}"#)
        .create_async()
        .await;

    let service = HttpOcrService::new(server.url()).unwrap();
    let response = service
        .perform_ocr(None, Some("https://example.com/a.png"))
        .await
        .unwrap();

    assert_eq!(response.into_result(), Err(Some("Model overloaded".into())));
}

#[tokio::test]
async fn non_envelope_error_maps_to_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/ask")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let service = HttpOcrService::new(server.url()).unwrap();
    let err = service.ask_ai("Hello").await.unwrap_err();
    assert!(matches!(err, ServiceError::Status { status: 502 }));
}

#[tokio::test]
async fn garbage_on_200_is_invalid_response() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/ask")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let service = HttpOcrService::new(server.url()).unwrap();
    let err = service.ask_ai("Hello").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidResponse(_)));
}

#[tokio::test]
async fn ask_posts_text() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/ask")
        .match_body(Matcher::Json(json!({ "text": "Hello World" })))
        .with_status(200)
        .with_body(r#"{"success":true,"data":{"response":"This text is a greeting."}}"#)
        .create_async()
        .await;

    let service = HttpOcrService::new(server.url()).unwrap();
    let response = service.ask_ai("Hello World").await.unwrap();

    mock.assert_async().await;
    assert_eq!(
        response,
        ServiceResponse::ok(AiData {
            response: "This text is a greeting.".into()
        })
    );
}

#[tokio::test]
async fn controller_over_http_end_to_end() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/ocr")
        .with_status(200)
        .with_body(r#"{"success":true,"data":{"text":"Hello World"}}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/api/ask")
        .with_status(200)
        .with_body(r#"{"success":true,"data":{"response":"A greeting."}}"#)
        .create_async()
        .await;

    let service = Arc::new(HttpOcrService::new(server.url()).unwrap());
    let mut page = PageController::new(service, VisionConfig::default());
    page.set_url("https://example.com/hello.png");
    page.perform_ocr().await.unwrap();
    page.ask_ai().await.unwrap();

    assert_eq!(page.state().ocr_result, "Hello World");
    assert_eq!(page.state().ai_response, "A greeting.");
}

#[tokio::test]
async fn unreachable_worker_surfaces_inline_error() {
    // Port 9 (discard) is closed on test hosts.
    let service = Arc::new(HttpOcrService::new("http://127.0.0.1:9").unwrap());
    let mut page = PageController::new(service, VisionConfig::default());
    page.set_url("https://example.com/hello.png");
    page.perform_ocr().await.unwrap();

    let err = page.state().error.clone().unwrap();
    assert!(err.contains("127.0.0.1:9"), "{err}");
    assert!(!page.state().ocr_loading);
}
