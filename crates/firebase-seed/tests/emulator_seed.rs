//! End-to-end seeding against a mocked Firestore emulator endpoint.

use firebase_seed::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCUMENTS: &str = "/v1/projects/shop-dev/databases/(default)/documents";

fn write_file(dir: &TempDir, name: &str, contents: &str) {
    std::fs::write(dir.path().join(name), contents).unwrap();
}

fn client(server: &MockServer) -> FirestoreClient {
    FirestoreClient::emulator("unused:0", "shop-dev").with_base_url(server.uri())
}

#[tokio::test]
async fn test_seed_all_collections() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{DOCUMENTS}/products/p1")))
        .and(body_json(json!({
            "fields": {
                "name": {"stringValue": "Widget"},
                "price": {"integerValue": "10"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path_regex(format!(
            r"^{}/banners/[A-Za-z0-9]{{20}}$",
            regex_escape(DOCUMENTS)
        )))
        .and(body_json(json!({"fields": {"name": {"stringValue": "Banner A"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("{DOCUMENTS}/contact/main")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    write_file(&dir, "products.json", r#"[{"id":"p1","name":"Widget","price":10}]"#);
    write_file(&dir, "banners.json", r#"[{"name":"Banner A"}]"#);
    write_file(&dir, "contact.json", r#"[{"id":"main","email":"hi@example.com"}]"#);

    let seeder = Seeder::new(client(&mock_server), dir.path());
    let summary = seeder.run(&Manifest::default()).await.unwrap();

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.imports[1].generated_ids, 1);
}

#[tokio::test]
async fn test_malformed_contact_keeps_earlier_writes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    write_file(&dir, "products.json", r#"[{"id":"p1","name":"Widget"}]"#);
    write_file(&dir, "banners.json", r#"[{"id":"b1","name":"Banner A"}]"#);
    write_file(&dir, "contact.json", r#"[{"id":"main","#);

    let seeder = Seeder::new(client(&mock_server), dir.path());
    let err = seeder.run(&Manifest::default()).await.unwrap_err();

    assert!(matches!(err, SeedError::Parse { .. }));
}

#[tokio::test]
async fn test_rejected_write_aborts_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{DOCUMENTS}/products/p1")))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Quota exceeded.", "status": "RESOURCE_EXHAUSTED"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    write_file(&dir, "products.json", r#"[{"id":"p1"},{"id":"p2"}]"#);

    let seeder = Seeder::new(client(&mock_server), dir.path());
    let err = seeder.import_file("products", "products.json").await.unwrap_err();

    assert!(err.to_string().contains("Quota exceeded."));
}

fn regex_escape(s: &str) -> String {
    s.replace('(', r"\(").replace(')', r"\)")
}
