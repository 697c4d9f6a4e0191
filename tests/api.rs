use std::sync::Arc;

use actix_governor::Governor;
use actix_web::{
    App,
    dev::Service,
    http::{StatusCode, header},
    test,
    web::{self, Data},
};
use serde_json::{Value, json};

use employee_portal::routes;
use employee_portal::store::{EmployeeStore, MemoryEmployeeStore};

const BOUNDARY: &str = "----employee-portal-test-boundary";

macro_rules! test_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(Data::from($store.clone()))
                .configure(routes::configure)
                .default_service(web::to(routes::not_found)),
        )
        .await
    };
}

#[derive(Default)]
struct Form {
    body: Vec<u8>,
}

impl Form {
    fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn into_request(mut self) -> test::TestRequest {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        test::TestRequest::post()
            .uri("/api/employees")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(self.body)
    }
}

fn employee_form(emp_id: &str, password: &str) -> Form {
    Form::default()
        .text("name", "Jane Doe")
        .text("designation", "Backend Engineer")
        .text("empId", emp_id)
        .text("favTools", "Git,Docker,AWS")
        .text("password", password)
}

fn jpeg(len: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    data.extend((0..len - data.len()).map(|i| (i % 251) as u8));
    data
}

fn login_request(emp_id: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/employees/login")
        .set_json(json!({ "empId": emp_id, "password": password }))
}

fn new_store() -> Arc<dyn EmployeeStore> {
    Arc::new(MemoryEmployeeStore::new())
}

#[actix_web::test]
async fn register_then_login_scenario() {
    let store = new_store();
    let app = test_app!(store);

    let resp = test::call_service(&app, employee_form("E100", "secret1").into_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Employee created successfully!");
    assert_eq!(body["employee"]["empId"], "E100");
    assert!(body["employee"].get("password").is_none());

    let resp = test::call_service(&app, login_request("E100", "secret1").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "name": "Jane Doe",
            "empId": "E100",
            "designation": "Backend Engineer",
            "favTools": ["Git", "Docker", "AWS"]
        })
    );

    let resp = test::call_service(&app, login_request("E100", "wrong").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid password");

    let resp = test::call_service(&app, login_request("E999", "x").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Employee not found");
}

#[actix_web::test]
async fn empty_password_login_checks_the_employee_first() {
    let store = new_store();
    let app = test_app!(store);

    let resp = test::call_service(&app, employee_form("E100", "secret1").into_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(&app, login_request("E999", "").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Employee not found");

    let resp = test::call_service(&app, login_request("E100", "").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid password");

    let resp = test::call_service(&app, login_request("  ", "secret1").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn duplicate_emp_id_is_a_conflict() {
    let store = new_store();
    let app = test_app!(store);

    let resp = test::call_service(&app, employee_form("E1", "first").into_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(&app, employee_form("E1", "second").into_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].is_string());
    assert!(body["error"].as_str().unwrap().contains("E1"));

    // the original credentials still work, the second ones never do
    let resp = test::call_service(&app, login_request("E1", "first").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = test::call_service(&app, login_request("E1", "second").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(store.list_all().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn listing_never_exposes_passwords() {
    let store = new_store();
    let app = test_app!(store);

    for id in ["E1", "E2", "E3"] {
        let resp = test::call_service(&app, employee_form(id, "secret1").into_request().to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get().uri("/api/employees").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let employees = body.as_array().unwrap();

    assert_eq!(employees.len(), 3);
    for employee in employees {
        assert!(employee.get("password").is_none());
        assert!(!employee.to_string().contains("argon2"));
    }
}

#[actix_web::test]
async fn fav_tools_are_normalized() {
    let store = new_store();
    let app = test_app!(store);

    let csv = Form::default()
        .text("name", "Ann")
        .text("designation", "Ops")
        .text("empId", "E1")
        .text("favTools", " Git , Docker,AWS ")
        .text("password", "pw");
    test::call_service(&app, csv.into_request().to_request()).await;

    let repeated = Form::default()
        .text("name", "Bob")
        .text("designation", "Dev")
        .text("empId", "E2")
        .text("favTools", "Git")
        .text("favTools", "Docker")
        .text("password", "pw");
    test::call_service(&app, repeated.into_request().to_request()).await;

    let req = test::TestRequest::post()
        .uri("/api/employees")
        .set_json(json!({
            "name": "Cy",
            "designation": "QA",
            "empId": "E3",
            "favTools": ["Git", "Docker"],
            "password": "pw"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let tools: Vec<Vec<String>> = store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.fav_tools)
        .collect();

    assert_eq!(
        tools,
        vec![
            vec!["Git", "Docker", "AWS"],
            vec!["Git", "Docker"],
            vec!["Git", "Docker"],
        ]
    );
}

#[actix_web::test]
async fn missing_field_is_a_client_error() {
    let store = new_store();
    let app = test_app!(store);

    let form = Form::default()
        .text("name", "Jane")
        .text("empId", "E5")
        .text("favTools", "Git")
        .text("password", "pw");
    let resp = test::call_service(&app, form.into_request().to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("designation"));
    assert!(store.list_all().await.unwrap().is_empty());
}

#[actix_web::test]
async fn non_image_upload_is_rejected_before_persisting() {
    let store = new_store();
    let app = test_app!(store);

    let form = employee_form("E1", "pw").file("profileImage", "notes.txt", "text/plain", b"hello");
    let resp = test::call_service(&app, form.into_request().to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.find_by_emp_id("E1").await.unwrap().is_none());
}

#[actix_web::test]
async fn oversized_image_is_rejected_before_persisting() {
    let store = new_store();
    let app = test_app!(store);

    let form = employee_form("E1", "pw").file(
        "profileImage",
        "big.jpg",
        "image/jpeg",
        &jpeg(6 * 1024 * 1024),
    );
    let resp = test::call_service(&app, form.into_request().to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.find_by_emp_id("E1").await.unwrap().is_none());
}

#[actix_web::test]
async fn profile_image_is_served_byte_for_byte() {
    let store = new_store();
    let app = test_app!(store);
    let photo = jpeg(4 * 1024 * 1024);

    let form = employee_form("E1", "pw").file("profileImage", "me.jpg", "image/jpeg", &photo);
    let resp = test::call_service(&app, form.into_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["employee"]["profileImage"]["size"], photo.len());

    let req = test::TestRequest::get().uri("/api/employees/E1/image").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );
    assert_eq!(
        resp.headers().get(header::CONTENT_LENGTH).unwrap(),
        photo.len().to_string().as_str()
    );

    let bytes = test::read_body(resp).await;
    assert_eq!(bytes.as_ref(), photo.as_slice());
}

#[actix_web::test]
async fn missing_image_is_not_found() {
    let store = new_store();
    let app = test_app!(store);

    let resp = test::call_service(&app, employee_form("E1", "pw").into_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    for uri in ["/api/employees/E1/image", "/api/employees/E404/image"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn empty_file_part_means_no_photo() {
    let store = new_store();
    let app = test_app!(store);

    let form = employee_form("E1", "pw").file("profileImage", "", "application/octet-stream", b"");
    let resp = test::call_service(&app, form.into_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    assert!(store.find_profile_image("E1").await.unwrap().is_none());
}

#[actix_web::test]
async fn named_empty_text_file_is_rejected() {
    let store = new_store();
    let app = test_app!(store);

    let form = employee_form("E1", "pw").file("profileImage", "a.txt", "text/plain", b"");
    let resp = test::call_service(&app, form.into_request().to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.find_by_emp_id("E1").await.unwrap().is_none());
}

#[actix_web::test]
async fn image_type_must_match_content() {
    let store = new_store();
    let app = test_app!(store);

    let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
    png.resize(128, 0);

    let form = employee_form("E1", "pw").file("profileImage", "me.jpg", "image/jpeg", &png);
    let resp = test::call_service(&app, form.into_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.find_by_emp_id("E1").await.unwrap().is_none());

    let form = employee_form("E1", "pw").file("profileImage", "me.png", "image/png", &png);
    let resp = test::call_service(&app, form.into_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn svg_photo_keeps_its_declared_type() {
    let store = new_store();
    let app = test_app!(store);
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"/>"#;

    let form = employee_form("E1", "pw").file("profileImage", "me.svg", "image/svg+xml", svg);
    let resp = test::call_service(&app, form.into_request().to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/api/employees/E1/image").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/svg+xml"
    );
}

#[actix_web::test]
async fn too_many_fav_tools_are_rejected() {
    let store = new_store();
    let app = test_app!(store);

    let mut form = Form::default()
        .text("name", "Jane Doe")
        .text("designation", "Backend Engineer")
        .text("empId", "E1")
        .text("password", "pw");
    for i in 0..101 {
        form = form.text("favTools[]", &format!("tool-{i}"));
    }
    let resp = test::call_service(&app, form.into_request().to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.find_by_emp_id("E1").await.unwrap().is_none());
}

#[actix_web::test]
async fn form_text_has_a_total_budget() {
    let store = new_store();
    let app = test_app!(store);

    // each part fits the per-field limit, together they do not
    let chunk = "x".repeat(60 * 1024);
    let mut form = employee_form("E1", "pw");
    for _ in 0..5 {
        form = form.text("favTools", &chunk);
    }
    let resp = test::call_service(&app, form.into_request().to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.find_by_emp_id("E1").await.unwrap().is_none());
}

#[actix_web::test]
async fn malformed_login_body_is_a_validation_error() {
    let store = new_store();
    let app = test_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/employees/login")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid request");
}

#[actix_web::test]
async fn unknown_route_is_json_404() {
    let store = new_store();
    let app = test_app!(store);

    let req = test::TestRequest::get().uri("/api/nothing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn security_headers_are_set() {
    let store = new_store();
    let app = test::init_service(
        App::new()
            .wrap(routes::security_headers())
            .app_data(Data::from(store.clone()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/employees").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );
    assert_eq!(resp.headers().get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
}

#[actix_web::test]
async fn cors_allows_only_the_frontend_origin() {
    let store = new_store();
    let app = test::init_service(
        App::new()
            .wrap(routes::cors("http://localhost:3000"))
            .app_data(Data::from(store.clone()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/employees")
        .insert_header((header::ORIGIN, "http://localhost:3000"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );

    let req = test::TestRequest::get()
        .uri("/api/employees")
        .insert_header((header::ORIGIN, "http://evil.example"))
        .to_request();
    // a rejected origin may surface as an error rather than a response
    match app.call(req).await {
        Ok(resp) => assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none()),
        Err(err) => assert!(err.as_response_error().status_code().is_client_error()),
    }
}

#[actix_web::test]
async fn rate_limit_applies_per_client() {
    let store = new_store();
    let limiter = routes::build_limiter(2, 60).unwrap();
    let app = test::init_service(
        App::new()
            .wrap(Governor::new(&limiter))
            .app_data(Data::from(store.clone()))
            .configure(routes::configure),
    )
    .await;

    let peer = "10.1.2.3:40000".parse().unwrap();
    let mut statuses = Vec::new();
    for _ in 0..3 {
        let req = test::TestRequest::get()
            .uri("/api/employees")
            .peer_addr(peer)
            .to_request();
        let status = match app.call(req).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        };
        statuses.push(status);
    }

    assert_eq!(
        statuses,
        vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );
}
