use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, Role};
use migration::MigratorTrait;

const ADMIN: (&str, &str) = ("boss", "boss-pass");
const RAVI: (&str, &str) = ("ravi", "ravi-pass");
const MEENA: (&str, &str) = ("meena", "meena-pass");

struct TestApp {
    router: Router,
    vehicle_id: String,
    second_vehicle_id: String,
}

async fn test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    engine
        .new_user(ADMIN.0, ADMIN.1, Some("Fleet office"), Role::Admin)
        .await
        .unwrap();
    engine
        .new_user(RAVI.0, RAVI.1, None, Role::Driver)
        .await
        .unwrap();
    engine
        .new_user(MEENA.0, MEENA.1, None, Role::Driver)
        .await
        .unwrap();
    let vehicle = engine
        .register_vehicle("TS09AB1234", Some("Tata 407"), ADMIN.0)
        .await
        .unwrap();
    let second = engine
        .register_vehicle("TS09CD5678", None, ADMIN.0)
        .await
        .unwrap();

    TestApp {
        router: server::router(Arc::new(engine)),
        vehicle_id: vehicle.id.to_string(),
        second_vehicle_id: second.id.to_string(),
    }
}

fn basic(credentials: (&str, &str)) -> String {
    let encoded = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", credentials.0, credentials.1));
    format!("Basic {encoded}")
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    credentials: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(credentials) = credentials {
        builder = builder.header(header::AUTHORIZATION, basic(credentials));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn start_journey(app: &TestApp, driver: (&str, &str), vehicle_id: &str, pouch: Value) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/journey/start",
        Some(driver),
        Some(json!({ "vehicleId": vehicle_id, "pouch": pouch, "destination": "Hyderabad" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn requests_without_valid_credentials_are_unauthorized() {
    let app = test_app().await;

    let (status, _) = send(&app, "GET", "/journeys", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/journeys", Some(("ravi", "wrong")), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn journey_lifecycle_over_http() {
    let app = test_app().await;
    let id = start_journey(&app, RAVI, &app.vehicle_id, json!("10000")).await;

    for (kind, amount) in [("topUp", json!(2000)), ("fuel", json!("1500")), ("toll", json!(500))] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/journey/{id}/expense"),
            Some(RAVI),
            Some(json!({ "type": kind, "amount": amount })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = send(&app, "GET", &format!("/journey/{id}"), Some(RAVI), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"]["workingBalanceMinor"], 10000);
    assert_eq!(body["journey"]["pouchMinor"], 10000);
    assert_eq!(body["expenses"].as_array().unwrap().len(), 3);

    let (status, body) = send(&app, "GET", &format!("/journey/{id}/expenses"), Some(RAVI), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/journey/{id}/location"),
        Some(RAVI),
        Some(json!({ "latitude": 17.385, "longitude": 78.4867 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lastLocation"]["latitude"], 17.385);

    let (status, body) = send(&app, "POST", &format!("/journey/{id}/end"), Some(RAVI), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["journey"]["status"], "completed");
    assert!(body["adjustment"].is_null());

    let (status, _) = send(&app, "POST", &format!("/journey/{id}/end"), Some(RAVI), Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "POST",
        "/admin/reset-financial-data",
        Some(ADMIN),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["archivedCount"], 1);

    let (status, body) = send(&app, "GET", "/journeys?scope=all", Some(RAVI), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        "GET",
        "/journeys?scope=all&includeArchived=true",
        Some(RAVI),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn busy_vehicle_is_a_conflict() {
    let app = test_app().await;
    start_journey(&app, RAVI, &app.vehicle_id, json!(5000)).await;

    let (status, body) = send(
        &app,
        "POST",
        "/journey/start",
        Some(MEENA),
        Some(json!({ "vehicleId": app.vehicle_id, "pouch": 5000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Vehicle busy"));
}

#[tokio::test]
async fn input_errors_map_to_statuses() {
    let app = test_app().await;
    let id = start_journey(&app, RAVI, &app.vehicle_id, json!(5000)).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/journey/{id}/expense"),
        Some(RAVI),
        Some(json!({ "type": "fuel", "amount": "fifteen" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/journey/{id}/expense"),
        Some(RAVI),
        Some(json!({ "type": "salary", "amount": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/journey/{id}/expense"),
        Some(RAVI),
        Some(json!({ "type": "fuel", "amount": 15.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("whole number"));

    let (status, _) = send(&app, "GET", "/journey/not-a-uuid", Some(RAVI), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        "/journey/00000000-0000-4000-8000-000000000000",
        Some(RAVI),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("/journey/{id}"), Some(MEENA), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/admin/summary", Some(RAVI), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deficit_shows_up_in_salary() {
    let app = test_app().await;
    let id = start_journey(&app, MEENA, &app.second_vehicle_id, json!(1000)).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/journey/{id}/expense"),
        Some(MEENA),
        Some(json!({ "type": "fuel", "amount": 1750 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", &format!("/journey/{id}/end"), Some(MEENA), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["adjustment"]["kind"], "journey_adjustment");
    assert_eq!(body["adjustment"]["amountMinor"], 750);

    let (status, body) = send(&app, "GET", "/salary/meena", Some(MEENA), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["salary"]["paidMinor"], 750);
    assert_eq!(body["history"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/salary/meena", Some(RAVI), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        "/admin/salary/meena",
        Some(ADMIN),
        Some(json!({ "salaryAmount": "20000", "entries": [{ "amount": -250, "note": "uniform" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["salaryMinor"], 20000);
    assert_eq!(body["paidMinor"], 500);
    assert_eq!(body["balanceMinor"], 19500);
}

#[tokio::test]
async fn deactivated_driver_cannot_log_in() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/admin/users/ravi/deactivate",
        Some(ADMIN),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deactivated");

    let (status, _) = send(&app, "GET", "/journeys", Some(RAVI), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admins_register_vehicles() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/admin/vehicles",
        Some(ADMIN),
        Some(json!({ "registration": "ka01ef9012", "label": "spare" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["registration"], "KA01EF9012");

    let (status, _) = send(
        &app,
        "POST",
        "/admin/vehicles",
        Some(ADMIN),
        Some(json!({ "registration": "KA01EF9012" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, body) = send(&app, "GET", "/vehicles", Some(RAVI), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}
