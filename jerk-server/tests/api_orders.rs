//! HTTP API 端到端测试
//!
//! 通过 `build_app` + `oneshot` 直接调用 Router，不走网络。

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use jerk_server::{Config, ServerState, build_app};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

// Devon House, Kingston
const SHOP_LAT: f64 = 18.0223;
const SHOP_LNG: f64 = -76.7837;

struct TestApp {
    _dir: TempDir,
    app: Router,
}

async fn setup(location_verification: bool) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    config.location_verification = location_verification;
    config.public_origin = "https://jerk.example.com".into();
    let state = ServerState::initialize(&config).await.unwrap();
    TestApp {
        _dir: dir,
        app: build_app(state),
    }
}

impl TestApp {
    async fn raw(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, http::HeaderMap, String) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, text) = self.raw(method, uri, body).await;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(body)).await
    }

    async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, Some(body)).await
    }

    async fn add_shop(&self) -> Value {
        let (status, body) = self
            .post(
                "/api/locations",
                json!({
                    "name": "Devon House",
                    "address": "26 Hope Rd",
                    "latitude": SHOP_LAT,
                    "longitude": SHOP_LNG,
                    "radiusMeters": 200.0
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"].clone()
    }

    async fn create_order(&self, number: &str) -> Value {
        let (status, body) = self.post("/api/orders", order_form(number, SHOP_LAT, SHOP_LNG)).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"].clone()
    }
}

fn order_form(number: &str, lat: f64, lng: f64) -> Value {
    json!({
        "orderNumber": number,
        "customerName": "Delroy Wilson",
        "customerEmail": "delroy@example.com",
        "orderDetails": "Pepper sauce on the side",
        "items": [
            {"foodItemId": "jerk-chicken", "quantity": 2},
            {"foodItemId": "rice-and-peas", "quantity": 1}
        ],
        "location": {"latitude": lat, "longitude": lng, "accuracyMeters": 12.0}
    })
}

#[tokio::test]
async fn health_reports_local_mode() {
    let t = setup(true).await;
    let (status, body) = t.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storeMode"], "local");
    assert_eq!(body["pendingSync"], 0);
}

#[tokio::test]
async fn order_lifecycle_over_http() {
    let t = setup(true).await;
    let shop = t.add_shop().await;

    let created = t.create_order("1001").await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "pending");
    assert_eq!(
        created["orderDetails"],
        "2x Jerk Chicken, 1x Rice and Peas\nPepper sauce on the side"
    );
    assert_eq!(created["location"]["locationId"], shop["id"]);
    assert_eq!(
        created["qrUrl"],
        format!("https://jerk.example.com/order?id={id}")
    );

    let (status, qr) = t.get(&format!("/api/orders/{id}/qr")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(qr["orderId"], id.as_str());
    assert_eq!(qr["url"], created["qrUrl"]);

    // Scanning the QR link resolves the order
    let scanned: String = url::form_urlencoded::byte_serialize(
        qr["url"].as_str().unwrap().as_bytes(),
    )
    .collect();
    let (status, order) = t.get(&format!("/api/orders/scan?url={scanned}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["id"], id.as_str());

    let (status, body) = t
        .get("/api/orders/scan?url=https%3A%2F%2Fjerk.example.com%2Fmenu")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5);

    // Check-in form validation
    let uri = format!("/api/orders/{id}/check-in");
    let (status, body) = t
        .post(&uri, json!({"driverName": "  ", "driverCompany": "doordash"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4005);

    let (status, body) = t.post(&uri, json!({"driverName": "Ken"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4006);

    let (status, body) = t
        .post(&uri, json!({"driverName": "Ken", "driverCompany": "Pony Express"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4006);

    // Delivering before pickup is rejected
    let deliver = format!("/api/orders/{id}/deliver");
    let (status, body) = t.post(&deliver, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4003);

    let (status, body) = t
        .post(&uri, json!({"driverName": "Ken Boothe", "driverCompany": "Uber Eats"}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["status"], "picked_up");
    assert_eq!(body["data"]["driverCompany"], "uber_eats");
    assert!(body["data"]["pickedUpAt"].is_i64());

    let (status, body) = t
        .post(&uri, json!({"driverName": "Someone Else", "driverCompany": "grubhub"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4003);

    let (status, body) = t.post(&deliver, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "delivered");

    let (status, _) = t.post(&deliver, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, order) = t.get(&format!("/api/orders/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "delivered");
    assert_eq!(order["driverName"], "Ken Boothe");
}

#[tokio::test]
async fn failed_verification_creates_no_order() {
    let t = setup(true).await;

    // No locations configured yet
    let (status, body) = t.post("/api/orders", order_form("1", SHOP_LAT, SHOP_LNG)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 7004);
    assert_eq!(body["details"]["verification"]["isValid"], false);

    t.add_shop().await;
    let (status, body) = t
        .post("/api/orders", order_form("2", SHOP_LAT + 0.1, SHOP_LNG))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["verification"]["locationName"], "Devon House");
    assert!(body["details"]["verification"]["distanceMeters"].as_f64().unwrap() > 10_000.0);

    let (status, orders) = t.get("/api/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn create_rejects_invalid_forms() {
    let t = setup(false).await;

    let mut form = order_form("1", 0.0, 0.0);
    form["customerEmail"] = json!("not-an-email");
    let (status, body) = t.post("/api/orders", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);

    let mut form = order_form("1", 0.0, 0.0);
    form["items"] = json!([]);
    form["orderDetails"] = json!("");
    let (_, body) = t.post("/api/orders", form).await;
    assert_eq!(body["code"], 4007);

    let mut form = order_form("1", 0.0, 0.0);
    form["items"] = json!([{"foodItemId": "lobster", "quantity": 1}]);
    let (status, body) = t.post("/api/orders", form).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);

    t.create_order("1").await;
    let (status, body) = t.post("/api/orders", order_form("1", 0.0, 0.0)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4002);

    let (status, body) = t.get("/api/orders/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);

    // Blank after trimming
    let mut form = order_form("   ", 0.0, 0.0);
    form["customerName"] = json!("   ");
    let (status, body) = t.post("/api/orders", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
    assert_eq!(body["details"]["field"], "orderNumber");
}

#[tokio::test]
async fn malformed_bodies_get_error_envelope() {
    let t = setup(false).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"orderNumber\": "))
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], 6);

    // Well-formed JSON with a missing field
    let (status, body) = t
        .post("/api/orders", json!({"orderNumber": "1", "customerName": "A"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);

    let (status, body) = t
        .post("/api/orders/x/check-in", json!({"driverName": 42}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn export_rows_match_list() {
    let t = setup(false).await;
    let a = t.create_order("A-1").await;
    t.create_order("A-2").await;
    t.create_order("A-3").await;

    let id = a["id"].as_str().unwrap();
    t.post(
        &format!("/api/orders/{id}/check-in"),
        json!({"driverName": "Ken", "driverCompany": "postmates"}),
    )
    .await;

    let (status, headers, csv) = t.raw(Method::GET, "/api/orders/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    assert!(
        headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("attachment; filename=\"orders-")
    );

    // Details span two lines inside quotes, so count records by order number
    let (_, list) = t.get("/api/orders").await;
    let rows = csv.lines().filter(|l| l.starts_with("A-")).count();
    assert_eq!(rows, list.as_array().unwrap().len());
    assert!(csv.starts_with("Order Number,Customer Name,Customer Email,Order Details,Status"));
    assert!(csv.contains("picked_up"));
    assert!(csv.contains("Postmates"));

    let (_, _, filtered) = t
        .raw(Method::GET, "/api/orders/export?status=picked_up", None)
        .await;
    assert_eq!(filtered.lines().filter(|l| l.starts_with("A-")).count(), 1);
}

#[tokio::test]
async fn bulk_archive_delete_and_stats() {
    let t = setup(false).await;
    let a = t.create_order("B-1").await;
    let b = t.create_order("B-2").await;
    t.create_order("B-3").await;

    let (status, body) = t
        .post(
            "/api/orders/archive",
            json!({"ids": [a["id"], "ghost"]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["affected"], 1);

    let (_, visible) = t.get("/api/orders").await;
    assert_eq!(visible.as_array().unwrap().len(), 2);
    let (_, all) = t.get("/api/orders?includeArchived=true").await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, body) = t.post("/api/orders/delete", json!({"ids": [b["id"]]})).await;
    assert_eq!(body["data"]["affected"], 1);

    let (status, stats) = t.get("/api/orders/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({"total": 1, "pending": 1, "pickedUp": 0, "delivered": 0, "archived": 1})
    );
}

#[tokio::test]
async fn locations_zones_and_standalone_verify() {
    let t = setup(true).await;
    let shop = t.add_shop().await;
    let id = shop["id"].as_str().unwrap();

    let (status, body) = t
        .post(
            "/api/locations/verify",
            json!({"latitude": SHOP_LAT, "longitude": SHOP_LNG}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isValid"], true);

    let (status, body) = t
        .post("/api/locations/verify", json!({"latitude": 91.0, "longitude": 0.0}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7003);

    let (status, body) = t
        .put(&format!("/api/locations/{id}"), json!({"radiusMeters": -5.0}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7005);

    let (status, body) = t
        .post(
            "/api/delivery-zones",
            json!({
                "name": "New Kingston",
                "centerLatitude": SHOP_LAT,
                "centerLongitude": SHOP_LNG,
                "radiusMeters": 3000.0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let zone_id = body["data"]["id"].clone();

    let (_, body) = t
        .post(
            "/api/locations/verify",
            json!({"latitude": SHOP_LAT, "longitude": SHOP_LNG}),
        )
        .await;
    assert_eq!(body["deliveryZoneId"], zone_id);

    let (status, _) = t
        .call(Method::DELETE, &format!("/api/locations/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = t.get(&format!("/api/locations/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 7001);
}

#[tokio::test]
async fn food_items_and_settings() {
    let t = setup(false).await;

    let (status, items) = t.get("/api/food-items").await;
    assert_eq!(status, StatusCode::OK);
    let count = items.as_array().unwrap().len();
    assert!(count > 0);

    let (status, body) = t
        .put(
            "/api/food-items/bammy",
            json!({"name": "Bammy", "price": 2.5, "category": "Sides"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (_, items) = t.get("/api/food-items").await;
    assert_eq!(items.as_array().unwrap().len(), count + 1);

    let (status, _) = t.call(Method::DELETE, "/api/food-items/bammy", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = t.call(Method::DELETE, "/api/food-items/bammy", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);

    let (status, settings) = t.get("/api/settings/Owner@Jerk.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["email"], "owner@jerk.com");

    let (status, body) = t
        .put(
            "/api/settings/owner@jerk.com",
            json!({"preferences": {"theme": "dark"}, "profile": {"businessName": "Jerk Centre"}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["preferences"]["theme"], "dark");
    assert_eq!(body["data"]["preferences"]["language"], settings["preferences"]["language"]);

    let (status, body) = t.get("/api/settings/nope").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 8001);
}
