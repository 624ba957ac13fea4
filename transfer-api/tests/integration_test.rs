use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use transfer_api::{app, AppState};
use transfer_domain::{
    DriverLanguage, HourlyPackage, LanguageSurcharge, SurchargeValue, VehicleTariff,
};
use transfer_lifecycle::{
    LogNotifier, MockPaymentAdapter, PaymentAdapter, PaymentIntent, PaymentOrchestrator,
    RefundOutcome,
};
use transfer_pricing::{DistanceResult, FixedDistanceProvider, PricingSettings};
use transfer_store::{
    InMemoryAdditionalItemRepository, InMemoryBookingRepository, InMemoryQuoteRepository,
    InMemoryRouteRepository, InMemoryRuleRepository, InMemoryTariffRepository,
};
use uuid::Uuid;

const BASE: &str = "Garagem Central";

fn sedan(id: Uuid) -> VehicleTariff {
    VehicleTariff {
        id,
        name: "Sedan Executivo".to_string(),
        description: None,
        max_passengers: 3,
        max_luggage: 3,
        display_order: 1,
        is_active: true,
        price_per_km_cents: 200,
        price_per_hour_cents: 10000,
        min_km_franchise: 50.0,
        min_price_for_franchise_cents: 15000,
        min_price_one_way_cents: 10000,
        min_price_round_trip_cents: 25000,
        min_price_hourly_cents: 30000,
        hourly_packages: vec![HourlyPackage {
            duration_hours: 5,
            fixed_price_cents: 60000,
            km_allowance: 50.0,
        }],
        km_allowance_per_hour: 12.0,
        additional_price_per_km_cents: 250,
        additional_price_per_hour_cents: 12000,
        language_surcharges: vec![LanguageSurcharge {
            language: DriverLanguage::En,
            value: SurchargeValue::Percentage(10.0),
        }],
        operational_radius_km: 0.0,
        min_booking_lead_time_hours: 24,
    }
}

/// Gateway wrapper that counts refund executions and holds each one open
/// long enough for a concurrent request to overlap it.
struct SlowCountingGateway {
    inner: MockPaymentAdapter,
    refunds: AtomicUsize,
}

impl SlowCountingGateway {
    fn new() -> Self {
        Self {
            inner: MockPaymentAdapter,
            refunds: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PaymentAdapter for SlowCountingGateway {
    async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: Value,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        self.inner.create_intent(amount_cents, currency, metadata).await
    }

    async fn get_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        self.inner.get_intent(intent_id).await
    }

    async fn refund(
        &self,
        intent_id: &str,
        amount_cents: i64,
    ) -> Result<RefundOutcome, Box<dyn std::error::Error + Send + Sync>> {
        self.refunds.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.inner.refund(intent_id, amount_cents).await
    }
}

async fn test_app(tariff: VehicleTariff) -> Router {
    test_app_with_gateway(tariff, Arc::new(MockPaymentAdapter)).await
}

async fn test_app_with_gateway(
    tariff: VehicleTariff,
    gateway: Arc<dyn PaymentAdapter>,
) -> Router {
    let tariffs = InMemoryTariffRepository::new();
    tariffs.seed(vec![tariff]).await;

    let mut distance = FixedDistanceProvider::with_default(DistanceResult {
        distance_km: 20.0,
        duration_minutes: 30,
    });
    distance.insert(
        "GRU",
        "Centro",
        DistanceResult {
            distance_km: 30.0,
            duration_minutes: 45,
        },
    );
    distance.insert(
        BASE,
        "GRU",
        DistanceResult {
            distance_km: 20.0,
            duration_minutes: 30,
        },
    );

    let state = AppState {
        tariffs: Arc::new(tariffs),
        rules: Arc::new(InMemoryRuleRepository::new()),
        routes: Arc::new(InMemoryRouteRepository::new()),
        additional_items: Arc::new(InMemoryAdditionalItemRepository::new()),
        bookings: Arc::new(InMemoryBookingRepository::new()),
        quotes: Arc::new(InMemoryQuoteRepository::new()),
        distance: Arc::new(distance),
        payments: Arc::new(PaymentOrchestrator::new(gateway)),
        notifier: Arc::new(LogNotifier),
        pricing: PricingSettings::default(),
        base_address: BASE.to_string(),
    };
    app(state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn one_way_trip() -> Value {
    json!({
        "service": "one_way",
        "outbound": {
            "origin": "GRU",
            "destination": "Centro",
            "date": "2026-09-10",
            "time": "10:00:00"
        }
    })
}

#[tokio::test]
async fn pricing_options_returns_franchise_floor_price() {
    let app = test_app(sedan(Uuid::new_v4())).await;

    let response = app
        .oneshot(post_json("/v1/pricing/options", one_way_trip()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let options = body["options"].as_array().unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0]["outcome"], "priced");
    // 30 km is under the 50 km franchise, so the floor price applies.
    assert_eq!(options[0]["total_cents"], 15000);
    assert_eq!(options[0]["min_price_applied"], true);
    assert_eq!(
        options[0]["offered_languages"],
        json!(["pt", "en"])
    );
}

#[tokio::test]
async fn vehicle_outside_radius_is_flagged_not_dropped() {
    let mut tariff = sedan(Uuid::new_v4());
    // Supplier drives 20 + 30 + 20 (default) = 70 km, over the limit.
    tariff.operational_radius_km = 60.0;
    let app = test_app(tariff).await;

    let response = app
        .oneshot(post_json("/v1/pricing/options", one_way_trip()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let options = body["options"].as_array().unwrap();
    assert_eq!(options[0]["outcome"], "outside_operational_radius");
    assert_eq!(options[0]["supplier_total_distance_km"], 70.0);
}

#[tokio::test]
async fn booking_flow_confirms_idempotently_via_webhook() {
    let vehicle_id = Uuid::new_v4();
    let app = test_app(sedan(vehicle_id)).await;

    let mut create = one_way_trip();
    create["vehicle_type_id"] = json!(vehicle_id);
    create["customer_name"] = json!("Maria Silva");
    create["customer_email"] = json!("maria@example.com");

    let response = app
        .clone()
        .oneshot(post_json("/v1/bookings", create))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();
    let intent_id = body["booking"]["payment_intent_id"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(body["booking"]["status"], "pendente");
    assert_eq!(body["booking"]["payment_status"], "aguardando");
    assert!(body["client_secret"].as_str().is_some());

    let webhook = json!({
        "id": "evt_1",
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": intent_id } }
    });
    let response = app
        .clone()
        .oneshot(post_json("/v1/webhooks/payments", webhook.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Replay must be acknowledged without changing anything.
    let response = app
        .clone()
        .oneshot(post_json("/v1/webhooks/payments", webhook))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/v1/bookings/{}", booking_id)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["status"], "confirmada");
    assert_eq!(body["payment_status"], "pago");
}

#[tokio::test]
async fn refund_is_refused_until_paid() {
    let vehicle_id = Uuid::new_v4();
    let app = test_app(sedan(vehicle_id)).await;

    let mut create = one_way_trip();
    create["vehicle_type_id"] = json!(vehicle_id);
    create["customer_name"] = json!("Maria Silva");
    create["customer_email"] = json!("maria@example.com");

    let response = app
        .clone()
        .oneshot(post_json("/v1/bookings", create))
        .await
        .unwrap();
    let body = body_json(response).await;
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(post_json(
            &format!("/v1/bookings/{}/refund", booking_id),
            json!({ "reason": "cliente desistiu" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn concurrent_refund_requests_move_money_once() {
    let vehicle_id = Uuid::new_v4();
    let gateway = Arc::new(SlowCountingGateway::new());
    let app = test_app_with_gateway(sedan(vehicle_id), gateway.clone()).await;

    let mut create = one_way_trip();
    create["vehicle_type_id"] = json!(vehicle_id);
    create["customer_name"] = json!("Maria Silva");
    create["customer_email"] = json!("maria@example.com");

    let response = app
        .clone()
        .oneshot(post_json("/v1/bookings", create))
        .await
        .unwrap();
    let body = body_json(response).await;
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();
    let intent_id = body["booking"]["payment_intent_id"]
        .as_str()
        .unwrap()
        .to_string();

    let webhook = json!({
        "id": "evt_refund_race",
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": intent_id } }
    });
    app.clone()
        .oneshot(post_json("/v1/webhooks/payments", webhook))
        .await
        .unwrap();

    let uri = format!("/v1/bookings/{}/refund", booking_id);
    let reason = json!({ "reason": "cliente desistiu" });
    let (first, second) = tokio::join!(
        app.clone().oneshot(post_json(&uri, reason.clone())),
        app.clone().oneshot(post_json(&uri, reason)),
    );

    let mut statuses = [first.unwrap().status(), second.unwrap().status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);
    // The loser must be turned away before the gateway is touched.
    assert_eq!(gateway.refunds.load(Ordering::SeqCst), 1);

    let response = app
        .oneshot(get(&format!("/v1/bookings/{}", booking_id)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["status"], "cancelada");
    assert_eq!(body["payment_status"], "reembolsado");
}

#[tokio::test]
async fn unknown_booking_is_a_404() {
    let app = test_app(sedan(Uuid::new_v4())).await;
    let response = app
        .oneshot(get(&format!("/v1/bookings/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_flow_converts_on_payment() {
    let vehicle_id = Uuid::new_v4();
    let app = test_app(sedan(vehicle_id)).await;

    let submit = json!({
        "service": "one_way",
        "outbound": {
            "origin": "GRU",
            "destination": "Campos do Jordão",
            "date": "2026-09-20",
            "time": "08:00:00"
        },
        "vehicle_type_id": vehicle_id,
        "customer_name": "João Souza",
        "customer_email": "joao@example.com"
    });
    let response = app
        .clone()
        .oneshot(post_json("/v1/quotes", submit))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let quote = body_json(response).await;
    let quote_id = quote["id"].as_str().unwrap().to_string();
    assert_eq!(quote["status"], "pendente");

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/quotes/{}/price", quote_id),
            json!({ "price_cents": 85000, "notes": "inclui pedágios" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["quote"]["status"], "cotado");
    let intent_id = body["quote"]["payment_intent_id"]
        .as_str()
        .unwrap()
        .to_string();

    let webhook = json!({
        "id": "evt_2",
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": intent_id } }
    });
    let response = app
        .clone()
        .oneshot(post_json("/v1/webhooks/payments", webhook))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/quotes/{}", quote_id)))
        .await
        .unwrap();
    let quote = body_json(response).await;
    assert_eq!(quote["status"], "convertido");
    let booking_id = quote["booking_id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(get(&format!("/v1/bookings/{}", booking_id)))
        .await
        .unwrap();
    let booking = body_json(response).await;
    assert_eq!(booking["status"], "confirmada");
    assert_eq!(booking["payment_status"], "pago");
    assert_eq!(booking["total_price_cents"], 85000);
    assert_eq!(booking["quote_request_id"].as_str().unwrap(), quote_id);
}

#[tokio::test]
async fn payment_on_cancelled_quote_creates_no_booking() {
    let vehicle_id = Uuid::new_v4();
    let app = test_app(sedan(vehicle_id)).await;

    let submit = json!({
        "service": "one_way",
        "outbound": {
            "origin": "GRU",
            "destination": "Campos do Jordão",
            "date": "2026-09-20",
            "time": "08:00:00"
        },
        "vehicle_type_id": vehicle_id,
        "customer_name": "João Souza",
        "customer_email": "joao@example.com"
    });
    let response = app
        .clone()
        .oneshot(post_json("/v1/quotes", submit))
        .await
        .unwrap();
    let quote = body_json(response).await;
    let quote_id = quote["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/quotes/{}/price", quote_id),
            json!({ "price_cents": 85000 }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let intent_id = body["quote"]["payment_intent_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Operator cancels while the payment link is already out.
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/quotes/{}/cancel", quote_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The late payment must not materialize a booking.
    let webhook = json!({
        "id": "evt_late_payment",
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": intent_id } }
    });
    let response = app
        .clone()
        .oneshot(post_json("/v1/webhooks/payments", webhook))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(get(&format!("/v1/quotes/{}", quote_id)))
        .await
        .unwrap();
    let quote = body_json(response).await;
    assert_eq!(quote["status"], "cancelado");
    assert!(quote["booking_id"].is_null());
}

#[tokio::test]
async fn repricing_a_linked_quote_is_rejected_not_dropped() {
    let vehicle_id = Uuid::new_v4();
    let app = test_app(sedan(vehicle_id)).await;

    let submit = json!({
        "service": "one_way",
        "outbound": {
            "origin": "GRU",
            "destination": "Campos do Jordão",
            "date": "2026-09-20",
            "time": "08:00:00"
        },
        "vehicle_type_id": vehicle_id,
        "customer_name": "João Souza",
        "customer_email": "joao@example.com"
    });
    let response = app
        .clone()
        .oneshot(post_json("/v1/quotes", submit))
        .await
        .unwrap();
    let quote = body_json(response).await;
    let quote_id = quote["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/quotes/{}/price", quote_id),
            json!({ "price_cents": 85000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A second price for a quote whose link is already out must fail
    // loudly, never answer with the old figure.
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/quotes/{}/price", quote_id),
            json!({ "price_cents": 90000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(get(&format!("/v1/quotes/{}", quote_id)))
        .await
        .unwrap();
    let quote = body_json(response).await;
    assert_eq!(quote["admin_quote_price_cents"], 85000);
}

#[tokio::test]
async fn quote_cannot_convert_before_payment() {
    let vehicle_id = Uuid::new_v4();
    let app = test_app(sedan(vehicle_id)).await;

    let submit = json!({
        "service": "one_way",
        "outbound": {
            "origin": "GRU",
            "destination": "Centro",
            "date": "2026-09-20",
            "time": "08:00:00"
        },
        "vehicle_type_id": vehicle_id,
        "customer_name": "João Souza",
        "customer_email": "joao@example.com"
    });
    let response = app
        .clone()
        .oneshot(post_json("/v1/quotes", submit))
        .await
        .unwrap();
    let quote = body_json(response).await;
    let quote_id = quote["id"].as_str().unwrap().to_string();

    // Accepting a quote that has not been priced yet is invalid.
    let response = app
        .oneshot(post_json(
            &format!("/v1/quotes/{}/accept", quote_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
