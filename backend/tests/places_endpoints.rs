//! HTTP contract tests for the place search and admin endpoints.
//!
//! Each test wires the real search service over a scripted provider and
//! drives the Actix app in-process.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::http::header::{CACHE_CONTROL, HeaderMap};
use actix_web::web::Bytes;
use actix_web::{App, test, web};
use rstest::rstest;
use serde_json::Value;

use nearby::Trace;
use nearby::domain::TRACE_ID_HEADER;
use nearby::domain::ports::{PlaceSourceError, ProviderElement};
use nearby::inbound::http::configure_api;
use nearby::inbound::http::state::HttpState;
use nearby::settings::NearbySettings;
use nearby::test_support::{ScriptedPlaceSource, monday_morning, node, search_service_with};

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }
}

async fn send(source: Arc<ScriptedPlaceSource>, requests: Vec<test::TestRequest>) -> Vec<Reply> {
    let settings = NearbySettings {
        http_timeout_seconds: Some(1),
        ..NearbySettings::default()
    };
    let service = search_service_with(settings, source, monday_morning());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(HttpState::new(service)))
            .wrap(Trace)
            .configure(configure_api),
    )
    .await;

    let mut replies = Vec::with_capacity(requests.len());
    for request in requests {
        let response = test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let headers = response.headers().clone();
        let body = test::read_body(response).await;
        replies.push(Reply {
            status,
            headers,
            body,
        });
    }
    replies
}

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri)
}

fn parks() -> Vec<ProviderElement> {
    vec![
        node(
            1,
            19.4118,
            -99.1698,
            &[
                ("name", "Parque México"),
                ("leisure", "park"),
                ("opening_hours", "24/7"),
            ],
        ),
        node(
            2,
            19.4200,
            -99.1600,
            &[("name", "Jardín Pushkin"), ("leisure", "park")],
        ),
        node(3, 19.4300, -99.1700, &[("leisure", "park")]),
    ]
}

#[actix_web::test]
async fn search_returns_the_ranked_envelope() {
    let source = Arc::new(ScriptedPlaceSource::new(vec![Ok(parks())]));
    let replies = send(
        source.clone(),
        vec![get(
            "/api/v1/places?categoria=Parque&lat=19.4326&lon=-99.1332&mood=calm",
        )],
    )
    .await;
    let reply = &replies[0];

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.headers.get(CACHE_CONTROL).and_then(|v| v.to_str().ok()),
        Some("public, max-age=60")
    );
    assert!(reply.headers.contains_key(TRACE_ID_HEADER));
    let body = reply.json();
    assert_eq!(body["category"], "park");
    assert_eq!(body["wasStrict"], true);
    assert_eq!(body["filteredByTime"], false);
    assert_eq!(body["preferences"]["mood"], "calm");
    let names: Vec<&str> = body["places"]
        .as_array()
        .expect("places array")
        .iter()
        .filter_map(|place| place["name"].as_str())
        .collect();
    assert_eq!(names, ["Parque México", "Jardín Pushkin"]);
    assert_eq!(body["places"][0]["address"], "unavailable");
    assert_eq!(source.calls(), 1);
}

#[rstest]
#[case::missing_category("/api/v1/places?lat=19.43&lon=-99.13", "missing_parameter")]
#[case::missing_lon("/api/v1/places?category=park&lat=19.43", "missing_parameter")]
#[case::non_numeric_lat("/api/v1/places?category=park&lat=north&lon=-99.13", "invalid_coordinate")]
#[case::out_of_range_lat("/api/v1/places?category=park&lat=91&lon=-99.13", "invalid_coordinate")]
#[case::unknown_category("/api/v1/places?category=volcano&lat=19.4&lon=-99.1", "unknown_category")]
#[actix_web::test]
async fn invalid_requests_are_rejected_before_the_provider(
    #[case] uri: &str,
    #[case] code: &str,
) {
    let source = Arc::new(ScriptedPlaceSource::default());
    let replies = send(source.clone(), vec![get(uri)]).await;
    let reply = &replies[0];

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let body = reply.json();
    assert_eq!(body["code"], code);
    assert_eq!(
        body["traceId"].as_str(),
        reply
            .headers
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
    );
    assert_eq!(source.calls(), 0);
}

#[rstest]
#[case::outage(
    PlaceSourceError::transport("connection refused"),
    StatusCode::SERVICE_UNAVAILABLE,
    "provider_unavailable",
    "transport"
)]
#[case::rate_limited(
    PlaceSourceError::rate_limited("slow down"),
    StatusCode::SERVICE_UNAVAILABLE,
    "provider_unavailable",
    "rate_limited"
)]
#[case::timeout(
    PlaceSourceError::timeout("query timed out"),
    StatusCode::GATEWAY_TIMEOUT,
    "provider_timeout",
    "timeout"
)]
#[actix_web::test]
async fn provider_failures_map_to_gateway_statuses(
    #[case] failure: PlaceSourceError,
    #[case] status: StatusCode,
    #[case] code: &str,
    #[case] reason: &str,
) {
    let source = Arc::new(ScriptedPlaceSource::new(vec![Err(failure)]));
    let replies = send(
        source,
        vec![get("/api/v1/places?category=park&lat=19.43&lon=-99.13")],
    )
    .await;

    assert_eq!(replies[0].status, status);
    let body = replies[0].json();
    assert_eq!(body["code"], code);
    assert_eq!(body["details"]["reason"], reason);
}

#[actix_web::test]
async fn slow_provider_times_out() {
    let source = Arc::new(
        ScriptedPlaceSource::new(vec![Ok(parks())]).with_delay(Duration::from_secs(3)),
    );
    let replies = send(
        source,
        vec![get("/api/v1/places?category=park&lat=19.43&lon=-99.13")],
    )
    .await;

    assert_eq!(replies[0].status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(replies[0].json()["code"], "provider_timeout");
}

#[actix_web::test]
async fn flush_forces_a_fresh_provider_call() {
    let source = Arc::new(ScriptedPlaceSource::new(vec![Ok(parks()), Ok(parks())]));
    let search = "/api/v1/places?category=park&lat=19.4326&lon=-99.1332";
    let replies = send(
        source.clone(),
        vec![
            get(search),
            get(search),
            test::TestRequest::post().uri("/api/v1/admin/cache/flush"),
            get(search),
        ],
    )
    .await;

    assert_eq!(replies[0].json(), replies[1].json());
    assert_eq!(replies[2].status, StatusCode::NO_CONTENT);
    assert_eq!(replies[3].status, StatusCode::OK);
    assert_eq!(source.calls(), 2);
}

#[actix_web::test]
async fn metrics_count_requests_hits_and_failures() {
    let source = Arc::new(ScriptedPlaceSource::new(vec![
        Ok(parks()),
        Err(PlaceSourceError::transport("down")),
    ]));
    let park = "/api/v1/places?category=park&lat=19.4326&lon=-99.1332";
    let replies = send(
        source,
        vec![
            get(park),
            get(park),
            get("/api/v1/places?category=cafe&lat=19.4326&lon=-99.1332"),
            get("/api/v1/places?lat=19.4326&lon=-99.1332"),
            get("/api/v1/admin/metrics"),
        ],
    )
    .await;
    let metrics = &replies[4];

    assert_eq!(metrics.status, StatusCode::OK);
    assert_eq!(
        metrics.headers.get(CACHE_CONTROL).and_then(|v| v.to_str().ok()),
        Some("no-store")
    );
    let body = metrics.json();
    assert_eq!(body["totalRequests"], 3);
    assert_eq!(body["cacheHits"], 1);
    assert_eq!(body["cacheMisses"], 2);
    assert_eq!(body["providerFailures"], 1);
    assert_eq!(body["perCategory"]["park"], 2);
    assert_eq!(body["perCategory"]["cafe"], 1);
}
