//! End-to-end behaviour of the search service over a scripted provider.
//!
//! The clock is frozen on Monday 2024-06-03 at 09:30 UTC and "now" is taken
//! in UTC, so the morning bucket is current.

use std::sync::Arc;

use nearby::domain::ports::ProviderElement;
use nearby::domain::{PlaceSearchService, SearchOutcome, SearchRequest};
use nearby::test_support::{ScriptedPlaceSource, monday_morning, node, search_service};
use rstest::rstest;

const LAT: f64 = 19.4326;
const LON: f64 = -99.1332;

fn request(category: &str, bucket: Option<&str>) -> SearchRequest {
    SearchRequest {
        category: Some(category.to_owned()),
        lat: Some(LAT.to_string()),
        lon: Some(LON.to_string()),
        time_bucket: bucket.map(str::to_owned),
        ..SearchRequest::default()
    }
}

fn service(source: &Arc<ScriptedPlaceSource>) -> Arc<PlaceSearchService> {
    search_service(source.clone(), monday_morning())
}

fn names(outcome: &SearchOutcome) -> Vec<&str> {
    outcome.places.iter().map(|place| place.name.as_str()).collect()
}

fn museum(id: i64, name: &str, lat_offset: f64, hours: Option<&str>) -> ProviderElement {
    let mut tags = vec![("name", name), ("tourism", "museum")];
    if let Some(hours) = hours {
        tags.push(("opening_hours", hours));
    }
    node(id, LAT + lat_offset, LON, &tags)
}

#[tokio::test]
async fn empty_at_every_radius_returns_no_places_after_three_calls() {
    let source = Arc::new(ScriptedPlaceSource::default());

    let outcome = service(&source)
        .search(request("museum", None))
        .await
        .expect("empty is not an error");

    assert!(outcome.places.is_empty());
    assert_eq!(source.calls(), 3);
    let widths: Vec<f64> = source
        .queries()
        .iter()
        .map(|query| {
            let (south, _, north, _) = query.bounding_box.as_tuple();
            ((north - south) / 2.0 * 100.0).round() / 100.0
        })
        .collect();
    assert_eq!(widths, [0.02, 0.05, 0.1]);
}

#[tokio::test]
async fn first_non_empty_radius_wins_without_merging() {
    let source = Arc::new(ScriptedPlaceSource::new(vec![
        Ok(Vec::new()),
        Ok(vec![museum(1, "Museo Tamayo", 0.03, None)]),
        Ok(vec![museum(2, "Museo Soumaya", 0.08, None)]),
    ]));

    let outcome = service(&source)
        .search(request("museo", None))
        .await
        .expect("search");

    assert_eq!(names(&outcome), ["Museo Tamayo"]);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn equal_scores_are_ordered_by_distance() {
    // 0.00108° and 0.00072° of latitude are roughly 120 m and 80 m.
    let source = Arc::new(ScriptedPlaceSource::new(vec![Ok(vec![
        museum(1, "A", 0.00108, None),
        museum(2, "B", 0.00072, None),
    ])]));

    let outcome = service(&source)
        .search(request("museum", None))
        .await
        .expect("search");

    assert_eq!(names(&outcome), ["B", "A"]);
    assert_eq!(outcome.places[0].score, outcome.places[1].score);
}

#[tokio::test]
async fn malformed_hours_fail_open_under_a_strict_filter() {
    let source = Arc::new(ScriptedPlaceSource::new(vec![Ok(vec![
        museum(1, "Open now", 0.001, Some("Mo-Fr 08:00-18:00")),
        museum(2, "Evenings only", 0.001, Some("Mo-Fr 18:00-23:00")),
        museum(3, "Scribbled", 0.001, Some("ask at the door")),
    ])]));

    let outcome = service(&source)
        .search(request("museum", Some("morning")))
        .await
        .expect("search");

    assert!(outcome.was_strict);
    assert!(outcome.filtered_by_time);
    let mut kept = names(&outcome);
    kept.sort_unstable();
    assert_eq!(kept, ["Open now", "Scribbled"]);
}

#[rstest]
#[case::bucket_not_current("evening")]
#[case::bucket_current_but_all_closed("morning")]
#[tokio::test]
async fn filter_relaxes_when_nothing_survives(#[case] bucket: &str) {
    let source = Arc::new(ScriptedPlaceSource::new(vec![Ok(vec![
        museum(1, "Late A", 0.001, Some("Mo-Su 20:00-23:00")),
        museum(2, "Late B", 0.002, Some("Mo-Su 21:00-23:30")),
    ])]));

    let outcome = service(&source)
        .search(request("museum", Some(bucket)))
        .await
        .expect("search");

    assert!(!outcome.was_strict);
    assert!(!outcome.filtered_by_time);
    assert_eq!(outcome.places.len(), 2);
}

#[tokio::test]
async fn repeated_searches_are_served_from_cache() {
    let source = Arc::new(ScriptedPlaceSource::new(vec![Ok(vec![museum(
        1,
        "Museo Tamayo",
        0.001,
        None,
    )])]));
    let service = service(&source);

    let first = service.search(request("museum", None)).await.expect("first");
    let second = service.search(request("MUSEO", None)).await.expect("second");

    assert_eq!(first, second);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn results_never_exceed_four() {
    let elements: Vec<ProviderElement> = (0..7)
        .map(|i| museum(i, &format!("Museo {i}"), 0.001 * f64::from(i as i32 + 1), None))
        .collect();
    let source = Arc::new(ScriptedPlaceSource::new(vec![Ok(elements)]));

    let outcome = service(&source)
        .search(request("museum", None))
        .await
        .expect("search");

    assert_eq!(
        names(&outcome),
        ["Museo 0", "Museo 1", "Museo 2", "Museo 3"]
    );
}
