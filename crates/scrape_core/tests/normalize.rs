use pretty_assertions::assert_eq;
use scrape_core::{normalize, PageRecord, RawResults, ResultSet, UNKNOWN_STATUS};
use serde_json::json;

fn normalized(payload: serde_json::Value) -> ResultSet {
    normalize(&RawResults::from_value(payload)).expect("normalizes")
}

#[test]
fn bare_url_list_yields_unknown_records() {
    let urls: Vec<String> = (0..5).map(|i| format!("https://example.com/{i}")).collect();
    let results = normalized(json!(urls));

    assert_eq!(results.len(), 5);
    for (record, url) in results.iter().zip(&urls) {
        assert_eq!(record, &PageRecord::bare(url.as_str()));
        assert_eq!(record.status, UNKNOWN_STATUS);
        assert!(!record.has_known_status());
    }
}

#[test]
fn duplicate_urls_collapse_keeping_first_position() {
    let results = normalized(json!([
        "https://example.com/a",
        "https://example.com/b",
        "https://example.com/a",
    ]));

    let urls: Vec<_> = results.urls().collect();
    assert_eq!(urls, vec!["https://example.com/a", "https://example.com/b"]);
}

#[test]
fn malformed_list_entries_are_dropped_individually() {
    let results = normalized(json!([
        "https://example.com/a",
        42,
        null,
        "   ",
        { "url": "https://example.com/nested" },
        " https://example.com/b ",
    ]));

    let urls: Vec<_> = results.urls().collect();
    assert_eq!(urls, vec!["https://example.com/a", "https://example.com/b"]);
}

#[test]
fn mapping_preserves_fields_and_discovery_order() {
    let results = normalized(json!({
        "https://example.com/": {
            "status": "indexed",
            "meta_title": "Home",
            "meta_description": "Welcome",
            "heading_count": 4,
            "internal_link_count": 2,
            "internal_links": ["https://example.com/about", "https://example.com/blog"],
            "_id": "ignored",
        },
        "https://example.com/about": { "status": "indexed", "meta_title": "About" },
        "https://example.com/blog": {},
    }));

    assert_eq!(results.len(), 3);
    let urls: Vec<_> = results.urls().collect();
    assert_eq!(
        urls,
        vec![
            "https://example.com/",
            "https://example.com/about",
            "https://example.com/blog",
        ]
    );

    let home = results.get("https://example.com/").unwrap();
    assert_eq!(
        home,
        &PageRecord {
            url: "https://example.com/".to_string(),
            status: "indexed".to_string(),
            meta_title: Some("Home".to_string()),
            meta_description: Some("Welcome".to_string()),
            heading_count: Some(4),
            internal_link_count: Some(2),
            internal_links: Some(vec![
                "https://example.com/about".to_string(),
                "https://example.com/blog".to_string(),
            ]),
        }
    );

    let blog = results.get("https://example.com/blog").unwrap();
    assert_eq!(blog, &PageRecord::bare("https://example.com/blog"));
}

#[test]
fn blank_or_missing_status_becomes_sentinel() {
    let results = normalized(json!({
        "https://example.com/a": { "status": "" },
        "https://example.com/b": { "status": null },
        "https://example.com/c": { "meta_title": "C" },
        "https://example.com/d": { "status": 200 },
    }));

    let statuses: Vec<_> = results.iter().map(|r| r.status.as_str()).collect();
    assert_eq!(statuses, vec![UNKNOWN_STATUS, UNKNOWN_STATUS, UNKNOWN_STATUS, "200"]);
}

#[test]
fn malformed_mapping_entries_are_dropped() {
    let results = normalized(json!({
        "https://example.com/ok": { "status": "indexed", "heading_count": 0 },
        "https://example.com/negative": { "status": "indexed", "heading_count": -1 },
        "https://example.com/fraction": { "internal_link_count": 1.5 },
        "https://example.com/text-count": { "heading_count": "3" },
        "https://example.com/not-object": "indexed",
        "": { "status": "indexed" },
        "https://example.com/null-count": { "heading_count": null },
    }));

    let urls: Vec<_> = results.urls().collect();
    assert_eq!(
        urls,
        vec!["https://example.com/ok", "https://example.com/null-count"]
    );
    assert_eq!(results.get("https://example.com/ok").unwrap().heading_count, Some(0));
    assert_eq!(
        results.get("https://example.com/null-count").unwrap().heading_count,
        None
    );
}

#[test]
fn wrongly_typed_optional_fields_are_treated_as_absent() {
    let results = normalized(json!({
        "https://example.com/": {
            "status": "indexed",
            "meta_title": 7,
            "meta_description": ["x"],
            "internal_links": ["https://example.com/a", 3, null],
        },
    }));

    let record = results.get("https://example.com/").unwrap();
    assert_eq!(record.meta_title, None);
    assert_eq!(record.meta_description, None);
    assert_eq!(
        record.internal_links,
        Some(vec!["https://example.com/a".to_string()])
    );
}

#[test]
fn empty_collections_normalize_to_empty_mapping() {
    assert!(normalized(json!([])).is_empty());
    assert!(normalized(json!({})).is_empty());
    assert!(normalized(json!(null)).is_empty());
    assert!(normalize(&RawResults::Missing).unwrap().is_empty());
}

#[test]
fn wrong_top_level_shape_is_an_error() {
    let err = normalize(&RawResults::from_value(json!("https://example.com/"))).unwrap_err();
    assert_eq!(err.found, "string");

    let err = normalize(&RawResults::from_value(json!(12))).unwrap_err();
    assert_eq!(err.found, "number");
}

#[test]
fn linked_records_resolve_within_the_set() {
    let results = normalized(json!({
        "https://example.com/": {
            "status": "indexed",
            "internal_links": [
                "https://example.com/about",
                "https://elsewhere.example.org/",
                "https://example.com/missing",
            ],
        },
        "https://example.com/about": { "status": "indexed" },
    }));

    let linked: Vec<_> = results
        .linked_records("https://example.com/")
        .into_iter()
        .map(|record| record.url.as_str())
        .collect();
    assert_eq!(linked, vec!["https://example.com/about"]);
    assert!(results.linked_records("https://example.com/about").is_empty());
    assert!(results.linked_records("https://example.com/nope").is_empty());
}
