use axum::extract::Query;
use axum::http::Uri;
use catalog_api::routes::params::{AssignedQuery, Pagination, ProductQuery, parse_id_list};
use uuid::Uuid;

#[test]
fn parse_id_list_accepts_comma_separated_ids() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let raw = format!("{a},{b}");

    let ids = parse_id_list(&raw).expect("valid list");
    assert_eq!(ids, vec![a, b]);
}

#[test]
fn parse_id_list_skips_empty_segments() {
    let a = Uuid::new_v4();
    let raw = format!(" {a} , ,");

    let ids = parse_id_list(&raw).expect("valid list");
    assert_eq!(ids, vec![a]);
}

#[test]
fn parse_id_list_rejects_malformed_ids() {
    assert!(parse_id_list("not-a-uuid").is_err());
}

#[test]
fn product_query_treats_empty_filter_as_absent() {
    let query = ProductQuery {
        page: None,
        per_page: None,
        tags: Some(String::new()),
        categories: None,
    };

    assert_eq!(query.tag_ids().expect("empty filter"), None);
    assert_eq!(query.category_ids().expect("absent filter"), None);
}

// Query structs must survive the actual axum extractor, where
// serde_urlencoded sees every value as a string.
#[test]
fn product_query_deserializes_from_request_uri() {
    let tag = Uuid::new_v4();
    let uri: Uri = format!("/api/products?page=2&per_page=5&tags={tag}")
        .parse()
        .expect("valid uri");

    let Query(query) = Query::<ProductQuery>::try_from_uri(&uri).expect("query accepted");
    assert_eq!(query.page, Some(2));
    assert_eq!(query.per_page, Some(5));
    assert_eq!(query.tag_ids().expect("valid filter"), Some(vec![tag]));
    assert_eq!(query.pagination().normalize(), (2, 5, 5));
}

#[test]
fn assigned_query_deserializes_from_request_uri() {
    let uri: Uri = "/api/tags?assigned_only=true&page=1&per_page=10"
        .parse()
        .expect("valid uri");

    let Query(query) = Query::<AssignedQuery>::try_from_uri(&uri).expect("query accepted");
    assert_eq!(query.assigned_only, Some(true));
    assert_eq!(query.pagination().normalize(), (1, 10, 0));
}

#[test]
fn bare_pagination_deserializes_from_request_uri() {
    let uri: Uri = "/api/wishlists?page=3&per_page=7".parse().expect("valid uri");

    let Query(pagination) = Query::<Pagination>::try_from_uri(&uri).expect("query accepted");
    assert_eq!(pagination.normalize(), (3, 7, 14));
}

#[test]
fn pagination_normalizes_out_of_range_values() {
    let pagination = Pagination {
        page: Some(0),
        per_page: Some(1000),
    };
    let (page, per_page, offset) = pagination.normalize();
    assert_eq!(page, 1);
    assert_eq!(per_page, 100);
    assert_eq!(offset, 0);

    let defaults = Pagination {
        page: None,
        per_page: None,
    };
    assert_eq!(defaults.normalize(), (1, 20, 0));
}
