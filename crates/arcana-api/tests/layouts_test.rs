//! Integration tests for the layout registry routes.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;

use common::{RecordingAdGateway, ScriptedReadingService};

#[tokio::test]
async fn test_list_layouts_returns_the_whole_catalog() {
    let app = common::build_test_app(
        ScriptedReadingService::ready(),
        Arc::new(RecordingAdGateway::default()),
    );

    let (status, json) = common::get_json(app, "/api/v1/layouts").await;

    assert_eq!(status, StatusCode::OK);
    let layouts = json.as_array().unwrap();
    assert_eq!(layouts.len(), 5);
    let ids: Vec<&str> = layouts
        .iter()
        .map(|layout| layout["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"three_card"));
    assert!(ids.contains(&"celtic_cross"));
}

#[tokio::test]
async fn test_get_layout_returns_schema_with_positions() {
    let app = common::build_test_app(
        ScriptedReadingService::ready(),
        Arc::new(RecordingAdGateway::default()),
    );

    let (status, json) = common::get_json(app, "/api/v1/layouts/celtic_cross").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "celtic_cross");
    assert_eq!(json["card_count"], 10);
    assert_eq!(json["opening_rule"], "in_order");
    assert_eq!(json["positions"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_get_unknown_layout_falls_back_to_default() {
    let app = common::build_test_app(
        ScriptedReadingService::ready(),
        Arc::new(RecordingAdGateway::default()),
    );

    let (status, json) = common::get_json(app, "/api/v1/layouts/no_such_layout").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "card_of_day");
    assert_eq!(json["card_count"], 1);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = common::build_test_app(
        ScriptedReadingService::ready(),
        Arc::new(RecordingAdGateway::default()),
    );

    let (status, json) = common::get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}
