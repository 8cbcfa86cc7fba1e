use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use imperium_lib::notify::BUILDING_COMPLETED;
use imperium_service::{router, run_scan};
use imperium_service_shared::test_utils::{test_state, TestWorld};

fn server(world: &TestWorld) -> TestServer {
    TestServer::new(router(world.state.clone())).unwrap()
}

fn fighter() -> Value {
    json!({
        "name": "Jaeger",
        "ship_class": "FIGHTER",
        "modules": [
            { "module_type_id": 1, "level": 2, "slot_position": 0 },
            { "module_type_id": 2, "level": 1, "slot_position": 1 }
        ]
    })
}

#[tokio::test]
async fn calculate_reports_stats_without_a_player() {
    let world = test_state();
    let server = server(&world);

    let response = server
        .post("/api/v1/blueprints/calculate")
        .json(&json!({
            "ship_class": "FIGHTER",
            "modules": fighter()["modules"]
        }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["build_time_minutes"], 15);
    assert_eq!(body["combat_rating"], "MITTEL");
    assert_eq!(body["stats"]["hull"], 50.0);
    assert_eq!(body["research"]["is_valid"], false);
}

#[tokio::test]
async fn calculate_rejects_level_above_max() {
    let world = test_state();
    let server = server(&world);

    let response = server
        .post("/api/v1/blueprints/calculate")
        .json(&json!({
            "ship_class": "FIGHTER",
            "modules": [{ "module_type_id": 7, "level": 5, "slot_position": 0 }]
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["type"], "/problems/invalid-request");
    assert!(body["instance"].is_string());
}

#[tokio::test]
async fn blueprint_lifecycle() {
    let world = test_state();
    let server = server(&world);
    let base = format!("/api/v1/players/{}/blueprints", world.player.id);

    let created = server.post(&base).json(&fighter()).await;
    created.assert_status(StatusCode::CREATED);
    let id = created.json::<Value>()["id"].as_i64().unwrap();

    let listed = server.get(&base).await;
    listed.assert_status_ok();
    assert_eq!(listed.json::<Value>().as_array().unwrap().len(), 1);

    let shown = server.get(&format!("{base}/{id}")).await;
    shown.assert_status_ok();
    let body = shown.json::<Value>();
    assert_eq!(body["name"], "Jaeger");
    assert_eq!(body["report"]["build_time_minutes"], 15);

    let mut renamed = fighter();
    renamed["name"] = json!("Abfangjaeger");
    let updated = server.put(&format!("{base}/{id}")).json(&renamed).await;
    updated.assert_status_ok();
    assert_eq!(updated.json::<Value>()["name"], "Abfangjaeger");

    server
        .delete(&format!("{base}/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("{base}/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_blueprint_name_is_bad_request() {
    let world = test_state();
    let server = server(&world);
    let mut body = fighter();
    body["name"] = json!("   ");

    let response = server
        .post(&format!("/api/v1/players/{}/blueprints", world.player.id))
        .json(&body)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["detail"]
        .as_str()
        .unwrap()
        .contains("name"));
}

#[tokio::test]
async fn ship_order_without_research_is_gated() {
    let world = test_state();
    let server = server(&world);
    let player = world.player.id;

    let created = server
        .post(&format!("/api/v1/players/{player}/blueprints"))
        .json(&fighter())
        .await;
    let blueprint_id = created.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .post(&format!("/api/v1/players/{player}/construction"))
        .json(&json!({
            "kind": "ship",
            "planet_id": world.planet.id,
            "target_id": blueprint_id,
            "quantity": 2
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body = response.json::<Value>();
    assert_eq!(body["type"], "/problems/gated");
    assert_eq!(body["errors"]["kind"], "missing_research");
}

#[tokio::test]
async fn foreign_planet_is_forbidden() {
    let world = test_state();
    let server = server(&world);
    let other = world.state.store().create_player("Bo", None).unwrap();

    let response = server
        .post(&format!("/api/v1/players/{}/construction", other.id))
        .json(&json!({
            "kind": "building",
            "planet_id": world.planet.id,
            "target_id": 1
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["type"], "/problems/forbidden");
}

#[tokio::test]
async fn unknown_player_is_not_found() {
    let world = test_state();
    let server = server(&world);

    server
        .get("/api/v1/players/42/research")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scan_completes_buildings_and_unlocks_research() {
    let world = test_state();
    let server = server(&world);
    let player = world.player.id;

    let queued = server
        .post(&format!("/api/v1/players/{player}/construction"))
        .json(&json!({
            "kind": "building",
            "planet_id": world.planet.id,
            "target_id": 1,
            "quantity": 2
        }))
        .await;
    queued.assert_status(StatusCode::CREATED);
    assert_eq!(queued.json::<Value>()["required_build_time_minutes"], 60);

    let gated = server
        .post(&format!("/api/v1/players/{player}/research"))
        .json(&json!({ "research_id": 1 }))
        .await;
    gated.assert_status(StatusCode::FORBIDDEN);

    let report = run_scan(&world.state, Utc::now() + Duration::days(1))
        .await
        .expect("scan");
    assert_eq!(report.completed, 1);
    let events = world.sink.for_player(player).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, BUILDING_COMPLETED);

    let started = server
        .post(&format!("/api/v1/players/{player}/research"))
        .json(&json!({ "research_id": 1 }))
        .await;
    started.assert_status(StatusCode::CREATED);
    assert_eq!(started.json::<Value>()["max_progress"], 600);

    let again = server
        .post(&format!("/api/v1/players/{player}/research"))
        .json(&json!({ "research_id": 1 }))
        .await;
    again.assert_status(StatusCode::CONFLICT);

    let status = server
        .get(&format!("/api/v1/players/{player}/research"))
        .await
        .json::<Value>();
    let metallurgie = status
        .as_array()
        .unwrap()
        .iter()
        .find(|view| view["research_id"] == 1)
        .unwrap();
    assert_eq!(metallurgie["status"], "in_progress");

    server
        .delete(&format!("/api/v1/players/{player}/research"))
        .await
        .assert_status_ok();
    server
        .delete(&format!("/api/v1/players/{player}/research"))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn cancelled_order_is_gone_from_the_queue() {
    let world = test_state();
    let server = server(&world);
    let player = world.player.id;

    let queued = server
        .post(&format!("/api/v1/players/{player}/construction"))
        .json(&json!({ "kind": "building", "planet_id": world.planet.id, "target_id": 3 }))
        .await;
    let id = queued.json::<Value>()["id"].as_i64().unwrap();

    let cancelled = server
        .delete(&format!("/api/v1/players/{player}/construction/building/{id}"))
        .await;
    cancelled.assert_status_ok();
    assert_eq!(cancelled.json::<Value>()["target_id"], 3);

    let listed = server
        .get(&format!("/api/v1/players/{player}/construction"))
        .await
        .json::<Value>();
    assert!(listed.as_array().unwrap().is_empty());

    server
        .delete(&format!("/api/v1/players/{player}/construction/building/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_and_request_ids() {
    let world = test_state();
    let server = server(&world);

    let ready = server.get("/health/ready").await;
    ready.assert_status_ok();
    assert_eq!(ready.json::<Value>()["status"], "ok");

    let live = server.get("/health/live").await;
    live.assert_status_ok();
    assert!(live.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn blueprint_with_pending_ship_orders_is_locked() {
    let world = test_state();
    let server = server(&world);
    let player = world.player.id;
    let transport = json!({
        "name": "Frachter",
        "ship_class": "TRANSPORT",
        "modules": [
            { "module_type_id": 2, "level": 1, "slot_position": 0 },
            { "module_type_id": 8, "level": 2, "slot_position": 1 }
        ]
    });

    let created = server
        .post(&format!("/api/v1/players/{player}/blueprints"))
        .json(&transport)
        .await;
    let id = created.json::<Value>()["id"].as_i64().unwrap();
    server
        .post(&format!("/api/v1/players/{player}/construction"))
        .json(&json!({ "kind": "ship", "planet_id": world.planet.id, "target_id": id }))
        .await
        .assert_status(StatusCode::CREATED);

    let mut armed = transport.clone();
    armed["modules"] = json!([{ "module_type_id": 9, "level": 5, "slot_position": 0 }]);
    let response = server
        .put(&format!("/api/v1/players/{player}/blueprints/{id}"))
        .json(&armed)
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["errors"]["kind"], "blueprint_in_use");
}
