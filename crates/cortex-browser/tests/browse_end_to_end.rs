use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
use cortex_browser::{
    FetchOutcome, FieldRegistry, Navigator, NavigatorSettings, PanelId, Status,
};
use cortex_core::{ApiClient, ApiConfig, Gender};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

async fn users() -> Json<Value> {
    Json(json!([{"uid": 1, "name": "Ann"}]))
}

async fn user(Path(uid): Path<u64>) -> Result<Json<Value>, StatusCode> {
    match uid {
        1 => Ok(Json(json!({
            "uid": 1,
            "name": "Ann",
            "gender": "m",
            "birthday": "1990/04/01"
        }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn snapshots(Path(uid): Path<u64>) -> Result<Json<Value>, StatusCode> {
    match uid {
        1 => Ok(Json(json!([{"id": 9, "datetime": "2023-01-01"}]))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn snapshot(Path((uid, sid)): Path<(u64, u64)>) -> Result<Json<Value>, StatusCode> {
    match (uid, sid) {
        (1, 9) => Ok(Json(json!({
            "ss_id": 9,
            "datetime": "2023-01-01",
            "fields": ["feelings", "image_color", "pose"]
        }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn field(Path((uid, sid, name)): Path<(u64, u64, String)>) -> Result<Json<Value>, StatusCode> {
    if (uid, sid) != (1, 9) {
        return Err(StatusCode::NOT_FOUND);
    }
    match name.as_str() {
        "feelings" => Ok(Json(json!({
            "hunger": 0.1,
            "thirst": 0.2,
            "exhaustion": 0.3,
            "happiness": 0.4
        }))),
        "image_color" => Ok(Json(json!({
            "image_color": "http://127.0.0.1/users/1/snapshots/9/image_color/data",
            "width": 640,
            "height": 480
        }))),
        "pose" => Ok(Json(json!({
            "translation": {"x": 0.1, "y": 0.2, "z": 0.3},
            "rotation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}
        }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn spawn_api() -> SocketAddr {
    let app = Router::new()
        .route("/users", get(users))
        .route("/users/:uid", get(user))
        .route("/users/:uid/snapshots", get(snapshots))
        .route("/users/:uid/snapshots/:sid", get(snapshot))
        .route("/users/:uid/snapshots/:sid/:field", get(field));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub api");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn navigator_for(addr: SocketAddr) -> (Navigator, mpsc::Receiver<FetchOutcome>) {
    let client = ApiClient::new(ApiConfig::new(addr.ip().to_string(), addr.port()))
        .expect("http client");
    Navigator::new(
        Arc::new(client),
        FieldRegistry::with_defaults(),
        NavigatorSettings {
            panel_width_percent: 15,
            clear_snapshot_on_user_change: false,
        },
    )
}

async fn settle(nav: &mut Navigator, rx: &mut mpsc::Receiver<FetchOutcome>) {
    while nav.view().is_loading() {
        let outcome = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("fetch outcome in time")
            .expect("channel open");
        nav.apply(outcome);
    }
}

#[tokio::test]
async fn drills_down_from_users_to_rendered_fields() {
    let addr = spawn_api().await;
    let (mut nav, mut rx) = navigator_for(addr).await;

    nav.open_users();
    settle(&mut nav, &mut rx).await;
    assert_eq!(nav.view().users.labels().collect::<Vec<_>>(), vec!["Ann"]);

    assert!(nav.activate(PanelId::Users, 0));
    settle(&mut nav, &mut rx).await;
    assert_eq!(
        nav.view().snapshots.labels().collect::<Vec<_>>(),
        vec!["2023-01-01"]
    );

    assert!(nav.activate(PanelId::Snapshots, 0));
    settle(&mut nav, &mut rx).await;

    let view = nav.view();
    let card = view.user_card.as_ref().expect("user card");
    assert_eq!(card.name, "Ann");
    assert_eq!(card.gender, Gender::Male);
    assert_eq!(card.birthday, "1990/04/01");

    let feelings = view.feelings.as_ref().expect("feelings");
    assert_eq!(
        feelings.rows().map(|(_, value)| value.to_string()),
        [
            "0.100".to_string(),
            "0.200".to_string(),
            "0.300".to_string(),
            "0.400".to_string()
        ]
    );

    let image = view.background.as_ref().expect("color image");
    assert_eq!(
        image.url,
        "http://127.0.0.1/users/1/snapshots/9/image_color/data"
    );
    assert_eq!(image.dimensions(), Some((640, 480)));
    assert!(matches!(view.status, Status::Loaded { .. }));
}

#[tokio::test]
async fn missing_user_surfaces_http_status() {
    let addr = spawn_api().await;
    let (mut nav, mut rx) = navigator_for(addr).await;

    nav.open_snapshots(cortex_core::Id::from(5_u64));
    settle(&mut nav, &mut rx).await;

    match &nav.view().status {
        Status::Error { path, message, .. } => {
            assert_eq!(path, "users/5/snapshots");
            assert!(message.contains("404"), "message was {message}");
        }
        other => panic!("expected error status, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_api_is_reported_not_swallowed() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let (mut nav, mut rx) = navigator_for(addr).await;
    nav.open_users();
    settle(&mut nav, &mut rx).await;
    assert!(matches!(nav.view().status, Status::Error { .. }));
    assert!(nav.view().users.is_empty());
}
