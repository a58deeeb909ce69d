use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use tournament_builder::access::Principal;
use tournament_builder::config::{AppConfig, TournamentSettings};
use tournament_builder::domain::Team;
use tournament_builder::services::server::build_app;
use tournament_builder::services::{TournamentService, TournamentSetup};

const TOKEN: &str = "let-me-in";

fn app(dir: &TempDir) -> Router {
    let config = AppConfig::default()
        .with_tournament(TournamentSettings::default())
        .with_database_path(dir.path().join("tournament.db").to_string_lossy().to_string())
        .with_admin_token(TOKEN);

    let teams = (1..=8)
        .map(|i| Team::new(i, format!("Team {}", i), vec![format!("Player {}", i)]))
        .collect();
    let start = NaiveDate::from_ymd_opt(2026, 4, 11)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let setup = TournamentSetup {
        shuffle: false,
        ..TournamentSetup::starting_at(start)
    };

    let mut service = TournamentService::new(config.clone()).unwrap();
    service.initialize(&Principal::admin(), teams, &setup).unwrap();
    build_app(service, config)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn lists_teams_and_matches() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, teams) = send(&app, get("/api/teams")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(teams.as_array().unwrap().len(), 8);
    assert_eq!(teams[0]["teamName"], "Team 1");
    assert_eq!(teams[0]["group"], "A");

    let (status, matches) = send(&app, get("/api/matches?stage=group")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(matches.as_array().unwrap().len(), 12);
    assert_eq!(matches[0]["scheduledTime"], "2026-04-11T09:00:00");
    assert_eq!(matches[0]["status"], "scheduled");

    let (status, _) = send(&app, get("/api/matches?stage=playoff")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn single_match_and_missing_match() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, m) = send(&app, get("/api/matches/7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(m["matchId"], 7);
    assert_eq!(m["summary"], "Upcoming: Team 2 vs Team 4");

    let (status, body) = send(&app, get("/api/matches/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Match 99 not found");
}

#[tokio::test]
async fn viewer_cannot_post_results() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    let result = json!({ "team1Score": 3, "team2Score": 1, "winnerId": 1 });

    let (status, _) = send(&app, post("/api/matches/1/result", result.clone(), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, post("/api/matches/1/result", result.clone(), Some("wrong"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, m) = send(&app, get("/api/matches/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(m["status"], "scheduled");
}

#[tokio::test]
async fn admin_records_result_and_standings_follow() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    let result = json!({ "team1Score": 3, "team2Score": 1, "winnerId": 3 });

    let (status, m) = send(&app, post("/api/matches/1/result", result, Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(m["winnerName"], "Team 3");
    assert_eq!(m["status"], "completed");

    let (status, standings) = send(&app, get("/api/standings?group=a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(standings.as_array().unwrap().len(), 4);
    assert_eq!(standings[0]["teamId"], 3);
    assert_eq!(standings[0]["rank"], 1);
    assert_eq!(standings[0]["points"], 2);

    let missing = json!({ "team1Score": 1, "team2Score": 0 });
    let (status, _) = send(&app, post("/api/matches/404/result", missing, Some(TOKEN))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn out_of_range_score_is_a_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    let huge = json!({ "team1Score": i32::MAX, "team2Score": 0, "winnerId": 1 });

    let (status, body) = send(&app, post("/api/matches/2/result", huge, Some(TOKEN))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid score"));

    let (_, m) = send(&app, get("/api/matches/2")).await;
    assert_eq!(m["status"], "scheduled");
}

#[tokio::test]
async fn next_stage_requires_finished_group_stage() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, _) = send(&app, post("/api/stages/next", json!({}), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, post("/api/stages/next", json!({}), Some(TOKEN))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not finished"));

    for match_id in 1..=12 {
        let result = json!({ "team1Score": 2, "team2Score": 0, "winnerId": null });
        let uri = format!("/api/matches/{}/result", match_id);
        let (status, _) = send(&app, post(&uri, result, Some(TOKEN))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, generated) = send(&app, post("/api/stages/next?parallelMatches=4", json!({}), Some(TOKEN))).await;
    assert_eq!(status, StatusCode::CREATED);
    let generated = generated.as_array().unwrap();
    assert_eq!(generated.len(), 4);
    assert!(generated.iter().all(|m| m["stage"] == "quarterfinal"));
    assert_eq!(generated[0]["scheduledTime"], generated[3]["scheduledTime"]);
}

#[tokio::test]
async fn commands_are_interpreted_and_gated() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, body) = send(&app, post("/api/commands", json!({ "text": "standings group b" }), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interpretation"]["action"], "GET_STANDINGS");
    assert_eq!(body["outcome"]["kind"], "standings");
    assert_eq!(body["outcome"]["standings"].as_array().unwrap().len(), 4);

    let (status, _) = send(&app, post("/api/commands", json!({ "text": "match 2 score 1-0" }), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, post("/api/commands", json!({ "text": "match 2 score 1-0" }), Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["kind"], "matchUpdated");
    assert_eq!(body["outcome"]["updated"]["winnerName"], "Draw");

    let (status, body) = send(&app, post("/api/commands", json!({ "text": "sing a song" }), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interpretation"]["action"], "UNKNOWN");
    assert_eq!(body["outcome"]["kind"], "notUnderstood");
}

#[tokio::test]
async fn team_search() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, body) = send(&app, get("/api/teams/search?name=team%205")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team"]["teamId"], 5);
    assert_eq!(body["matches"].as_array().unwrap().len(), 3);

    let (status, _) = send(&app, get("/api/teams/search?name=nobody")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/api/teams/search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
