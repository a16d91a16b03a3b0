//! REST surface: create / join / start / state.
//!
//! Thin handlers over the hub; every rejection is reported as
//! `{error, message}` with the taxonomy's wire code.

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use serde_json::json;

use super::hub::{ApiError, MatchHub};
use super::socket;
use crate::core::{Actor, GameConfig};

/// HTTP + WebSocket server for the match hub.
pub struct Server;

impl Server {
    /// Run the server on `addr` (e.g. `"0.0.0.0:3001"`).
    pub async fn run(addr: &str) -> std::io::Result<()> {
        let hub = web::Data::new(MatchHub::default());
        log::info!("starting game server on {addr}");
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(hub.clone())
                .route("/api/health", web::get().to(health))
                .route("/api/games", web::post().to(create_game))
                .route("/api/games/{game_id}/join", web::post().to(join_game))
                .route("/api/games/{game_id}/start", web::post().to(start_game))
                .route("/api/games/{game_id}", web::get().to(get_state))
                .route("/ws/games/{game_id}", web::get().to(socket::connect))
        })
        .workers(4)
        .bind(addr)?
        .run()
        .await
    }
}

fn error_response(err: &ApiError) -> HttpResponse {
    let body = json!({ "error": err.code(), "message": err.to_string() });
    HttpResponse::build(
        actix_web::http::StatusCode::from_u16(err.http_status())
            .unwrap_or(actix_web::http::StatusCode::BAD_REQUEST),
    )
    .json(body)
}

/// Bearer token from the Authorization header.
fn extract_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "error": "NOT_AUTHORIZED", "message": message }))
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateGameRequest {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    seat: Option<Actor>,
    #[serde(flatten)]
    config: GameConfig,
}

async fn create_game(
    hub: web::Data<MatchHub>,
    body: web::Json<CreateGameRequest>,
) -> impl Responder {
    let body = body.into_inner();
    let display_name = body.display_name.unwrap_or_else(|| "Player".to_string());
    let seat = body.seat.unwrap_or(Actor::Facilitator);

    let (player, state) = hub.create_match(body.config, display_name, seat).await;
    HttpResponse::Created().json(json!({
        "gameId": player.game_id,
        "token": player.token,
        "player": player,
        "state": state,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinGameRequest {
    display_name: String,
    seat: Actor,
}

async fn join_game(
    hub: web::Data<MatchHub>,
    path: web::Path<String>,
    body: web::Json<JoinGameRequest>,
) -> impl Responder {
    let game_id = path.into_inner();
    let body = body.into_inner();
    match hub.join(&game_id, body.display_name, body.seat).await {
        Ok(player) => HttpResponse::Ok().json(json!({
            "gameId": player.game_id,
            "token": player.token,
            "seat": player.seat,
            "displayName": player.display_name,
        })),
        Err(err) => error_response(&err.into()),
    }
}

async fn start_game(
    hub: web::Data<MatchHub>,
    path: web::Path<String>,
    req: HttpRequest,
) -> impl Responder {
    let game_id = path.into_inner();
    let Some(token) = extract_token(&req) else {
        return unauthorized("missing Authorization header");
    };
    match hub.start(&game_id, &token).await {
        Ok(state) => HttpResponse::Ok().json(json!({ "state": state })),
        Err(err) => error_response(&err),
    }
}

async fn get_state(
    hub: web::Data<MatchHub>,
    path: web::Path<String>,
    req: HttpRequest,
) -> impl Responder {
    let game_id = path.into_inner();
    let Some(token) = extract_token(&req) else {
        return unauthorized("missing Authorization header");
    };
    match hub.snapshot(&game_id, &token).await {
        Ok(state) => HttpResponse::Ok().json(json!({ "state": state })),
        Err(err) => error_response(&err),
    }
}
