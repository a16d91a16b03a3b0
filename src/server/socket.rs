//! WebSocket bridge: the real-time action channel.
//!
//! On connect the server immediately pushes the current snapshot. Each
//! incoming action is applied under the match's engine lock; success
//! broadcasts the new snapshot to the whole room, failure answers only
//! the sender with an error frame.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures::StreamExt;
use serde::Deserialize;

use super::hub::MatchHub;
use super::messages::{IncomingMessage, OutgoingMessage};

#[derive(Debug, Deserialize)]
pub(super) struct ConnectQuery {
    token: String,
}

/// `GET /ws/games/{game_id}?token=...`
pub(super) async fn connect(
    hub: web::Data<MatchHub>,
    path: web::Path<String>,
    query: web::Query<ConnectQuery>,
    req: HttpRequest,
    body: web::Payload,
) -> impl Responder {
    let game_id = path.into_inner();

    let player = match hub.authorize(&game_id, &query.token).await {
        Ok(player) => player,
        Err(err) => {
            return HttpResponse::Unauthorized()
                .json(serde_json::json!({ "error": err.code(), "message": err.to_string() }));
        }
    };
    let room = match hub.room(&game_id).await {
        Ok(room) => room,
        Err(err) => {
            return HttpResponse::NotFound()
                .json(serde_json::json!({ "error": err.code(), "message": err.to_string() }));
        }
    };

    let Ok((response, mut session, mut stream)) = actix_ws::handle(&req, body) else {
        return HttpResponse::InternalServerError().finish();
    };

    let mut updates = room.broadcast.subscribe();
    let hub = hub.clone();
    actix_web::rt::spawn(async move {
        log::info!(
            "player '{}' ({}) connected to match {}",
            player.display_name,
            player.seat.as_str(),
            game_id
        );

        // Push the current snapshot before accepting any action.
        let snapshot = {
            let engine = room.engine.lock().await;
            OutgoingMessage::snapshot(engine.state()).to_json()
        };
        if session.text(snapshot).await.is_err() {
            return;
        }

        'sesh: loop {
            tokio::select! {
                biased;
                update = updates.recv() => match update {
                    Ok(json) => if session.text(json).await.is_err() { break 'sesh },
                    // Lagged receivers just miss intermediate snapshots.
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue 'sesh,
                    Err(_) => break 'sesh,
                },
                msg = stream.next() => match msg {
                    Some(Ok(actix_ws::Message::Text(text))) => {
                        let reply = handle_action(&hub, &game_id, &player, &text).await;
                        if let Some(frame) = reply {
                            if session.text(frame).await.is_err() { break 'sesh }
                        }
                    }
                    Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                    Some(Err(_)) => break 'sesh,
                    None => break 'sesh,
                    _ => continue 'sesh,
                },
            }
        }

        log::info!(
            "player '{}' disconnected from match {}",
            player.display_name,
            game_id
        );
    });

    response
}

/// Apply one action; returns an error frame for the sender, or nothing
/// when the broadcast already carries the update.
async fn handle_action(
    hub: &MatchHub,
    game_id: &str,
    player: &super::hub::Player,
    raw: &str,
) -> Option<String> {
    let message: IncomingMessage = match serde_json::from_str(raw) {
        Ok(message) => message,
        Err(err) => {
            return Some(
                OutgoingMessage::error("INVALID_TARGET", format!("malformed message: {err}"))
                    .to_json(),
            );
        }
    };

    match hub.apply_action(game_id, player, message).await {
        Ok(_) => None,
        Err(err) => Some(OutgoingMessage::error(err.code(), err.to_string()).to_json()),
    }
}
