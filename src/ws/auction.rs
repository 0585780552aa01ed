//! Live auction feed: state changes, clock ticks, notices and debounced
//! player search, one task per socket.

use std::time::Duration;

use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::{handle, Message, Session};
use futures::StreamExt;
use sqlx::PgPool;
use tokio::sync::{broadcast::error::RecvError, mpsc};

use crate::auction::AuctionEngine;
use crate::config::settings;
use crate::db::player_repo;
use crate::debounce::Debouncer;
use crate::error::AppError;
use crate::http::auth::JwtAuth;
use crate::protocol::{ClientMsg, ServerMsg};

pub async fn ws_auction(
    req: HttpRequest,
    body: web::Payload,
    db_pool: web::Data<PgPool>,
    engine: web::Data<AuctionEngine>,
) -> Result<HttpResponse, Error> {
    // 1 · browsers can't set headers on a WS upgrade, so the JWT rides in ?token=
    let token = req
        .query_string()
        .split('&')
        .find_map(|kv| kv.strip_prefix("token="))
        .ok_or(AppError::Unauthorized("token missing"))?;
    let auth = JwtAuth::from_bearer(token)?;

    // 2 · handshake
    let (response, mut session, mut ws_stream) = handle(&req, body)?;

    // 3 · subscribe before taking the snapshot so nothing falls in between
    let mut feed = engine.subscribe();
    let initial = engine.snapshot().await;

    let db = db_pool.get_ref().clone();
    let quiet = Duration::from_millis(settings().search_debounce_ms);

    actix::spawn(async move {
        let (found_tx, mut found_rx) = mpsc::unbounded_channel::<ServerMsg>();
        let mut debounce = Debouncer::new(quiet);

        if send(&mut session, &ServerMsg::State { state: initial }).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                // client → server
                frame = ws_stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMsg>(&text) {
                        Ok(ClientMsg::Search { query }) => {
                            let query = query.trim().to_string();
                            if query.is_empty() {
                                debounce.cancel();
                                let _ = found_tx.send(ServerMsg::SearchResults {
                                    query,
                                    players: Vec::new(),
                                });
                            } else {
                                let db = db.clone();
                                let tx = found_tx.clone();
                                debounce.call(async move {
                                    match player_repo::search(&db, &query, settings().search_limit).await {
                                        Ok(players) => {
                                            let _ = tx.send(ServerMsg::SearchResults { query, players });
                                        }
                                        Err(e) => log::warn!("player search failed: {e}"),
                                    }
                                });
                            }
                        }
                        Err(e) => log::debug!("ignoring client frame from {}: {e}", auth.email),
                    },
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                },
                // engine → client
                msg = feed.recv() => match msg {
                    Ok(msg) => {
                        if send(&mut session, &msg).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::debug!("auction feed lagged for {}, skipped {skipped}", auth.email);
                    }
                    Err(RecvError::Closed) => break,
                },
                // search results → client
                Some(msg) = found_rx.recv() => {
                    if send(&mut session, &msg).await.is_err() {
                        break;
                    }
                }
            }
        }

        debounce.cancel();
        let _ = session.close(None).await;
        log::info!("auction WS closed for {}", auth.email);
    });

    Ok(response)
}

async fn send(session: &mut Session, msg: &ServerMsg) -> Result<(), actix_ws::Closed> {
    match serde_json::to_string(msg) {
        Ok(json) => session.text(json).await,
        Err(e) => {
            log::error!("could not encode {msg:?}: {e}");
            Ok(())
        }
    }
}
