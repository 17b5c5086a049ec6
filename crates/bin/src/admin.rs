//! Read-only admin HTTP surface over the live bot registry.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use botdata::{BotActor, BotRegistry};
use common::{BotId, PlayerId, TeamId};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
struct AdminState {
    registry: Arc<BotRegistry>,
}

/// Counts of live bots.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct Stats {
    pub live: usize,
    pub wanderers: usize,
    pub active: usize,
    pub match_participants: usize,
    pub alliance: usize,
    pub horde: usize,
    pub neutral: usize,
}

impl Stats {
    fn collect(actors: &[BotActor]) -> Self {
        let mut stats = Stats {
            live: actors.len(),
            ..Default::default()
        };
        for actor in actors {
            stats.wanderers += usize::from(actor.wanderer);
            stats.active += usize::from(actor.active);
            stats.match_participants += usize::from(actor.match_participant);
            match actor.team {
                TeamId::Alliance => stats.alliance += 1,
                TeamId::Horde => stats.horde += 1,
                TeamId::Neutral => stats.neutral += 1,
            }
        }
        stats
    }
}

pub fn router(registry: Arc<BotRegistry>) -> Router {
    Router::new()
        .route("/bots", get(list_bots))
        .route("/bots/{id}", get(bot_by_id))
        .route("/bots/by-name/{name}", get(bot_by_name))
        .route("/owners/{owner}/bots", get(owned_bots))
        .route("/stats", get(stats))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(AdminState { registry })
}

fn found(actor: Option<BotActor>) -> Response {
    match actor {
        Some(actor) => Json(actor).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_bots(State(state): State<AdminState>) -> Json<Vec<BotActor>> {
    let mut actors = state.registry.snapshot();
    actors.sort_unstable_by_key(|a| a.id);
    Json(actors)
}

async fn bot_by_id(State(state): State<AdminState>, Path(id): Path<BotId>) -> Response {
    found(state.registry.find(id))
}

async fn bot_by_name(State(state): State<AdminState>, Path(name): Path<String>) -> Response {
    found(state.registry.find_by_name(&name))
}

async fn owned_bots(State(state): State<AdminState>, Path(owner): Path<PlayerId>) -> Json<Vec<BotId>> {
    Json(state.registry.owned_by(owner))
}

async fn stats(State(state): State<AdminState>) -> Json<Stats> {
    Json(Stats::collect(&state.registry.snapshot()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use common::BotClass;
    use tower::ServiceExt;

    fn actor(id: BotId, name: &str, team: TeamId) -> BotActor {
        BotActor {
            id,
            name: name.to_string(),
            class: BotClass::Warrior,
            race: Some(1),
            faction: 1,
            team,
            region: 0,
            level: 60,
            archetype: Some(70001),
            owner: None,
            wanderer: true,
            active: true,
            match_participant: false,
        }
    }

    fn registry() -> Arc<BotRegistry> {
        let registry = Arc::new(BotRegistry::new());
        registry.register(actor(80000, "Anduin", TeamId::Alliance));
        registry.register(actor(80001, "Garrosh", TeamId::Horde));
        registry.set_owner(80001, Some(7));
        registry
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router(registry())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_bot_lookup() {
        let (status, body) = get_json("/bots/80001").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Garrosh");

        let (status, _) = get_json("/bots/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_lookup_by_name_ignores_case() {
        let (status, body) = get_json("/bots/by-name/anduin").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 80000);
    }

    #[tokio::test]
    async fn test_owned_bots() {
        let (status, body) = get_json("/owners/7/bots").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([80001]));

        let (_, body) = get_json("/owners/8/bots").await;
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_stats() {
        let (_, body) = get_json("/stats").await;
        assert_eq!(body["live"], 2);
        assert_eq!(body["alliance"], 1);
        assert_eq!(body["horde"], 1);
        assert_eq!(body["match_participants"], 0);
    }
}
