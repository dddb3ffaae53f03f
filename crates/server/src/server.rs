use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{admin, journeys, salary};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves HTTP Basic credentials to an active user and hands it to the
/// handlers as an `Extension<engine::User>`.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|err| {
            tracing::error!("authentication failed: {err}");
            StatusCode::UNAUTHORIZED
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Builds the HTTP API around `engine`. Every route requires Basic auth.
pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };

    Router::new()
        .route("/journey/start", post(journeys::start))
        .route("/journey/{id}", get(journeys::detail))
        .route("/journey/{id}/expense", post(journeys::expense_new))
        .route("/journey/{id}/expenses", get(journeys::expense_list))
        .route("/journey/{id}/location", post(journeys::location))
        .route("/journey/{id}/end", post(journeys::end))
        .route("/journeys", get(journeys::list))
        .route("/salary/{user_id}", get(salary::get))
        .route("/admin/salary/{user_id}", post(salary::update))
        .route("/admin/salary/{user_id}/payout", post(salary::payout))
        .route("/admin/reset-financial-data", post(admin::reset))
        .route("/admin/summary", get(admin::summary))
        .route(
            "/admin/users/{username}/deactivate",
            post(admin::deactivate_user),
        )
        .route("/admin/vehicles", post(admin::vehicle_new))
        .route("/vehicles", get(admin::vehicles))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}
