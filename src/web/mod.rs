//! Read-only HTTP feed for a running farm: the latest frame, the full frame
//! history, and a server-sent event stream of frames as they are produced.

use std::{
    convert::Infallible,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, info, warn};

use crate::{
    engine::SimulatedClock,
    events::SimEvent,
    farm::FarmView,
    scenario::Scenario,
    snapshot::SnapshotWriter,
};

#[derive(Clone, Serialize)]
pub struct FarmFrame {
    pub tick: u64,
    pub now: u64,
    pub view: FarmView,
    pub events: Vec<SimEvent>,
    pub completed: bool,
}

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub scenario: String,
    pub total_ticks: u64,
    pub frame: Option<FarmFrame>,
    pub completed: bool,
}

#[derive(Clone)]
struct AppState {
    broadcaster: broadcast::Sender<String>,
    latest_frame: Arc<Mutex<Option<FarmFrame>>>,
    frames: Arc<Mutex<Vec<FarmFrame>>>,
    total_ticks: u64,
    scenario_name: String,
    simulation_done: Arc<AtomicBool>,
}

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub ticks: u64,
    pub tick_ms: u64,
    pub snapshot_dir: Option<PathBuf>,
    pub host: String,
    pub port: u16,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        ticks,
        tick_ms,
        snapshot_dir,
        host,
        port,
    } = config;

    let scenario_name = scenario.name.clone();
    let mut farm = scenario.build_farm()?;
    if let Some(dir) = snapshot_dir {
        farm.set_persistence(SnapshotWriter::new(dir)?);
    }

    let (tx, _) = broadcast::channel::<String>(512);
    let latest_frame: Arc<Mutex<Option<FarmFrame>>> = Arc::new(Mutex::new(None));
    let frames: Arc<Mutex<Vec<FarmFrame>>> = Arc::new(Mutex::new(Vec::new()));
    let simulation_done = Arc::new(AtomicBool::new(false));

    let latest_for_sim = latest_frame.clone();
    let frames_for_sim = frames.clone();
    let done_for_sim = simulation_done.clone();
    let tx_for_sim = tx.clone();
    let scenario_label = scenario_name.clone();

    let sim_handle = tokio::task::spawn_blocking(move || {
        let mut clock = SimulatedClock::default();
        let mut tick = 0;
        farm.run_for(&mut clock, ticks, tick_ms, |farm, summary| {
            tick += 1;
            let frame = FarmFrame {
                tick,
                now: summary.now,
                view: farm.view(),
                events: summary.events.clone(),
                completed: tick == ticks,
            };
            publish_frame(&latest_for_sim, &frames_for_sim, &tx_for_sim, frame);
        });
        done_for_sim.store(true, Ordering::SeqCst);
    });

    let state = Arc::new(AppState {
        broadcaster: tx.clone(),
        latest_frame: latest_frame.clone(),
        frames: frames.clone(),
        total_ticks: ticks,
        scenario_name: scenario_label.clone(),
        simulation_done: simulation_done.clone(),
    });

    tokio::spawn(async move {
        match sim_handle.await {
            Ok(()) => info!(scenario = %scenario_label, "simulation completed"),
            Err(err) => error!(error = ?err, "simulation task failed"),
        }
    });

    let router = Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/frames", get(all_frames))
        .route("/api/events", get(stream_events))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    info!(%addr, "farm feed live (Ctrl+C to stop)");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn publish_frame(
    latest: &Mutex<Option<FarmFrame>>,
    frames: &Mutex<Vec<FarmFrame>>,
    tx: &broadcast::Sender<String>,
    frame: FarmFrame,
) {
    {
        let mut guard = latest.lock().expect("latest frame lock poisoned");
        *guard = Some(frame.clone());
    }
    match serde_json::to_string(&frame) {
        Ok(payload) => {
            let _ = tx.send(payload);
        }
        Err(err) => warn!(error = %err, "failed to encode frame"),
    }
    frames.lock().expect("frames lock poisoned").push(frame);
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down farm feed");
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    let frame = state
        .latest_frame
        .lock()
        .expect("latest frame lock poisoned")
        .clone();
    Json(StateEnvelope {
        scenario: state.scenario_name.clone(),
        total_ticks: state.total_ticks,
        frame,
        completed: state.simulation_done.load(Ordering::SeqCst),
    })
}

#[derive(Serialize)]
struct FramesResponse {
    scenario: String,
    total_ticks: u64,
    completed: bool,
    frames: Vec<FarmFrame>,
}

async fn all_frames(State(state): State<Arc<AppState>>) -> Json<FramesResponse> {
    let frames = state.frames.lock().expect("frames lock poisoned").clone();
    Json(FramesResponse {
        scenario: state.scenario_name.clone(),
        total_ticks: state.total_ticks,
        completed: state.simulation_done.load(Ordering::SeqCst),
        frames,
    })
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
