use super::*;
use approx::assert_relative_eq;
use surface_graph::primitives::{create_cube, create_grid};
use surface_graph::GraphBuildError;

fn events() -> broadcast::Sender<ReadinessEvent> {
    broadcast::channel(8).0
}

fn cube_context(id: &str) -> GraphContext {
    GraphContext::spawn(id, create_cube(DVec3::ONE, false), WeldTolerance::default(), events())
}

#[tokio::test]
async fn test_context_becomes_ready() {
    let context = cube_context("cube");
    assert!(context.has_worker());
    assert_eq!(context.readiness().wait().await, ContextState::Ready);
    assert!(context.is_ready());

    let summary = context.summary().unwrap();
    assert_eq!(summary.vertex_count, 8);
    assert_eq!(summary.edge_count, 18);
    assert_eq!(context.nearest_vertex(DVec3::new(1.1, 1.1, 1.1)).unwrap(), Some(6));

    let path = context.shortest_path(0, 1).unwrap();
    assert_relative_eq!(path.length, 1.0);
}

/// A context whose build is queued but whose worker has not started yet.
fn gated_context(
    id: &str,
    mesh: MeshData,
) -> (GraphContext, mpsc::UnboundedReceiver<WorkerRequest>) {
    let status = StatusCell::new(id.to_string(), events());
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(WorkerRequest::Build {
        mesh,
        tolerance: WeldTolerance::default(),
    })
    .unwrap();
    let context = GraphContext {
        status,
        requests: Some(tx),
        worker: None,
    };
    (context, rx)
}

#[tokio::test]
async fn test_queries_never_block_while_building() {
    let (mut context, rx) = gated_context("cube", create_cube(DVec3::ONE, false));
    assert_eq!(context.state(), ContextState::Building);
    assert!(!context.is_ready());
    assert_eq!(context.nearest_vertex(DVec3::ZERO).unwrap_err(), ContextError::NotReady);
    assert_eq!(context.shortest_path(0, 1).unwrap_err(), ContextError::NotReady);
    assert_eq!(context.summary().unwrap_err(), ContextError::NotReady);
    assert_eq!(context.request_path(0, 1).unwrap_err(), ContextError::NotReady);

    // Releasing the worker lets the queued build through
    context.worker = Some(worker::spawn(Arc::clone(&context.status), rx).unwrap());
    assert_eq!(context.readiness().wait().await, ContextState::Ready);
    assert_eq!(context.nearest_vertex(DVec3::ZERO).unwrap(), Some(0));
    context.dispose();
    context.join();
}

#[tokio::test]
async fn test_dispose_cancels_build() {
    let grid = create_grid(400, 400, 0.01);
    let mut context = GraphContext::spawn("grid", grid, WeldTolerance::default(), events());
    let handle = context.readiness();
    context.dispose();
    assert_eq!(handle.wait().await, ContextState::Disposed);
    assert_eq!(context.state(), ContextState::Disposed);
    assert_eq!(context.model().unwrap_err(), ContextError::Disposed);
    context.join();
}

#[tokio::test]
async fn test_dispose_is_idempotent() {
    let mut context = cube_context("cube");
    context.readiness().wait().await;
    context.dispose();
    context.dispose();
    context.join();
    context.join();
    assert_eq!(context.state(), ContextState::Disposed);
    assert_eq!(context.shortest_path(0, 1).unwrap_err(), ContextError::Disposed);
}

#[tokio::test]
async fn test_query_snapshot_survives_dispose() {
    let mut context = cube_context("cube");
    context.readiness().wait().await;
    let model = context.model().unwrap();
    context.dispose();
    assert!(model.shortest_path(0, 6).is_ok());
}

#[tokio::test]
async fn test_empty_mesh_fails() {
    let tx = events();
    let mut rx = tx.subscribe();
    let context = GraphContext::spawn("empty", MeshData::default(), WeldTolerance::default(), tx);
    let expected = ContextState::Failed(ContextError::Build(GraphBuildError::EmptyMesh));
    assert_eq!(context.readiness().wait().await, expected);
    assert_eq!(context.nearest_vertex(DVec3::ZERO).unwrap_err(), ContextError::NotReady);

    let event = rx.recv().await.unwrap();
    assert_eq!(event.context_id, "empty");
    assert_eq!(event.state, expected);
}

#[tokio::test]
async fn test_spawn_failure_is_terminal() {
    let tx = events();
    let mut rx = tx.subscribe();
    let status = StatusCell::new("broken".to_string(), tx);
    let error = ContextError::WorkerSpawn("no threads".to_string());
    let context = GraphContext::failed(status, error);
    assert!(!context.has_worker());

    let expected = ContextState::Failed(ContextError::WorkerSpawn("no threads".to_string()));
    assert_eq!(context.state(), expected);
    assert_eq!(context.readiness().wait().await, expected);
    assert_eq!(rx.recv().await.unwrap().state, expected);
    assert_eq!(context.request_path(0, 1).unwrap_err(), ContextError::NotReady);
}

#[tokio::test]
async fn test_path_on_worker() {
    let context = cube_context("cube");
    context.readiness().wait().await;
    let answer = context.request_path(0, 6).unwrap();
    let path = answer.await.unwrap().unwrap();
    assert_relative_eq!(path.length, 1.0 + 2f64.sqrt(), epsilon = 1e-12);

    let answer = context.request_path(0, 99).unwrap();
    assert!(matches!(answer.await.unwrap(), Err(ContextError::Path(_))));
}

#[tokio::test]
async fn test_path_request_after_dispose() {
    let mut context = cube_context("cube");
    context.readiness().wait().await;
    context.dispose();
    assert_eq!(context.request_path(0, 6).unwrap_err(), ContextError::Disposed);
}
