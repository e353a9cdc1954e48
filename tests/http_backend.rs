use std::{sync::Arc, time::Duration};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

use regression_dashboard::{
    Algorithm, ClientErr, DashboardConfig, DisplayState, HttpBackend, MetricsController,
    PredictionClient, PredictionInput,
};

/// Serves a single canned JSON response and hands back the raw request.
async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;

        let reason = if status == 200 { "OK" } else { "Internal Server Error" };
        let response = format!(
            "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;
        request
    });

    (format!("http://{addr}"), handle)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Accepts connections and reads their requests, but never answers.
async fn serve_silently() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            held.push(stream);
        }
    });

    (format!("http://{addr}"), handle)
}

fn backend(base_url: &str) -> Arc<HttpBackend> {
    Arc::new(HttpBackend::new(&DashboardConfig::new(base_url, None)).unwrap())
}

#[tokio::test]
async fn metrics_over_http() {
    let (url, server) = serve_once(
        200,
        r#"{"metrics":{"r2_score":0.82,"mse":1500000},"sample_predictions":[{"index":0,"actual":200000,"predicted":210000}]}"#,
    )
    .await;

    let mut dashboard = MetricsController::new(backend(&url));
    dashboard.select_algorithm(Algorithm::Linear);
    dashboard.settle().await;

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /metrics?algorithm=linear "));

    assert!(matches!(dashboard.state(), DisplayState::Ready(_)));
    assert_eq!(dashboard.metrics().and_then(|m| m.r2_score), Some(0.82));
    assert_eq!(dashboard.chart().points()[0].predicted, 210_000.0);
}

#[tokio::test]
async fn metrics_http_500_is_error_state() {
    let (url, server) = serve_once(500, r#"{"error":"boom"}"#).await;

    let mut dashboard = MetricsController::new(backend(&url));
    dashboard.select_algorithm(Algorithm::Tree);
    dashboard.settle().await;
    server.await.unwrap();

    assert_eq!(dashboard.state(), &DisplayState::Error);
    assert_eq!(dashboard.metrics(), None);
    assert!(dashboard.chart().is_empty());
}

#[tokio::test]
async fn malformed_body_is_error_state() {
    let (url, server) = serve_once(200, r#"{"metrics":"soon"}"#).await;

    let mut dashboard = MetricsController::new(backend(&url));
    dashboard.select_algorithm(Algorithm::Linear);
    dashboard.settle().await;
    server.await.unwrap();

    assert_eq!(dashboard.state(), &DisplayState::Error);
    assert!(dashboard.last_error().unwrap().contains("/metrics"));
}

#[tokio::test]
async fn predict_over_http() {
    let (url, server) = serve_once(200, r#"{"predicted_price":305000.0}"#).await;

    let mut client = PredictionClient::new(backend(&url));
    let result = client
        .predict(Algorithm::Tree, &PredictionInput::default())
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /predict "));
    assert!(request.contains(r#""algorithm":"tree""#));
    assert!(request.contains(r#""area_sqft":1200.0"#));
    assert_eq!(result.predicted_price, 305_000.0);
    assert_eq!(result.display(), "Predicted Price: $305,000");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut client = PredictionClient::new(backend(&format!("http://{addr}")));
    let err = client
        .predict(Algorithm::Linear, &PredictionInput::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientErr::Network(_)));
    assert_eq!(client.state(), &DisplayState::Error);
}

#[tokio::test]
async fn train_over_http() {
    let (url, server) = serve_once(
        200,
        r#"{"status":"success","message":"tree model trained!","metrics":{"r2_score":0.9,"mse":12.5}}"#,
    )
    .await;

    let trained = backend(&url).train(Algorithm::Tree).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /train?algorithm=tree "));
    assert_eq!(trained.message, "tree model trained!");
    assert_eq!(trained.metrics.mse, Some(12.5));
}

#[tokio::test]
async fn request_timeout_is_a_network_failure() {
    let (url, server) = serve_silently().await;
    let config = DashboardConfig::new(&url, Some(Duration::from_secs(1)));
    let backend = Arc::new(HttpBackend::new(&config).unwrap());

    let mut dashboard = MetricsController::new(Arc::clone(&backend));
    dashboard.select_algorithm(Algorithm::Linear);
    tokio::time::timeout(Duration::from_secs(10), dashboard.settle())
        .await
        .unwrap();
    assert_eq!(dashboard.state(), &DisplayState::Error);
    assert_eq!(dashboard.in_flight(), 0);

    let mut client = PredictionClient::new(backend);
    let err = tokio::time::timeout(
        Duration::from_secs(10),
        client.predict(Algorithm::Tree, &PredictionInput::default()),
    )
    .await
    .unwrap()
    .unwrap_err();

    match err {
        ClientErr::Network(e) => assert!(e.is_timeout()),
        other => panic!("expected a network failure, got {other:?}"),
    }
    assert_eq!(client.state(), &DisplayState::Error);

    server.abort();
}
