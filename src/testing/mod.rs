use axum::Router;
use url::Url;

/// Serve `router` on an ephemeral localhost port for the rest of the test runtime.
pub async fn spawn_router(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server");
    });

    Url::parse(&format!("http://{}/", addr)).expect("mock url")
}
