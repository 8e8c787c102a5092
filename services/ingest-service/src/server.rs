use gsm_common::bind_listener;
use std::{io, net::SocketAddr};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::app;
use crate::config::ServerConfig;
use crate::state::AppState;

/// A server accepting connections in the background.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<io::Result<()>>,
}

/// Binds the configured address and starts serving. Port 0 picks a free port;
/// see [`ServerHandle::local_addr`].
pub async fn start(config: ServerConfig) -> io::Result<ServerHandle> {
    let listener = bind_listener(config.host, config.port).await?;
    let local_addr = listener.local_addr()?;

    let state = AppState::new(config.log_policy);
    let router = app::build_router(state, config.body_limit_bytes);
    let (shutdown, stop_requested) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            // A dropped handle counts as a stop request.
            let _ = stop_requested.await;
        })
        .await
    });

    Ok(ServerHandle {
        local_addr,
        shutdown,
        task,
    })
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn stop(self) -> io::Result<()> {
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(io::Error::other(err)),
        }?;
        tracing::info!(address = %self.local_addr, "server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::net::{IpAddr, Ipv4Addr};

    fn local_config() -> ServerConfig {
        ServerConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn serves_until_stopped() {
        let handle = start(local_config()).await.unwrap();
        let base = format!("http://{}", handle.local_addr());
        let client = reqwest::Client::new();

        let health: Value = client
            .get(format!("{base}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health, json!({ "status": "ok" }));

        let missing = client.get(format!("{base}/ingest")).send().await.unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

        for _ in 0..10 {
            let response = client
                .post(format!("{base}/ingest"))
                .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
                .json(&json!({ "station": "field-3", "temp_c": 4.25 }))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), reqwest::StatusCode::OK);
            let body: Value = response.json().await.unwrap();
            assert_eq!(body, json!({ "ok": true }));
        }

        let bad = client
            .post(format!("{base}/ingest"))
            .body("not-json")
            .send()
            .await
            .unwrap();
        assert_eq!(bad.status(), reqwest::StatusCode::BAD_REQUEST);

        let addr = handle.local_addr();
        handle.stop().await.unwrap();
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }
}
