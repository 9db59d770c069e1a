//! Serve an axum router in the background for HTTP client tests

use std::net::{SocketAddr, TcpListener};
use std::thread;

use axum::Router;
use tokio::sync::oneshot;

/// An axum router served on its own thread and runtime.
///
/// Blocking clients can call it from plain `#[test]` functions. The
/// server stops when this value is dropped.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    #[must_use]
    pub fn spawn(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
        listener
            .set_nonblocking(true)
            .expect("Failed to set test server non-blocking");
        let addr = listener.local_addr().expect("Failed to read test server address");
        let (tx, rx) = oneshot::channel::<()>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to build test server runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)
                    .expect("Failed to adopt test server listener");
                axum::serve(listener, router)
                    .with_graceful_shutdown(async {
                        let _ = rx.await;
                    })
                    .await
                    .expect("Test server failed");
            });
        });

        Self {
            addr,
            shutdown: Some(tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://127.0.0.1:<port>`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// An `http://` address nothing listens on
#[must_use]
pub fn unused_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    drop(listener);
    format!("http://{addr}")
}
