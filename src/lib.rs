pub mod cancel;
pub mod chat;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod roster;
pub mod session;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use config::Config;
use error::ServerError;
use roster::RosterHandle;

/// Binds the listener and serves connections until the process is
/// killed. Generalizes the teacher crate's `rocket()` / `rocket_with_db()`
/// factory functions (`src/lib.rs`) into an async equivalent: build the
/// shared state, then hand off to an accept loop.
pub async fn serve(config: Config) -> Result<(), ServerError> {
    let (addr, _roster, accept_handle) = bind_and_spawn(config).await?;
    info!(%addr, "relay-chat listening");

    tokio::select! {
        _ = accept_handle => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }
    Ok(())
}

/// Binds the listener and spawns the roster actor plus the accept loop,
/// returning the bound address (useful when `config.port == 0`, letting
/// the OS pick a free port) and a handle to each. Split out of [`serve`]
/// so integration tests can stand up a real server on an ephemeral port
/// without going through the process-lifetime `ctrl_c` wait.
pub async fn bind_and_spawn(
    config: Config,
) -> Result<(SocketAddr, RosterHandle, JoinHandle<()>), ServerError> {
    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })?;

    let roster = roster::spawn(config);
    let accept_handle = tokio::spawn(accept_loop(listener, roster.clone()));
    Ok((local_addr, roster, accept_handle))
}

async fn accept_loop(listener: TcpListener, roster: RosterHandle) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let roster = roster.clone();
                tokio::spawn(connection::handle(stream, addr.to_string(), roster));
            }
            Err(err) => {
                tracing::warn!(%err, "failed to accept connection");
            }
        }
    }
}
