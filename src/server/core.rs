use log::{error, info, warn};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol::responses::{TOO_MANY_CONNECTIONS, error_response};
use crate::server::session::handle_client;
use crate::service::ObjectService;

/// Book-keeping for one connected client
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub connected_at: Instant,
    pub commands_handled: u64,
}

pub type ClientRegistry = Arc<Mutex<HashMap<SocketAddr, ClientSession>>>;

pub struct Server {
    client_registry: ClientRegistry,
    listener: TcpListener,
    service: Arc<ObjectService>,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Prepare the storage roots and bind the listener.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let roots = config.root_paths().prepare()?;
        info!(
            "Browsable root: {} (drafts: {}, published: {})",
            roots.browsable_root().display(),
            roots.draft_pages_root().display(),
            roots.published_pages_root().display()
        );

        let socket = config.listen_socket();
        let listener = TcpListener::bind(socket.as_str()).await.map_err(|e| {
            error!("Failed to bind to {}: {}", socket, e);
            e
        })?;
        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self {
            client_registry: Arc::new(Mutex::new(HashMap::new())),
            listener,
            service: Arc::new(ObjectService::from_config(&config, roots)),
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn service(&self) -> Arc<ObjectService> {
        Arc::clone(&self.service)
    }

    /// Accept connections until the task is dropped.
    pub async fn start(&self) {
        info!(
            "Starting pagefs server on {} (max {} clients)",
            self.config.listen_socket(),
            self.config.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let client_registry = Arc::clone(&self.client_registry);
                    let service = Arc::clone(&self.service);
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_new_client(stream, addr, client_registry, service, config).await
                        {
                            warn!("Failed to handle client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Registers a new client, enforcing the client limit, and runs its session.
async fn handle_new_client(
    mut stream: TcpStream,
    client_addr: SocketAddr,
    client_registry: ClientRegistry,
    service: Arc<ObjectService>,
    config: Arc<ServerConfig>,
) -> Result<(), std::io::Error> {
    let admitted = {
        let mut clients = client_registry.lock().await;
        if clients.len() >= config.max_clients {
            false
        } else {
            clients.insert(
                client_addr,
                ClientSession {
                    connected_at: Instant::now(),
                    commands_handled: 0,
                },
            );
            info!(
                "Accepted client: {} ({}/{} clients)",
                client_addr,
                clients.len(),
                config.max_clients
            );
            true
        }
    };

    // registry lock is released before writing to the socket
    if !admitted {
        warn!("Rejecting {}: client limit reached", client_addr);
        let reply = error_response(
            TOO_MANY_CONNECTIONS,
            "too_many_connections",
            "too many connections, try again later",
        );
        stream.write_all(reply.as_bytes()).await?;
        return Ok(());
    }

    let result = handle_client(stream, client_addr, &client_registry, service, &config).await;

    if let Some(session) = client_registry.lock().await.remove(&client_addr) {
        info!(
            "Client {} disconnected after {} commands ({:.1?})",
            client_addr,
            session.commands_handled,
            session.connected_at.elapsed()
        );
    }

    result
}
