use log::{error, info, warn};
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::auth::CredentialStore;
use crate::client::handle_client;
use crate::config::{ServeMode, ShellConfig};
use crate::error::ShellError;
use crate::server::SessionRouter;

pub struct Server {
    router: Arc<SessionRouter>,
    config: Arc<ShellConfig>,
}

impl Server {
    pub fn new(config: ShellConfig, credentials: Box<dyn CredentialStore>) -> Result<Self, ShellError> {
        let router = SessionRouter::new(&config, credentials)?;

        Ok(Self {
            router: Arc::new(router),
            config: Arc::new(config),
        })
    }

    /// Serves sessions until the console session ends or the listener fails.
    pub async fn start(&self) -> Result<(), ShellError> {
        match self.config.mode {
            ServeMode::Console => self.serve_console().await,
            ServeMode::Tcp => self.serve_tcp().await,
        }
    }

    async fn serve_console(&self) -> Result<(), ShellError> {
        info!("Serving a console session");

        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        handle_client(
            reader,
            writer,
            &self.router,
            "console",
            self.config.max_command_length,
        )
        .await?;
        Ok(())
    }

    async fn serve_tcp(&self) -> Result<(), ShellError> {
        let socket = self.config.control_socket();
        let listener = TcpListener::bind(&socket).await?;
        info!(
            "Listening on {} (max {} sessions)",
            socket, self.config.max_sessions
        );

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    let router = Arc::clone(&self.router);
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each connection so accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &addr.to_string(), &router, &config).await {
                            warn!("Failed to handle connection {}: {}", addr, e);
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

/// Runs one TCP connection as a shell session.
async fn handle_connection(
    stream: TcpStream,
    peer: &str,
    router: &SessionRouter,
    config: &ShellConfig,
) -> std::io::Result<()> {
    info!("Connection from {}", peer);

    let (read_half, mut write_half) = stream.into_split();
    let result = handle_client(
        BufReader::new(read_half),
        &mut write_half,
        router,
        peer,
        config.max_command_length,
    )
    .await;

    let _ = write_half.shutdown().await;
    info!("Connection {} closed", peer);
    result
}
