use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};

use crate::common::{ClientCommand, ServerEvent};
use crate::error::ChatError;
use crate::history::HistoryApi;
use crate::network::gateway::{ConnectionHandle, SessionGateway};

/// Line-delimited-JSON TCP front for the messaging core: one session per
/// socket, commands in, events out.
pub struct ChatServer {
    listener: TcpListener,
    gateway: Arc<SessionGateway>,
    history: Arc<HistoryApi>,
}

impl ChatServer {
    pub async fn bind(
        addr: &str,
        gateway: Arc<SessionGateway>,
        history: Arc<HistoryApi>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        log::info!("listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            gateway,
            history,
        })
    }

    /// Actual bound address, useful when binding port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop; each socket gets its own session task.
    pub async fn run(self) -> io::Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let gateway = self.gateway.clone();
            let history = self.history.clone();
            tokio::spawn(async move {
                if let Err(err) = handle_session(stream, gateway, history).await {
                    log::debug!("session from {peer} ended: {err}");
                }
            });
        }
    }
}

async fn handle_session(
    stream: TcpStream,
    gateway: Arc<SessionGateway>,
    history: Arc<HistoryApi>,
) -> io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    // The first frame must authenticate the session.
    let Some(first) = lines.next_line().await? else {
        return Ok(());
    };
    let token = match serde_json::from_str::<ClientCommand>(&first) {
        Ok(ClientCommand::Auth { token }) => token,
        _ => {
            let err = ChatError::Auth("first frame must be an auth command".into());
            return write_event(&mut write_half, &ServerEvent::error(&err)).await;
        }
    };

    let mut handle = match gateway.connect(&token).await {
        Ok(handle) => handle,
        Err(err) => {
            return write_event(&mut write_half, &ServerEvent::error(&err)).await;
        }
    };
    let ready = ServerEvent::Ready {
        user_id: handle.user_id().to_string(),
    };
    write_event(&mut write_half, &ready).await?;

    // Socket close or error ends the loop; dropping the handle unregisters
    // the connection from presence as part of the same teardown.
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let reply = match serde_json::from_str::<ClientCommand>(&line) {
                    Ok(command) => handle_command(command, &handle, &history),
                    Err(err) => {
                        log::warn!("malformed frame from {}: {err}", handle.user_id());
                        ServerEvent::Error {
                            code: "validation".to_string(),
                            message: format!("malformed command: {err}"),
                        }
                    }
                };
                write_event(&mut write_half, &reply).await?;
            }
            event = handle.recv() => {
                let Some(event) = event else { break };
                write_event(&mut write_half, &event).await?;
            }
        }
    }

    Ok(())
}

fn handle_command(
    command: ClientCommand,
    handle: &ConnectionHandle,
    history: &HistoryApi,
) -> ServerEvent {
    match command {
        ClientCommand::Auth { .. } => ServerEvent::Error {
            code: "validation".to_string(),
            message: "session is already authenticated".to_string(),
        },
        ClientCommand::Send {
            receiver_id,
            content,
            booking_id,
        } => {
            if let Some(booking_id) = booking_id {
                log::debug!("send from {} correlated with booking {booking_id}", handle.user_id());
            }
            match handle.send_message(&receiver_id, &content) {
                Ok(message) => ServerEvent::Sent { message },
                Err(err) => ServerEvent::error(&err),
            }
        }
        ClientCommand::History {
            sender_id,
            receiver_id,
        } => match history.fetch_history(handle.user_id(), &sender_id, &receiver_id) {
            Ok(messages) => ServerEvent::History { messages },
            Err(err) => ServerEvent::error(&err),
        },
    }
}

async fn write_event(writer: &mut OwnedWriteHalf, event: &ServerEvent) -> io::Result<()> {
    let mut frame = serde_json::to_vec(event).map_err(io::Error::other)?;
    frame.push(b'\n');
    writer.write_all(&frame).await
}
