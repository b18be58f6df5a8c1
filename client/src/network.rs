//! Network channel worker.
//!
//! A dedicated thread runs a single-threaded tokio runtime and owns the UDP
//! socket. The frame loop talks to it only through two unbounded channels:
//! [`ChannelHandle::post`] never blocks and [`ChannelHandle::poll`] never
//! waits, so no frame ever stalls on the network.

use crate::error::ClientError;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Envelope, IncomingMessage, OutgoingMessage, MAX_DATAGRAM_SIZE};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{sleep, sleep_until, Instant};

pub struct ChannelHandle {
    outgoing: Option<mpsc::UnboundedSender<OutgoingMessage>>,
    incoming: mpsc::UnboundedReceiver<Envelope>,
    worker: Option<JoinHandle<()>>,
}

impl ChannelHandle {
    pub fn spawn(fake_ping_ms: u64) -> Result<Self, ClientError> {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();

        let worker = std::thread::Builder::new()
            .name("network-channel".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!("Failed to start network runtime: {}", e);
                        let _ = incoming_tx.send(Envelope::with_error(
                            IncomingMessage::Disconnect,
                            e.to_string(),
                        ));
                        return;
                    }
                };
                runtime.block_on(run_channel(outgoing_rx, incoming_tx, fake_ping_ms));
            })?;

        Ok(Self {
            outgoing: Some(outgoing_tx),
            incoming: incoming_rx,
            worker: Some(worker),
        })
    }

    /// Fire-and-forget.
    pub fn post(&self, message: OutgoingMessage) {
        let Some(outgoing) = &self.outgoing else {
            return;
        };
        if let Err(e) = outgoing.send(message) {
            warn!("Dropping {}: {}", e.0.tag(), ClientError::ChannelClosed);
        }
    }

    pub fn poll(&mut self) -> Option<Envelope> {
        self.incoming.try_recv().ok()
    }

    /// Closes the outgoing side and waits for the worker to wind down.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.outgoing = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Network worker panicked");
            }
        }
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.close();
    }
}

struct Link {
    socket: UdpSocket,
    server_addr: SocketAddr,
}

enum ChannelEvent {
    Outgoing(Option<OutgoingMessage>),
    Datagram(std::io::Result<usize>),
    SendDue,
    DeliverDue,
}

/// FIFO of values held back until their own release instant, stamped on
/// arrival.
struct DelayQueue<T> {
    delay: Duration,
    entries: VecDeque<(Instant, T)>,
}

impl<T> DelayQueue<T> {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            entries: VecDeque::new(),
        }
    }

    fn push(&mut self, value: T) {
        self.entries.push_back((Instant::now() + self.delay, value));
    }

    fn next_release(&self) -> Option<Instant> {
        self.entries.front().map(|(at, _)| *at)
    }

    fn pop_due(&mut self, now: Instant) -> Option<T> {
        match self.entries.front() {
            Some((at, _)) if *at <= now => self.entries.pop_front().map(|(_, value)| value),
            _ => None,
        }
    }
}

async fn run_channel(
    mut outgoing: mpsc::UnboundedReceiver<OutgoingMessage>,
    incoming: mpsc::UnboundedSender<Envelope>,
    fake_ping_ms: u64,
) {
    let mut link: Option<Link> = None;
    let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];
    // Half the fake round trip on each direction
    let one_way = Duration::from_millis(fake_ping_ms / 2);
    let mut to_send: DelayQueue<OutgoingMessage> = DelayQueue::new(one_way);
    let mut to_deliver: DelayQueue<Envelope> = DelayQueue::new(one_way);

    loop {
        let send_at = to_send.next_release();
        let deliver_at = to_deliver.next_release();
        let event = tokio::select! {
            message = outgoing.recv() => ChannelEvent::Outgoing(message),
            received = recv_datagram(link.as_ref(), &mut buffer) => ChannelEvent::Datagram(received),
            _ = wait_until(send_at) => ChannelEvent::SendDue,
            _ = wait_until(deliver_at) => ChannelEvent::DeliverDue,
        };

        match event {
            ChannelEvent::Outgoing(None) => break,
            ChannelEvent::Outgoing(Some(message)) => {
                if let OutgoingMessage::SessionInit { endpoint, .. } = &message {
                    match open_link(endpoint).await {
                        Ok(opened) => {
                            info!("Channel open to {}", opened.server_addr);
                            link = Some(opened);
                            deliver(&incoming, Envelope::new(IncomingMessage::Connect));
                        }
                        Err(e) => {
                            error!("Failed to open channel to {}: {}", endpoint, e);
                            deliver(
                                &incoming,
                                Envelope::with_error(IncomingMessage::Disconnect, e.to_string()),
                            );
                            continue;
                        }
                    }
                }

                if link.is_none() {
                    debug!("No channel yet, dropping {}", message.tag());
                    continue;
                }
                to_send.push(message);
            }
            ChannelEvent::SendDue => {
                let now = Instant::now();
                while let Some(message) = to_send.pop_due(now) {
                    let Some(active) = link.as_ref() else {
                        break;
                    };
                    if let Err(e) = send_message(active, &message).await {
                        warn!("Failed to send {}: {}", message.tag(), e);
                    }
                }
            }
            ChannelEvent::DeliverDue => {
                let now = Instant::now();
                while let Some(envelope) = to_deliver.pop_due(now) {
                    deliver(&incoming, envelope);
                }
            }
            ChannelEvent::Datagram(Ok(len)) => match deserialize::<Envelope>(&buffer[..len]) {
                Ok(envelope) => to_deliver.push(envelope),
                Err(e) => warn!("Failed to deserialize datagram: {}", e),
            },
            ChannelEvent::Datagram(Err(e)) => {
                error!("Error receiving datagram: {}", e);
                deliver(
                    &incoming,
                    Envelope::with_error(
                        IncomingMessage::Log {
                            message: "receive failed".to_string(),
                        },
                        e.to_string(),
                    ),
                );
                sleep(Duration::from_millis(10)).await;
            }
        }
    }

    if let Some(active) = link.as_ref() {
        while let Some((_, message)) = to_send.entries.pop_front() {
            if let Err(e) = send_message(active, &message).await {
                warn!("Failed to send {}: {}", message.tag(), e);
            }
        }
    }
    for (_, envelope) in to_deliver.entries.drain(..) {
        deliver(&incoming, envelope);
    }
    if link.is_some() {
        deliver(&incoming, Envelope::new(IncomingMessage::Disconnect));
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn open_link(endpoint: &str) -> Result<Link, ClientError> {
    let server_addr = tokio::net::lookup_host(endpoint)
        .await?
        .next()
        .ok_or_else(|| ClientError::UnresolvedEndpoint(endpoint.to_string()))?;
    let bind_addr = if server_addr.is_ipv4() {
        "0.0.0.0:0"
    } else {
        "[::]:0"
    };
    let socket = UdpSocket::bind(bind_addr).await?;
    socket.connect(server_addr).await?;
    Ok(Link {
        socket,
        server_addr,
    })
}

async fn send_message(link: &Link, message: &OutgoingMessage) -> Result<(), ClientError> {
    let data = serialize(message)?;
    link.socket.send(&data).await?;
    Ok(())
}

async fn recv_datagram(link: Option<&Link>, buffer: &mut [u8]) -> std::io::Result<usize> {
    match link {
        Some(link) => link.socket.recv(buffer).await,
        None => std::future::pending().await,
    }
}

fn deliver(incoming: &mpsc::UnboundedSender<Envelope>, envelope: Envelope) {
    if incoming.send(envelope).is_err() {
        debug!("Simulation side is gone, dropping envelope");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn wait_for(handle: &mut ChannelHandle, timeout: Duration) -> Option<Envelope> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(envelope) = handle.poll() {
                return Some(envelope);
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        None
    }

    #[test]
    fn test_poll_is_empty_before_init() {
        let mut handle = ChannelHandle::spawn(0).unwrap();
        assert!(handle.poll().is_none());
        handle.shutdown();
    }

    #[test]
    fn test_messages_before_init_are_dropped() {
        let mut handle = ChannelHandle::spawn(0).unwrap();
        handle.post(OutgoingMessage::GameStart {
            player_id: "p".to_string(),
        });
        assert!(wait_for(&mut handle, Duration::from_millis(50)).is_none());
        handle.shutdown();
    }

    #[test]
    fn test_unresolvable_endpoint_reports_fault() {
        let mut handle = ChannelHandle::spawn(0).unwrap();
        handle.post(OutgoingMessage::SessionInit {
            endpoint: "not an endpoint".to_string(),
            player_id: "p".to_string(),
            player_name: "P".to_string(),
        });

        let envelope = wait_for(&mut handle, Duration::from_secs(2));
        assert!(envelope.map(|e| e.is_fault()).unwrap_or(false));
    }
}
