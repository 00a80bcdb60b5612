//! # Listener Service
//!
//! Dedicated accept loop with one OS thread per accepted connection. The
//! server owns its listener transport, dispatcher, and key reference
//! explicitly; nothing lives in global state.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{ChannelOptions, ServerConfig};
use crate::error::{ChannelError, Result};
use crate::protocol::dispatcher::Dispatcher;
use crate::protocol::handler::{ConnectionHandler, HandlerState};
use crate::service::secure::SecureChannel;
use crate::transport::tcp::{AcceptOutcome, TcpTransport};
use crate::utils::crypto::SymmetricKey;

pub struct Server {
    transport: TcpTransport,
    dispatcher: Arc<Dispatcher>,
    key: Arc<SymmetricKey>,
    options: ChannelOptions,
    accept_timeout: Duration,
    crash_on_timeout: bool,
    state: HandlerState,
    running: Arc<AtomicBool>,
    workers: Vec<JoinHandle<HandlerState>>,
}

impl Server {
    /// Binds the listener described by `config`.
    pub fn bind(
        config: &ServerConfig,
        options: ChannelOptions,
        key: SymmetricKey,
        dispatcher: Dispatcher,
    ) -> Result<Self> {
        let addr: SocketAddr = config
            .address
            .parse()
            .map_err(|e| ChannelError::Config(format!("invalid listen address: {e}")))?;
        let transport = TcpTransport::bind(addr)?;

        Ok(Self {
            transport,
            dispatcher: Arc::new(dispatcher),
            key: Arc::new(key),
            options,
            accept_timeout: config.accept_timeout,
            crash_on_timeout: config.crash_on_timeout,
            state: HandlerState::Listening,
            running: Arc::new(AtomicBool::new(true)),
            workers: Vec::new(),
        })
    }

    /// Address the listener actually bound to (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.transport.local_addr()
    }

    pub fn state(&self) -> HandlerState {
        self.state
    }

    /// Handle for requesting a stop from another thread. The loop exits
    /// after its current accept wait; in-flight connections finish.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Runs the accept loop until stopped or a fatal error.
    ///
    /// An idle accept window loops back to listening unless
    /// `crash_on_timeout` is set, in which case it is fatal. The listener
    /// always ends `Closed`, with worker threads joined.
    pub fn run(&mut self) -> Result<()> {
        info!(addr = %self.local_addr()?, "server accepting connections");

        while self.running.load(Ordering::Relaxed) {
            self.state = HandlerState::Accepting;

            match self.transport.accept(self.accept_timeout) {
                Ok(AcceptOutcome::TimedOut) => {
                    if self.crash_on_timeout {
                        warn!("no connection within the accept window");
                        self.shutdown();
                        return Err(ChannelError::Timeout);
                    }
                    self.state = HandlerState::Listening;
                }
                Ok(AcceptOutcome::Connected(peer)) => {
                    let Some(conn) = self.transport.take_accepted() else {
                        continue;
                    };
                    let channel = SecureChannel::over(conn, &self.key, &self.options);
                    let dispatcher = Arc::clone(&self.dispatcher);

                    match std::thread::Builder::new()
                        .name(format!("conn-{peer}"))
                        .spawn(move || ConnectionHandler::new(channel, dispatcher).run())
                    {
                        Ok(worker) => self.workers.push(worker),
                        Err(e) => {
                            error!(error = %e, "failed to spawn connection thread");
                            self.shutdown();
                            return Err(e.into());
                        }
                    }
                    self.reap_finished();
                    self.state = HandlerState::Listening;
                }
                Err(e) => {
                    error!(error = %e, "accept failed");
                    self.shutdown();
                    return Err(e);
                }
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Drops handles of connection threads that already finished.
    fn reap_finished(&mut self) {
        self.workers.retain(|worker| !worker.is_finished());
    }

    fn shutdown(&mut self) {
        for worker in self.workers.drain(..) {
            if let Err(e) = worker.join() {
                debug!("connection thread panicked: {e:?}");
            }
        }
        self.transport.close();
        self.state = HandlerState::Closed;
        info!("listener closed");
    }
}
