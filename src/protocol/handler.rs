//! # Connection Handling
//!
//! Per-connection control loop: receive one structured request, hand it to
//! application logic, send one structured response, close. The terminal
//! `Closed` state is reached on every path out of the loop, so the socket
//! and buffers are released no matter how processing ends.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ChannelError, Result};
use crate::protocol::dispatcher::Dispatcher;
use crate::protocol::envelope::ResponseEnvelope;
use crate::service::secure::SecureChannel;

/// Lifecycle of one connection end to end.
///
/// The listener side walks `Idle -> Listening -> Accepting` (with the
/// timeout edge back to `Listening`); each accepted connection continues
/// `Connected -> Processing -> Closed` on its own thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Idle,
    Listening,
    Accepting,
    Connected,
    Processing,
    Closed,
}

/// Serves exactly one request on an accepted connection.
pub struct ConnectionHandler {
    channel: SecureChannel,
    dispatcher: Arc<Dispatcher>,
    state: HandlerState,
}

impl ConnectionHandler {
    pub fn new(channel: SecureChannel, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            channel,
            dispatcher,
            state: HandlerState::Connected,
        }
    }

    pub fn state(&self) -> HandlerState {
        self.state
    }

    /// Runs the request/response exchange to completion.
    ///
    /// Always ends in `Closed`. A fatal processing error triggers one
    /// best-effort encrypted failure response first; if that send also
    /// fails the peer simply observes a closed connection.
    pub fn run(mut self) -> HandlerState {
        self.state = HandlerState::Processing;

        match self.process() {
            Ok(()) => debug!("request served"),
            Err(ChannelError::ConnectionClosed) => {
                debug!("peer closed before a request arrived");
            }
            Err(e) => {
                warn!(error = %e, "request processing failed");
                let response = ResponseEnvelope::failure(e.to_string());
                if let Err(send_error) = self.channel.send_response(&response) {
                    debug!(error = %send_error, "error response could not be delivered");
                }
            }
        }

        self.channel.close();
        self.state = HandlerState::Closed;
        self.state
    }

    fn process(&mut self) -> Result<()> {
        let request = self.channel.recv_request()?;
        debug!(op = request.op().unwrap_or("<none>"), "request received");

        // Application logic runs unbounded on this thread; the core imposes
        // no timeout on it.
        let response = self.dispatcher.dispatch(&request);
        self.channel.send_response(&response)
    }
}
