//! Operation dispatch at the application boundary.
//!
//! The transport core hands each decoded request to a registered handler
//! and sends back whatever the handler returns. Handlers are registered
//! before the server starts and the table is immutable afterwards, so it is
//! shared across connection threads without locking.

use std::collections::HashMap;

use tracing::warn;

use crate::error::Result;
use crate::protocol::envelope::{RequestEnvelope, ResponseEnvelope};

type HandlerFn = dyn Fn(&RequestEnvelope) -> Result<ResponseEnvelope> + Send + Sync + 'static;

/// Maps operation names to application handlers.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Box<HandlerFn>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `op`, replacing any previous one.
    pub fn register<F>(&mut self, op: &str, handler: F)
    where
        F: Fn(&RequestEnvelope) -> Result<ResponseEnvelope> + Send + Sync + 'static,
    {
        self.handlers.insert(op.to_string(), Box::new(handler));
    }

    /// Routes a request to its handler.
    ///
    /// Unroutable requests and handler errors become failure responses; the
    /// peer always gets an answer for a well-formed request.
    pub fn dispatch(&self, request: &RequestEnvelope) -> ResponseEnvelope {
        let Some(op) = request.op() else {
            return ResponseEnvelope::failure("request missing operation name");
        };

        match self.handlers.get(op) {
            None => {
                warn!(op, "no handler registered");
                ResponseEnvelope::failure(format!("unknown operation: {op}"))
            }
            Some(handler) => match handler(request) {
                Ok(response) => response,
                Err(e) => {
                    warn!(op, error = %e, "handler failed");
                    ResponseEnvelope::failure(e.to_string())
                }
            },
        }
    }
}
