use thiserror::Error;

use crate::host::ClientId;

/// A line couldn't be written to a client
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Connection for client {0} is closed")]
    Closed(ClientId),
    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// An error that could occur while handling a hook or command
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Send error: {0}")]
    Send(#[from] SendError),
}

pub type HandleResult = Result<(), HandlerError>;
