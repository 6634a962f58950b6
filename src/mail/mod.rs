//! Mail transports
//!
//! Provides the `MailTransport` trait and three transports:
//! - `CommandTransport`: pipes the message to `sendmail -t -i` (or any compatible command)
//! - `HttpTransport`: posts JSON to a mail API
//! - `LogTransport`: logs instead of sending, used for dry runs
//!
//! # Example
//!
//! ```ignore
//! use req_notifier::mail::{create_transport, MailMessage};
//!
//! let transport = create_transport(&config.mail)?;
//! let message = MailMessage::html(vec!["amy@example.gov".into()], "Hello", "<p>Hi</p>");
//! transport.send(&message).await?;
//! ```

mod command;
mod http;
mod log;
mod types;

pub use command::CommandTransport;
pub use http::HttpTransport;
pub use log::LogTransport;
pub use types::{MailError, MailMessage, MailTransport, parse_addresses};

use crate::config::{MailConfig, TransportKind};

/// Create the transport named in the mail config
pub fn create_transport(config: &MailConfig) -> Result<Box<dyn MailTransport>, MailError> {
    Ok(match config.transport {
        TransportKind::Command => Box::new(CommandTransport::from_config(config)),
        TransportKind::Http => Box::new(HttpTransport::from_config(config)?),
        TransportKind::Log => Box::new(LogTransport),
    })
}
