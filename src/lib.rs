//! Named-data LED responder.
//!
//! Answers interests of the form `/thisRoom/pi/<code>/led/<n>/value/<action>`
//! by toggling one of three outputs, provided `<code>` matches the access code
//! currently on display. The code changes every 30 seconds.

pub mod access_code;
pub mod app;
pub mod config;
pub mod dispatcher;
pub mod face;
pub mod name;
pub mod outputs;
pub mod packet;
pub mod security;
