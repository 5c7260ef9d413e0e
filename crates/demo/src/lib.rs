//! Demo services on top of `ebb-http`.
//!
//! - [`routes::Router`]: the HTTP handler behind `ebb-demo --mode http`
//! - [`tcp_echo::serve_lines`]: the line echo behind `ebb-demo --mode tcp-echo`

pub mod routes;
pub mod tcp_echo;
