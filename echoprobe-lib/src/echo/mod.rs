//! The echo backend: a stateless HTTP/1 server that answers every request with a
//! JSON description of what it received. It is the oracle behind the reverse
//! proxy under test, so it must reflect the request exactly as it arrived on the
//! socket.

pub mod capture;
pub mod guards;
pub mod handler;
pub mod record;
pub mod server;

pub use capture::HeadCapturingStream;
pub use record::{EchoHeaders, EchoRecord, RawHead};
pub use server::{run, serve, shutdown_signal};
