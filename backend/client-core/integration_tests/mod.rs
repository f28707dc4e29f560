// Public API tests for client-core.
// Every test talks to wiremock bridges bound to 127.0.0.1; nothing leaves the host.

mod connection;
mod discovery;
mod helpers;
mod remote_client;
