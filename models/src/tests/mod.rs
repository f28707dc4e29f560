mod connection_state;
mod discovered_server;
mod endpoint;
mod network;
