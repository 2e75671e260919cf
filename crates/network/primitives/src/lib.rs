pub mod addr_info;
pub mod client;
pub mod config;
pub mod messages;
pub mod psk;
pub mod scope;
pub mod stream;
