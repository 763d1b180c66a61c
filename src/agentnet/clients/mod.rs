//! Provider specific [`ClientWrapper`](crate::client_wrapper::ClientWrapper) implementations.

pub mod openai;
