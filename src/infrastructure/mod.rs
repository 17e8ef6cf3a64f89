pub mod http_backend;
pub mod in_memory;
