// Adapters layer: the upstream HTTP fetcher and the inbound JSON API.

pub mod api;
pub mod http;
