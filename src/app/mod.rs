pub mod service;

pub use service::PollenService;
