//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod broadcast_host_bridge;
mod fs_model_cache;
mod http_model_downloader;
mod static_network_monitor;

pub use broadcast_host_bridge::BroadcastHostBridge;
pub use fs_model_cache::FsModelCache;
pub use http_model_downloader::HttpModelDownloader;
pub use static_network_monitor::StaticNetworkMonitor;
