mod client;

pub use client::WarehouseClient;
