pub mod adapter;
mod connect;
pub mod params;
