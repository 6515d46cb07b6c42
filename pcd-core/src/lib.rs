pub mod config;
pub mod pointcloud;
