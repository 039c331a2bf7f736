//! arpguard - ARP spoofing telemetry collector and live dashboard.

pub mod collector;
pub mod config;
pub mod dashboard;
pub mod display;
