//! `almox-api` — HTTP surface of the stock-requisition service.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
