pub mod aggregator;
pub mod change_calculator;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod input;
pub mod market_session;
pub mod model;
pub mod quotes;
pub mod registry;
pub mod session;
pub mod ui;
pub mod watchlist_store;
