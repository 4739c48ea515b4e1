pub mod traits;

// API provider implementations
pub mod dividend_api;
