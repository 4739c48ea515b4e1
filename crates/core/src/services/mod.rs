pub mod cost_basis_service;
pub mod currency_service;
pub mod dividend_service;
pub mod goal_service;
pub mod holdings_service;
pub mod transaction_service;
