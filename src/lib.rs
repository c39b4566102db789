//! Year-by-year retirement projection: salary, 401(k)/Roth balances, Social
//! Security, Medicare premiums, Roth conversions and taxes.

pub mod api;
pub mod core;
