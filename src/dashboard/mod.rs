//! Dashboard module
//!
//! Provides the overview page with the filtered expense listing, this month's
//! insights and budget status, and the monthly summary page.

mod charts;
mod handlers;
mod insights;
mod monthly;

pub use handlers::get_dashboard_page;
pub use monthly::get_monthly_summary_page;
