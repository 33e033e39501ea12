pub mod auth;
pub mod ot_calc;
pub mod overtime;
pub mod stats;

pub use auth::Actor;
pub use overtime::OvertimeService;
pub use stats::OvertimeStatsService;
