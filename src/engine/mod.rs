pub mod clock;
pub mod dispatch;
pub mod eligibility;
pub mod notify;
pub mod policy;
pub mod proximity;
pub mod ranking;
pub mod snapshot;
pub mod writer;
