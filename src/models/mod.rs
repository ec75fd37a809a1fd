pub mod assignment;
pub mod history;
pub mod notification;
pub mod officer;
pub mod request;
pub mod routine;
pub mod vehicle;
pub mod weekday;
pub mod zone;
