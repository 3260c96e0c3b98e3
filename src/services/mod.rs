pub mod ai;
pub mod datetime;
pub mod dispatcher;
pub mod relay;
