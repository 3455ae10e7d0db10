pub mod async_task;
pub mod error_sink;
pub mod time;
