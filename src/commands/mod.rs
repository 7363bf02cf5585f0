pub mod common;
pub mod record;

pub use record::{run_record, RecordArgs};
