//! Frame-record persistence (save/load).

pub mod record;

pub use record::{load_records, save_records, FrameRecord, RecordSet};
