pub mod error;
pub mod record;
pub mod record_id;
pub mod time;

pub use error::{CoreError, ErrorCategory, Result};
pub use record::Record;
pub use record_id::{generate_id, validate_id};
pub use time::{Utc, now_utc};
