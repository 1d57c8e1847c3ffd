use chrono::{DateTime, Utc};

/// A time as reported by Steam's servers.
pub type ServerTime = DateTime<Utc>;
