use std::fmt;

use ::time::format_description::FormatItem;
use ::time::macros::format_description;
use ::time::OffsetDateTime;

const STAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"); // yyyy-MM-dd HH:mm:ss

/// A wall-clock instant, displayed in the portal's fixed format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp(OffsetDateTime);

impl Stamp {
    /// Local time where the offset can be determined, UTC otherwise.
    pub fn now() -> Self {
        Self(OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()))
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.format(STAMP_FORMAT) {
            Ok(s) => write!(fmt, "{}", s),
            Err(_) => write!(fmt, "{}", self.0.unix_timestamp()),
        }
    }
}
