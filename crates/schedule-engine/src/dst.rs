//! Normalising wall-clock input to UTC, with DST transition policies.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};

/// Policy for wall-clock times that fall in a DST gap or overlap.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DstPolicy {
    /// Reject times in the DST gap (e.g., 2:30 AM during spring forward)
    Skip,
    /// Shift forward by the length of the gap
    ShiftForward,
    /// Keep the wall clock: gaps shift forward, overlaps take the earlier instant
    #[default]
    WallClock,
}

/// Convert a wall-clock datetime in an IANA timezone to UTC.
///
/// # Errors
/// Returns `ScheduleError::InvalidTimezone` if `timezone` is not a valid IANA
/// identifier, and `ScheduleError::NonexistentLocalTime` for a gap time under
/// [`DstPolicy::Skip`].
pub fn local_to_utc(
    local: NaiveDateTime,
    timezone: &str,
    policy: DstPolicy,
) -> Result<DateTime<Utc>> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| ScheduleError::InvalidTimezone(timezone.to_string()))?;

    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, later) => match policy {
            DstPolicy::Skip | DstPolicy::WallClock => Ok(earlier.with_timezone(&Utc)),
            DstPolicy::ShiftForward => Ok(later.with_timezone(&Utc)),
        },
        LocalResult::None => match policy {
            DstPolicy::Skip => Err(ScheduleError::NonexistentLocalTime {
                time: local,
                timezone: timezone.to_string(),
            }),
            DstPolicy::ShiftForward | DstPolicy::WallClock => {
                // Reading the wall time with the offset in force before the
                // gap lands it `gap` minutes later on the post-gap clock.
                let before = tz
                    .offset_from_utc_datetime(&(local - Duration::days(1)))
                    .fix()
                    .local_minus_utc();
                Ok((local - Duration::seconds(before as i64)).and_utc())
            }
        },
    }
}
