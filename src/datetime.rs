//! Module containing functionality related to BSON DateTimes.
//! For more information, see the documentation for the [`DateTime`] type.

use std::{
    fmt::{self, Display},
    time::{Duration, SystemTime},
};

use time::format_description::well_known::Rfc3339;

use crate::error::{Error, Result};

/// Struct representing a BSON datetime.
///
/// BSON datetimes have millisecond precision and are written as a signed 64-bit count of
/// milliseconds since the Unix epoch, irrespective of magnitude.
///
/// ```
/// use bsonbuf::DateTime;
///
/// let dt = DateTime::parse_rfc3339_str("1998-02-12T00:01:00.023Z")?;
/// assert_eq!(dt.timestamp_millis(), 887_241_660_023);
/// assert_eq!(dt.try_to_rfc3339_string()?, "1998-02-12T00:01:00.023Z");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// Interop with RFC 3339 strings is bounded by the [`time`] crate's supported date range. The
/// `large_dates` feature can be enabled to expand this range.
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone)]
pub struct DateTime(i64);

impl crate::DateTime {
    /// The latest possible date that can be represented in BSON.
    pub const MAX: Self = Self::from_millis(i64::MAX);

    /// The earliest possible date that can be represented in BSON.
    pub const MIN: Self = Self::from_millis(i64::MIN);

    /// Makes a new [`DateTime`] from the number of non-leap milliseconds since
    /// January 1, 1970 0:00:00 UTC (aka "UNIX timestamp").
    pub const fn from_millis(date: i64) -> Self {
        Self(date)
    }

    /// Returns a [`DateTime`] which corresponds to the current date and time.
    pub fn now() -> DateTime {
        Self::from_system_time(SystemTime::now())
    }

    /// Convert the given [`time::OffsetDateTime`] into a [`DateTime`], truncating it to millisecond
    /// precision. Values outside the representable range saturate.
    pub fn from_time_0_3(dt: time::OffsetDateTime) -> Self {
        let millis = dt.unix_timestamp_nanos() / 1_000_000;
        match i64::try_from(millis) {
            Ok(ts) => Self::from_millis(ts),
            _ => {
                if millis > 0 {
                    Self::MAX
                } else {
                    Self::MIN
                }
            }
        }
    }

    /// Convert this [`DateTime`] to a [`time::OffsetDateTime`], or `None` if it lies outside the
    /// range the `time` crate supports.
    pub fn to_time_opt(self) -> Option<time::OffsetDateTime> {
        time::OffsetDateTime::UNIX_EPOCH.checked_add(time::Duration::milliseconds(self.0))
    }

    /// Convert the given [`SystemTime`] into a [`DateTime`], truncating it to millisecond
    /// precision. Values outside the representable range saturate.
    pub fn from_system_time(st: SystemTime) -> Self {
        match st.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(d) => {
                if d.as_millis() <= i64::MAX as u128 {
                    Self::from_millis(d.as_millis() as i64)
                } else {
                    Self::MAX
                }
            }
            // handle SystemTime from before the Unix Epoch
            Err(e) => {
                let millis = e.duration().as_millis();
                if millis > i64::MAX as u128 {
                    Self::MIN
                } else {
                    Self::from_millis(-(millis as i64))
                }
            }
        }
    }

    /// Convert this [`DateTime`] to a [`SystemTime`].
    pub fn to_system_time(self) -> SystemTime {
        if self.0 >= 0 {
            SystemTime::UNIX_EPOCH + Duration::from_millis(self.0 as u64)
        } else {
            // need to convert to i128 before calculating absolute value since i64::MIN.abs()
            // overflows and panics.
            SystemTime::UNIX_EPOCH - Duration::from_millis((self.0 as i128).unsigned_abs() as u64)
        }
    }

    /// Returns the number of non-leap-milliseconds since January 1, 1970 UTC.
    pub const fn timestamp_millis(self) -> i64 {
        self.0
    }

    /// Convert this [`DateTime`] to an RFC 3339 formatted string.
    pub fn try_to_rfc3339_string(self) -> Result<String> {
        let odt = self
            .to_time_opt()
            .ok_or_else(|| Error::datetime(format!("{} ms is out of range", self.0)))?;
        odt.format(&Rfc3339).map_err(Error::datetime)
    }

    /// Convert the given RFC 3339 formatted string to a [`DateTime`], truncating it to millisecond
    /// precision.
    pub fn parse_rfc3339_str(s: impl AsRef<str>) -> Result<Self> {
        let odt = time::OffsetDateTime::parse(s.as_ref(), &Rfc3339).map_err(Error::datetime)?;
        Ok(Self::from_time_0_3(odt))
    }
}

impl fmt::Debug for crate::DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tup = f.debug_tuple("DateTime");
        match self.to_time_opt() {
            Some(dt) => tup.field(&dt),
            _ => tup.field(&self.0),
        };
        tup.finish()
    }
}

impl Display for crate::DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_time_opt() {
            Some(dt) => Display::fmt(&dt, f),
            _ => Display::fmt(&self.0, f),
        }
    }
}

impl From<SystemTime> for crate::DateTime {
    fn from(st: SystemTime) -> Self {
        Self::from_system_time(st)
    }
}

impl From<crate::DateTime> for SystemTime {
    fn from(dt: crate::DateTime) -> Self {
        dt.to_system_time()
    }
}

impl From<time::OffsetDateTime> for crate::DateTime {
    fn from(x: time::OffsetDateTime) -> Self {
        Self::from_time_0_3(x)
    }
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use crate::DateTime;

    #[test]
    fn rfc3339_round_trip() {
        let dt = DateTime::from_time_0_3(datetime!(2020-06-01 12:30:45.123 UTC));
        let s = dt.try_to_rfc3339_string().unwrap();
        assert_eq!(s, "2020-06-01T12:30:45.123Z");
        assert_eq!(DateTime::parse_rfc3339_str(&s).unwrap(), dt);
    }

    #[test]
    fn pre_epoch() {
        let dt = DateTime::from_time_0_3(datetime!(1960-01-01 0:00 UTC));
        assert!(dt.timestamp_millis() < 0);
        assert_eq!(DateTime::from_system_time(dt.to_system_time()), dt);
    }

    #[test]
    fn out_of_range_formatting_fails() {
        assert!(DateTime::MAX.try_to_rfc3339_string().is_err());
        assert_eq!(format!("{}", DateTime::MIN), i64::MIN.to_string());
    }

    #[test]
    fn truncates_to_millis() {
        let dt = DateTime::from_time_0_3(datetime!(2001-02-03 04:05:06.789999 UTC));
        assert_eq!(dt.timestamp_millis() % 1000, 789);
    }
}
