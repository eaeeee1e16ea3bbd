//! Split a timeline into fixed-length epochs

use std::fmt;
use std::io;
use std::num::NonZeroU64;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::error::EpochError;

/// Seconds since the Unix epoch
pub type Timestamp = u64;

/// Epoch number, counted from the clock origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Option<Epoch> {
        self.0.checked_add(1).map(Epoch)
    }

    pub fn previous(self) -> Option<Epoch> {
        self.0.checked_sub(1).map(Epoch)
    }
}

impl From<Epoch> for u64 {
    fn from(e: Epoch) -> u64 {
        e.0
    }
}

impl From<u64> for Epoch {
    fn from(n: u64) -> Self {
        Epoch(n)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An epoch together with its boundaries
///
/// `start` is inclusive and `end` is exclusive, `end` being the start of
/// the following epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochInfo {
    pub epoch: Epoch,
    pub start: Timestamp,
    pub end: Timestamp,
    pub previous_start: Option<Timestamp>,
}

/// Maps timestamps to epochs of a constant duration
///
/// ```text
///
/// 0        1        2        3        4        5
/// x--------x--------x--------x--------x--------x  epochs ticking at epoch_duration
///
/// ^
/// |
/// origin
/// ```
///
/// Every epoch covers the half-open interval `[start, start + duration)`,
/// so a timestamp falling exactly on a boundary belongs to the epoch
/// that starts there. Nothing is cached: all values are recomputed from
/// `(now, origin, duration)` on each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochClock {
    origin: Timestamp,
    epoch_duration: NonZeroU64,
}

impl EpochClock {
    /// Create a clock whose epoch 0 begins at `origin`
    pub fn new(origin: Timestamp, epoch_duration: u64) -> Result<Self, EpochError> {
        let epoch_duration = NonZeroU64::new(epoch_duration).ok_or(EpochError::InvalidEpochDuration)?;
        Ok(Self {
            origin,
            epoch_duration,
        })
    }

    pub fn origin(&self) -> Timestamp {
        self.origin
    }

    pub fn epoch_duration(&self) -> u64 {
        self.epoch_duration.get()
    }

    /// Time elapsed since the origin, failing for timestamps before it
    fn since_origin(&self, now: Timestamp) -> Result<u64, EpochError> {
        now.checked_sub(self.origin).ok_or(EpochError::InvalidTime {
            now,
            origin: self.origin,
        })
    }

    /// Epoch containing `now`
    pub fn current_epoch(&self, now: Timestamp) -> Result<Epoch, EpochError> {
        Ok(Epoch(self.since_origin(now)? / self.epoch_duration.get()))
    }

    /// Start of the epoch containing `now`
    pub fn current_epoch_start(&self, now: Timestamp) -> Result<Timestamp, EpochError> {
        let elapsed = self.since_origin(now)?;
        // Rounding down the elapsed time keeps the result within [origin, now].
        Ok(now - elapsed % self.epoch_duration.get())
    }

    /// Start of the epoch following the one containing `now`
    pub fn next_epoch_start(&self, now: Timestamp) -> Result<Timestamp, EpochError> {
        self.current_epoch_start(now)?
            .checked_add(self.epoch_duration.get())
            .ok_or(EpochError::Overflow)
    }

    /// Start of the epoch preceding the one containing `now`
    pub fn previous_epoch_start(&self, now: Timestamp) -> Result<Timestamp, EpochError> {
        if self.current_epoch(now)? == Epoch(0) {
            return Err(EpochError::NoPreviousEpoch);
        }
        Ok(self.current_epoch_start(now)? - self.epoch_duration.get())
    }

    /// Start timestamp of a given epoch
    pub fn epoch_start(&self, epoch: Epoch) -> Result<Timestamp, EpochError> {
        epoch
            .0
            .checked_mul(self.epoch_duration.get())
            .and_then(|offset| self.origin.checked_add(offset))
            .ok_or(EpochError::Overflow)
    }

    /// Epoch containing `now` with all of its boundaries
    pub fn epoch_at(&self, now: Timestamp) -> Result<EpochInfo, EpochError> {
        let epoch = self.current_epoch(now)?;
        let start = self.current_epoch_start(now)?;
        let end = self.next_epoch_start(now)?;
        let previous_start = match epoch.0 {
            0 => None,
            _ => Some(start - self.epoch_duration.get()),
        };
        Ok(EpochInfo {
            epoch,
            start,
            end,
            previous_start,
        })
    }

    /// Time elapsed since the start of the epoch containing `now`
    pub fn elapsed_in_epoch(&self, now: Timestamp) -> Result<u64, EpochError> {
        Ok(self.since_origin(now)? % self.epoch_duration.get())
    }

    /// Time left until the next epoch starts
    pub fn remaining_in_epoch(&self, now: Timestamp) -> Result<u64, EpochError> {
        Ok(self.epoch_duration.get() - self.elapsed_in_epoch(now)?)
    }
}

impl BorshSerialize for EpochClock {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&self.origin, writer)?;
        BorshSerialize::serialize(&self.epoch_duration.get(), writer)
    }
}

impl BorshDeserialize for EpochClock {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let origin = u64::deserialize_reader(reader)?;
        let epoch_duration = u64::deserialize_reader(reader)?;
        EpochClock::new(origin, epoch_duration).map_err(|e| {
            log::warn!("Rejected encoded clock with origin {}: {}", origin, e);
            io::Error::new(io::ErrorKind::InvalidData, e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WEEK;

    #[test]
    fn test_rejects_zero_duration() {
        assert_eq!(EpochClock::new(0, 0), Err(EpochError::InvalidEpochDuration));
    }

    #[test]
    fn test_week_epochs_from_zero_origin() {
        let clock = EpochClock::new(0, WEEK).unwrap();
        assert_eq!(WEEK, 604_800);

        assert_eq!(clock.current_epoch(0).unwrap(), Epoch(0));
        assert_eq!(clock.current_epoch_start(0).unwrap(), 0);
        assert_eq!(clock.next_epoch_start(0).unwrap(), 604_800);
        assert_eq!(clock.previous_epoch_start(0), Err(EpochError::NoPreviousEpoch));

        assert_eq!(clock.current_epoch(604_799).unwrap(), Epoch(0));

        assert_eq!(clock.current_epoch(604_800).unwrap(), Epoch(1));
        assert_eq!(clock.current_epoch_start(604_800).unwrap(), 604_800);
        assert_eq!(clock.previous_epoch_start(604_800).unwrap(), 0);
        assert_eq!(clock.next_epoch_start(604_800).unwrap(), 1_209_600);
    }

    #[test]
    fn test_before_origin_is_invalid() {
        let clock = EpochClock::new(1_000, 10).unwrap();
        let expected = EpochError::InvalidTime {
            now: 999,
            origin: 1_000,
        };
        assert_eq!(clock.current_epoch(999), Err(expected.clone()));
        assert_eq!(clock.current_epoch_start(999), Err(expected.clone()));
        assert_eq!(clock.next_epoch_start(999), Err(expected.clone()));
        assert_eq!(clock.previous_epoch_start(999), Err(expected));
    }

    #[test]
    fn test_non_zero_origin() {
        let clock = EpochClock::new(1_000, 10).unwrap();
        assert_eq!(clock.current_epoch(1_000).unwrap(), Epoch(0));
        assert_eq!(clock.current_epoch(1_025).unwrap(), Epoch(2));
        assert_eq!(clock.current_epoch_start(1_025).unwrap(), 1_020);
        assert_eq!(clock.next_epoch_start(1_025).unwrap(), 1_030);
        assert_eq!(clock.previous_epoch_start(1_025).unwrap(), 1_010);
        assert_eq!(clock.elapsed_in_epoch(1_025).unwrap(), 5);
        assert_eq!(clock.remaining_in_epoch(1_025).unwrap(), 5);
    }

    #[test]
    fn test_epoch_at_matches_individual_queries() {
        let clock = EpochClock::new(0, WEEK).unwrap();

        let info = clock.epoch_at(0).unwrap();
        assert_eq!(
            info,
            EpochInfo {
                epoch: Epoch(0),
                start: 0,
                end: WEEK,
                previous_start: None,
            }
        );

        let info = clock.epoch_at(3 * WEEK + 5).unwrap();
        assert_eq!(info.epoch, Epoch(3));
        assert_eq!(info.start, 3 * WEEK);
        assert_eq!(info.end, 4 * WEEK);
        assert_eq!(info.previous_start, Some(2 * WEEK));
    }

    #[test]
    fn test_epoch_start_inverts_current_epoch() {
        let clock = EpochClock::new(500, 7).unwrap();
        assert_eq!(clock.epoch_start(Epoch(0)).unwrap(), 500);
        assert_eq!(clock.epoch_start(Epoch(3)).unwrap(), 521);
        assert_eq!(clock.current_epoch(521).unwrap(), Epoch(3));
        assert_eq!(clock.epoch_start(Epoch(u64::MAX)), Err(EpochError::Overflow));
    }

    #[test]
    fn test_next_epoch_start_overflow() {
        let clock = EpochClock::new(0, 10).unwrap();
        assert_eq!(clock.next_epoch_start(u64::MAX), Err(EpochError::Overflow));
        // The epoch itself is still well defined.
        assert_eq!(clock.current_epoch(u64::MAX).unwrap(), Epoch(u64::MAX / 10));
    }

    #[test]
    fn test_borsh_rejects_zero_duration() {
        let clock = EpochClock::new(42, 7).unwrap();
        let bytes = borsh::to_vec(&clock).unwrap();
        assert_eq!(borsh::from_slice::<EpochClock>(&bytes).unwrap(), clock);

        let mut corrupt = borsh::to_vec(&42u64).unwrap();
        corrupt.extend(borsh::to_vec(&0u64).unwrap());
        assert!(borsh::from_slice::<EpochClock>(&corrupt).is_err());
    }

    #[test]
    fn test_epoch_neighbours() {
        assert_eq!(Epoch(0).previous(), None);
        assert_eq!(Epoch(1).previous(), Some(Epoch(0)));
        assert_eq!(Epoch(u64::MAX).next(), None);
        assert_eq!(Epoch(41).next(), Some(Epoch(42)));
    }

    mod properties {
        use proptest::prelude::*;

        use super::super::*;

        proptest! {
            /// Property: `now` lies in `[current_epoch_start, next_epoch_start)`.
            #[test]
            fn prop_now_within_current_epoch(
                origin in 0u64..1_000_000_000,
                duration in 1u64..10_000_000,
                offset in 0u64..1_000_000_000,
            ) {
                let clock = EpochClock::new(origin, duration).unwrap();
                let now = origin + offset;
                let start = clock.current_epoch_start(now).unwrap();
                let next = clock.next_epoch_start(now).unwrap();
                prop_assert!(start <= now);
                prop_assert!(now < next);
                prop_assert_eq!(next, start + duration);
                let epoch = clock.current_epoch(now).unwrap();
                prop_assert_eq!(start, origin + epoch.0 * duration);
            }

            /// Property: reaching the next boundary advances the epoch by one.
            #[test]
            fn prop_boundary_advances_by_one(
                origin in 0u64..1_000_000_000,
                duration in 1u64..10_000_000,
                offset in 0u64..1_000_000_000,
            ) {
                let clock = EpochClock::new(origin, duration).unwrap();
                let now = origin + offset;
                let epoch = clock.current_epoch(now).unwrap();
                let next = clock.next_epoch_start(now).unwrap();

                prop_assert_eq!(clock.current_epoch(next).unwrap(), Epoch(epoch.0 + 1));
                prop_assert_eq!(clock.current_epoch(next - 1).unwrap(), epoch);
            }

            /// Property: the previous epoch starts exactly one duration earlier.
            #[test]
            fn prop_previous_epoch_start(
                origin in 0u64..1_000_000_000,
                duration in 1u64..10_000_000,
                offset in 0u64..1_000_000_000,
            ) {
                let clock = EpochClock::new(origin, duration).unwrap();
                let now = origin + offset;
                let epoch = clock.current_epoch(now).unwrap();
                let start = clock.current_epoch_start(now).unwrap();
                match clock.previous_epoch_start(now) {
                    Ok(prev) => {
                        prop_assert!(epoch.0 > 0);
                        prop_assert_eq!(prev, start - duration);
                    }
                    Err(e) => {
                        prop_assert_eq!(epoch, Epoch(0));
                        prop_assert_eq!(e, EpochError::NoPreviousEpoch);
                    }
                }
            }
        }
    }
}
