//! Wall-clock source used for line timestamps and rotation

use chrono::{Local, NaiveDateTime};

/// Source of the local wall-clock time read once per formatted event.
///
/// Closures returning a `NaiveDateTime` implement this too, which is how tests
/// pin the time.
pub trait Clock: Send {
    fn now(&self) -> NaiveDateTime;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDateTime + Send,
{
    fn now(&self) -> NaiveDateTime {
        self()
    }
}
