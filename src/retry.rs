//! Bounded-attempt retry with a fixed inter-attempt delay.

use std::thread;
use std::time::Duration;

use tracing::debug;

/// Run `body` up to `attempts` times, sleeping `delay` between attempts.
///
/// The first success ends the loop and its value is returned; exhausting all
/// attempts returns the last failure. An attempt count of zero is treated
/// as one.
pub fn run<T, E>(
    mut body: impl FnMut() -> Result<T, E>,
    attempts: usize,
    delay: Duration,
) -> Result<T, E> {
    let attempts = attempts.max(1);
    let mut last = None;

    for attempt in 1..=attempts {
        if attempt > 1 {
            thread::sleep(delay);
        }

        match body() {
            Ok(value) => return Ok(value),
            Err(err) => {
                debug!("attempt {attempt}/{attempts} failed");
                last = Some(err);
            }
        }
    }

    // The loop runs at least once, so a failure is recorded here.
    Err(last.unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_success_short_circuits() {
        let mut calls = 0;
        let result: Result<i32, ()> = run(
            || {
                calls += 1;
                Ok(42)
            },
            5,
            Duration::ZERO,
        );

        assert_eq!(result, Ok(42));
        assert_eq!(calls, 1);
    }

    #[test]
    fn retries_until_success() {
        let mut calls = 0;
        let result: Result<i32, &str> = run(
            || {
                calls += 1;
                if calls < 3 { Err("nope") } else { Ok(7) }
            },
            3,
            Duration::ZERO,
        );

        assert_eq!(result, Ok(7));
        assert_eq!(calls, 3);
    }

    #[test]
    fn exhaustion_returns_the_last_error() {
        let mut calls = 0;
        let result: Result<(), usize> = run(
            || {
                calls += 1;
                Err(calls)
            },
            4,
            Duration::ZERO,
        );

        assert_eq!(result, Err(4));
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        let mut calls = 0;
        let _: Result<(), ()> = run(
            || {
                calls += 1;
                Err(())
            },
            0,
            Duration::ZERO,
        );

        assert_eq!(calls, 1);
    }
}
