#[cfg(test)]
mod tests {
    use crate::clock::{ClockError, LamportClock};

    #[test]
    fn test_tick_increments_by_one() {
        let mut clock = LamportClock::new();

        assert_eq!(clock.tick(), Ok(1));
        assert_eq!(clock.tick(), Ok(2));
        assert_eq!(clock.value(), 2);
    }

    #[test]
    fn test_observe_takes_max_plus_one() {
        let mut clock = LamportClock::from(0);
        assert_eq!(clock.observe(2), Ok(3));

        // Remote timestamp behind the local clock still advances by one.
        let mut clock = LamportClock::from(10);
        assert_eq!(clock.observe(4), Ok(11));
    }

    #[test]
    fn test_merge_reply_counts_as_event() {
        // Send from 3 ticks to 4, receiver answers 5, sender ends at 6.
        let mut clock = LamportClock::from(3);
        assert_eq!(clock.tick(), Ok(4));
        assert_eq!(clock.merge_reply(5), Ok(6));
    }

    #[test]
    fn test_clock_strictly_increases_on_every_operation() {
        let mut clock = LamportClock::new();
        let mut last = clock.value();

        for step in 0..50u64 {
            let next = match step % 3 {
                0 => clock.tick(),
                1 => clock.observe(step / 2),
                _ => clock.merge_reply(step * 2),
            }
            .unwrap();
            assert!(next > last, "clock went from {} to {}", last, next);
            last = next;
        }
    }

    #[test]
    fn test_receiver_clock_exceeds_message_timestamp() {
        let mut sender = LamportClock::from(7);
        let mut receiver = LamportClock::from(2);

        let timestamp = sender.tick().unwrap();
        let after = receiver.observe(timestamp).unwrap();

        assert!(after > timestamp);
    }

    // ============================================================
    // OVERFLOW
    // ============================================================

    #[test]
    fn test_max_timestamp_is_refused_and_clock_unchanged() {
        let mut clock = LamportClock::from(5);

        assert_eq!(clock.observe(u64::MAX), Err(ClockError::Overflow(u64::MAX)));
        assert_eq!(clock.merge_reply(u64::MAX), Err(ClockError::Overflow(u64::MAX)));
        assert_eq!(clock.value(), 5);
    }

    #[test]
    fn test_clock_at_max_refuses_every_event() {
        let mut clock = LamportClock::new();
        assert_eq!(clock.observe(u64::MAX - 1), Ok(u64::MAX));

        assert_eq!(clock.tick(), Err(ClockError::Overflow(u64::MAX)));
        assert_eq!(clock.observe(3), Err(ClockError::Overflow(u64::MAX)));
        assert_eq!(clock.value(), u64::MAX);
    }
}
