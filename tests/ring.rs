mod common;

mod tests {
    use super::common::{MockRing, RING_ADDRESS, RecordingBus};
    use embassy_time::Duration;
    use myrtio_marquee::color::{Rgb, color_wheel};
    use myrtio_marquee::ring::{DEFAULT_RING_PERIOD, RingAnimator, RingConfig, RingState, wheel_index};
    use myrtio_marquee::AnimationTask;

    const LEDS: usize = 22;

    #[test]
    fn test_wheel_index_spreads_over_wheel() {
        assert_eq!(wheel_index::<LEDS>(0, 0), 0);
        assert_eq!(wheel_index::<LEDS>(1, 0), 11);
        assert_eq!(wheel_index::<LEDS>(21, 0), 244);
        assert_eq!(wheel_index::<LEDS>(21, 20), 9);
        assert_eq!(wheel_index::<LEDS>(0, 254), 254);
    }

    #[test]
    fn test_state_starts_dark_and_wraps_phase() {
        let state = RingState::<LEDS>::new(255);
        assert_eq!(state.phase(), 0);
        assert!(state.colors().iter().all(|c| *c == Rgb::new(0, 0, 0)));
    }

    #[test]
    fn test_first_frame_starts_green() {
        let mut animator = RingAnimator::<_, LEDS>::new(MockRing::new(LEDS), &RingConfig::default());
        let mut bus = RecordingBus::default();
        animator.tick(&mut bus).unwrap();

        let frame = &animator.driver().commits[0];
        assert_eq!(frame[0], Rgb::new(0, 255, 0));
        assert_eq!(frame[1], color_wheel(11));
        assert_eq!(bus.addresses(), vec![RING_ADDRESS]);
        assert_eq!(animator.state().phase(), 1);
    }

    #[test]
    fn test_rotation_repeats_after_full_period() {
        let mut animator = RingAnimator::<_, LEDS>::new(MockRing::new(LEDS), &RingConfig::default());
        let mut bus = RecordingBus::default();
        for _ in 0..256 {
            animator.tick(&mut bus).unwrap();
        }

        let commits = &animator.driver().commits;
        assert_eq!(commits.len(), 256);
        assert_eq!(commits[255], commits[0]);
        assert_ne!(commits[1], commits[0]);
        assert_eq!(animator.state().phase(), 1);
    }

    #[test]
    fn test_initial_phase_shifts_first_frame() {
        let config = RingConfig {
            initial_phase: 85,
            ..RingConfig::default()
        };
        let mut animator = RingAnimator::<_, LEDS>::new(MockRing::new(LEDS), &config);
        animator.tick(&mut RecordingBus::default()).unwrap();
        assert_eq!(animator.driver().commits[0][0], Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_failed_commit_keeps_phase() {
        let mut animator = RingAnimator::<_, LEDS>::new(MockRing::new(LEDS), &RingConfig::default());
        let mut bus = RecordingBus::failing_after(0);
        assert!(animator.tick(&mut bus).is_err());
        assert_eq!(animator.state().phase(), 0);
        assert!(animator.driver().commits.is_empty());
    }

    #[test]
    fn test_poll_returns_period() {
        let config = RingConfig {
            period: Duration::from_millis(25),
            ..RingConfig::default()
        };
        let mut animator = RingAnimator::<_, LEDS>::new(MockRing::new(LEDS), &config);
        let delay = animator.poll(&mut RecordingBus::default()).unwrap();
        assert_eq!(delay, Duration::from_millis(25));
        assert_eq!(RingConfig::default().period, DEFAULT_RING_PERIOD);
    }
}
