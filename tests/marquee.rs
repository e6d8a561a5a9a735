mod common;

mod tests {
    use super::common::{
        FixedRasterizer, HEIGHT, MatrixOp, MockMatrix, RecordingBus, StubRasterizer, WIDTH,
    };
    use embassy_time::Duration;
    use myrtio_marquee::idle::{IdleConfig, Pictogram};
    use myrtio_marquee::raster::{PixelBuffer, TextRasterizer};
    use myrtio_marquee::{FrameSlot, MarqueeConfig, MarqueeTask, Traversal};

    const HEART: &[(u8, u8)] = &[(3, 2), (4, 3), (5, 2)];
    const NOTE: &[(u8, u8)] = &[(10, 1), (10, 2), (11, 1)];
    const PICTOGRAMS: &[Pictogram<'static>] = &[Pictogram::new(HEART), Pictogram::new(NOTE)];

    fn idle(cycles: u16) -> IdleConfig<'static> {
        IdleConfig {
            pictograms: PICTOGRAMS,
            cycles_per_pictogram: cycles,
            ..IdleConfig::default()
        }
    }

    fn run_cycle<T: TextRasterizer<WIDTH, HEIGHT>>(
        task: &mut MarqueeTask<'_, MockMatrix, T, WIDTH, HEIGHT>,
        bus: &mut RecordingBus,
    ) -> Vec<Duration> {
        let mut delays = Vec::new();
        while !task.is_idle() {
            delays.push(task.step(bus).unwrap());
        }
        while task.is_idle() {
            delays.push(task.step(bus).unwrap());
        }
        delays
    }

    #[test]
    fn test_pass_length_follows_text() {
        let config = MarqueeConfig::new("Now Playing");
        let mut task = MarqueeTask::new(MockMatrix::default(), StubRasterizer::default(), &config);
        let mut bus = RecordingBus::default();
        assert_eq!(task.cursor().pass_len(), 99);

        for _ in 0..98 {
            task.step(&mut bus).unwrap();
        }
        assert_eq!(task.cursor().position(), 98);
        assert!(!task.is_idle());

        task.step(&mut bus).unwrap();
        assert_eq!(task.cursor().position(), 0);
        assert!(task.is_idle());
        assert_eq!(task.passes(), 1);
    }

    #[test]
    fn test_banner_enters_from_right_edge() {
        let config = MarqueeConfig::new("Hi");
        let rasterizer = StubRasterizer::default();
        let mut task = MarqueeTask::new(MockMatrix::default(), rasterizer, &config);
        let mut bus = RecordingBus::default();
        for _ in 0..3 {
            task.step(&mut bus).unwrap();
        }
        // 18 steps per pass, still scrolling
        assert_eq!(task.cursor().position(), 3);
        let pixels: Vec<_> = task
            .frames()
            .driver()
            .ops
            .iter()
            .filter_map(|op| match op {
                MatrixOp::Pixel(_, x, y, b) => Some((*x, *y, *b)),
                _ => None,
            })
            .collect();
        assert_eq!(pixels, vec![(15, 0, 128), (14, 0, 128)]);
    }

    #[test]
    fn test_scroll_never_touches_visible_frame() {
        let mut config = MarqueeConfig::new("Now Playing");
        config.idle = idle(2);
        let mut task = MarqueeTask::new(MockMatrix::default(), StubRasterizer::default(), &config);
        let mut bus = RecordingBus::default();
        run_cycle(&mut task, &mut bus);
        run_cycle(&mut task, &mut bus);
        assert_eq!(task.frames().driver().torn_writes, 0);
        assert_eq!(task.passes(), 2);
    }

    #[test]
    fn test_idle_episode_timing() {
        let mut config = MarqueeConfig::new("Hi");
        config.glyph_width = 1;
        config.idle = idle(4);
        let mut task = MarqueeTask::new(MockMatrix::default(), StubRasterizer::default(), &config);
        let mut bus = RecordingBus::default();

        let delays = run_cycle(&mut task, &mut bus);

        let zero = Duration::from_ticks(0);
        let mut expected = vec![zero, zero, Duration::from_millis(500), zero];
        expected.extend([Duration::from_secs(1); 8]);
        expected.push(zero);
        assert_eq!(delays, expected);

        // 2 scroll flips, then 8 pictogram flips
        assert_eq!(task.frames().driver().visible_flips(), 10);
        assert_eq!(task.cursor().position(), 0);
        assert!(!task.is_idle());
    }

    #[test]
    fn test_first_flip_reveals_first_pictogram() {
        let mut config = MarqueeConfig::new("Hi");
        config.glyph_width = 1;
        config.idle = idle(1);
        let mut task = MarqueeTask::new(MockMatrix::default(), StubRasterizer::default(), &config);
        let mut bus = RecordingBus::default();

        // two scroll steps, pause, pre-render
        for _ in 0..4 {
            task.step(&mut bus).unwrap();
        }
        assert_eq!(task.frames().visible(), FrameSlot::Second);

        task.step(&mut bus).unwrap();
        assert_eq!(task.frames().visible(), FrameSlot::First);

        let held = task.frames().driver().held_groups();
        assert_eq!(held.len(), 1);
        for &(x, y) in HEART {
            assert!(held[0].contains(&MatrixOp::Pixel(FrameSlot::First, x, y, 128)));
        }
        for &(x, y) in NOTE {
            assert!(held[0].contains(&MatrixOp::Pixel(FrameSlot::Second, x, y, 128)));
        }
    }

    #[test]
    fn test_consecutive_episodes_render_identically() {
        // 99 steps per pass, so the banner leaves a different frame on
        // screen before each episode
        let mut config = MarqueeConfig::new("Now Playing");
        config.idle = idle(1);
        let mut task = MarqueeTask::new(MockMatrix::default(), StubRasterizer::default(), &config);
        let mut bus = RecordingBus::default();

        run_cycle(&mut task, &mut bus);
        let visible_after_first = task.frames().visible();
        run_cycle(&mut task, &mut bus);

        let held = task.frames().driver().held_groups();
        assert_eq!(held.len(), 2);
        assert_eq!(held[0], held[1]);
        assert_eq!(visible_after_first, task.frames().visible());
    }

    #[test]
    fn test_empty_pictogram_list_returns_immediately() {
        let mut config = MarqueeConfig::new("Hi");
        config.glyph_width = 1;
        let mut task = MarqueeTask::new(MockMatrix::default(), StubRasterizer::default(), &config);
        let mut bus = RecordingBus::default();

        let delays = run_cycle(&mut task, &mut bus);
        let zero = Duration::from_ticks(0);
        assert_eq!(delays, vec![zero, zero, Duration::from_millis(500), zero, zero]);
    }

    #[test]
    fn test_mirrored_traversal() {
        let mut bitmap = PixelBuffer::<WIDTH, HEIGHT>::new();
        bitmap.set(0, 0, true);
        bitmap.set(2, 5, true);

        let mut config = MarqueeConfig::new("Hi");
        config.traversal = Traversal::Mirrored;
        config.brightness = 40;
        let mut task = MarqueeTask::new(MockMatrix::default(), FixedRasterizer(bitmap), &config);
        task.step(&mut RecordingBus::default()).unwrap();

        let ops = &task.frames().driver().ops;
        assert!(ops.contains(&MatrixOp::Pixel(FrameSlot::Second, 15, 8, 40)));
        assert!(ops.contains(&MatrixOp::Pixel(FrameSlot::Second, 13, 3, 40)));
        assert_eq!(Traversal::Forward.map::<WIDTH, HEIGHT>(2, 5), (2, 5));
    }

    #[test]
    fn test_bus_failure_keeps_cursor() {
        let config = MarqueeConfig::new("Hi");
        let mut task = MarqueeTask::new(MockMatrix::default(), StubRasterizer::default(), &config);
        let mut bus = RecordingBus::failing_after(1);
        assert!(task.step(&mut bus).is_err());
        assert_eq!(task.cursor().position(), 0);
        assert_eq!(task.frames().visible(), FrameSlot::First);
    }
}
