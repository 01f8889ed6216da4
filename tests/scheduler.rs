mod common;

mod tests {
    use myrtio_frame_mapper::frame_scheduler::DEFAULT_FRAME_DURATION;
    use myrtio_frame_mapper::{
        Display, DisplayConfig, Duration, Error, FrameScheduler, FrameSource, Instant, NoopLogger,
        PipelineState, RenderLease,
    };

    use crate::common::{BLUE, FakeDevice, FakeProvider, RED, SINGLE_TILE_SETUP};

    /// Alternates red and blue on every frame.
    #[derive(Default)]
    struct Blink {
        frames: usize,
        last: Option<Instant>,
    }

    impl FrameSource for Blink {
        fn render<const MAX_PIXELS: usize>(
            &mut self,
            now: Instant,
            frame: &mut RenderLease<'_, MAX_PIXELS>,
        ) {
            let color = if self.frames % 2 == 0 { RED } else { BLUE };
            frame.fill(color);
            self.frames += 1;
            self.last = Some(now);
        }
    }

    type TestScheduler = FrameScheduler<Blink, FakeDevice, NoopLogger, 64, 64>;

    fn scheduler() -> TestScheduler {
        let mut display = Display::new(DisplayConfig::default(), NoopLogger);
        display
            .open(SINGLE_TILE_SETUP.as_bytes(), &mut FakeProvider::default())
            .unwrap();
        display.pool().unwrap();
        FrameScheduler::new(display, Blink::default())
    }

    fn last_sent(scheduler: &TestScheduler) -> Vec<myrtio_frame_mapper::Rgb> {
        let unit = scheduler.display().engine().unwrap().unit(0).unwrap();
        unit.device().unwrap().last_sent().unwrap().to_vec()
    }

    #[test]
    fn test_tick_timing() {
        let mut scheduler = scheduler();
        assert_eq!(scheduler.frame_duration(), DEFAULT_FRAME_DURATION);

        let result = scheduler.tick(Instant::from_millis(0)).unwrap();
        assert_eq!(result.next_deadline, Instant::from_millis(33));
        assert_eq!(result.sleep_duration, Duration::from_millis(33));
        assert_eq!(result.latched_units, 1);
        assert_eq!(last_sent(&scheduler), [RED, RED]);

        let result = scheduler.tick(Instant::from_millis(33)).unwrap();
        assert_eq!(result.next_deadline, Instant::from_millis(66));
        assert_eq!(last_sent(&scheduler), [BLUE, BLUE]);

        // Slightly late frames keep the schedule
        let result = scheduler.tick(Instant::from_millis(80)).unwrap();
        assert_eq!(result.next_deadline, Instant::from_millis(99));
        assert_eq!(result.sleep_duration, Duration::from_millis(19));

        assert_eq!(scheduler.source_mut().frames, 3);
        assert_eq!(scheduler.source_mut().last, Some(Instant::from_millis(80)));
        assert_eq!(scheduler.display().state(), PipelineState::Streaming);
    }

    #[test]
    fn test_tick_resets_after_stall() {
        let mut scheduler = scheduler();
        scheduler.tick(Instant::from_millis(0)).unwrap();

        let result = scheduler.tick(Instant::from_millis(1000)).unwrap();
        assert_eq!(result.next_deadline, Instant::from_millis(1033));
        assert_eq!(result.sleep_duration, Duration::from_millis(33));
    }

    #[test]
    fn test_reset_after_clock_jump() {
        let mut scheduler = scheduler();
        scheduler.tick(Instant::from_millis(5000)).unwrap();

        scheduler.reset(Instant::from_millis(0));
        let result = scheduler.tick(Instant::from_millis(0)).unwrap();
        assert_eq!(result.next_deadline, Instant::from_millis(33));
    }

    #[test]
    fn test_tick_behind_schedule() {
        let display = {
            let mut display: Display<FakeDevice, NoopLogger, 64, 64> =
                Display::new(DisplayConfig::default(), NoopLogger);
            display
                .open(SINGLE_TILE_SETUP.as_bytes(), &mut FakeProvider::default())
                .unwrap();
            display.pool().unwrap();
            display
        };
        let mut scheduler =
            FrameScheduler::with_frame_duration(display, Blink::default(), Duration::from_millis(10));

        scheduler.tick(Instant::from_millis(0)).unwrap();
        let result = scheduler.tick(Instant::from_millis(25)).unwrap();
        assert_eq!(result.next_deadline, Instant::from_millis(20));
        assert_eq!(result.sleep_duration, Duration::from_millis(0));
    }

    #[test]
    fn test_tick_requires_pool() {
        let display: Display<FakeDevice, NoopLogger, 64, 64> =
            Display::new(DisplayConfig::default(), NoopLogger);
        let mut scheduler = FrameScheduler::new(display, Blink::default());
        assert!(matches!(
            scheduler.tick(Instant::from_millis(0)),
            Err(Error::InvalidState(PipelineState::Uninitialized))
        ));
    }
}
