mod common;

mod tests {
    use myrtio_frame_mapper::{
        Dimensions, Display, DisplayConfig, Error, LogLevel, ParseError, PipelineState,
    };

    use crate::common::{
        FakeDevice, FakeProvider, GREEN, RED, RecordingLogger, SINGLE_TILE_SETUP,
    };

    type TestDisplay = Display<FakeDevice, RecordingLogger, 64, 64>;

    fn display(config: DisplayConfig) -> TestDisplay {
        TestDisplay::new(config, RecordingLogger::default())
    }

    fn opened(config: DisplayConfig, source: &str) -> TestDisplay {
        let mut display = display(config);
        display
            .open(source.as_bytes(), &mut FakeProvider::default())
            .unwrap();
        display
    }

    fn sent(display: &TestDisplay) -> Option<&[myrtio_frame_mapper::Rgb]> {
        display
            .engine()?
            .unit(0)?
            .device()?
            .last_sent()
    }

    #[test]
    fn test_lifecycle() {
        let mut display = display(DisplayConfig::default());
        assert_eq!(display.state(), PipelineState::Uninitialized);

        display
            .open(SINGLE_TILE_SETUP.as_bytes(), &mut FakeProvider::default())
            .unwrap();
        assert_eq!(display.state(), PipelineState::SetupLoaded);
        assert_eq!(display.dimensions(), Dimensions::new(2, 1));

        assert_eq!(display.pool().unwrap(), Dimensions::new(2, 1));
        assert_eq!(display.state(), PipelineState::MappingReady);

        let mut lease = display.lease().unwrap();
        lease.set_pixel(0, 0, RED);
        lease.set_pixel(1, 0, GREEN);
        let token = lease.publish();

        let prepared = display.prepare(token).unwrap();
        assert_eq!(display.state(), PipelineState::Streaming);
        assert_eq!(sent(&display), Some(&[RED, GREEN][..]));

        assert_eq!(display.display(prepared).unwrap(), 1);
        let device = display.engine().unwrap().unit(0).unwrap().device().unwrap();
        assert_eq!(device.latches, 1);

        display.close();
        assert_eq!(display.state(), PipelineState::Closed);
        assert!(display.engine().is_none());
        assert!(display.frame().is_none());

        let log = display.log().sink();
        assert!(log.contains(LogLevel::Info, "initializing LED output..."));
        assert!(log.contains(LogLevel::Info, "initialized 2x1 pixel LED setup"));
        assert!(log.contains(LogLevel::Info, "deinitializing LED output..."));
    }

    #[test]
    fn test_size_overrides() {
        let config = DisplayConfig {
            width: 4,
            height: 3,
            ..DisplayConfig::default()
        };
        let mut display = opened(config, SINGLE_TILE_SETUP);
        assert_eq!(display.dimensions(), Dimensions::new(4, 3));

        display.pool().unwrap();
        let frame = display.frame().unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
    }

    #[test]
    fn test_far_offset_tile_opens() {
        let config = DisplayConfig {
            width: 2,
            height: 1,
            ..DisplayConfig::default()
        };
        let mut display = opened(
            config,
            r#"{"hardware": [
                {"id": "strip", "tiles": [{"x": 0, "y": 0, "width": 2, "height": 1}]},
                {"id": "far", "tiles": [{"x": 2147483647, "y": 0, "width": 1, "height": 1}]}
            ]}"#,
        );
        assert_eq!(display.state(), PipelineState::SetupLoaded);

        assert_eq!(display.pool().unwrap(), Dimensions::new(2, 1));
        assert_eq!(display.engine().unwrap().active_units(), 1);
    }

    #[test]
    fn test_pool_twice_keeps_frame() {
        let mut display = opened(DisplayConfig::default(), SINGLE_TILE_SETUP);
        display.pool().unwrap();
        let token = display.lease().unwrap().publish();
        let _ = display.prepare(token).unwrap();

        assert_eq!(display.pool().unwrap(), Dimensions::new(2, 1));
        assert_eq!(display.frame().unwrap().sequence(), 1);
        assert_eq!(display.state(), PipelineState::Streaming);
    }

    #[test]
    fn test_empty_setup_closes() {
        let mut display = display(DisplayConfig::default());
        let result = display.open(br#"{"hardware": []}"#, &mut FakeProvider::default());

        assert!(matches!(result, Err(Error::Empty)));
        assert_eq!(display.state(), PipelineState::Closed);
        assert!(display.setup().is_none());
        assert!(
            display
                .log()
                .sink()
                .contains(LogLevel::Warning, "no LED hardware found")
        );
    }

    #[test]
    fn test_malformed_setup_closes() {
        let mut display = display(DisplayConfig::default());
        let result = display.open(br#"{"hardware": [{"id": "a"}]}"#, &mut FakeProvider::default());

        let error = result.unwrap_err();
        assert!(error.is_fatal());
        assert!(matches!(error, Error::Parse(ParseError::NoTiles { unit: 0 })));
        assert_eq!(display.state(), PipelineState::Closed);
        assert!(
            display
                .log()
                .sink()
                .contains(LogLevel::Error, "failed to start LED output")
        );
    }

    #[test]
    fn test_nothing_mapped_closes() {
        let config = DisplayConfig {
            width: 2,
            height: 1,
            ..DisplayConfig::default()
        };
        let mut display = opened(
            config,
            r#"{"hardware": [{"id": "far", "tiles": [{"x": 10, "y": 0, "width": 1, "height": 1}]}]}"#,
        );

        assert!(matches!(display.pool(), Err(Error::NothingMapped)));
        assert_eq!(display.state(), PipelineState::Closed);
    }

    #[test]
    fn test_frame_too_large_closes() {
        let config = DisplayConfig {
            width: 100,
            height: 100,
            ..DisplayConfig::default()
        };
        let mut display = opened(config, SINGLE_TILE_SETUP);
        assert!(matches!(display.pool(), Err(Error::Allocation(_))));
        assert_eq!(display.state(), PipelineState::Closed);
    }

    #[test]
    fn test_invalid_state() {
        let mut display = display(DisplayConfig::default());
        assert!(matches!(
            display.pool(),
            Err(Error::InvalidState(PipelineState::Uninitialized))
        ));
        assert!(matches!(
            display.lease(),
            Err(Error::InvalidState(PipelineState::Uninitialized))
        ));

        display
            .open(SINGLE_TILE_SETUP.as_bytes(), &mut FakeProvider::default())
            .unwrap();
        assert!(matches!(
            display.open(SINGLE_TILE_SETUP.as_bytes(), &mut FakeProvider::default()),
            Err(Error::InvalidState(PipelineState::SetupLoaded))
        ));
        assert!(matches!(
            display.lease(),
            Err(Error::InvalidState(PipelineState::SetupLoaded))
        ));

        display.close();
        assert!(matches!(
            display.pool(),
            Err(Error::InvalidState(PipelineState::Closed))
        ));
    }

    #[test]
    fn test_stale_tokens() {
        let mut display = opened(DisplayConfig::default(), SINGLE_TILE_SETUP);
        display.pool().unwrap();

        let first = display.lease().unwrap().publish();
        let second = display.lease().unwrap().publish();
        assert!(matches!(display.prepare(first), Err(Error::StaleFrame)));
        let prepared = display.prepare(second).unwrap();

        let third = display.lease().unwrap().publish();
        let _ = display.prepare(third).unwrap();
        assert!(matches!(display.display(prepared), Err(Error::StaleFrame)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut display = opened(DisplayConfig::default(), SINGLE_TILE_SETUP);
        display.close();
        display.close();

        let closes = display
            .log()
            .sink()
            .records
            .iter()
            .filter(|(_, message)| message.contains("deinitializing"))
            .count();
        assert_eq!(closes, 1);
    }

    #[test]
    fn test_verbosity_filter() {
        let quiet = DisplayConfig {
            verbosity: LogLevel::Warning,
            ..DisplayConfig::default()
        };
        let mut display = opened(quiet, SINGLE_TILE_SETUP);
        display.pool().unwrap();
        assert!(display.log().sink().records.is_empty());

        let noisy = DisplayConfig {
            verbosity: LogLevel::Debug,
            ..DisplayConfig::default()
        };
        let mut display = opened(noisy, SINGLE_TILE_SETUP);
        display.pool().unwrap();
        let log = display.log().sink();
        assert!(log.contains(LogLevel::Debug, "frame 2x1 \"RGB u8\", 6 bytes"));
        assert!(log.contains(LogLevel::Debug, "hardware \"strip\": 1 tiles, 2 LEDs"));
        assert!(log.contains(LogLevel::Debug, "2 of 2 LEDs mapped"));
    }
}
