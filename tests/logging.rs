mod common;

mod tests {
    use myrtio_frame_mapper::{Log, LogLevel};

    use crate::common::RecordingLogger;

    #[test]
    fn test_log_level_names() {
        assert_eq!(LogLevel::parse_from_str("very-noisy"), Some(LogLevel::VeryNoisy));
        assert_eq!(LogLevel::parse_from_str("loud"), None);
        assert_eq!(LogLevel::from_raw(2), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_raw(8), None);
        assert_eq!(LogLevel::Warning.as_str(), "warning");
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_verbosity_filter() {
        let mut log = Log::new(RecordingLogger::default(), LogLevel::Warning);
        log.error(format_args!("bus {}", 3));
        log.warn(format_args!("low"));
        log.info(format_args!("hidden"));
        log.debug(format_args!("hidden"));

        assert!(log.enabled(LogLevel::Warning));
        assert!(!log.enabled(LogLevel::Info));
        assert!(!log.enabled(LogLevel::Quiet));

        log.set_verbosity(LogLevel::Quiet);
        log.error(format_args!("hidden"));

        let sink = log.into_sink();
        assert_eq!(
            sink.records,
            [
                (LogLevel::Error, "bus 3".to_string()),
                (LogLevel::Warning, "low".to_string())
            ]
        );
    }

    #[test]
    fn test_borrowed_logger() {
        let mut sink = RecordingLogger::default();
        {
            let mut log = Log::new(&mut sink, LogLevel::Info);
            log.info(format_args!("ready"));
        }
        assert!(sink.contains(LogLevel::Info, "ready"));
    }
}
