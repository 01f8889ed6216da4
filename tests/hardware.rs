mod tests {
    use myrtio_frame_mapper::{DeviceError, LedDevice, Rgb, SmartLedsDevice};
    use smart_leds::{RGB8, SmartLedsWrite};

    /// Writer collecting the last written strip.
    #[derive(Default)]
    struct StripWriter {
        strip: Vec<RGB8>,
        broken: bool,
    }

    impl SmartLedsWrite for StripWriter {
        type Error = ();
        type Color = RGB8;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            if self.broken {
                return Err(());
            }
            self.strip = iterator.into_iter().map(Into::into).collect();
            Ok(())
        }
    }

    #[test]
    fn test_smart_leds_device() {
        let mut device = SmartLedsDevice::new(StripWriter::default());
        let chain = [Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)];

        device.send_chain(&chain).unwrap();
        device.latch().unwrap();
        assert_eq!(device.into_inner().strip, chain);
    }

    #[test]
    fn test_smart_leds_write_error() {
        let mut device = SmartLedsDevice::new(StripWriter {
            broken: true,
            ..StripWriter::default()
        });
        assert_eq!(device.send_chain(&[Rgb::default()]), Err(DeviceError::Io));
    }
}
