mod tests {
    use myrtio_frame_mapper::{AllocationError, Error, Frame, PixelFormat, Rgb};

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    #[test]
    fn test_allocate_black_frame() {
        let frame = Frame::<64>::allocate(4, 3, PixelFormat::Rgb8).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.pixels().len(), 12);
        assert_eq!(frame.byte_len(), 36);
        assert_eq!(frame.sequence(), 0);
        assert!(frame.pixels().iter().all(|&p| p == BLACK));
    }

    #[test]
    fn test_allocate_errors() {
        assert_eq!(
            Frame::<64>::allocate(0, 3, PixelFormat::Rgb8).unwrap_err(),
            AllocationError::ZeroDimension
        );
        assert_eq!(
            Frame::<64>::allocate(2, 2, PixelFormat::Rgba8).unwrap_err(),
            AllocationError::UnsupportedFormat(PixelFormat::Rgba8)
        );
        assert_eq!(
            Frame::<8>::allocate(3, 3, PixelFormat::Rgb8).unwrap_err(),
            AllocationError::FrameTooLarge {
                pixels: 9,
                capacity: 8
            }
        );
    }

    #[test]
    fn test_lease_publish_redeem() {
        let mut frame = Frame::<16>::allocate(2, 2, PixelFormat::Rgb8).unwrap();

        let mut lease = frame.lease();
        assert!(lease.set_pixel(1, 1, RED));
        assert!(!lease.set_pixel(2, 0, RED));
        let token = lease.publish();
        assert_eq!(token.sequence(), 1);

        frame.redeem(token).unwrap();
        assert_eq!(frame.pixel(1, 1), Some(RED));
        assert_eq!(frame.pixel(0, 0), Some(BLACK));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn test_stale_token_rejected() {
        let mut frame = Frame::<16>::allocate(2, 2, PixelFormat::Rgb8).unwrap();

        let first = frame.lease().publish();
        let second = frame.lease().publish();
        assert_eq!(second.sequence(), 2);

        assert!(matches!(frame.redeem(first), Err(Error::StaleFrame)));
        frame.redeem(second).unwrap();

        // Leasing without publishing does not advance the sequence
        let mut lease = frame.lease();
        lease.fill(RED);
        drop(lease);
        assert_eq!(frame.sequence(), 2);
    }

    #[test]
    fn test_copy_from_rgb24() {
        let mut frame = Frame::<16>::allocate(2, 2, PixelFormat::Rgb8).unwrap();
        // Two pixels per row plus two padding bytes
        let source = [
            1, 2, 3, 4, 5, 6, 0xAA, 0xAA, //
            7, 8, 9, 10, 11, 12, 0xAA, 0xAA,
        ];

        let mut lease = frame.lease();
        assert_eq!(lease.copy_from_rgb24(&source, 8), 2);
        let token = lease.publish();
        frame.redeem(token).unwrap();

        assert_eq!(frame.pixel(0, 0), Some(Rgb::new(1, 2, 3)));
        assert_eq!(frame.pixel(1, 0), Some(Rgb::new(4, 5, 6)));
        assert_eq!(frame.pixel(0, 1), Some(Rgb::new(7, 8, 9)));
        assert_eq!(frame.pixel(1, 1), Some(Rgb::new(10, 11, 12)));
    }

    #[test]
    fn test_copy_from_short_source() {
        let mut frame = Frame::<16>::allocate(2, 2, PixelFormat::Rgb8).unwrap();
        let mut lease = frame.lease();
        assert_eq!(lease.copy_from_rgb24(&[1, 2, 3, 4, 5, 6, 7], 6), 1);
        assert_eq!(lease.copy_from_rgb24(&[1, 2, 3], 3), 0);
        assert_eq!(lease[1], Rgb::new(4, 5, 6));
        assert_eq!(lease[2], BLACK);
    }

    #[test]
    fn test_row_mut() {
        let mut frame = Frame::<16>::allocate(3, 2, PixelFormat::Rgb8).unwrap();
        let mut lease = frame.lease();
        lease.row_mut(1).unwrap().fill(RED);
        assert!(lease.row_mut(2).is_none());
        let token = lease.publish();
        frame.redeem(token).unwrap();

        assert_eq!(frame.pixel(2, 0), Some(BLACK));
        assert_eq!(frame.pixel(0, 1), Some(RED));
        assert_eq!(frame.pixel(2, 1), Some(RED));
    }

    #[test]
    fn test_pixel_format_names() {
        assert_eq!(PixelFormat::Rgb8.as_str(), "RGB u8");
        assert_eq!(PixelFormat::parse_from_str("BGR u8"), Some(PixelFormat::Bgr8));
        assert_eq!(PixelFormat::parse_from_str("YUV"), None);
        assert_eq!(PixelFormat::Rgba8.components(), 4);
    }
}
