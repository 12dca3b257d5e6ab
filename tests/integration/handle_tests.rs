//! Slide handle lifecycle tests.
//!
//! These tests verify:
//! - Opening valid and unrecognized files
//! - Geometry is queried once at open time and survives disposal
//! - Disposal releases the session exactly once (explicit, repeated, drop)
//! - Decoder-backed queries fail after disposal

use wholeslide::error::{DecodeError, SlideError};
use wholeslide::region::RegionRequest;
use wholeslide::slide::SlideHandle;

use super::test_utils::{init_tracing, MockDecoder, MockSession, RecordingCanvas};

// =============================================================================
// Open
// =============================================================================

#[test]
fn test_open_reads_geometry_once() {
    init_tracing();
    let decoder = MockDecoder::standard();
    let tracker = decoder.tracker();

    let slide = SlideHandle::open(&decoder, "CMU-1.svs").unwrap();

    assert_eq!(tracker.layer_count_queries(), 1);
    assert_eq!(tracker.dimension_queries(), 3);

    assert_eq!(slide.layer_count(), 3);
    assert_eq!(slide.layer0_width(), 10000);
    assert_eq!(slide.layer0_height(), 8000);
    assert_eq!(slide.layer_width(1), Some(2500));
    assert_eq!(slide.layer_height(2), Some(500));

    // Accessors never go back to the decoder
    for layer in 0..slide.layer_count() {
        let _ = slide.layer_dimensions(layer);
    }
    assert_eq!(tracker.layer_count_queries(), 1);
    assert_eq!(tracker.dimension_queries(), 3);
}

#[test]
fn test_open_unrecognized_file() {
    let decoder = MockDecoder::standard();
    let tracker = decoder.tracker();

    let result = SlideHandle::open(&decoder, "notes.txt");

    match result {
        Err(SlideError::Open { path, source }) => {
            assert_eq!(path.to_str(), Some("notes.txt"));
            assert!(matches!(source, DecodeError::Unsupported(_)));
        }
        other => panic!("Expected Open error, got {:?}", other),
    }
    assert_eq!(tracker.layer_count_queries(), 0);
    assert_eq!(tracker.closes(), 0);
}

#[test]
fn test_open_empty_pyramid() {
    let decoder = MockDecoder::new(&[]);
    let tracker = decoder.tracker();

    let result = SlideHandle::open(&decoder, "empty.svs");

    assert!(matches!(result, Err(SlideError::Open { .. })));
    assert_eq!(tracker.closes(), 1);
}

#[test]
fn test_is_valid_file() {
    let decoder = MockDecoder::standard();
    assert!(SlideHandle::is_valid_file(&decoder, "slides/CMU-1.svs"));
    assert!(!SlideHandle::is_valid_file(&decoder, "slides/CMU-1.jpg"));
}

#[test]
fn test_independent_handles() {
    let decoder = MockDecoder::standard();
    let tracker = decoder.tracker();

    let mut first = SlideHandle::open(&decoder, "a.svs").unwrap();
    let second = SlideHandle::open(&decoder, "a.svs").unwrap();

    first.dispose();
    assert!(first.is_disposed());
    assert!(!second.is_disposed());
    assert!(second.comment().is_ok());
    assert_eq!(tracker.closes(), 1);

    drop(second);
    assert_eq!(tracker.closes(), 2);
}

#[test]
fn test_handle_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<SlideHandle<MockSession>>();
}

// =============================================================================
// Dispose
// =============================================================================

#[test]
fn test_dispose_twice_releases_once() {
    let decoder = MockDecoder::standard();
    let tracker = decoder.tracker();
    let mut slide = SlideHandle::open(&decoder, "CMU-1.svs").unwrap();

    slide.dispose();
    slide.dispose();
    assert_eq!(tracker.closes(), 1);

    drop(slide);
    assert_eq!(tracker.closes(), 1);
}

#[test]
fn test_drop_releases_session() {
    let decoder = MockDecoder::standard();
    let tracker = decoder.tracker();

    {
        let slide = SlideHandle::open(&decoder, "CMU-1.svs").unwrap();
        assert_eq!(slide.layer_count(), 3);
        assert_eq!(tracker.closes(), 0);
    }

    assert_eq!(tracker.closes(), 1);
}

#[test]
fn test_geometry_survives_dispose() {
    let decoder = MockDecoder::standard();
    let mut slide = SlideHandle::open(&decoder, "CMU-1.svs").unwrap();
    slide.dispose();

    assert_eq!(slide.layer_count(), 3);
    assert_eq!(slide.layer0_width(), 10000);
    assert_eq!(slide.layer0_height(), 8000);
    assert_eq!(slide.layer_dimensions(1), Some((2500, 2000)));
}

#[test]
fn test_comment() {
    let decoder = MockDecoder::standard().with_comment("Aperio Image Library v10.0.50");
    let mut slide = SlideHandle::open(&decoder, "CMU-1.svs").unwrap();

    assert_eq!(
        slide.comment().unwrap().as_deref(),
        Some("Aperio Image Library v10.0.50")
    );

    slide.dispose();
    assert!(matches!(slide.comment(), Err(SlideError::Disposed)));
}

#[test]
fn test_reads_fail_after_dispose() {
    let decoder = MockDecoder::standard();
    let tracker = decoder.tracker();
    let mut slide = SlideHandle::open(&decoder, "CMU-1.svs").unwrap();
    slide.dispose();

    let mut canvas = RecordingCanvas::new();
    let request = RegionRequest::new(0, 0, 100, 100, 1.0);

    assert!(matches!(
        slide.paint_region(&mut canvas, &request),
        Err(SlideError::Disposed)
    ));
    assert!(matches!(
        slide.read_region(0, 0, 0, 10, 10),
        Err(SlideError::Disposed)
    ));
    assert!(matches!(
        slide.create_thumbnail(100),
        Err(SlideError::Disposed)
    ));
    assert!(matches!(
        slide.layer_downsample(0),
        Err(SlideError::Disposed)
    ));

    assert_eq!(tracker.read_count(), 0);
    assert!(canvas.ops.is_empty());
}

#[test]
fn test_disposed_takes_precedence_over_invalid_downsample() {
    let decoder = MockDecoder::standard();
    let mut slide = SlideHandle::open(&decoder, "CMU-1.svs").unwrap();
    slide.dispose();

    let mut canvas = RecordingCanvas::new();
    let request = RegionRequest::new(0, 0, 10, 10, 0.5);
    assert!(matches!(
        slide.paint_region(&mut canvas, &request),
        Err(SlideError::Disposed)
    ));
}

#[test]
fn test_read_region_too_large() {
    let decoder = MockDecoder::standard();
    let tracker = decoder.tracker();
    let mut slide = SlideHandle::open(&decoder, "CMU-1.svs").unwrap();

    let result = slide.read_region(0, 0, 0, u32::MAX, u32::MAX);

    assert!(matches!(result, Err(SlideError::RegionTooLarge { .. })));
    assert_eq!(tracker.read_count(), 0);
    assert!(!slide.is_disposed());
}
