//! TIFF parser and slide backend tests against on-disk files.
//!
//! These cover byte order, BigTIFF, Aperio and generic TIFF metadata and the
//! pyramid level selection rules through the public library API.

use wsi_inspect::format::tiff::TiffPyramid;
use wsi_inspect::io::{BlockCache, LocalFileReader};
use wsi_inspect::slide::{SlideBackend, SlideHandle};
use wsi_inspect::{detect_format, FormatError, SlideFormat, TiffBackend};

use super::test_utils::{
    aperio_slide, generic_slide, write_slide, ByteOrderType, IfdBuilder, TagValue, TiffBuilder,
    APERIO_DESCRIPTION, TAG_IMAGE_DESCRIPTION,
};

// =============================================================================
// Byte Order and BigTIFF
// =============================================================================

#[tokio::test]
async fn test_little_endian_tiff() {
    let file = write_slide(&generic_slide(ByteOrderType::LittleEndian, false), ".tif");

    let slide = TiffBackend::new().open(file.path()).await.unwrap();

    assert_eq!(slide.level_count(), 2);
    assert_eq!(slide.dimensions(), (2000, 1000));
    assert_eq!(slide.level_dimensions(), vec![(2000, 1000), (1000, 500)]);
    assert_eq!(slide.level_downsamples(), vec![1.0, 2.0]);
}

#[tokio::test]
async fn test_big_endian_tiff() {
    let file = write_slide(&generic_slide(ByteOrderType::BigEndian, false), ".tif");

    let slide = TiffBackend::new().open(file.path()).await.unwrap();

    assert_eq!(slide.level_count(), 2);
    assert_eq!(slide.dimensions(), (2000, 1000));
    assert_eq!(slide.properties().get("tiff.Software"), Some("libvips 8.14"));
}

#[tokio::test]
async fn test_both_byte_orders_produce_equivalent_results() {
    let le = write_slide(&aperio_slide(ByteOrderType::LittleEndian), ".svs");
    let be = write_slide(&aperio_slide(ByteOrderType::BigEndian), ".svs");

    let backend = TiffBackend::new();
    let le_slide = backend.open(le.path()).await.unwrap();
    let be_slide = backend.open(be.path()).await.unwrap();

    assert_eq!(le_slide.level_dimensions(), be_slide.level_dimensions());
    assert_eq!(le_slide.level_downsamples(), be_slide.level_downsamples());
    assert_eq!(
        format!("{:?}", le_slide.properties()),
        format!("{:?}", be_slide.properties())
    );
}

#[tokio::test]
async fn test_bigtiff_parsing() {
    let file = write_slide(&generic_slide(ByteOrderType::LittleEndian, true), ".tif");

    let reader = LocalFileReader::open(file.path()).await.unwrap();
    let pyramid = TiffPyramid::parse(&reader).await.unwrap();
    assert!(pyramid.header.is_bigtiff);
    assert_eq!(pyramid.ifd_count, 2);

    let slide = TiffBackend::new().open(file.path()).await.unwrap();
    assert_eq!(slide.level_dimensions(), vec![(2000, 1000), (1000, 500)]);
    assert_eq!(slide.properties().get("openslide.mpp-x"), Some("0.25"));
}

#[tokio::test]
async fn test_bigtiff_big_endian() {
    let file = write_slide(&generic_slide(ByteOrderType::BigEndian, true), ".tif");

    let slide = TiffBackend::new().open(file.path()).await.unwrap();
    assert_eq!(slide.level_count(), 2);
    assert_eq!(slide.properties().get("tiff.Make"), Some("Scanner"));
}

// =============================================================================
// Format Detection
// =============================================================================

#[tokio::test]
async fn test_format_detection_svs() {
    let file = write_slide(&aperio_slide(ByteOrderType::LittleEndian), ".svs");

    let reader = LocalFileReader::open(file.path()).await.unwrap();
    assert_eq!(
        detect_format(&reader).await.unwrap(),
        Some(SlideFormat::Aperio)
    );
}

#[tokio::test]
async fn test_format_detection_ignores_extension() {
    // Aperio content behind a .tif name is still Aperio
    let aperio = write_slide(&aperio_slide(ByteOrderType::LittleEndian), ".tif");
    // Generic content behind a .svs name is still generic
    let generic = write_slide(&generic_slide(ByteOrderType::LittleEndian, false), ".svs");

    let backend = TiffBackend::new();
    assert_eq!(
        backend.detect_format(aperio.path()).await.unwrap(),
        Some(SlideFormat::Aperio)
    );
    assert_eq!(
        backend.detect_format(generic.path()).await.unwrap(),
        Some(SlideFormat::GenericTiff)
    );
}

#[tokio::test]
async fn test_format_detection_not_tiff() {
    let file = write_slide(b"\x89PNG\r\n\x1a\n0000000000000000", ".png");

    let backend = TiffBackend::new();
    assert_eq!(backend.detect_format(file.path()).await.unwrap(), None);
    assert!(matches!(
        backend.open(file.path()).await,
        Err(FormatError::UnsupportedFormat { .. })
    ));
}

// =============================================================================
// Aperio Metadata
// =============================================================================

#[tokio::test]
async fn test_aperio_properties() {
    let file = write_slide(&aperio_slide(ByteOrderType::LittleEndian), ".svs");

    let slide = TiffBackend::new().open(file.path()).await.unwrap();
    assert_eq!(slide.format(), SlideFormat::Aperio);
    assert!(slide.path().ends_with(".svs"));
    assert_eq!(slide.levels()[1].tiles_x, 4);
    assert_eq!(slide.levels()[1].tiles_y, 2);

    let props = slide.properties();

    assert_eq!(props.get("openslide.vendor"), Some("aperio"));
    assert_eq!(props.get("aperio.AppMag"), Some("20"));
    assert_eq!(props.get("aperio.MPP"), Some("0.4990"));
    assert_eq!(props.get("aperio.ScanScope ID"), Some("SS1234"));
    assert_eq!(props.get("openslide.objective-power"), Some("20"));
    assert_eq!(props.get("openslide.mpp-x"), Some("0.4990"));
    assert_eq!(props.get("openslide.mpp-y"), Some("0.4990"));
    assert_eq!(props.get("openslide.comment"), Some(APERIO_DESCRIPTION));
    assert_eq!(props.get("tiff.ImageDescription"), Some(APERIO_DESCRIPTION));
    assert_eq!(props.get("openslide.level-count"), Some("3"));
    assert_eq!(props.get("openslide.level[2].width"), Some("256"));
    assert_eq!(props.get("openslide.level[2].downsample"), Some("16"));
    assert_eq!(props.get("openslide.level[0].tile-width"), Some("256"));
}

#[tokio::test]
async fn test_label_and_macro_are_not_levels() {
    let file = write_slide(&aperio_slide(ByteOrderType::LittleEndian), ".svs");

    let reader = LocalFileReader::open(file.path()).await.unwrap();
    let pyramid = TiffPyramid::parse(&reader).await.unwrap();
    assert_eq!(pyramid.ifd_count, 6);
    assert_eq!(pyramid.level_count(), 3);

    let ifd_indices: Vec<usize> = pyramid.levels.iter().map(|l| l.ifd_index).collect();
    assert_eq!(ifd_indices, vec![0, 2, 3]);
    assert_eq!(pyramid.dimensions(), Some((4096, 2048)));
    assert_eq!(pyramid.get_level(2).map(|l| l.width), Some(256));
    assert!(pyramid.get_level(3).is_none());

    let slide = TiffBackend::new().open(file.path()).await.unwrap();
    assert_eq!(
        slide.level_dimensions(),
        vec![(4096, 2048), (1024, 512), (256, 128)]
    );
    assert_eq!(slide.level_downsamples(), vec![1.0, 4.0, 16.0]);
}

#[tokio::test]
async fn test_aperio_without_mpp() {
    let data = TiffBuilder::new()
        .add_ifd(
            IfdBuilder::tiled(1024, 1024, 256, 256)
                .with_description("Aperio Image Library v10.0.50\n1024x1024|AppMag = 40"),
        )
        .build();
    let file = write_slide(&data, ".svs");

    let slide = TiffBackend::new().open(file.path()).await.unwrap();
    assert_eq!(slide.properties().get("openslide.objective-power"), Some("40"));
    assert!(!slide.properties().contains("aperio.MPP"));
    assert!(!slide.properties().contains("openslide.mpp-x"));
}

// =============================================================================
// Pyramid Rules
// =============================================================================

#[tokio::test]
async fn test_inconsistent_aspect_ratio_is_skipped() {
    let data = TiffBuilder::new()
        .add_ifd(IfdBuilder::tiled(4000, 4000, 256, 256))
        // 2x horizontally, 4x vertically
        .add_ifd(IfdBuilder::tiled(2000, 1000, 256, 256))
        .add_ifd(IfdBuilder::tiled(1000, 1000, 256, 256))
        .build();
    let file = write_slide(&data, ".tif");

    let slide = TiffBackend::new().open(file.path()).await.unwrap();
    assert_eq!(slide.level_dimensions(), vec![(4000, 4000), (1000, 1000)]);
    assert_eq!(slide.level_downsamples(), vec![1.0, 4.0]);
}

#[tokio::test]
async fn test_levels_sorted_by_size() {
    // Smallest level written first
    let data = TiffBuilder::new()
        .add_ifd(IfdBuilder::tiled(500, 500, 256, 256))
        .add_ifd(IfdBuilder::tiled(2000, 2000, 256, 256))
        .add_ifd(IfdBuilder::tiled(1000, 1000, 256, 256))
        .build();
    let file = write_slide(&data, ".tif");

    let slide = TiffBackend::new().open(file.path()).await.unwrap();
    assert_eq!(
        slide.level_dimensions(),
        vec![(2000, 2000), (1000, 1000), (500, 500)]
    );
    assert_eq!(slide.level_downsamples(), vec![1.0, 2.0, 4.0]);
}

#[tokio::test]
async fn test_no_tiled_levels_is_unsupported() {
    let data = TiffBuilder::new()
        .add_ifd(IfdBuilder::stripped(640, 480))
        .build();
    let file = write_slide(&data, ".tif");

    let result = TiffBackend::new().open(file.path()).await;
    assert!(matches!(result, Err(FormatError::UnsupportedFormat { .. })));
}

#[tokio::test]
async fn test_ifd_cycle_stops_walk() {
    // Single IFD whose next pointer loops back to itself
    let data = TiffBuilder::new()
        .add_ifd(IfdBuilder::tiled(1024, 1024, 256, 256).with_next_ifd(8))
        .build();
    let file = write_slide(&data, ".tif");

    let slide = TiffBackend::new().open(file.path()).await.unwrap();
    assert_eq!(slide.level_count(), 1);
}

#[tokio::test]
async fn test_truncated_value_is_format_error() {
    let mut data = TiffBuilder::new()
        .add_ifd(
            // One tile, so the description is the only out-of-line value
            IfdBuilder::tiled(256, 256, 256, 256).with(
                TAG_IMAGE_DESCRIPTION,
                TagValue::Ascii("x".repeat(64)),
            ),
        )
        .build();
    data.truncate(data.len() - 40);
    let file = write_slide(&data, ".tif");

    let result = TiffBackend::new().open(file.path()).await;
    assert!(result.is_err());
    assert!(result.err().unwrap().not_found_path().is_none());
}

// =============================================================================
// Block Cache
// =============================================================================

#[tokio::test]
async fn test_block_cache_serves_repeated_reads() {
    let file = write_slide(&aperio_slide(ByteOrderType::LittleEndian), ".svs");

    let reader = LocalFileReader::open(file.path()).await.unwrap();
    let cached = BlockCache::with_capacity(reader, 4096, 16);

    TiffPyramid::parse(&cached).await.unwrap();
    let misses = cached.misses();
    TiffPyramid::parse(&cached).await.unwrap();

    assert_eq!(cached.misses(), misses);
    assert!(cached.hits() > 0);
}
