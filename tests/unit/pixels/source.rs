use super::*;

fn gradient(w: u32, h: u32, channels: usize) -> SourceImage {
    let mut data = Vec::with_capacity(w as usize * h as usize * channels);
    for y in 0..h {
        for x in 0..w {
            for c in 0..channels {
                data.push(((x * 16 + y * 4 + c as u32 * 50) % 256) as u8);
            }
        }
    }
    SourceImage::new(w, h, channels, data).unwrap()
}

#[test]
fn new_rejects_mismatched_length() {
    let err = SourceImage::new(2, 2, 3, vec![0; 11]).unwrap_err();
    assert!(matches!(err, KaleidoError::InvalidParameter(_)));
}

#[test]
fn new_rejects_zero_dimensions_and_bad_channels() {
    assert!(SourceImage::new(0, 2, 3, vec![]).is_err());
    assert!(SourceImage::new(2, 2, 2, vec![0; 8]).is_err());
}

#[test]
fn pixel_indexes_row_major() {
    let src = gradient(3, 2, 4);
    let p = src.pixel(2, 1);
    let i = (3 + 2) * 4;
    assert_eq!(p, &src.data()[i..i + 4]);
}

#[test]
fn from_dynamic_keeps_rgb_and_rgba() {
    let rgb = DynamicImage::new_rgb8(5, 3);
    let src = SourceImage::from_dynamic(rgb).unwrap();
    assert_eq!(src.layout(), PixelLayout::Rgb8);
    assert_eq!((src.width(), src.height()), (5, 3));

    let rgba = DynamicImage::new_rgba8(2, 7);
    let src = SourceImage::from_dynamic(rgba).unwrap();
    assert_eq!(src.layout(), PixelLayout::Rgba8);
}

#[test]
fn from_dynamic_converts_luma() {
    let src = SourceImage::from_dynamic(DynamicImage::new_luma8(4, 4)).unwrap();
    assert_eq!(src.channels(), 3);
    let src = SourceImage::from_dynamic(DynamicImage::new_luma_a8(4, 4)).unwrap();
    assert_eq!(src.channels(), 4);
}

#[test]
fn downscale_is_noop_when_within_limit() {
    let src = gradient(8, 6, 3);
    assert!(src.downscaled_to_fit(8).unwrap().is_none());
}

#[test]
fn downscale_preserves_aspect_and_layout() {
    let src = gradient(40, 20, 4);
    let small = src.downscaled_to_fit(10).unwrap().unwrap();
    assert_eq!((small.width(), small.height()), (10, 5));
    assert_eq!(small.layout(), PixelLayout::Rgba8);
}

#[test]
fn prepare_preview_shares_small_sources() {
    let src = Arc::new(gradient(4, 4, 3));
    let preview = prepare_preview(&src, PREVIEW_MAX_DIM).unwrap();
    assert!(Arc::ptr_eq(&src, &preview));
}
