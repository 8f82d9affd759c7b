use super::*;

fn checker(w: u32, h: u32) -> SourceImage {
    let mut data = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let v = if (x + y) % 2 == 0 { 0 } else { 200 };
            data.extend_from_slice(&[v, (x * 10) as u8, (y * 10) as u8]);
        }
    }
    SourceImage::new(w, h, 3, data).unwrap()
}

#[test]
fn neighbours_never_leave_the_axis() {
    for dim in [1u32, 2, 3, 17] {
        for coord in [-1e12, -3.5, -0.0, 0.0, 0.4, 1.999, 2.0, 16.5, 1e12, f64::INFINITY] {
            let (i0, i1, f) = neighbours(coord, dim);
            assert!(i0 < dim as usize && i1 < dim as usize, "coord={coord} dim={dim}");
            assert!((0.0..1.0).contains(&f));
        }
    }
}

#[test]
fn integer_coordinates_return_exact_texels() {
    let src = checker(4, 3);
    let mut px = [0u8; 3];
    sample_bilinear(&src, 1.0, 1.0, &mut px);
    assert_eq!(&px, src.pixel(1, 1));
    sample_bilinear(&src, 2.0, 0.0, &mut px);
    assert_eq!(&px, src.pixel(2, 0));
}

#[test]
fn midpoint_blends_four_neighbours() {
    let src = SourceImage::new(2, 2, 3, vec![0, 0, 0, 100, 0, 0, 0, 100, 0, 100, 100, 255]).unwrap();
    let mut px = [0u8; 3];
    sample_bilinear(&src, 0.5, 0.5, &mut px);
    assert_eq!(px, [50, 50, 64]);
}

#[test]
fn far_outside_coordinates_clamp_to_edges() {
    let src = checker(5, 4);
    let mut px = [0u8; 3];

    sample_bilinear(&src, -1e9, -1e9, &mut px);
    assert_eq!(&px, src.pixel(0, 0));

    sample_bilinear(&src, 1e9, 1e9, &mut px);
    let corner = src.pixel(4, 3);
    for c in 0..3 {
        assert!(px[c].abs_diff(corner[c]) <= 1, "{px:?} vs {corner:?}");
    }
}

#[test]
fn single_pixel_source_is_constant() {
    let src = SourceImage::new(1, 1, 4, vec![9, 8, 7, 6]).unwrap();
    let mut px = [0u8; 4];
    for (x, y) in [(-5.0, 0.0), (0.3, 0.7), (40.0, -2.0)] {
        sample_bilinear(&src, x, y, &mut px);
        assert_eq!(px, [9, 8, 7, 6]);
    }
}
