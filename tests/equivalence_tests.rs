//! Cross-algorithm and cross-mode properties on generated inputs.

use dualmorph::geom::{BoundingBox, Position};
use dualmorph::{Algorithm, BinaryImage, GrayscaleImage, Mode, Size, StructuringElement, transform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALGORITHMS: [Algorithm; 3] = [Algorithm::Naive, Algorithm::Border, Algorithm::Matrix];

fn pos(x: i64, y: i64) -> Position {
    Position::from_coords(vec![x, y]).unwrap()
}

fn random_image(width: i64, height: i64, density_percent: u32, rng: &mut StdRng) -> BinaryImage {
    let size = Size::from_lengths(&[width, height]).unwrap();
    let mut image = BinaryImage::new(&size, true).unwrap();
    for y in 0..height {
        for x in 0..width {
            if rng.gen_range(0..100) < density_percent {
                image.set_value(&pos(x, y), true).unwrap();
            }
        }
    }
    image
}

/// A 3x3 element with random non-origin content (origin always set, and
/// at least one non-origin offset so no element degenerates to the
/// identity).
fn random_element(rng: &mut StdRng) -> StructuringElement {
    let bounds = BoundingBox::new(&pos(-1, -1), &pos(1, 1)).unwrap();
    let mut element = StructuringElement::new(&bounds, true).unwrap();
    element.set_value(&pos(0, 0), true).unwrap();
    let mut offsets = 0;
    for x in -1..=1 {
        for y in -1..=1 {
            if x == 0 && y == 0 {
                continue;
            }
            if rng.gen_range(0..2) == 1 {
                element.set_value(&pos(x, y), true).unwrap();
                offsets += 1;
            }
        }
    }
    if offsets == 0 {
        element.set_value(&pos(1, 0), true).unwrap();
    }
    element
}

#[test]
fn all_algorithms_compute_identical_residues() {
    let mut setup_rng = StdRng::seed_from_u64(0xD1CE);
    for case in 0..6u64 {
        let image = random_image(12, 10, 40, &mut setup_rng);
        let family: Vec<StructuringElement> = (0..2).map(|_| random_element(&mut setup_rng)).collect();
        for mode in [Mode::Erosion, Mode::Dilation] {
            let mut reference: Option<GrayscaleImage> = None;
            for algorithm in ALGORITHMS {
                let mut rng = StdRng::seed_from_u64(1000 + case);
                let output = transform(algorithm, mode, &image, &family, &mut rng).unwrap();
                match &reference {
                    None => reference = Some(output.residues),
                    Some(expected) => assert_eq!(
                        &output.residues, expected,
                        "case {case}, {:?} under {:?}",
                        algorithm, mode
                    ),
                }
            }
        }
    }
}

#[test]
fn residues_never_exceed_the_iteration_count() {
    let mut setup_rng = StdRng::seed_from_u64(0xBEEF);
    let image = random_image(14, 14, 55, &mut setup_rng);
    let family = vec![random_element(&mut setup_rng), random_element(&mut setup_rng)];
    for mode in [Mode::Erosion, Mode::Dilation] {
        let mut rng = StdRng::seed_from_u64(4);
        let output = transform(Algorithm::Border, mode, &image, &family, &mut rng).unwrap();
        let last_iteration = (output.counters.iterations() - 1) as i32;
        for y in 0..14 {
            for x in 0..14 {
                let residue = output.residues.value(&pos(x, y)).unwrap();
                assert!(residue >= -1);
                assert!(residue <= last_iteration, "({x},{y}): {residue}");
            }
        }
    }
}

#[test]
fn counter_vectors_share_one_length_per_run() {
    let mut setup_rng = StdRng::seed_from_u64(0xACE);
    let image = random_image(9, 9, 50, &mut setup_rng);
    let family = vec![random_element(&mut setup_rng)];
    for algorithm in ALGORITHMS {
        let mut rng = StdRng::seed_from_u64(21);
        let output = transform(algorithm, Mode::Erosion, &image, &family, &mut rng).unwrap();
        let c = &output.counters;
        let len = c.iterations();
        assert!(len >= 1);
        assert_eq!(c.detect_comparisons.len(), len);
        assert_eq!(c.insert_comparisons.len(), len);
        assert_eq!(c.insert_accesses.len(), len);
        assert_eq!(c.remove_comparisons.len(), len);
        assert_eq!(c.remove_accesses.len(), len);
        assert_eq!(c.border_elements.len(), len);
        assert!(c.remove_comparisons.iter().all(|&v| v == 0));
    }
}

#[test]
fn origin_only_family_is_a_fixed_point() {
    let mut setup_rng = StdRng::seed_from_u64(0xF00D);
    let image = random_image(8, 8, 50, &mut setup_rng);
    let origin_only =
        StructuringElement::new(&BoundingBox::at_origin(2).unwrap(), false).unwrap();
    for mode in [Mode::Erosion, Mode::Dilation] {
        let mut rng = StdRng::seed_from_u64(8);
        let output = transform(Algorithm::Matrix, mode, &image, &[origin_only.clone()], &mut rng)
            .unwrap();
        for y in 0..8 {
            for x in 0..8 {
                let expected = if image.value(&pos(x, y)).unwrap() { 0 } else { -1 };
                assert_eq!(output.residues.value(&pos(x, y)).unwrap(), expected);
            }
        }
        assert!(output.counters.border_elements.iter().all(|&b| b == 0));
    }
}

/// Embeds the complement of `image` in a box padded by `padding` on every
/// side: the ring is foreground, the interior is the negated image.
fn padded_complement(image: &BinaryImage, padding: i64) -> BinaryImage {
    let width = image.length(0).unwrap();
    let height = image.length(1).unwrap();
    let size = Size::with_padding(&[width + 2 * padding, height + 2 * padding], padding).unwrap();
    let mut output = BinaryImage::new(&size, true).unwrap();
    for y in 0..height + 2 * padding {
        for x in 0..width + 2 * padding {
            let inside =
                x >= padding && x < width + padding && y >= padding && y < height + padding;
            let value = if inside {
                !image.value(&pos(x - padding, y - padding)).unwrap()
            } else {
                true
            };
            if value {
                output.set_value(&pos(x, y), true).unwrap();
            }
        }
    }
    output
}

#[test]
fn erosion_is_dual_to_dilation_of_the_complement() {
    // erosion(X, S) mirrors dilation(complement(X), reflect(S)) pixel for
    // pixel once the dilation side has room to treat the outside of X as
    // foreground.  Identical seeds align the shuffle streams, so even the
    // per-iteration residues agree, not just the fixed point.
    let mut setup_rng = StdRng::seed_from_u64(0xDA7A);
    for case in 0..4u64 {
        let image = random_image(10, 9, 45, &mut setup_rng);
        let family: Vec<StructuringElement> =
            (0..2).map(|_| random_element(&mut setup_rng)).collect();
        let reflected: Vec<StructuringElement> = family
            .iter()
            .map(|element| element.reflect_by_origin().unwrap())
            .collect();
        // 3x3 elements probe at most one cell away, but give the
        // complement room for the whole run.
        let padding = 12;
        let complement = padded_complement(&image, padding);

        let mut erosion_rng = StdRng::seed_from_u64(3000 + case);
        let eroded =
            transform(Algorithm::Border, Mode::Erosion, &image, &family, &mut erosion_rng)
                .unwrap();
        let mut dilation_rng = StdRng::seed_from_u64(3000 + case);
        let dilated = transform(
            Algorithm::Border,
            Mode::Dilation,
            &complement,
            &reflected,
            &mut dilation_rng,
        )
        .unwrap();

        for y in 0..9 {
            for x in 0..10 {
                let r_e = eroded.residues.value(&pos(x, y)).unwrap();
                let r_d = dilated
                    .residues
                    .value(&pos(x + padding, y + padding))
                    .unwrap();
                if image.value(&pos(x, y)).unwrap() {
                    assert_eq!(r_e, r_d, "case {case} at ({x},{y})");
                } else {
                    assert_eq!(r_e, -1, "case {case} at ({x},{y})");
                    assert_eq!(r_d, 0, "case {case} at ({x},{y})");
                }
            }
        }
    }
}
