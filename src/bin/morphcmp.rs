// src/bin/morphcmp.rs

//! Comparison driver: runs the selected algorithms over one image and one
//! generated structuring-element family, checks that every algorithm of
//! the same operation produced the same residues, and exports counter
//! CSVs (plus PNG/text dumps on request).

use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dualmorph::geom::{BoundingBox, Position};
use dualmorph::{
    Algorithm, BinaryImage, GrayscaleImage, Mode, StructuringElement, codec, transform,
};

const EXIT_USAGE: u8 = (-1i32) as u8;
const EXIT_LOAD: u8 = (-2i32) as u8;
const EXIT_SAVE: u8 = (-3i32) as u8;
const RESULT_ENGINE_FAILURE: u8 = 1 << 1;
const RESULT_OUTPUT_MISMATCH: u8 = 1 << 2;

const SLOTS: [(Mode, Algorithm); 6] = [
    (Mode::Erosion, Algorithm::Naive),
    (Mode::Erosion, Algorithm::Border),
    (Mode::Erosion, Algorithm::Matrix),
    (Mode::Dilation, Algorithm::Naive),
    (Mode::Dilation, Algorithm::Border),
    (Mode::Dilation, Algorithm::Matrix),
];

struct Options {
    image_path: String,
    counter_prefix: String,
    se_length: i64,
    number_of_se: usize,
    algorithms: u8,
    seed: i64,
    image_info: bool,
    random_content: bool,
    save_images: bool,
    verbose: bool,
}

fn usage(program: &str) {
    eprintln!(
        "usage: {program} [-i] [-r] [-s] [-v] \
         image_path counter_data_prefix se_length number_of_se algorithms seed"
    );
    eprintln!("\t-i: display image foreground and background pixel counts");
    eprintln!(
        "\t-r: seed the structuring element content from the clock \
         instead of the fixed default"
    );
    eprintln!("\t-s: save input and output images");
    eprintln!("\t-v: verbose");
    eprintln!("\tse_length: odd side of the square structuring elements, 3 to 9");
    eprintln!("\tnumber_of_se: how many structuring elements to generate");
    eprintln!(
        "\talgorithms: bitmask; bits 0-2 select naive/border/matrix erosion, \
         bits 3-5 the same for dilation"
    );
    eprintln!("\tseed: seed for the shuffle generator, -1 to seed from the clock");
}

fn parse_options(args: &[String]) -> Option<Options> {
    let mut image_info = false;
    let mut random_content = false;
    let mut save_images = false;
    let mut verbose = false;
    let mut positional = Vec::new();
    for argument in args {
        match argument.as_str() {
            "-i" => image_info = true,
            "-r" => random_content = true,
            "-s" => save_images = true,
            "-v" => verbose = true,
            other if other.starts_with('-') && other.parse::<i64>().is_err() => return None,
            other => positional.push(other.to_string()),
        }
    }
    if positional.len() != 6 {
        return None;
    }
    let se_length: i64 = positional[2].parse().ok()?;
    if !(3..=9).contains(&se_length) || se_length % 2 == 0 {
        return None;
    }
    let number_of_se: usize = positional[3].parse().ok()?;
    if number_of_se < 1 {
        return None;
    }
    let algorithms: u8 = positional[4].parse().ok()?;
    if algorithms > 0b11_1111 {
        return None;
    }
    let seed: i64 = positional[5].parse().ok()?;
    if seed < -1 {
        return None;
    }
    Some(Options {
        image_path: positional[0].clone(),
        counter_prefix: positional[1].clone(),
        se_length,
        number_of_se,
        algorithms,
        seed,
        image_info,
        random_content,
        save_images,
        verbose,
    })
}

/// A square element of the requested side around the origin: the origin
/// is always set and every other cell is drawn at random from the
/// content generator.
fn build_element<R: Rng>(
    half_length: i64,
    rng: &mut R,
) -> dualmorph::Result<StructuringElement> {
    let lower = Position::from_coords(vec![-half_length, -half_length])?;
    let upper = Position::from_coords(vec![half_length, half_length])?;
    let bounds = BoundingBox::new(&lower, &upper)?;
    let mut element = StructuringElement::new(&bounds, true)?;
    let mut p = Position::origin(2)?;
    for x in -half_length..=half_length {
        p.set_value(0, x)?;
        for y in -half_length..=half_length {
            if x == 0 && y == 0 {
                continue;
            }
            p.set_value(1, y)?;
            element.set_value(&p, rng.gen_range(0..2) == 1)?;
        }
    }
    p.set_value(0, 0)?;
    p.set_value(1, 0)?;
    element.set_value(&p, true)?;
    Ok(element)
}

fn slot_suffix(slot: usize) -> String {
    let (mode, algorithm) = SLOTS[slot];
    format!(".{}_{}", mode.label(), algorithm.label())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

fn run(options: &Options) -> u8 {
    // Element content draws from its own generator; `-r` trades the fixed
    // default seed for the clock.  The `seed` argument only governs the
    // shuffle stream below.
    let content_seed = if options.random_content {
        clock_seed()
    } else {
        0
    };
    let mut content_rng = StdRng::seed_from_u64(content_seed);
    let mut family = Vec::with_capacity(options.number_of_se);
    let half_length = (options.se_length - 1) / 2;
    for _ in 0..options.number_of_se {
        match build_element(half_length, &mut content_rng) {
            Ok(element) => family.push(element),
            Err(e) => {
                error!("failed to build the structuring element family: {e}");
                return EXIT_USAGE;
            }
        }
    }

    let shuffle_seed = if options.seed == -1 {
        clock_seed()
    } else {
        options.seed as u64
    };
    let mut rng = StdRng::seed_from_u64(shuffle_seed);

    let (image_d, image_e) = match codec::load_binary_image(&options.image_path) {
        Ok(pair) => pair,
        Err(e) => {
            error!("failed to load '{}': {e}", options.image_path);
            return EXIT_LOAD;
        }
    };
    if options.save_images {
        let saved = codec::save_binary_image(
            format!("{}.input_d.png", options.image_path),
            &image_d,
        )
        .and_then(|_| {
            codec::save_binary_image(format!("{}.input_e.png", options.image_path), &image_e)
        });
        if let Err(e) = saved {
            error!("failed to save the input copies: {e}");
            return EXIT_SAVE;
        }
    }

    let width = image_e.length(0).unwrap_or(0);
    let height = image_e.length(1).unwrap_or(0);
    if options.verbose {
        println!("Image size: {width} x {height}");
        if options.image_info {
            let foreground = image_e.count_foreground();
            let background = (width * height) as usize - foreground;
            println!(
                "Input image foreground pixels: {foreground}\t\
                 Input image background pixels: {background}"
            );
        }
    }

    let mut result: u8 = 0;
    let mut outputs: [Option<GrayscaleImage>; 6] = Default::default();
    let mut counters = Vec::new();
    let mut times_us: [Option<u128>; 6] = [None; 6];
    for (slot, &(mode, algorithm)) in SLOTS.iter().enumerate() {
        counters.push(None);
        if options.algorithms & (1 << slot) == 0 {
            continue;
        }
        if options.verbose {
            println!("Algorithm: {} {}", algorithm.label(), mode.label());
        }
        let image = match mode {
            Mode::Erosion => &image_e,
            Mode::Dilation => &image_d,
        };
        let output = match transform(algorithm, mode, image, &family, &mut rng) {
            Ok(output) => output,
            Err(e) => {
                error!("{} {} failed: {e}", algorithm.label(), mode.label());
                result |= RESULT_ENGINE_FAILURE;
                continue;
            }
        };
        let unpadded = match output.residues.unpadded() {
            Ok(unpadded) => unpadded,
            Err(e) => {
                error!("{} {}: unpadding failed: {e}", algorithm.label(), mode.label());
                result |= RESULT_ENGINE_FAILURE;
                continue;
            }
        };
        times_us[slot] = Some(output.elapsed_us());
        counters[slot] = Some(output.counters);
        outputs[slot] = Some(unpadded);
        info!(
            "{} {}: {} iterations",
            algorithm.label(),
            mode.label(),
            counters[slot].as_ref().map(|c| c.iterations()).unwrap_or(0)
        );
        if options.image_info {
            if let Some(output) = &outputs[slot] {
                if let Ok(foreground) = output.count_nonnegative() {
                    let background = (width * height) as usize - foreground;
                    println!(
                        "{} {} - foreground pixels: {foreground}\t\
                         background pixels: {background}",
                        algorithm.label(),
                        mode.label()
                    );
                }
            }
        }
    }

    // Residues of the same operation must agree pixel for pixel.
    for base in [0, 3] {
        for m in base..base + 2 {
            for n in (m + 1)..base + 3 {
                let (Some(a), Some(b)) = (&outputs[m], &outputs[n]) else {
                    continue;
                };
                if a == b {
                    if options.verbose {
                        println!("verbose message: {} images equal.", SLOTS[m].0.label());
                    }
                } else {
                    error!(
                        "{} images differ between {} and {}",
                        SLOTS[m].0.label(),
                        SLOTS[m].1.label(),
                        SLOTS[n].1.label()
                    );
                    result |= RESULT_OUTPUT_MISMATCH;
                }
            }
        }
    }

    if result == 0 {
        print!(
            "{};{};{};{};",
            options.se_length, options.number_of_se, width, height
        );
        for slot in 0..SLOTS.len() {
            if let Some(elapsed) = times_us[slot] {
                print!("{:.4e}", elapsed as f64);
            }
            if slot + 1 < SLOTS.len() {
                print!(";");
            }
        }
        println!();
    }

    if options.save_images {
        for slot in 0..SLOTS.len() {
            let Some(output) = &outputs[slot] else {
                continue;
            };
            let stem = format!("{}{}", options.image_path, slot_suffix(slot));
            if let Err(e) = codec::save_grayscale_image(format!("{stem}.png"), output) {
                error!("failed to save '{stem}.png': {e}");
                return EXIT_SAVE;
            }
            let dumped = File::create(format!("{stem}.txt"))
                .map_err(dualmorph::MorphError::from)
                .and_then(|file| output.dump_text(&mut BufWriter::new(file)));
            if let Err(e) = dumped {
                error!("failed to save '{stem}.txt': {e}");
                return EXIT_SAVE;
            }
        }
    }

    for slot in 0..SLOTS.len() {
        let Some(counter_set) = &counters[slot] else {
            continue;
        };
        let path = format!("{}{}.csv", options.counter_prefix, slot_suffix(slot));
        let written = File::create(&path)
            .map_err(dualmorph::MorphError::from)
            .and_then(|file| codec::write_counters(&mut BufWriter::new(file), counter_set));
        if let Err(e) = written {
            error!("failed to save '{path}': {e}");
            return EXIT_SAVE;
        }
    }

    result
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let program = args
        .first()
        .map(String::as_str)
        .unwrap_or("morphcmp")
        .to_string();
    let Some(options) = parse_options(&args[1..]) else {
        usage(&program);
        return ExitCode::from(EXIT_USAGE);
    };
    ExitCode::from(run(&options))
}
