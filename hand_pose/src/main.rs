//! pose_probe — classify a JSON-lines landmark stream and print one line per
//! frame.
//!
//! Reads frames of the form `[[{"x":..,"y":..,"z":..}, ...21], ...]` from the
//! file given as the first argument, or stdin when absent.  Useful for
//! checking thresholds against recorded detector output.

use hand_pose::{ClassifierConfig, GestureClassifier, HandFrame};
use std::fs::File;
use std::io::{self, BufRead, BufReader};

fn main() {
    let input: Box<dyn BufRead> = match std::env::args().nth(1) {
        Some(path) if path != "-" => match File::open(&path) {
            Ok(f)  => Box::new(BufReader::new(f)),
            Err(e) => {
                eprintln!("Error: cannot open {}: {}", path, e);
                std::process::exit(1);
            }
        },
        _ => Box::new(BufReader::new(io::stdin())),
    };

    let mut classifier = GestureClassifier::new(ClassifierConfig::default());

    println!("  frame  fist  palm  pinch  victory      x       y   pinch-d");
    for (n, line) in input.lines().enumerate() {
        let line = match line {
            Ok(l)  => l,
            Err(e) => { eprintln!("Error: read failed: {}", e); break; }
        };
        if line.trim().is_empty() { continue; }

        let frame = match HandFrame::from_json_line(&line) {
            Ok(f)  => f,
            Err(e) => { println!("  {:>5}  skipped: {}", n, e); continue; }
        };

        match classifier.observe(&frame) {
            Some(s) => println!(
                "  {:>5}  {:>4}  {:>4}  {:>5}  {:>7}  {:>6.3}  {:>6.3}  {:>7.3}",
                n,
                flag(s.is_fist), flag(s.is_open_palm), flag(s.is_pinching), flag(s.is_victory),
                s.hand_position.x, s.hand_position.y, s.pinch_distance,
            ),
            None => println!("  {:>5}  (no hand)", n),
        }
    }
}

fn flag(b: bool) -> &'static str { if b { "yes" } else { "-" } }
