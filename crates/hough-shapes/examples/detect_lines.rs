use hough_shapes::core::seeded_rng;
use hough_shapes::{detect, DetectionConfig};

#[cfg(feature = "tracing")]
use hough_shapes::core::init_tracing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(false);

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: detect_lines <image_path> [votes]");
        return Ok(());
    };
    let votes = match std::env::args().nth(2) {
        Some(v) => v.parse()?,
        None => 50,
    };

    let img = image::open(path)?.to_luma8();
    let config = DetectionConfig::default();

    let found = detect::detect_lines_randomized(&img, &config, votes, 10, seeded_rng(1), None)?;
    println!(
        "randomized: {} lines in {} iterations ({:?})",
        found.lines.len(),
        found.iterations,
        found.termination
    );
    for line in &found.lines {
        let n = line.normal();
        println!(
            "  theta={:.4} rho={:.1} votes={}",
            n.theta, n.rho, line.votes
        );
    }

    let (lines, _) = detect::detect_lines_standard(&img, &config, 1.0, votes)?;
    println!("standard: {} peaks", lines.len());
    Ok(())
}
