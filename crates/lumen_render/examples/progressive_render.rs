//! Progressive render example.
//!
//! Renders the Cornell box scene in the background, polls progress
//! while it converges, then saves the result to PPM format.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Duration;

use lumen_render::{Camera, PathTracer, Pixel, ProgressiveRenderer, RenderSettings, Scene};

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .init();

    let settings = RenderSettings {
        width: 640,
        height: 360,
        samples_per_pixel: 64,
        max_depth: 3,
    };

    let mut camera = Camera::new();
    camera.set_position_orientation(lumen_render::Vec3::new(0.0, 0.0, 0.0), 0.0, -0.15);

    println!(
        "Rendering {}x{} @ {} spp...",
        settings.width, settings.height, settings.samples_per_pixel
    );

    let mut renderer = ProgressiveRenderer::new(
        Scene::cornell_box(),
        camera,
        PathTracer::Completion,
        settings,
    );
    renderer.start();

    while renderer.is_running() {
        let progress = renderer.poll_progress();
        println!(
            "pass {}/{}, {} pixels, {:?} elapsed",
            progress.pass_index + 1,
            progress.pass_total,
            progress.pixels_in_pass,
            progress.elapsed
        );
        std::thread::sleep(Duration::from_millis(500));
    }
    renderer.wait();

    let progress = renderer.poll_progress();
    println!("Rendered in {:?}", progress.elapsed);

    let filename = "output.ppm";
    let buffer = renderer.buffer();
    save_ppm(&buffer.snapshot(), buffer.width(), buffer.height(), filename)
        .expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn save_ppm(pixels: &[Pixel], width: u32, height: u32, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", width, height)?;
    writeln!(writer, "255")?;

    for pixel in pixels {
        let r = (pixel.r.clamp(0.0, 1.0) * 255.0) as u8;
        let g = (pixel.g.clamp(0.0, 1.0) * 255.0) as u8;
        let b = (pixel.b.clamp(0.0, 1.0) * 255.0) as u8;
        writeln!(writer, "{} {} {}", r, g, b)?;
    }

    Ok(())
}
