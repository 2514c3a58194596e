use fxg_swf::{Character, FxgTranscoder, GraphicNode, MemoryResourceResolver};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let graphic = GraphicNode::from_json_str(include_str!("../tests/data/badge.json"))?;

    let mut logo = Vec::new();
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        4,
        2,
        image::Rgba([255, 0, 0, 128]),
    ))
    .write_to(&mut std::io::Cursor::new(&mut logo), image::ImageFormat::Png)?;

    let resolver = MemoryResourceResolver::new().with_entry("logo.png", logo);
    let out = FxgTranscoder::new(resolver).transcode(&graphic)?;

    for (id, character) in out.dictionary.iter() {
        match character {
            Character::Sprite(s) => {
                println!("{:>3} sprite {:<18} {} placement(s)", id.0, s.label, s.placements.len())
            }
            Character::Shape(s) => println!(
                "{:>3} shape  {} record(s), {} fill(s), {} line(s)",
                id.0,
                s.records.len(),
                s.fill_styles.len(),
                s.line_styles.len()
            ),
            Character::Bitmap(b) => println!("{:>3} bitmap {}x{}", id.0, b.width, b.height),
        }
    }
    for problem in &out.problems {
        println!("problem: {problem}");
    }

    Ok(())
}
