//! Headless capture: PNG screenshots of the rendered framebuffer.

use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use crate::VidMem;

/// Save the current framebuffer as a PNG file.
///
/// The framebuffer is ARGB32; the encoder wants RGBA bytes.
pub fn save_screenshot(vidmem: &VidMem, path: &Path) -> Result<(), Box<dyn Error>> {
    let width = vidmem.framebuffer_width();
    let height = vidmem.framebuffer_height();

    let file = fs::File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let rgba: Vec<u8> = vidmem
        .framebuffer()
        .iter()
        .flat_map(|&pixel| {
            [
                (pixel >> 16) as u8,
                (pixel >> 8) as u8,
                pixel as u8,
                (pixel >> 24) as u8,
            ]
        })
        .collect();

    writer.write_image_data(&rgba)?;
    Ok(())
}

/// Save `frames` consecutive frames as numbered PNGs in `dir`.
pub fn save_frame_sequence(
    vidmem: &mut VidMem,
    dir: &Path,
    frames: u32,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    for i in 1..=frames {
        vidmem.run_frame();
        save_screenshot(vidmem, &dir.join(format!("{i:06}.png")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VidMemConfig;

    #[test]
    fn screenshot_decodes_to_framebuffer_size() {
        let mut vm = VidMem::new(&VidMemConfig::default()).expect("valid");
        vm.vram_mut().poke(0, 0xF0);
        vm.run_frame();

        let path = std::env::temp_dir().join(format!("vidmem-shot-{}.png", std::process::id()));
        save_screenshot(&vm, &path).expect("write png");

        let decoder = png::Decoder::new(fs::File::open(&path).expect("open png"));
        let mut reader = decoder.read_info().expect("png header");
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).expect("png frame");
        let _ = fs::remove_file(&path);

        assert_eq!((info.width, info.height), (512, 342));
        assert_eq!(&buf[0..4], &[0, 0, 0, 0xFF], "pixel 0 is ink");
        assert_eq!(&buf[16..20], &[0xFF, 0xFF, 0xFF, 0xFF], "pixel 4 is paper");
    }
}
