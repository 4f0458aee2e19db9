//! Command-line front end for `jpeg-anatomy`.
//!
//! ```text
//! inspect report <file.jpg>            print the segment structure
//! inspect xmp <file.jpg>               save every XMP packet next to the input file
//! inspect extract <file.jpg> [outdir]  split the file into its embedded JPEG streams
//! inspect gainmap <app2.hex>           decode an ISO 21496-1 APP2 segment from a hex dump
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, ensure, Context};
use jpeg_anatomy::StreamRole;

const USAGE: &str = "usage: inspect <report|xmp|extract|gainmap> <file> [outdir]";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    match &*args {
        [cmd, file] if cmd == "report" => report(Path::new(file)),
        [cmd, file] if cmd == "xmp" => save_xmp(Path::new(file)),
        [cmd, file] if cmd == "extract" => extract(Path::new(file), Path::new("output")),
        [cmd, file, outdir] if cmd == "extract" => extract(Path::new(file), Path::new(outdir)),
        [cmd, file] if cmd == "gainmap" => gainmap(Path::new(file)),
        _ => bail!(USAGE),
    }
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("cannot read '{}'", path.display()))
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".into())
}

fn report(path: &Path) -> anyhow::Result<()> {
    let data = read(path)?;
    let walk = jpeg_anatomy::walk(&data)?;

    println!("{}", "=".repeat(70));
    println!("JPEG file analysis report: {}", path.display());
    println!("{}", "=".repeat(70));

    if let Some(frame) = walk.frame() {
        println!("Dimensions: {}x{}", frame.width(), frame.height());
    }
    if let Some(ri) = walk.restart_interval() {
        println!("Restart interval: {ri} MCUs");
    }

    let packets = walk.xmp_packets().collect::<Vec<_>>();
    if !packets.is_empty() {
        println!("\nFound {} XMP metadata segment(s):", packets.len());
        for (i, (offset, packet)) in packets.iter().enumerate() {
            println!(
                "  XMP #{}: offset {:#08X}, {} bytes",
                i + 1,
                offset,
                packet.len()
            );
        }
    }

    println!(
        "\n{:<10} {:<6} {:<8} {:<8} Description",
        "Offset", "Marker", "Code", "Length"
    );
    println!("{}", "-".repeat(70));
    for segment in walk.segments() {
        let description = match segment.as_segment_kind() {
            Some(kind) => kind.to_string(),
            None => String::new(),
        };
        println!(
            "{:<10} {:<6} {:<8} {:<8} {}",
            format!("{:#08X}", segment.offset()),
            segment.marker().to_string(),
            format!("{:#06X}", segment.marker().code()),
            segment.declared_length(),
            description,
        );
    }
    println!("{}", "=".repeat(70));

    for warning in walk.warnings() {
        println!("warning: {warning}");
    }
    for segment in walk.gain_map_segments() {
        println!("\nGain map metadata at {:#08X}:", segment.offset());
        match jpeg_anatomy::decode_gainmap(segment.bytes()) {
            Ok(decoded) => print_gainmap(&decoded),
            Err(e) => println!("  error: {e}"),
        }
    }
    Ok(())
}

fn save_xmp(path: &Path) -> anyhow::Result<()> {
    let data = read(path)?;
    let walk = jpeg_anatomy::walk(&data)?;
    let packets = walk.xmp_packets().collect::<Vec<_>>();
    if packets.is_empty() {
        println!("No XMP metadata found in '{}'.", path.display());
        return Ok(());
    }

    let stem = stem(path);
    for (i, (offset, packet)) in packets.iter().enumerate() {
        let name = if packets.len() == 1 {
            format!("{stem}.xml")
        } else {
            format!("{stem}_xmp_{i:02}_{offset:#08X}.xml")
        };
        let out = path.with_file_name(name);
        fs::write(&out, *packet).with_context(|| format!("cannot write '{}'", out.display()))?;
        println!("Saved XMP metadata to '{}'", out.display());
    }
    Ok(())
}

fn extract(path: &Path, outdir: &Path) -> anyhow::Result<()> {
    let data = read(path)?;
    let extraction = jpeg_anatomy::extract(&data);
    for warning in extraction.warnings() {
        println!("warning: {warning}");
    }
    ensure!(
        !extraction.is_empty(),
        "no JPEG streams found in '{}'",
        path.display()
    );

    fs::create_dir_all(outdir)
        .with_context(|| format!("cannot create '{}'", outdir.display()))?;

    let stem = stem(path);
    let (mut aux, mut thumb) = (0, 0);
    for stream in extraction.streams() {
        println!(
            "Role: {:<16} | Size: {:7.2} KB | Offset: {} -> {}",
            stream.role().to_string(),
            stream.len() as f64 / 1024.0,
            stream.start(),
            stream.end(),
        );

        let name = match stream.role() {
            StreamRole::MainImage => format!("{stem}_main.jpg"),
            StreamRole::AuxiliaryImage => {
                aux += 1;
                format!("{stem}_aux_{}.jpg", aux - 1)
            }
            StreamRole::Thumbnail => {
                thumb += 1;
                format!("{stem}_thumb_{}.jpg", thumb - 1)
            }
        };
        let out: PathBuf = outdir.join(name);
        let bytes = stream
            .slice(&data)
            .context("stream range outside of input data")?;
        fs::write(&out, bytes).with_context(|| format!("cannot write '{}'", out.display()))?;
        println!("  saved to '{}'", out.display());
    }
    Ok(())
}

fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();
    hex::decode(&digits).context("invalid hex dump")
}

fn gainmap(path: &Path) -> anyhow::Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read '{}'", path.display()))?;
    let segment = parse_hex(&text)?;
    let decoded = jpeg_anatomy::decode_gainmap(&segment)?;
    print_gainmap(&decoded);
    Ok(())
}

fn print_gainmap(decoded: &jpeg_anatomy::DecodedGainMap) {
    let meta = &decoded.metadata;
    println!("  Segment length: {} bytes", decoded.declared_length);
    println!("  URN: {}", jpeg_anatomy::ISO21496_URN);
    println!(
        "  Version: min={}, writer={}",
        meta.minimum_version, meta.writer_version
    );
    println!("  Is multichannel: {}", meta.is_multichannel);
    println!("  Use base colour space: {}", meta.use_base_colour_space);

    let headroom = &meta.hdr_headroom;
    println!(
        "  HDR headroom: baseline {:.4} ({:?}), alternate {:.4} ({:?})",
        headroom.baseline.value(),
        headroom.baseline,
        headroom.alternate.value(),
        headroom.alternate,
    );
    for (channel, record) in meta.named_channels() {
        println!("  --- Channel: {channel} ---");
        println!("    Gain map min:     {:.4}", record.gain_map_min.value());
        println!("    Gain map max:     {:.4}", record.gain_map_max.value());
        println!("    Gamma:            {:.4}", record.gamma.value());
        println!("    Base offset:      {:.4}", record.base_offset.value());
        println!("    Alternate offset: {:.4}", record.alternate_offset.value());
    }
    for warning in &decoded.warnings {
        println!("  warning: {warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_dump() {
        let bytes = parse_hex("ff e2 00 06\n  75 72\n").unwrap();
        assert_eq!(bytes, [0xFF, 0xE2, 0x00, 0x06, b'u', b'r']);
        assert_eq!(parse_hex("FFE2").unwrap(), [0xFF, 0xE2]);
        assert!(parse_hex("").unwrap().is_empty());

        assert!(parse_hex("ff e").is_err());
        assert!(parse_hex("zz").is_err());
    }
}
