//! Minimal RGBA PNG encoder for screenshots.
//!
//! Image data goes through `miniz_oxide`'s zlib stream. Alpha is kept, so the
//! area outside the round glass (never written) comes out transparent.

/// Encode an RGBA pixel buffer as a PNG file.
///
/// `width` and `height` are in pixels. `rgba` contains `width * height * 4` bytes
/// in row-major RGBA order.
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, String> {
    let row_len = width as usize * 4;
    if rgba.len() != row_len * height as usize {
        return Err(format!("Expected {} bytes for {}x{} RGBA, got {}",
            row_len * height as usize, width, height, rgba.len()));
    }

    let mut png = Vec::with_capacity(rgba.len() / 4 + 1024);
    png.extend_from_slice(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(6); // color type: RGBA
    ihdr.push(0); // compression
    ihdr.push(0); // filter
    ihdr.push(0); // interlace
    write_chunk(&mut png, b"IHDR", &ihdr);

    // Each scanline is prefixed with filter type 0 (None)
    let mut raw = Vec::with_capacity((row_len + 1) * height as usize);
    for row in rgba.chunks_exact(row_len.max(1)) {
        raw.push(0);
        raw.extend_from_slice(row);
    }
    let idat = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    let crc = crc32(chunk_type.iter().chain(data));
    out.extend_from_slice(&crc.to_be_bytes());
}

// CRC-32 (PNG/zlib), over chunk type + data
fn crc32<'a, I: Iterator<Item = &'a u8>>(bytes: I) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &b in bytes {
        crc ^= b as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
        }
    }
    !crc
}
