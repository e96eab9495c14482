//! Shared helpers for building synthetic HG-X files: the forward pipeline
//! (delta filter, plane interleave, RLE, zlib) and the two container
//! layouts, mirroring what the engine's own packer produces.

#![allow(dead_code)]

/// LSB-first bit writer for command streams.
pub struct BitWriter {
    bytes: Vec<u8>,
    bit: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            bit: 0,
        }
    }

    pub fn push(&mut self, b: bool) {
        if self.bit == 0 {
            self.bytes.push(0);
        }
        if b {
            *self.bytes.last_mut().unwrap() |= 1 << self.bit;
        }
        self.bit = (self.bit + 1) % 8;
    }

    pub fn push_gamma(&mut self, v: u32) {
        assert!(v > 0);
        let digits = 31 - v.leading_zeros();
        for _ in 0..digits {
            self.push(false);
        }
        self.push(true);
        for k in (0..digits).rev() {
            self.push((v >> k) & 1 != 0);
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Zig-zag pack, the inverse of the decoder's unpack.
pub fn pack_val(v: u8) -> u8 {
    if v < 0x80 { v << 1 } else { ((v ^ 0xFF) << 1) | 1 }
}

/// Forward delta filter + bit-plane interleave, the inverse of the
/// decoder's unfilter stage.
pub fn filter_and_interleave(pixels: &[u8], height: usize, depth: usize, stride: usize) -> Vec<u8> {
    assert_eq!(pixels.len(), stride * height);
    let mut buf = pixels.to_vec();
    for y in (1..height).rev() {
        for x in 0..stride {
            buf[y * stride + x] = buf[y * stride + x].wrapping_sub(buf[(y - 1) * stride + x]);
        }
    }
    for x in (depth..stride).rev() {
        buf[x] = buf[x].wrapping_sub(buf[x - depth]);
    }

    assert_eq!(buf.len() % 4, 0);
    let sect_len = buf.len() / 4;
    let mut out = vec![0u8; buf.len()];
    for i in 0..sect_len {
        for k in 0..4 {
            let p = pack_val(buf[i * 4 + k]);
            out[i] |= ((p >> 6) & 3) << (2 * k);
            out[sect_len + i] |= ((p >> 4) & 3) << (2 * k);
            out[2 * sect_len + i] |= ((p >> 2) & 3) << (2 * k);
            out[3 * sect_len + i] |= (p & 3) << (2 * k);
        }
    }
    out
}

/// Split `raw` into alternating copy/zero runs and emit the data stream
/// plus the gamma-coded command stream.
pub fn rle_compress(raw: &[u8]) -> (Vec<u8>, Vec<u8>) {
    assert!(!raw.is_empty());
    let mut w = BitWriter::new();
    let mut data = Vec::new();

    let copy_first = raw[0] != 0;
    w.push(copy_first);
    w.push_gamma(raw.len() as u32);

    let mut copy = copy_first;
    let mut i = 0;
    while i < raw.len() {
        let start = i;
        while i < raw.len() && (raw[i] != 0) == copy {
            i += 1;
        }
        w.push_gamma((i - start) as u32);
        if copy {
            data.extend_from_slice(&raw[start..i]);
        }
        copy = !copy;
    }
    (data, w.finish())
}

pub fn zlib(bytes: &[u8]) -> Vec<u8> {
    use flate2::{Compression, write::ZlibEncoder};
    use std::io::Write;

    let mut enc = ZlibEncoder::new(Vec::new(), Compression::fast());
    enc.write_all(bytes).unwrap();
    enc.finish().unwrap()
}

/// Deterministic pseudo-random bytes (xorshift32).
pub fn noise(len: usize) -> Vec<u8> {
    let mut state: u32 = 0xDEAD_BEEF;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

pub fn aligned_stride(width: usize, depth: usize) -> usize {
    (width * depth + 3) & !3
}

/// One frame's streams, compressed and ready for a container.
pub struct EncodedFrame {
    pub width: u32,
    pub height: u32,
    pub depth_bits: u32,
    pub id: u32,
    pub data: Vec<u8>,
    pub raw_data_len: usize,
    pub cmd: Vec<u8>,
    pub raw_cmd_len: usize,
}

/// Run the full forward pipeline on `pixels` (bottom-up rows, aligned
/// stride).
pub fn encode_frame(pixels: &[u8], width: usize, height: usize, depth: usize) -> EncodedFrame {
    let stride = aligned_stride(width, depth);
    let filtered = filter_and_interleave(pixels, height, depth, stride);
    let (raw_data, raw_cmd) = rle_compress(&filtered);
    EncodedFrame {
        width: width as u32,
        height: height as u32,
        depth_bits: (depth * 8) as u32,
        id: 0,
        data: zlib(&raw_data),
        raw_data_len: raw_data.len(),
        cmd: zlib(&raw_cmd),
        raw_cmd_len: raw_cmd.len(),
    }
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Assemble an HG-2 file. `with_base` writes the type-0x25 variant with the
/// 8-byte base-offset extension per frame.
pub fn build_hg2(frames: &[EncodedFrame], with_base: bool) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"HG-2");
    push_u32(&mut out, 12);
    push_u32(&mut out, if with_base { 0x25 } else { 0x20 });

    for (n, f) in frames.iter().enumerate() {
        let struct_len = if with_base { 76 } else { 68 };
        let frame_len = struct_len + f.data.len() + f.cmd.len();
        let offset_next = if n + 1 < frames.len() {
            frame_len as u32
        } else {
            0
        };

        push_u32(&mut out, f.width);
        push_u32(&mut out, f.height);
        push_u32(&mut out, f.depth_bits);
        push_u32(&mut out, 0); // unknown
        push_u32(&mut out, 0); // unknown
        push_u32(&mut out, f.data.len() as u32);
        push_u32(&mut out, f.raw_data_len as u32);
        push_u32(&mut out, f.cmd.len() as u32);
        push_u32(&mut out, f.raw_cmd_len as u32);
        push_u32(&mut out, 0); // extra length
        push_u32(&mut out, f.id);
        push_u32(&mut out, f.width); // total width
        push_u32(&mut out, f.height); // total height
        push_u32(&mut out, 0); // offset x
        push_u32(&mut out, 0); // offset y
        push_u32(&mut out, 1); // transparency flag
        push_u32(&mut out, offset_next);
        if with_base {
            push_u32(&mut out, 0); // base x
            push_u32(&mut out, 0); // base y
        }
        out.extend_from_slice(&f.data);
        out.extend_from_slice(&f.cmd);
    }
    out
}

fn push_tag_header(out: &mut Vec<u8>, name: &[u8], offset_next: u32, length: u32) {
    let mut sig = [0u8; 8];
    sig[..name.len()].copy_from_slice(name);
    out.extend_from_slice(&sig);
    push_u32(out, offset_next);
    push_u32(out, length);
}

/// Assemble an HG-3 file with one `stdinfo` + `img0000` frame per entry.
pub fn build_hg3(frames: &[EncodedFrame]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"HG-3");
    push_u32(&mut out, 12);
    push_u32(&mut out, 0x300);

    for (n, f) in frames.iter().enumerate() {
        let img_len = 24 + f.data.len() + f.cmd.len();
        // frame header + stdinfo tag + img tag
        let frame_len = 8 + (16 + 40) + (16 + img_len);
        let offset_next = if n + 1 < frames.len() {
            frame_len as u32
        } else {
            0
        };

        push_u32(&mut out, offset_next);
        push_u32(&mut out, f.id);

        push_tag_header(&mut out, b"stdinfo", 0x38, 40);
        push_u32(&mut out, f.width);
        push_u32(&mut out, f.height);
        push_u32(&mut out, f.depth_bits);
        push_u32(&mut out, 0); // offset x
        push_u32(&mut out, 0); // offset y
        push_u32(&mut out, f.width); // total width
        push_u32(&mut out, f.height); // total height
        push_u32(&mut out, 1); // transparency flag
        push_u32(&mut out, 0); // base x
        push_u32(&mut out, 0); // base y

        push_tag_header(&mut out, b"img0000", 0, img_len as u32);
        push_u32(&mut out, 0); // unknown
        push_u32(&mut out, f.height);
        push_u32(&mut out, f.data.len() as u32);
        push_u32(&mut out, f.raw_data_len as u32);
        push_u32(&mut out, f.cmd.len() as u32);
        push_u32(&mut out, f.raw_cmd_len as u32);
        out.extend_from_slice(&f.data);
        out.extend_from_slice(&f.cmd);
    }
    out
}

/// Assemble an HG-3 file whose single frame carries only an `img_jpg` tag
/// (and optionally `img_al`), the variant this crate does not decode.
pub fn build_hg3_jpeg(with_alpha: bool) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"HG-3");
    push_u32(&mut out, 12);
    push_u32(&mut out, 0x300);

    push_u32(&mut out, 0); // last frame
    push_u32(&mut out, 0); // id

    push_tag_header(&mut out, b"stdinfo", 0x38, 40);
    for v in [64u32, 48, 32, 0, 0, 64, 48, 1, 0, 0] {
        push_u32(&mut out, v);
    }

    let jpeg_body = [0xFFu8, 0xD8, 0xFF, 0xD9];
    if with_alpha {
        push_tag_header(&mut out, b"img_jpg", 0x14, jpeg_body.len() as u32);
        out.extend_from_slice(&jpeg_body);
        push_tag_header(&mut out, b"img_al", 0, 8);
        push_u32(&mut out, 0); // compressed length
        push_u32(&mut out, 0); // decompressed length
    } else {
        push_tag_header(&mut out, b"img_jpg", 0, jpeg_body.len() as u32);
        out.extend_from_slice(&jpeg_body);
    }
    out
}
