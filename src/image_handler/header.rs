//! # Header 尺寸快速读取
//!
//! ## 设计思路
//!
//! 多数调用只需要宽高，不需要像素。PNG / JPEG 都在文件头声明了尺寸，
//! 直接按字节结构读取即可，开销与 header 大小成正比，避免完整解压。
//!
//! ## 实现思路
//!
//! - PNG：签名固定 8 字节，IHDR 必须是第一个块，宽高位于偏移 16 / 20（大端 u32）。
//! - JPEG：从偏移 2 起顺序扫描 marker 段，遇到 SOF 段读取宽高，遇到 SOS / EOI 停止。
//!
//! 两个读取器都只返回 `Option`：`None` 表示“无法确定，请走完整解码”，
//! 截断、越界、声明长度异常都归入这一类，绝不返回部分或错误的结果。

use super::buffer::Dimensions;

/// PNG 文件签名。
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

const PNG_HEADER_LEN: usize = 24;
const IHDR_TAG: &[u8; 4] = b"IHDR";

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_MIN_LEN: usize = 5;

const MARKER_PREFIX: u8 = 0xFF;
const MARKER_TEM: u8 = 0x01;
const MARKER_EOI: u8 = 0xD9;
const MARKER_SOS: u8 = 0xDA;

/// 长度字段(2) + 精度(1) + 高(2) + 宽(2)
const SOF_MIN_LEN: usize = 7;

/// 读取 PNG IHDR 中声明的宽高。
///
/// # 示例
/// ```
/// use image_resize::{Dimensions, png_dimensions};
///
/// let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
/// bytes.extend_from_slice(b"IHDR");
/// bytes.extend_from_slice(&100u32.to_be_bytes());
/// bytes.extend_from_slice(&50u32.to_be_bytes());
///
/// assert_eq!(png_dimensions(&bytes), Some(Dimensions::new(100, 50)));
/// ```
pub fn png_dimensions(bytes: &[u8]) -> Option<Dimensions> {
    if bytes.len() < PNG_HEADER_LEN || bytes[..8] != PNG_SIGNATURE {
        return None;
    }

    if &bytes[12..16] != IHDR_TAG {
        return None;
    }

    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);

    let dimensions = Dimensions::new(width, height);
    dimensions.is_known().then_some(dimensions)
}

/// 扫描 JPEG marker 段，读取第一个 SOF 段声明的宽高。
///
/// 每轮循环读取位置严格前进，扫描必然在缓冲区长度内结束。
pub fn jpeg_dimensions(bytes: &[u8]) -> Option<Dimensions> {
    if bytes.len() < JPEG_MIN_LEN || bytes[..2] != JPEG_SOI {
        return None;
    }

    let mut pos = 2;
    while pos < bytes.len() {
        if bytes[pos] != MARKER_PREFIX {
            pos += 1;
            continue;
        }

        // 连续的 0xFF 是填充字节
        let mut code_pos = pos + 1;
        while bytes.get(code_pos) == Some(&MARKER_PREFIX) {
            code_pos += 1;
        }
        let marker = *bytes.get(code_pos)?;
        pos = code_pos + 1;

        if marker == MARKER_EOI || marker == MARKER_SOS {
            return None;
        }
        if is_standalone_marker(marker) {
            continue;
        }

        let length = u16::from_be_bytes([*bytes.get(pos)?, *bytes.get(pos + 1)?]) as usize;
        if length < 2 || pos + length > bytes.len() {
            return None;
        }

        if is_start_of_frame(marker) {
            // 段载荷：精度(1) 高(2) 宽(2)，声明长度装不下时不读后续段的字节
            if length < SOF_MIN_LEN {
                return None;
            }
            let payload = bytes.get(pos + 2..pos + 7)?;
            let height = u16::from_be_bytes([payload[1], payload[2]]);
            let width = u16::from_be_bytes([payload[3], payload[4]]);

            let dimensions = Dimensions::new(width as u32, height as u32);
            return dimensions.is_known().then_some(dimensions);
        }

        pos += length;
    }

    None
}

/// SOF0..SOF15，排除同一区间内的 DHT(C4)、JPG(C8)、DAC(CC)。
fn is_start_of_frame(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

/// 不带长度字段的 marker：TEM、RST0..RST7，以及误入的 0x00。
fn is_standalone_marker(marker: u8) -> bool {
    matches!(marker, 0x00 | MARKER_TEM | 0xD0..=0xD7)
}
