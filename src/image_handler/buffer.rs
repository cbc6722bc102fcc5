//! # 数据模型
//!
//! ## 设计思路
//!
//! 将“尺寸查询结果”和“流水线中间结果”建模为独立类型：
//! - `Dimensions` 表示宽高，`(0, 0)` 表示无法确定
//! - `PixelBuffer` 表示 RGBA 像素数据，构造时强制 `len == width * height * 4`
//! - `EncodedImage` 表示编码后的 PNG 字节
//!
//! 所有权随阶段转移：缩放会消费输入缓冲并返回新缓冲，旧缓冲在此时释放。

use serde::{Deserialize, Serialize};

use super::ImageError;
use super::format::ImageFormat;

/// 图片宽高（像素）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// 无法确定尺寸时的返回值。
    pub const UNKNOWN: Self = Self { width: 0, height: 0 };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 宽高均为正数。
    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// 像素总数，使用 `u64` 避免溢出。
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// 按 RGBA 估算的解码后字节数。
    pub fn rgba_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// 按比例缩小到单边不超过 `max_dimension`，不放大，每边至少 1 像素。
pub fn fit_within(source: Dimensions, max_dimension: u32) -> Dimensions {
    if !source.is_known() || max_dimension == 0 {
        return Dimensions::UNKNOWN;
    }
    if source.width <= max_dimension && source.height <= max_dimension {
        return source;
    }

    let scale = (max_dimension as f64 / source.width as f64)
        .min(max_dimension as f64 / source.height as f64);

    let width = ((source.width as f64 * scale).floor() as u32).clamp(1, max_dimension);
    let height = ((source.height as f64 * scale).floor() as u32).clamp(1, max_dimension);

    Dimensions { width, height }
}

/// RGBA8 像素缓冲，行优先、无行填充。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl PixelBuffer {
    /// 校验长度后接管字节所有权。
    ///
    /// # 示例
    /// ```
    /// use image_resize::PixelBuffer;
    ///
    /// let buffer = PixelBuffer::new(2, 1, vec![0; 8])?;
    /// assert_eq!(buffer.as_bytes().len(), 8);
    /// assert!(PixelBuffer::new(2, 1, vec![0; 7]).is_err());
    /// # Ok::<(), image_resize::ImageError>(())
    /// ```
    pub fn new(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidBuffer(format!(
                "像素缓冲宽高必须为正数：{}x{}",
                width, height
            )));
        }

        let expected_len = Dimensions::new(width, height)
            .rgba_len()
            .ok_or_else(|| ImageError::ResourceLimit("图片尺寸导致内存溢出风险".to_string()))?;

        if bytes.len() != expected_len {
            return Err(ImageError::InvalidBuffer(format!(
                "像素数据长度异常：{} 字节（期望 {}x{}x4 = {} 字节）",
                bytes.len(),
                width,
                height,
                expected_len
            )));
        }

        Ok(Self { width, height, bytes })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 交出底层字节。
    pub fn into_raw(self) -> Vec<u8> {
        self.bytes
    }
}

/// 编码输出，当前固定为 PNG。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
}

impl EncodedImage {
    pub(crate) fn png(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for EncodedImage {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
