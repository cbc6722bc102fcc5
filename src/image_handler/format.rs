//! # 格式嗅探模块
//!
//! ## 设计思路
//!
//! 只看字节前缀（WEBP 额外看偏移 8 处的 4 字节）判断容器格式，不分配、无状态、永不失败。
//! 匹配顺序固定：PNG → JPEG → GIF → WEBP，首个命中即返回，否则为 `Unknown`。

use serde::{Deserialize, Serialize};

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const GIF_MAGIC: &[u8] = b"GIF8";
const RIFF_MAGIC: &[u8] = b"RIFF";
const WEBP_FOURCC: &[u8] = b"WEBP";

/// 输入图片的容器格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Unknown,
}

impl ImageFormat {
    /// 按魔数识别格式。
    ///
    /// 长度不足的输入只会让对应检查不命中，空输入返回 `Unknown`。
    ///
    /// # 示例
    /// ```
    /// use image_resize::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::classify(b"GIF89a"), ImageFormat::Gif);
    /// assert_eq!(ImageFormat::classify(&[]), ImageFormat::Unknown);
    /// ```
    pub fn classify(bytes: &[u8]) -> Self {
        if bytes.starts_with(PNG_MAGIC) {
            return Self::Png;
        }
        if bytes.starts_with(JPEG_MAGIC) {
            return Self::Jpeg;
        }
        if bytes.starts_with(GIF_MAGIC) {
            return Self::Gif;
        }
        if bytes.starts_with(RIFF_MAGIC) && bytes.len() >= 12 && &bytes[8..12] == WEBP_FOURCC {
            return Self::Webp;
        }
        Self::Unknown
    }

    /// 稳定字符串，供日志与序列化使用。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Unknown => "unknown",
        }
    }

    pub fn mime_type(self) -> Option<&'static str> {
        match self {
            Self::Png => Some("image/png"),
            Self::Jpeg => Some("image/jpeg"),
            Self::Gif => Some("image/gif"),
            Self::Webp => Some("image/webp"),
            Self::Unknown => None,
        }
    }

    /// 从 MIME 类型反查格式，忽略大小写与参数部分。
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/gif" => Self::Gif,
            "image/webp" => Self::Webp,
            _ => Self::Unknown,
        }
    }

    /// 映射为解码器使用的格式提示；`Unknown` 交由解码器自行猜测。
    pub(crate) fn codec_hint(self) -> Option<image::ImageFormat> {
        match self {
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Gif => Some(image::ImageFormat::Gif),
            Self::Webp => Some(image::ImageFormat::WebP),
            Self::Unknown => None,
        }
    }
}

/// `ImageFormat::classify` 的函数式入口。
pub fn classify(bytes: &[u8]) -> ImageFormat {
    ImageFormat::classify(bytes)
}
