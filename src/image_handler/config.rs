//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ImageConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中性能档位（quality / balanced / speed）作为高层语义，映射到滤镜与压缩级别组合。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的平衡配置。
//! - `ImagePerformanceProfile` 负责档位字符串解析与反向输出。
//! - `apply_performance_profile` 将档位转换为具体参数。
//! - `infer_performance_profile` 用于从当前配置反推档位。

use image::codecs::png::CompressionType;
use image::imageops::FilterType;

use super::ImageError;

/// 图片处理配置。
///
/// 字段覆盖了输入体积、解码资源上限、重采样与 PNG 编码四个方面。
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// 允许的最大编码输入体积（字节）。
    pub max_input_bytes: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 重采样滤镜。
    pub resize_filter: FilterType,
    /// PNG 压缩级别。
    pub png_compression: CompressionType,
    /// 查询尺寸时是否先尝试 header 快速读取。
    pub header_fast_path: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            resize_filter: FilterType::Triangle,
            png_compression: CompressionType::Default,
            header_fast_path: true,
        }
    }
}

/// 图片性能档位。
///
/// - `Quality`：尽量保真
/// - `Balanced`：质量与性能平衡
/// - `Speed`：优先处理速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePerformanceProfile {
    Quality,
    Balanced,
    Speed,
}

impl ImagePerformanceProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```
    /// use image_resize::ImagePerformanceProfile;
    ///
    /// let p = ImagePerformanceProfile::parse(" Balanced ")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), image_resize::ImageError>(())
    /// ```
    pub fn parse(profile: &str) -> Result<Self, ImageError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(ImageError::InvalidFormat(format!(
                "未知性能档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl ImageConfig {
    /// 基于当前参数反推性能档位。
    pub fn infer_performance_profile(&self) -> ImagePerformanceProfile {
        match (self.resize_filter, self.png_compression) {
            (FilterType::Lanczos3, CompressionType::Best) => ImagePerformanceProfile::Quality,
            (FilterType::Nearest, _) | (_, CompressionType::Fast) => ImagePerformanceProfile::Speed,
            _ => ImagePerformanceProfile::Balanced,
        }
    }

    /// 应用指定性能档位到实际参数。
    pub fn apply_performance_profile(&mut self, profile: ImagePerformanceProfile) {
        match profile {
            ImagePerformanceProfile::Quality => {
                self.resize_filter = FilterType::Lanczos3;
                self.png_compression = CompressionType::Best;
            }
            ImagePerformanceProfile::Balanced => {
                self.resize_filter = FilterType::Triangle;
                self.png_compression = CompressionType::Default;
            }
            ImagePerformanceProfile::Speed => {
                self.resize_filter = FilterType::Nearest;
                self.png_compression = CompressionType::Fast;
            }
        }
    }

    /// 校验像素数量与预计内存是否超过上限。
    pub(crate) fn check_decoded_limits(&self, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > self.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, self.max_decoded_pixels
            )));
        }

        let estimated = pixels
            .checked_mul(4)
            .ok_or_else(|| ImageError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > self.max_decoded_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                self.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    pub(crate) fn check_input_size(&self, len: usize) -> Result<(), ImageError> {
        if len as u64 > self.max_input_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "输入体积过大：{} 字节（限制：{} 字节）",
                len, self.max_input_bytes
            )));
        }
        Ok(())
    }
}
