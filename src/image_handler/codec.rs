//! # 编解码适配层
//!
//! ## 设计思路
//!
//! 解码、重采样、PNG 编码属于像素级编解码器的职责，这里只定义调用契约 `ImageCodec`，
//! 编排层（`handler` / `pipeline`）只依赖这个 trait，测试中可替换为计数用的假实现。
//!
//! ## 实现思路
//!
//! 默认实现 `NativeCodec`：
//! 1. 解码交给 `image`，已识别格式时带上格式提示，否则由 `image` 自行猜测
//! 2. 重采样优先 `fast_image_resize`，失败时回退 `image::imageops::resize`
//! 3. 编码固定输出 PNG（`PngEncoder` + 自适应行过滤）
//!
//! 每一步都产出独立所有权的新缓冲；缩放消费输入缓冲，输入在返回时即被释放。

use fast_image_resize as fr;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageBuffer, ImageEncoder, Rgba};

use super::ImageError;
use super::buffer::{Dimensions, EncodedImage, PixelBuffer};
use super::format::ImageFormat;

/// 像素级编解码契约。
pub trait ImageCodec: Send + Sync {
    /// 将编码字节解码为 RGBA8 缓冲。
    fn decode(&self, bytes: &[u8], hint: ImageFormat) -> Result<PixelBuffer, ImageError>;

    /// 将缓冲重采样到精确的目标尺寸，消费输入缓冲。
    fn resize(
        &self,
        buffer: PixelBuffer,
        target: Dimensions,
        filter: FilterType,
    ) -> Result<PixelBuffer, ImageError>;

    /// 将缓冲编码为 PNG。
    fn encode_png(
        &self,
        buffer: &PixelBuffer,
        compression: CompressionType,
    ) -> Result<EncodedImage, ImageError>;
}

/// 基于 `image` + `fast_image_resize` 的默认编解码器。
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCodec;

impl ImageCodec for NativeCodec {
    fn decode(&self, bytes: &[u8], hint: ImageFormat) -> Result<PixelBuffer, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::InvalidFormat("图片内容为空".to_string()));
        }

        let decoded = match hint.codec_hint() {
            Some(format) => image::load_from_memory_with_format(bytes, format),
            None => image::load_from_memory(bytes),
        }
        .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        PixelBuffer::new(width, height, rgba.into_raw())
    }

    fn resize(
        &self,
        buffer: PixelBuffer,
        target: Dimensions,
        filter: FilterType,
    ) -> Result<PixelBuffer, ImageError> {
        if !target.is_known() {
            return Err(ImageError::Resize(format!(
                "目标尺寸必须为正数：{}x{}",
                target.width, target.height
            )));
        }

        let source = buffer.dimensions();
        if source == target {
            return Ok(buffer);
        }

        let mut bytes = buffer.into_raw();
        match Self::resize_with_fast_image_resize(&mut bytes, source, target, filter) {
            Ok(resized) => Ok(resized),
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 重采样失败，回退 image::imageops::resize：{}",
                    err
                );
                Self::resize_with_imageops(bytes, source, target, filter)
            }
        }
    }

    fn encode_png(
        &self,
        buffer: &PixelBuffer,
        compression: CompressionType,
    ) -> Result<EncodedImage, ImageError> {
        let mut out = Vec::new();
        PngEncoder::new_with_quality(&mut out, compression, PngFilterType::Adaptive)
            .write_image(
                buffer.as_bytes(),
                buffer.width(),
                buffer.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| ImageError::Encode(format!("PNG 编码失败：{}", e)))?;

        if out.is_empty() {
            return Err(ImageError::Encode("PNG 编码输出为空".to_string()));
        }

        Ok(EncodedImage::png(out))
    }
}

impl NativeCodec {
    fn resize_with_fast_image_resize(
        bytes: &mut [u8],
        source: Dimensions,
        target: Dimensions,
        filter: FilterType,
    ) -> Result<PixelBuffer, ImageError> {
        let src_image =
            fr::images::Image::from_slice_u8(source.width, source.height, bytes, fr::PixelType::U8x4)
                .map_err(|e| ImageError::Resize(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target.width, target.height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new().resize_alg(Self::to_fast_alg(filter));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ImageError::Resize(format!("fast_image_resize 执行失败：{}", e)))?;

        PixelBuffer::new(target.width, target.height, dst_image.into_vec())
    }

    fn resize_with_imageops(
        bytes: Vec<u8>,
        source: Dimensions,
        target: Dimensions,
        filter: FilterType,
    ) -> Result<PixelBuffer, ImageError> {
        let src = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(source.width, source.height, bytes)
            .ok_or_else(|| ImageError::Resize("源像素缓冲长度异常".to_string()))?;

        let resized = image::imageops::resize(&src, target.width, target.height, filter);

        PixelBuffer::new(target.width, target.height, resized.into_raw())
    }

    fn to_fast_alg(filter: FilterType) -> fr::ResizeAlg {
        match filter {
            FilterType::Nearest => fr::ResizeAlg::Nearest,
            FilterType::Triangle => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
            FilterType::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
            FilterType::Gaussian => fr::ResizeAlg::Convolution(fr::FilterType::Mitchell),
            FilterType::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
        }
    }
}
