//! # 解码与变换流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → RGBA → 缩放 → PNG”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先用 header 尺寸做检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 校验输入体积，未知格式用 `infer` 识别并拒绝非图片负载
//! 2. 能读到 header 尺寸时先按像素上限快速拒绝
//! 3. 完整解码，再次校验解码后尺寸
//! 4. 按需缩放（消费输入缓冲）
//! 5. 编码为 PNG
//!
//! 任一阶段失败都直接返回 `ImageError`，不做自动重试。

use std::time::Instant;

use super::buffer::{Dimensions, EncodedImage, PixelBuffer, fit_within};
use super::format::ImageFormat;
use super::{ImageConfig, ImageError, ImageHandler};

impl ImageHandler {
    /// 将编码字节解码为 RGBA 像素缓冲。
    pub fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, ImageError> {
        let config = self.config_snapshot()?;
        self.decode_with_config(bytes, &config)
    }

    /// 将缓冲缩放到精确的 `width x height`，输入缓冲被消费。
    pub fn resize(&self, buffer: PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer, ImageError> {
        let config = self.config_snapshot()?;
        self.resize_with_config(buffer, Dimensions::new(width, height), &config)
    }

    /// 将缓冲编码为 PNG，无论原始输入是什么格式。
    pub fn encode_png(&self, buffer: &PixelBuffer) -> Result<EncodedImage, ImageError> {
        let config = self.config_snapshot()?;
        self.codec.encode_png(buffer, config.png_compression)
    }

    /// 解码 → 缩放 → 编码 一次完成。
    ///
    /// # 示例
    /// ```no_run
    /// use image_resize::{ImageConfig, ImageHandler};
    ///
    /// # fn demo(bytes: &[u8]) -> Result<(), image_resize::ImageError> {
    /// let handler = ImageHandler::new(ImageConfig::default());
    /// let png = handler.resize_to_png(bytes, 320, 240)?;
    /// assert_eq!(handler.dimensions(png.as_bytes()).width, 320);
    /// # Ok(())
    /// # }
    /// ```
    pub fn resize_to_png(&self, bytes: &[u8], width: u32, height: u32) -> Result<EncodedImage, ImageError> {
        let config = self.config_snapshot()?;
        self.run_pipeline(bytes, &config, |_| Ok(Dimensions::new(width, height)))
    }

    /// 按比例缩小到单边不超过 `max_dimension` 后编码为 PNG，不放大。
    pub fn thumbnail_png(&self, bytes: &[u8], max_dimension: u32) -> Result<EncodedImage, ImageError> {
        if max_dimension == 0 {
            return Err(ImageError::Resize("缩略图边长必须大于 0".to_string()));
        }

        let config = self.config_snapshot()?;
        self.run_pipeline(bytes, &config, |source| Ok(fit_within(source, max_dimension)))
    }

    fn run_pipeline<F>(
        &self,
        bytes: &[u8],
        config: &ImageConfig,
        target_for: F,
    ) -> Result<EncodedImage, ImageError>
    where
        F: FnOnce(Dimensions) -> Result<Dimensions, ImageError>,
    {
        let total_start = Instant::now();

        let decode_start = Instant::now();
        let decoded = self.decode_with_config(bytes, config)?;
        let decode_elapsed = decode_start.elapsed();

        let source = decoded.dimensions();
        let target = target_for(source)?;

        let resize_start = Instant::now();
        let resized = self.resize_with_config(decoded, target, config)?;
        let resize_elapsed = resize_start.elapsed();

        let encode_start = Instant::now();
        let encoded = self.codec.encode_png(&resized, config.png_compression)?;
        let encode_elapsed = encode_start.elapsed();

        log::info!(
            "✅ 图片处理完成 - {}x{} -> {}x{} 输出={}KB decode={}ms resize={}ms encode={}ms total={}ms",
            source.width,
            source.height,
            target.width,
            target.height,
            encoded.len() / 1024,
            decode_elapsed.as_millis(),
            resize_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(encoded)
    }

    pub(super) fn decode_with_config(
        &self,
        bytes: &[u8],
        config: &ImageConfig,
    ) -> Result<PixelBuffer, ImageError> {
        config.check_input_size(bytes.len())?;

        let format = ImageFormat::classify(bytes);
        if format == ImageFormat::Unknown {
            Self::reject_non_image_payload(bytes)?;
        }

        if let Some(header) = Self::header_dimensions(format, bytes) {
            config.check_decoded_limits(header.width, header.height)?;
        }

        let buffer = self.codec.decode(bytes, format)?;
        config.check_decoded_limits(buffer.width(), buffer.height())?;

        log::debug!(
            "图片解码成功 - 格式: {} 尺寸: {}x{}",
            format.as_str(),
            buffer.width(),
            buffer.height()
        );

        Ok(buffer)
    }

    pub(super) fn resize_with_config(
        &self,
        buffer: PixelBuffer,
        target: Dimensions,
        config: &ImageConfig,
    ) -> Result<PixelBuffer, ImageError> {
        if !target.is_known() {
            return Err(ImageError::Resize(format!(
                "目标尺寸必须为正数：{}x{}",
                target.width, target.height
            )));
        }
        config.check_decoded_limits(target.width, target.height)?;

        let resized = self.codec.resize(buffer, target, config.resize_filter)?;
        if resized.dimensions() != target {
            return Err(ImageError::Resize(format!(
                "缩放输出尺寸异常：{}x{}（期望 {}x{}）",
                resized.width(),
                resized.height(),
                target.width,
                target.height
            )));
        }

        Ok(resized)
    }

    /// 通过文件签名识别出的非图片负载直接拒绝，无法识别的交给解码器判断。
    fn reject_non_image_payload(bytes: &[u8]) -> Result<(), ImageError> {
        let Some(kind) = infer::get(bytes) else {
            return Ok(());
        };

        if kind.matcher_type() != infer::MatcherType::Image {
            log::warn!("⚠️ 输入不是图片类型：{}", kind.mime_type());
            return Err(ImageError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }
}
