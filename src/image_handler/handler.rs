//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 负责配置管理与尺寸查询编排，像素流水线各阶段见 `pipeline.rs`。
//! 尺寸查询链路固定为：
//! 1. 格式嗅探
//! 2. PNG / JPEG 走 header 快速读取
//! 3. 快速读取不可用或无法确定时，完整解码后取缓冲尺寸
//! 4. 仍失败则返回 `(0, 0)`，从不向调用方抛错
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<ImageConfig>>` 支持运行时动态切档。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 编解码器以 `Arc<dyn ImageCodec>` 注入，默认 `NativeCodec`。

use std::sync::{Arc, RwLock};

use super::buffer::Dimensions;
use super::codec::{ImageCodec, NativeCodec};
use super::format::ImageFormat;
use super::header::{jpeg_dimensions, png_dimensions};
use super::{ImageConfig, ImageError, ImagePerformanceProfile};

/// 图片处理器。
///
/// 封装了配置状态与编解码器，线程间可共享（`Send + Sync`）。
pub struct ImageHandler {
    pub(super) config: Arc<RwLock<ImageConfig>>,
    pub(super) codec: Arc<dyn ImageCodec>,
}

impl ImageHandler {
    /// 使用默认编解码器创建处理器。
    ///
    /// # 示例
    /// ```
    /// use image_resize::{ImageConfig, ImageHandler};
    ///
    /// let handler = ImageHandler::new(ImageConfig::default());
    /// assert_eq!(handler.dimensions(&[]).width, 0);
    /// ```
    pub fn new(config: ImageConfig) -> Self {
        Self::with_codec(config, Arc::new(NativeCodec))
    }

    /// 注入自定义编解码器。
    pub fn with_codec(config: ImageConfig, codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            codec,
        }
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次请求链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<ImageConfig, ImageError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 设置性能档位。
    pub fn set_performance_profile(&self, profile: ImagePerformanceProfile) -> Result<(), ImageError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_performance_profile(profile);

        log::info!(
            "⚙️ 已切换图片性能档位：{:?}（filter={:?}, compression={:?}）",
            profile,
            config.resize_filter,
            config.png_compression
        );

        Ok(())
    }

    /// 获取当前生效档位。
    pub fn get_performance_profile(&self) -> Result<ImagePerformanceProfile, ImageError> {
        let config = self
            .config
            .read()
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_performance_profile())
    }

    /// 设置输入体积与解码资源上限。
    pub fn set_limits(
        &self,
        max_input_bytes: u64,
        max_decoded_pixels: u64,
        max_decoded_bytes: u64,
    ) -> Result<(), ImageError> {
        if max_input_bytes == 0 {
            return Err(ImageError::InvalidFormat("max_input_bytes 必须大于 0".to_string()));
        }
        if max_decoded_pixels == 0 {
            return Err(ImageError::InvalidFormat("max_decoded_pixels 必须大于 0".to_string()));
        }
        if max_decoded_bytes < 4 {
            return Err(ImageError::InvalidFormat(
                "max_decoded_bytes 至少容纳 1 个 RGBA 像素".to_string(),
            ));
        }

        let mut config = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;

        config.max_input_bytes = max_input_bytes;
        config.max_decoded_pixels = max_decoded_pixels;
        config.max_decoded_bytes = max_decoded_bytes;

        Ok(())
    }

    /// 开关 header 快速读取。
    pub fn set_header_fast_path(&self, enabled: bool) -> Result<(), ImageError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.header_fast_path = enabled;
        Ok(())
    }

    /// 查询图片尺寸，失败时返回 `(0, 0)`。
    ///
    /// GIF / WEBP / 未知格式不走快速读取，直接完整解码。
    ///
    /// 完整解码只校验输入体积，不套用像素上限，保证与快速读取结果一致。
    pub fn dimensions(&self, bytes: &[u8]) -> Dimensions {
        let config = self.config_snapshot().unwrap_or_default();

        let format = ImageFormat::classify(bytes);
        if config.header_fast_path {
            if let Some(dimensions) = Self::header_dimensions(format, bytes) {
                return dimensions;
            }
        }

        log::debug!(
            "🔍 header 未给出尺寸，改为完整解码 - 格式: {} 长度: {}",
            format.as_str(),
            bytes.len()
        );

        let decoded = config
            .check_input_size(bytes.len())
            .and_then(|_| self.codec.decode(bytes, format));

        match decoded {
            Ok(buffer) => buffer.dimensions(),
            Err(err) => {
                log::debug!("尺寸查询解码失败：{}", err);
                Dimensions::UNKNOWN
            }
        }
    }

    /// 仅对自带尺寸声明的容器做 header 读取。
    pub(super) fn header_dimensions(format: ImageFormat, bytes: &[u8]) -> Option<Dimensions> {
        match format {
            ImageFormat::Png => png_dimensions(bytes),
            ImageFormat::Jpeg => jpeg_dimensions(bytes),
            ImageFormat::Gif | ImageFormat::Webp | ImageFormat::Unknown => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::image_handler::buffer::{EncodedImage, PixelBuffer};
    use image::codecs::png::CompressionType;
    use image::imageops::FilterType;
    use image::{DynamicImage, ImageBuffer, Rgb, Rgba};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) fn create_image_bytes(
        width: u32,
        height: u32,
        format: image::ImageFormat,
    ) -> Vec<u8> {
        let img = if format == image::ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
                Rgb([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8])
            }))
        } else {
            DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| {
                Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
            }))
        };

        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, format)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    /// 记录调用次数的编解码器，用于确认是否走了完整解码。
    #[derive(Default)]
    pub(crate) struct CountingCodec {
        pub(crate) decodes: AtomicUsize,
        pub(crate) resizes: AtomicUsize,
        pub(crate) encodes: AtomicUsize,
    }

    impl ImageCodec for CountingCodec {
        fn decode(&self, bytes: &[u8], hint: ImageFormat) -> Result<PixelBuffer, ImageError> {
            self.decodes.fetch_add(1, Ordering::SeqCst);
            NativeCodec.decode(bytes, hint)
        }

        fn resize(
            &self,
            buffer: PixelBuffer,
            target: Dimensions,
            filter: FilterType,
        ) -> Result<PixelBuffer, ImageError> {
            self.resizes.fetch_add(1, Ordering::SeqCst);
            NativeCodec.resize(buffer, target, filter)
        }

        fn encode_png(
            &self,
            buffer: &PixelBuffer,
            compression: CompressionType,
        ) -> Result<EncodedImage, ImageError> {
            self.encodes.fetch_add(1, Ordering::SeqCst);
            NativeCodec.encode_png(buffer, compression)
        }
    }

    fn counting_handler() -> (ImageHandler, Arc<CountingCodec>) {
        let codec = Arc::new(CountingCodec::default());
        let handler = ImageHandler::with_codec(ImageConfig::default(), codec.clone());
        (handler, codec)
    }

    #[test]
    fn png_and_jpeg_use_header_fast_path() {
        let (handler, codec) = counting_handler();

        let png = create_image_bytes(100, 50, image::ImageFormat::Png);
        assert_eq!(handler.dimensions(&png), Dimensions::new(100, 50));

        let jpeg = create_image_bytes(64, 48, image::ImageFormat::Jpeg);
        assert_eq!(handler.dimensions(&jpeg), Dimensions::new(64, 48));

        assert_eq!(codec.decodes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn gif_and_webp_always_decode() {
        let (handler, codec) = counting_handler();

        let gif = create_image_bytes(30, 20, image::ImageFormat::Gif);
        assert_eq!(handler.dimensions(&gif), Dimensions::new(30, 20));

        let webp = create_image_bytes(21, 11, image::ImageFormat::WebP);
        assert_eq!(handler.dimensions(&webp), Dimensions::new(21, 11));

        assert_eq!(codec.decodes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn corrupt_png_header_falls_back_to_decode() {
        let (handler, codec) = counting_handler();

        let mut png = create_image_bytes(10, 10, image::ImageFormat::Png);
        png[12..16].copy_from_slice(b"XXXX");

        assert_eq!(handler.dimensions(&png), Dimensions::UNKNOWN);
        assert_eq!(codec.decodes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_input_reports_zero_dimensions() {
        let (handler, codec) = counting_handler();
        assert_eq!(handler.dimensions(&[]), Dimensions::UNKNOWN);
        assert_eq!(codec.decodes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disabled_fast_path_decodes_png() {
        let (handler, codec) = counting_handler();
        handler.set_header_fast_path(false).expect("config write failed");

        let png = create_image_bytes(12, 34, image::ImageFormat::Png);
        assert_eq!(handler.dimensions(&png), Dimensions::new(12, 34));
        assert_eq!(codec.decodes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn decoded_pixel_limit_does_not_change_reported_size() {
        let mut config = ImageConfig::default();
        config.max_decoded_pixels = 100;
        let handler = ImageHandler::new(config);

        let png = create_image_bytes(20, 20, image::ImageFormat::Png);
        let fast = handler.dimensions(&png);
        handler.set_header_fast_path(false).expect("config write failed");
        let fallback = handler.dimensions(&png);

        assert_eq!(fast, Dimensions::new(20, 20));
        assert_eq!(fallback, fast);

        let gif = create_image_bytes(20, 20, image::ImageFormat::Gif);
        assert_eq!(handler.dimensions(&gif), Dimensions::new(20, 20));

        // 取像素的解码仍受上限约束
        assert!(matches!(handler.decode(&png), Err(ImageError::ResourceLimit(_))));
    }

    #[test]
    fn performance_profile_switches_are_visible() {
        let handler = ImageHandler::new(ImageConfig::default());
        handler
            .set_performance_profile(ImagePerformanceProfile::Speed)
            .expect("profile switch failed");

        assert_eq!(
            handler.get_performance_profile().expect("read profile failed"),
            ImagePerformanceProfile::Speed
        );
        let config = handler.config_snapshot().expect("config snapshot failed");
        assert_eq!(config.resize_filter, FilterType::Nearest);
    }

    #[test]
    fn set_limits_rejects_degenerate_values() {
        let handler = ImageHandler::new(ImageConfig::default());

        assert!(matches!(handler.set_limits(0, 1, 4), Err(ImageError::InvalidFormat(_))));
        assert!(matches!(handler.set_limits(1, 0, 4), Err(ImageError::InvalidFormat(_))));
        assert!(matches!(handler.set_limits(1, 1, 3), Err(ImageError::InvalidFormat(_))));

        handler.set_limits(1024, 100, 400).expect("valid limits");
        let config = handler.config_snapshot().expect("config snapshot failed");
        assert_eq!(config.max_input_bytes, 1024);
        assert_eq!(config.max_decoded_pixels, 100);
        assert_eq!(config.max_decoded_bytes, 400);
    }
}
