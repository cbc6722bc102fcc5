//! # 图片处理模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“格式嗅探 → header 尺寸读取 → 解码 → 缩放 → PNG 编码”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `format`：魔数嗅探，输出 `ImageFormat`
//! - `header`：PNG / JPEG header 尺寸快速读取
//! - `buffer`：`Dimensions` / `PixelBuffer` / `EncodedImage` 数据模型
//! - `codec`：像素级编解码契约与默认实现
//! - `handler`：配置管理 + 尺寸查询编排
//! - `pipeline`：解码、资源限制、缩放、编码
//! - `config/error`：配置与错误
//!
//! ## 新同事快速上手
//!
//! ```text
//! dimensions(bytes)
//!    ├─ format.rs（嗅探）
//!    ├─ header.rs（PNG / JPEG 快速读取）
//!    └─ pipeline.rs → codec.rs（快速读取无结果时完整解码）
//!
//! resize_to_png(bytes, w, h)
//!    ↓
//! pipeline.rs（decode → resize → encode + 阶段耗时日志）
//!    ↓
//! codec.rs（image / fast_image_resize）
//! ```

mod buffer;
mod codec;
mod config;
mod error;
mod format;
mod handler;
mod header;
mod pipeline;

use once_cell::sync::Lazy;

pub use buffer::{Dimensions, EncodedImage, PixelBuffer, fit_within};
pub use codec::{ImageCodec, NativeCodec};
pub use config::{ImageConfig, ImagePerformanceProfile};
pub use error::ImageError;
pub use format::{ImageFormat, classify};
pub use handler::ImageHandler;
pub use header::{PNG_SIGNATURE, jpeg_dimensions, png_dimensions};

/// 进程内共享的默认处理器，供模块级便捷函数使用。
static HANDLER: Lazy<ImageHandler> = Lazy::new(|| ImageHandler::new(ImageConfig::default()));

/// 使用默认配置的共享处理器。
pub fn shared_handler() -> &'static ImageHandler {
    &HANDLER
}

/// 查询图片尺寸，无法确定时返回 `(0, 0)`。
pub fn dimensions(bytes: &[u8]) -> Dimensions {
    HANDLER.dimensions(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, ImageError> {
    HANDLER.decode(bytes)
}

pub fn resize(buffer: PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer, ImageError> {
    HANDLER.resize(buffer, width, height)
}

pub fn encode_png(buffer: &PixelBuffer) -> Result<EncodedImage, ImageError> {
    HANDLER.encode_png(buffer)
}

pub fn resize_to_png(bytes: &[u8], width: u32, height: u32) -> Result<EncodedImage, ImageError> {
    HANDLER.resize_to_png(bytes, width, height)
}

pub fn thumbnail_png(bytes: &[u8], max_dimension: u32) -> Result<EncodedImage, ImageError> {
    HANDLER.thumbnail_png(bytes, max_dimension)
}
