//! # 图片尺寸探测与缩放 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      调用方（内存字节）                   │
//! └───────┬──────────────────────────────────┬───────────────┘
//!         ↓ dimensions()                     ↓ decode / resize / encode_png
//! ┌───────┼──────────────────────────────────┼───────────────┐
//! │  ┌─ format ──── 魔数嗅探 (PNG/JPEG/GIF/WEBP/UNKNOWN)     │
//! │  ├─ header ──── PNG IHDR / JPEG SOF 快速读取             │
//! │  ├─ handler ─── 尺寸查询编排 + 配置快照                  │
//! │  ├─ pipeline ── 解码 · 资源限制 · 缩放 · PNG 编码        │
//! │  └─ codec ───── image + fast_image_resize                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`image_handler`] | 格式嗅探、header 尺寸读取、解码 / 缩放 / 编码流水线 |
//!
//! 常用入口在 crate 根重新导出，模块级函数使用进程内共享的默认处理器。

pub mod image_handler;

pub use image_handler::{
    Dimensions, EncodedImage, ImageCodec, ImageConfig, ImageError, ImageFormat, ImageHandler,
    ImagePerformanceProfile, NativeCodec, PNG_SIGNATURE, PixelBuffer, classify, decode,
    dimensions, encode_png, fit_within, jpeg_dimensions, png_dimensions, resize, resize_to_png,
    shared_handler, thumbnail_png,
};
