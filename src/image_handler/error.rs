//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载 解码 / 缩放 / 编码 各阶段的失败，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 注意：header 快速解析“无法判断”不是错误，由 `Option::None` 表达，不会出现在这里。

/// 图片处理统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("缩放错误：{0}")]
    Resize(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("像素缓冲异常：{0}")]
    InvalidBuffer(String),
}

impl ImageError {
    /// 稳定的机器可读错误码，便于调用方做分支或上报。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "invalid_format",
            Self::Decode(_) => "decode_failed",
            Self::Resize(_) => "resize_failed",
            Self::Encode(_) => "encode_failed",
            Self::ResourceLimit(_) => "resource_limit",
            Self::InvalidBuffer(_) => "invalid_buffer",
        }
    }

    /// 出错所在的流水线阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) | Self::Decode(_) => "decode",
            Self::Resize(_) => "resize",
            Self::Encode(_) => "encode",
            Self::ResourceLimit(_) | Self::InvalidBuffer(_) => "validate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_and_stage_follow_variant() {
        let err = ImageError::Resize("目标尺寸为 0".to_string());
        assert_eq!(err.code(), "resize_failed");
        assert_eq!(err.stage(), "resize");

        let err = ImageError::InvalidFormat("空输入".to_string());
        assert_eq!(err.code(), "invalid_format");
        assert_eq!(err.stage(), "decode");
    }

    #[test]
    fn display_is_human_readable() {
        let err = ImageError::Encode("写入失败".to_string());
        assert_eq!(err.to_string(), "编码错误：写入失败");
    }
}
