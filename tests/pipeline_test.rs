// 解码 → 缩放 → PNG 编码 流水线的集成测试
use image::{DynamicImage, ImageBuffer, Rgb, Rgba};
use image_resize::{
    Dimensions, ImageConfig, ImageError, ImageFormat, ImageHandler, ImagePerformanceProfile,
    PixelBuffer,
};
use std::io::Cursor;
use std::sync::Arc;
use std::thread;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn encode(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = match format {
        image::ImageFormat::Jpeg => DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 255) as u8, (y % 255) as u8, 90])
        })),
        _ => DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, 90, 200])
        })),
    };
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format)
        .expect("failed to encode test image");
    cursor.into_inner()
}

const INPUT_FORMATS: [image::ImageFormat; 4] = [
    image::ImageFormat::Png,
    image::ImageFormat::Jpeg,
    image::ImageFormat::Gif,
    image::ImageFormat::WebP,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_query_agrees_with_full_decode() {
        init_logger();
        for format in INPUT_FORMATS {
            let bytes = encode(75, 41, format);
            let fast = image_resize::dimensions(&bytes);
            let decoded = image_resize::decode(&bytes).expect("decode should succeed");
            assert_eq!(fast, decoded.dimensions(), "{:?}", format);
            assert_eq!(fast, Dimensions::new(75, 41));
        }
    }

    #[test]
    fn round_trip_resize_yields_requested_size_for_each_input() {
        init_logger();
        for format in INPUT_FORMATS {
            for (width, height) in [(1, 1), (10, 90), (150, 20)] {
                let bytes = encode(60, 40, format);
                let decoded = image_resize::decode(&bytes).expect("decode should succeed");
                let resized = image_resize::resize(decoded, width, height).expect("resize should succeed");
                let png = image_resize::encode_png(&resized).expect("encode should succeed");

                assert_eq!(ImageFormat::classify(png.as_bytes()), ImageFormat::Png);
                assert_eq!(
                    image_resize::dimensions(png.as_bytes()),
                    Dimensions::new(width, height),
                    "{:?} -> {}x{}",
                    format,
                    width,
                    height
                );
            }
        }
    }

    #[test]
    fn dimension_query_never_errors_on_garbage() {
        assert_eq!(image_resize::dimensions(&[]), Dimensions::UNKNOWN);
        assert_eq!(image_resize::dimensions(b"hello world"), Dimensions::UNKNOWN);
        assert_eq!(image_resize::dimensions(&[0xFF, 0xD8, 0xFF]), Dimensions::UNKNOWN);
        assert_eq!(image_resize::dimensions(b"GIF89a"), Dimensions::UNKNOWN);
    }

    #[test]
    fn truncated_input_fails_decode_with_typed_error() {
        let bytes = encode(64, 64, image::ImageFormat::Png);
        let result = image_resize::decode(&bytes[..bytes.len() / 2]);

        let err = result.expect_err("truncated png must not decode");
        assert!(matches!(err, ImageError::Decode(_)));
        assert_eq!(err.code(), "decode_failed");
    }

    #[test]
    fn encoded_output_is_png_regardless_of_input() {
        let jpeg = encode(32, 32, image::ImageFormat::Jpeg);
        let png = image_resize::resize_to_png(&jpeg, 16, 16).expect("pipeline should succeed");
        assert_eq!(png.format(), ImageFormat::Png);
        assert!(png.as_bytes().starts_with(&image_resize::PNG_SIGNATURE));
    }

    #[test]
    fn profiles_change_output_but_not_dimensions() {
        let bytes = encode(200, 120, image::ImageFormat::Png);

        for profile in ["quality", "balanced", "speed"] {
            let handler = ImageHandler::new(ImageConfig::default());
            let profile = ImagePerformanceProfile::parse(profile).expect("known profile");
            handler
                .set_performance_profile(profile)
                .expect("profile switch failed");

            let png = handler.resize_to_png(&bytes, 50, 30).expect("pipeline should succeed");
            assert_eq!(handler.dimensions(png.as_bytes()), Dimensions::new(50, 30));
        }
    }

    #[test]
    fn independent_pipelines_run_on_separate_threads() {
        let handler = Arc::new(ImageHandler::new(ImageConfig::default()));

        let workers: Vec<_> = (1..=4u32)
            .map(|i| {
                let handler = Arc::clone(&handler);
                thread::spawn(move || {
                    let bytes = encode(20 * i, 10 * i, image::ImageFormat::Png);
                    let png = handler
                        .resize_to_png(&bytes, i, 2 * i)
                        .expect("pipeline should succeed");
                    handler.dimensions(png.as_bytes())
                })
            })
            .collect();

        for (i, worker) in (1..=4u32).zip(workers) {
            let dims = worker.join().expect("worker panicked");
            assert_eq!(dims, Dimensions::new(i, 2 * i));
        }
    }

    #[test]
    fn pixel_buffer_from_caller_bytes_can_be_encoded() {
        let buffer = PixelBuffer::new(3, 2, vec![255; 24]).expect("valid buffer");
        let png = image_resize::encode_png(&buffer).expect("encode should succeed");
        let decoded = image_resize::decode(png.as_bytes()).expect("decode should succeed");
        assert_eq!(decoded, buffer);
    }
}
