use crate::CodecError;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};
use jpeg_decoder::{Decoder, PixelFormat};
use jpeg_encoder::{ColorType, Encoder};

/// エンコード時の既定品質
pub const DEFAULT_QUALITY: u8 = 75;

/// JPEG画像をデコードします
///
/// # Details
/// - グレースケール（8bit/16bit）とRGBはそのまま保持
/// - CMYKはRGBに変換
pub fn decode(data: &[u8]) -> Result<DynamicImage, CodecError> {
    let mut decoder = Decoder::new(data);
    let pixels = decoder.decode()?;

    let info = decoder
        .info()
        .ok_or_else(|| CodecError::UnsupportedPixelFormat("JPEG info unavailable".to_string()))?;
    let width = u32::from(info.width);
    let height = u32::from(info.height);

    let image = match info.pixel_format {
        PixelFormat::L8 => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        PixelFormat::L16 => {
            // jpeg-decoderはネイティブエンディアンで出力する
            let samples: Vec<u16> = pixels
                .chunks_exact(2)
                .map(|p| u16::from_ne_bytes([p[0], p[1]]))
                .collect();
            ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(width, height, samples)
                .map(DynamicImage::ImageLuma16)
        }
        PixelFormat::RGB24 => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        PixelFormat::CMYK32 => {
            RgbImage::from_raw(width, height, cmyk_to_rgb(&pixels)).map(DynamicImage::ImageRgb8)
        }
    };

    image.ok_or_else(|| {
        CodecError::UnsupportedPixelFormat(format!(
            "JPEG {:?} data does not fit {width}x{height}",
            info.pixel_format
        ))
    })
}

fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(cmyk.len() / 4 * 3);
    for pixel in cmyk.chunks_exact(4) {
        let k = 255 - u32::from(pixel[3]);
        for &channel in &pixel[..3] {
            rgb.push(((255 - u32::from(channel)) * k / 255) as u8);
        }
    }
    rgb
}

/// 8bit画像をJPEGにエンコードします
///
/// JPEGはアルファチャンネルを持たないため、アルファは破棄されます。
pub fn encode(image: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let (width, height) = (image.width(), image.height());
    let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(CodecError::Dimensions { width, height }),
    };

    let mut output = Vec::new();
    let encoder = Encoder::new(&mut output, DEFAULT_QUALITY);
    match image {
        DynamicImage::ImageLuma8(buf) => encoder.encode(buf.as_raw(), w, h, ColorType::Luma)?,
        DynamicImage::ImageRgb8(buf) => encoder.encode(buf.as_raw(), w, h, ColorType::Rgb)?,
        DynamicImage::ImageRgba8(buf) => encoder.encode(buf.as_raw(), w, h, ColorType::Rgba)?,
        DynamicImage::ImageLumaA8(_) => {
            encoder.encode(image.to_luma8().as_raw(), w, h, ColorType::Luma)?
        }
        other => encoder.encode(other.to_rgb8().as_raw(), w, h, ColorType::Rgb)?,
    }

    Ok(output)
}
