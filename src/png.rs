use crate::CodecError;
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::borrow::Cow;
use std::io::Cursor;

/// PNG画像をデコードします
///
/// パレット・低ビット深度は8bitに展開し、16bitは8bitに丸めます。
pub fn decode(data: &[u8]) -> Result<DynamicImage, CodecError> {
    let mut decoder = Decoder::new(Cursor::new(data));
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);

    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;
    buf.truncate(frame.buffer_size());

    if frame.bit_depth != BitDepth::Eight {
        return Err(CodecError::UnsupportedPixelFormat(format!(
            "PNG bit depth {:?}",
            frame.bit_depth
        )));
    }

    let (width, height) = (frame.width, frame.height);
    let image = match frame.color_type {
        ColorType::Grayscale => GrayImage::from_raw(width, height, buf).map(DynamicImage::ImageLuma8),
        ColorType::GrayscaleAlpha => {
            GrayAlphaImage::from_raw(width, height, buf).map(DynamicImage::ImageLumaA8)
        }
        ColorType::Rgb => RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8),
        ColorType::Rgba => RgbaImage::from_raw(width, height, buf).map(DynamicImage::ImageRgba8),
        // EXPANDによりパレットは展開済み
        ColorType::Indexed => None,
    };

    image.ok_or_else(|| {
        CodecError::UnsupportedPixelFormat(format!("PNG {:?} {width}x{height}", frame.color_type))
    })
}

/// 8bit画像をPNGにエンコードします
pub fn encode(image: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let (color, data): (ColorType, Cow<'_, [u8]>) = match image {
        DynamicImage::ImageLuma8(buf) => (ColorType::Grayscale, Cow::Borrowed(buf.as_raw().as_slice())),
        DynamicImage::ImageLumaA8(buf) => {
            (ColorType::GrayscaleAlpha, Cow::Borrowed(buf.as_raw().as_slice()))
        }
        DynamicImage::ImageRgb8(buf) => (ColorType::Rgb, Cow::Borrowed(buf.as_raw().as_slice())),
        DynamicImage::ImageRgba8(buf) => (ColorType::Rgba, Cow::Borrowed(buf.as_raw().as_slice())),
        other => (ColorType::Rgba, Cow::Owned(other.to_rgba8().into_raw())),
    };

    let mut output = Vec::new();
    {
        let mut encoder = Encoder::new(&mut output, image.width(), image.height());
        encoder.set_color(color);
        encoder.set_depth(BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&data)?;
        writer.finish()?;
    }

    Ok(output)
}
