use crate::CodecError;
use image::codecs::tiff::{TiffDecoder, TiffEncoder};
use image::DynamicImage;
use std::io::Cursor;

/// TIFF画像をデコードします（リトルエンディアン・ビッグエンディアン両対応）
pub fn decode(data: &[u8]) -> Result<DynamicImage, CodecError> {
    let decoder = TiffDecoder::new(Cursor::new(data))?;
    Ok(DynamicImage::from_decoder(decoder)?)
}

/// 8bit画像をTIFFにエンコードします
pub fn encode(image: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    // TIFFエンコーダはグレースケール+アルファに未対応
    let widened;
    let image = match image {
        DynamicImage::ImageLumaA8(_) => {
            widened = DynamicImage::ImageRgba8(image.to_rgba8());
            &widened
        }
        _ => image,
    };

    let mut output = Cursor::new(Vec::new());
    image.write_with_encoder(TiffEncoder::new(&mut output))?;
    Ok(output.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, LumaA};

    #[test]
    fn test_grayscale_alpha_is_widened() {
        let image =
            DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(3, 3, LumaA([200, 255])));
        let encoded = encode(&image).expect("Failed to encode");
        assert!(
            encoded.starts_with(&[0x49, 0x49, 0x2A, 0x00])
                || encoded.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        );

        let decoded = decode(&encoded).expect("Failed to decode");
        assert_eq!(decoded.to_rgba8(), image.to_rgba8());
    }
}
