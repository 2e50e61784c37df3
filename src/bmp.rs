use crate::CodecError;
use image::codecs::bmp::{BmpDecoder, BmpEncoder};
use image::DynamicImage;
use std::io::Cursor;

/// BMP画像をデコードします
pub fn decode(data: &[u8]) -> Result<DynamicImage, CodecError> {
    let decoder = BmpDecoder::new(Cursor::new(data))?;
    Ok(DynamicImage::from_decoder(decoder)?)
}

/// 8bit画像をBMPにエンコードします
pub fn encode(image: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let mut output = Vec::new();
    image.write_with_encoder(BmpEncoder::new(&mut output))?;
    Ok(output)
}
