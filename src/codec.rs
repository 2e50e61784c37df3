use crate::format::Format;
use crate::guard::{self, ConversionRequest, Decision, SkipReason};
use crate::{bmp, jpeg, png, sniff, tiff};
use crate::{CodecError, Error};
use image::DynamicImage;
use log::debug;
use std::borrow::Cow;
use std::io::{Read, Write};

/// 1ファイル分の処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Converted { from: Format, to: Format },
}

/// 画像データをデコードします
///
/// 形式は宣言ではなくデータ自身のシグネチャから判定します。
/// 結果は8bit/チャンネル（Luma8, LumaA8, Rgb8, Rgba8）に揃えます。
pub fn decode(data: &[u8]) -> Result<DynamicImage, Error> {
    let format = sniff::detect(data).ok_or(Error::DecodeFailed(CodecError::UnknownFormat))?;
    debug!("decoding {} bytes as {format}", data.len());

    let image = match format {
        Format::Jpeg => jpeg::decode(data),
        Format::Png => png::decode(data),
        Format::Bmp => bmp::decode(data),
        Format::Tiff => tiff::decode(data),
    }
    .map_err(Error::DecodeFailed)?;

    Ok(if is_8bit(&image) {
        image
    } else {
        narrow(&image)
    })
}

/// 画像を指定形式にエンコードします（各エンコーダの既定設定）
pub fn encode(image: &DynamicImage, dst: Format) -> Result<Vec<u8>, Error> {
    let image = to_8bit(image);
    match dst {
        Format::Jpeg => jpeg::encode(&image),
        Format::Png => png::encode(&image),
        Format::Bmp => bmp::encode(&image),
        Format::Tiff => tiff::encode(&image),
    }
    .map_err(Error::EncodeFailed)
}

/// ストリームをデコードし、`dst` 形式で `writer` に書き出します
///
/// デコードとエンコードが両方成功するまで `writer` には何も書き込みません。
pub fn convert<R: Read, W: Write + ?Sized>(
    mut reader: R,
    writer: &mut W,
    dst: Format,
) -> Result<(), Error> {
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|e| Error::DecodeFailed(e.into()))?;

    let image = decode(&data)?;
    let encoded = encode(&image, dst)?;

    writer
        .write_all(&encoded)
        .and_then(|_| writer.flush())
        .map_err(|e| Error::EncodeFailed(e.into()))
}

/// 変換ガードを通してからストリームを変換します
pub fn convert_stream<R: Read, W: Write + ?Sized>(
    request: ConversionRequest,
    reader: R,
    writer: &mut W,
) -> Result<Outcome, Error> {
    match guard::decide(request, reader)? {
        Decision::Skip(reason) => Ok(Outcome::Skipped(reason)),
        Decision::Proceed { actual, stream } => {
            convert(stream, writer, request.dst)?;
            Ok(Outcome::Converted {
                from: actual,
                to: request.dst,
            })
        }
    }
}

fn is_8bit(image: &DynamicImage) -> bool {
    matches!(
        image,
        DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_)
    )
}

// 8bit以外（16bit・浮動小数点）は同じチャンネル構成の8bitに変換する
fn narrow(image: &DynamicImage) -> DynamicImage {
    let color = image.color();
    match (color.has_color(), color.has_alpha()) {
        (false, false) => DynamicImage::ImageLuma8(image.to_luma8()),
        (false, true) => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        (true, false) => DynamicImage::ImageRgb8(image.to_rgb8()),
        (true, true) => DynamicImage::ImageRgba8(image.to_rgba8()),
    }
}

fn to_8bit(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    if is_8bit(image) {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(narrow(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    #[test]
    fn test_to_8bit_keeps_channel_layout() {
        let luma16: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(2, 2, Luma([65535]));
        let narrowed = to_8bit(&DynamicImage::ImageLuma16(luma16)).into_owned();
        assert!(matches!(narrowed, DynamicImage::ImageLuma8(_)));
        assert_eq!(narrowed.to_luma8().get_pixel(0, 0).0, [255]);

        let rgb16: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(1, 1, Rgb([0, 0, 0]));
        let narrowed = to_8bit(&DynamicImage::ImageRgb16(rgb16)).into_owned();
        assert!(matches!(narrowed, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_to_8bit_borrows_8bit_images() {
        let image = DynamicImage::ImageRgb8(image::RgbImage::new(1, 1));
        assert!(matches!(to_8bit(&image), Cow::Borrowed(_)));
    }

    #[test]
    fn test_decode_unknown_signature() {
        assert!(matches!(
            decode(b"GIF89a......"),
            Err(Error::DecodeFailed(CodecError::UnknownFormat))
        ));
    }
}
