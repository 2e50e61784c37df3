pub mod batch;
pub mod bmp;
pub mod codec;
pub mod format;
pub mod guard;
pub mod jpeg;
pub mod png;
pub mod sniff;
pub mod tiff;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use batch::{BatchConfig, Report};
pub use codec::{convert, convert_stream, decode, encode, Outcome};
pub use format::Format;
pub use guard::{ConversionRequest, Decision, SkipReason};
pub use sniff::SniffError;

#[derive(Debug, Error)]
pub enum Error {
    /// 未対応の拡張子
    #[error("Unsupported extension: {0:?}")]
    UnsupportedExtension(String),
    /// 変換ガードでのシグネチャ判定エラー
    #[error("Conversion guard: {0}")]
    Guard(#[from] SniffError),
    /// デコードエラー
    #[error("Decode failed: {0}")]
    DecodeFailed(#[source] CodecError),
    /// エンコードエラー
    #[error("Encode failed: {0}")]
    EncodeFailed(#[source] CodecError),
    /// ファイルのオープン・作成・書き込みエラー
    #[error("File access failed: {}: {source}", path.display())]
    FileAccessFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// 同じ出力パスを別の入力が既に書き込んだ
    #[error("Output {} already written from {}", path.display(), claimed_by.display())]
    OutputConflict { path: PathBuf, claimed_by: PathBuf },
}

impl Error {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::FileAccessFailed {
            path: path.into(),
            source,
        }
    }
}

/// 各コーデックライブラリのエラー
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JPEG decode error: {0}")]
    JpegDecode(#[from] jpeg_decoder::Error),
    #[error("JPEG encode error: {0}")]
    JpegEncode(#[from] jpeg_encoder::EncodingError),
    #[error("PNG decode error: {0}")]
    PngDecode(#[from] ::png::DecodingError),
    #[error("PNG encode error: {0}")]
    PngEncode(#[from] ::png::EncodingError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// シグネチャから形式を判定できない
    #[error("Unknown image format")]
    UnknownFormat,
    /// 出力形式で表現できない画像サイズ
    #[error("Image dimensions {width}x{height} exceed the format limit")]
    Dimensions { width: u32, height: u32 },
    #[error("Unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),
}
