use crate::format::Format;
use crate::sniff::{self, Peeked};
use crate::Error;
use log::debug;
use std::io::Read;

/// 変換要求（宣言された変換元・変換先の形式）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRequest {
    pub src: Format,
    pub dst: Format,
}

impl ConversionRequest {
    pub fn new(src: Format, dst: Format) -> Self {
        Self { src, dst }
    }

    /// 変換元と変換先が同じ（変換不要）
    pub fn is_noop(&self) -> bool {
        self.src == self.dst
    }
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self::new(Format::Jpeg, Format::Png)
    }
}

/// 変換を行わない理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 変換元と変換先が同じ形式
    SameFormat,
    /// 実際の形式が宣言された変換元と異なる
    SourceMismatch { actual: Format },
}

/// 変換ガードの判定結果
#[derive(Debug)]
pub enum Decision<R> {
    Skip(SkipReason),
    /// `stream` は先頭を含むストリーム全体を読み出せる
    Proceed { actual: Format, stream: Peeked<R> },
}

impl<R> Decision<R> {
    pub fn is_skip(&self) -> bool {
        matches!(self, Decision::Skip(_))
    }
}

/// 変換を行うべきかを判定します
///
/// # Details
/// - 変換元と変換先が同じ場合はストリームを読まずに `Skip`
/// - シグネチャの判定に失敗した場合は `Error::Guard`
/// - 実際の形式が変換元と異なる場合は `Skip`（エラーではない）
/// - それ以外は `Proceed`
pub fn decide<R: Read>(request: ConversionRequest, reader: R) -> Result<Decision<R>, Error> {
    if request.is_noop() {
        return Ok(Decision::Skip(SkipReason::SameFormat));
    }

    let (actual, stream) = sniff::peek(reader)?;
    if actual != request.src {
        debug!(
            "declared source {} but content is {}, skipping",
            request.src, actual
        );
        return Ok(Decision::Skip(SkipReason::SourceMismatch { actual }));
    }

    Ok(Decision::Proceed { actual, stream })
}
