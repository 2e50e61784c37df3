use crate::format::Format;
use log::debug;
use std::io::{self, Cursor, Read};
use thiserror::Error;

/// 登録済みシグネチャの最大長（バイト）
pub const MAX_SIGNATURE_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum SniffError {
    /// シグネチャ読み込み中のI/Oエラー
    #[error("Source unreadable: {0}")]
    SourceUnreadable(#[source] io::Error),
    /// どのシグネチャにも一致しない
    #[error("Unrecognized format")]
    UnrecognizedFormat,
}

/// バイト列の先頭から形式を判定します
pub fn detect(data: &[u8]) -> Option<Format> {
    Format::ALL.into_iter().find(|format| {
        format
            .signatures()
            .iter()
            .any(|signature| data.starts_with(signature))
    })
}

/// ストリームの先頭を読み取り形式を判定します
///
/// 読み取った先頭バイトは消費されます。後続でストリーム全体が必要な場合は
/// [`peek`] を使用してください。
pub fn sniff<R: Read + ?Sized>(reader: &mut R) -> Result<Format, SniffError> {
    let prefix = read_prefix(reader)?;
    identify(&prefix)
}

/// 先頭を判定し、読み取った分を再生するリーダーと共に返します
pub fn peek<R: Read>(mut reader: R) -> Result<(Format, Peeked<R>), SniffError> {
    let prefix = read_prefix(&mut reader)?;
    let format = identify(&prefix)?;
    let peeked = Peeked {
        inner: Cursor::new(prefix).chain(reader),
    };
    Ok((format, peeked))
}

fn identify(prefix: &[u8]) -> Result<Format, SniffError> {
    let format = detect(prefix).ok_or(SniffError::UnrecognizedFormat)?;
    debug!("sniffed {format} from {} byte prefix", prefix.len());
    Ok(format)
}

// EOFに達した場合は読めた分だけ返す
fn read_prefix<R: Read + ?Sized>(reader: &mut R) -> Result<Vec<u8>, SniffError> {
    let mut buf = [0u8; MAX_SIGNATURE_LEN];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SniffError::SourceUnreadable(e)),
        }
    }
    Ok(buf[..filled].to_vec())
}

/// シグネチャ判定で消費した先頭バイトを再生するリーダー
#[derive(Debug)]
pub struct Peeked<R> {
    inner: io::Chain<Cursor<Vec<u8>>, R>,
}

impl<R> Peeked<R> {
    /// 判定に使用した先頭バイト
    pub fn prefix(&self) -> &[u8] {
        self.inner.get_ref().0.get_ref()
    }
}

impl<R: Read> Read for Peeked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}
