use crate::Error;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// 対応する画像形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Jpeg,
    Png,
    Bmp,
    Tiff,
}

/// 形式ごとの登録情報
struct Entry {
    format: Format,
    name: &'static str,
    /// 先頭が正規の拡張子
    extensions: &'static [&'static str],
    signatures: &'static [&'static [u8]],
}

// 判定の優先順位はこの並び順
const REGISTRY: &[Entry] = &[
    Entry {
        format: Format::Jpeg,
        name: "JPEG",
        extensions: &[".jpg", ".jpeg"],
        signatures: &[&[0xFF, 0xD8]],
    },
    Entry {
        format: Format::Png,
        name: "PNG",
        extensions: &[".png"],
        signatures: &[&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]],
    },
    Entry {
        format: Format::Bmp,
        name: "BMP",
        extensions: &[".bmp"],
        signatures: &[&[0x42, 0x4D]],
    },
    Entry {
        format: Format::Tiff,
        name: "TIFF",
        extensions: &[".tiff", ".tif"],
        signatures: &[
            &[0x49, 0x49, 0x2A, 0x00], // little-endian
            &[0x4D, 0x4D, 0x00, 0x2A], // big-endian
        ],
    },
];

impl Format {
    /// 全形式（シグネチャ判定の優先順）
    pub const ALL: [Format; 4] = [Format::Jpeg, Format::Png, Format::Bmp, Format::Tiff];

    fn entry(self) -> &'static Entry {
        match self {
            Format::Jpeg => &REGISTRY[0],
            Format::Png => &REGISTRY[1],
            Format::Bmp => &REGISTRY[2],
            Format::Tiff => &REGISTRY[3],
        }
    }

    /// 拡張子文字列（例: ".JPG"）から形式を取得します
    ///
    /// 大文字小文字は区別しません。未登録の拡張子は
    /// `Error::UnsupportedExtension` になります。
    pub fn from_extension(ext: &str) -> Result<Format, Error> {
        let lower = ext.to_ascii_lowercase();
        REGISTRY
            .iter()
            .find(|entry| entry.extensions.iter().any(|candidate| *candidate == lower))
            .map(|entry| entry.format)
            .ok_or_else(|| Error::UnsupportedExtension(ext.to_string()))
    }

    /// パス（例: "path/to/abc.jpg"）の拡張子から形式を取得します
    pub fn from_path(path: &Path) -> Result<Format, Error> {
        match path.extension() {
            Some(ext) => Format::from_extension(&format!(".{}", ext.to_string_lossy())),
            None => Err(Error::UnsupportedExtension(String::new())),
        }
    }

    /// 正規の拡張子（出力ファイル名に使用）
    pub fn extension(self) -> &'static str {
        self.entry().extensions[0]
    }

    pub fn extensions(self) -> &'static [&'static str] {
        self.entry().extensions
    }

    pub fn signatures(self) -> &'static [&'static [u8]] {
        self.entry().signatures
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// コマンドライン向け: "jpg" と ".jpg" の両方を受け付けます
impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('.') {
            Format::from_extension(s)
        } else {
            Format::from_extension(&format!(".{s}"))
                .map_err(|_| Error::UnsupportedExtension(s.to_string()))
        }
    }
}
