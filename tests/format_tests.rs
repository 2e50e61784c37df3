use image_conv::sniff::{self, SniffError, MAX_SIGNATURE_LEN};
use image_conv::{Error, Format};
use std::io::{self, Read};
use std::path::Path;

const REGISTERED: &[(&str, Format)] = &[
    (".jpg", Format::Jpeg),
    (".jpeg", Format::Jpeg),
    (".png", Format::Png),
    (".bmp", Format::Bmp),
    (".tiff", Format::Tiff),
    (".tif", Format::Tiff),
];

#[test]
fn test_extension_lookup_is_case_insensitive() {
    for (ext, format) in REGISTERED {
        let upper = ext.to_uppercase();
        assert_eq!(Format::from_extension(ext).unwrap(), *format);
        assert_eq!(Format::from_extension(&upper).unwrap(), *format);
        assert_eq!(
            Format::from_extension(&upper).unwrap(),
            Format::from_extension(&upper.to_lowercase()).unwrap()
        );
    }

    // 大文字小文字の混在
    assert_eq!(Format::from_extension(".JpEg").unwrap(), Format::Jpeg);
}

#[test]
fn test_unsupported_extension() {
    for ext in [".gif", ".webp", "", "jpg", ".jp"] {
        match Format::from_extension(ext) {
            Err(Error::UnsupportedExtension(found)) => assert_eq!(found, ext),
            other => panic!("{ext:?} should be unsupported, got {other:?}"),
        }
    }
}

#[test]
fn test_from_path() {
    assert_eq!(
        Format::from_path(Path::new("path/to/abc.JPG")).unwrap(),
        Format::Jpeg
    );
    assert_eq!(Format::from_path(Path::new("abc.tif")).unwrap(), Format::Tiff);
    assert!(matches!(
        Format::from_path(Path::new("path/to/README")),
        Err(Error::UnsupportedExtension(_))
    ));
}

#[test]
fn test_canonical_extension() {
    assert_eq!(Format::Jpeg.extension(), ".jpg");
    assert_eq!(Format::Png.extension(), ".png");
    assert_eq!(Format::Bmp.extension(), ".bmp");
    assert_eq!(Format::Tiff.extension(), ".tiff");

    // 正規の拡張子から元の形式に戻ること
    for format in Format::ALL {
        assert_eq!(Format::from_extension(format.extension()).unwrap(), format);
    }
}

#[test]
fn test_every_signature_is_sniffed() {
    for format in Format::ALL {
        for signature in format.signatures() {
            // シグネチャのみ
            let mut reader = *signature;
            assert_eq!(sniff::sniff(&mut reader).unwrap(), format);

            // 後続データあり
            let mut data = signature.to_vec();
            data.extend_from_slice(&[0x00; 32]);
            assert_eq!(sniff::sniff(&mut &data[..]).unwrap(), format);
            assert_eq!(sniff::detect(&data), Some(format));
        }
    }
}

#[test]
fn test_tiff_both_byte_orders() {
    assert_eq!(
        sniff::detect(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]),
        Some(Format::Tiff)
    );
    assert_eq!(
        sniff::detect(&[0x4D, 0x4D, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]),
        Some(Format::Tiff)
    );
}

#[test]
fn test_unrecognized_format() {
    let cases: &[&[u8]] = &[
        b"GIF89a\x01\x00\x01\x00",
        b"RIFF\x00\x00\x00\x00WEBP",
        &[],
        // 不完全なシグネチャ
        &[0xFF],
        &[0x89, 0x50, 0x4E, 0x47],
        &[0x49, 0x49, 0x2A],
    ];

    for data in cases {
        assert!(
            matches!(
                sniff::sniff(&mut &data[..]),
                Err(SniffError::UnrecognizedFormat)
            ),
            "{data:?} should not be recognized"
        );
        assert_eq!(sniff::detect(data), None);
    }
}

#[test]
fn test_source_unreadable() {
    let result = sniff::sniff(&mut FailingReader);
    assert!(matches!(result, Err(SniffError::SourceUnreadable(_))));
}

#[test]
fn test_sniff_consumes_prefix_only() {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(b"rest of stream");

    let mut reader = &data[..];
    assert_eq!(sniff::sniff(&mut reader).unwrap(), Format::Png);
    assert_eq!(reader, b"rest of stream");
    assert_eq!(data.len() - reader.len(), MAX_SIGNATURE_LEN);
}

#[test]
fn test_sniff_retries_interrupted_and_short_reads() {
    let mut reader = Trickle {
        data: vec![0x42, 0x4D, 0x10, 0x20],
        pos: 0,
        interrupted: false,
    };
    assert_eq!(sniff::sniff(&mut reader).unwrap(), Format::Bmp);
}

#[test]
fn test_display() {
    let names: Vec<String> = Format::ALL.iter().map(|f| f.to_string()).collect();
    assert_eq!(names, ["JPEG", "PNG", "BMP", "TIFF"]);
}

/// 常にエラーを返すリーダー
struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
    }
}

/// 1バイトずつ返し、最初に一度だけInterruptedを返すリーダー
struct Trickle {
    data: Vec<u8>,
    pos: usize,
    interrupted: bool,
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.interrupted {
            self.interrupted = true;
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        if self.pos >= self.data.len() || buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.data[self.pos];
        self.pos += 1;
        Ok(1)
    }
}
