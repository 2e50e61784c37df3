use crate::codec::{self, Outcome};
use crate::guard::{self, ConversionRequest, Decision, SkipReason};
use crate::{Error, Format};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

/// 一括変換の設定
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// 走査するディレクトリ
    pub root: PathBuf,
    /// サブディレクトリも走査するか
    pub recursive: bool,
    pub request: ConversionRequest,
    /// 並列数（0の場合はrayonの既定）
    pub jobs: usize,
}

impl BatchConfig {
    pub fn new(root: impl Into<PathBuf>, request: ConversionRequest) -> Self {
        Self {
            root: root.into(),
            recursive: false,
            request,
            jobs: 0,
        }
    }
}

/// 一括変換の結果（走査順）
#[derive(Debug, Default)]
pub struct Report {
    pub converted: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub failed: Vec<(PathBuf, Error)>,
}

impl Report {
    fn record(&mut self, path: PathBuf, result: Result<Outcome, Error>) {
        match result {
            Ok(Outcome::Converted { .. }) => self.converted.push(path),
            Ok(Outcome::Skipped(reason)) => {
                debug!("skipped {}: {reason:?}", path.display());
                self.skipped.push((path, reason));
            }
            Err(err) => {
                warn!("failed to convert {}: {err}", path.display());
                self.failed.push((path, err));
            }
        }
    }

    /// 失敗したファイルがなければtrue
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// ディレクトリ内のファイルを列挙します
///
/// # Details
/// - 各ディレクトリ内はファイル名順
/// - `recursive` が false の場合サブディレクトリは無視
/// - 再帰中に読めないサブディレクトリはスキップ（ルートが読めない場合はエラー）
pub fn traverse(root: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(root, recursive, &mut files)?;
    Ok(files)
}

fn collect_files(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> io::Result<()> {
    // アクセスできないエントリは読み飛ばす
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)?.filter_map(Result::ok).collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            files.push(path);
        } else if recursive {
            if let Err(err) = collect_files(&path, true, files) {
                warn!("skipping unreadable directory {}: {err}", path.display());
            }
        }
    }
    Ok(())
}

/// 出力パスを求めます（例: "abc.jpg" -> "abc.png"）
pub fn output_path(src: &Path, dst: Format) -> PathBuf {
    src.with_extension(dst.extension().trim_start_matches('.'))
}

/// 1ファイルを変換します
///
/// 入力を最後まで読み、デコードとエンコードが成功してから出力ファイルを作成します。
pub fn convert_file(path: &Path, request: ConversionRequest) -> Result<Outcome, Error> {
    let (actual, stream) = match open_guarded(path, request)? {
        Decision::Skip(reason) => return Ok(Outcome::Skipped(reason)),
        Decision::Proceed { actual, stream } => (actual, stream),
    };

    let mut encoded = Vec::new();
    codec::convert(stream, &mut encoded, request.dst)?;

    let dst_path = output_path(path, request.dst);
    write_output(&dst_path, &encoded)?;
    info!("converted {} -> {}", path.display(), dst_path.display());

    Ok(Outcome::Converted {
        from: actual,
        to: request.dst,
    })
}

fn open_guarded(
    path: &Path,
    request: ConversionRequest,
) -> Result<Decision<BufReader<File>>, Error> {
    // 同一形式ならファイルを開かない
    if request.is_noop() {
        return Ok(Decision::Skip(SkipReason::SameFormat));
    }

    let file = File::open(path).map_err(|e| Error::file_access(path, e))?;
    guard::decide(request, BufReader::new(file))
}

/// `sync_all` できる出力先
trait OutputFile: Write {
    fn sync_all(&self) -> io::Result<()>;
}

impl OutputFile for File {
    fn sync_all(&self) -> io::Result<()> {
        File::sync_all(self)
    }
}

fn write_output(path: &Path, data: &[u8]) -> Result<(), Error> {
    let file = File::create(path).map_err(|e| Error::file_access(path, e))?;
    finish_output(path, file, data)
}

// 書き込みに失敗した場合は途中までのファイルを削除する
fn finish_output<F: OutputFile>(path: &Path, mut file: F, data: &[u8]) -> Result<(), Error> {
    let written = file.write_all(data).and_then(|_| file.sync_all());
    drop(file);

    if let Err(err) = written {
        if let Err(remove_err) = fs::remove_file(path) {
            warn!("failed to remove partial {}: {remove_err}", path.display());
        }
        return Err(Error::file_access(path, err));
    }
    Ok(())
}

/// ディレクトリ内のファイルを一括変換します
///
/// 個々のファイルの失敗は `Report::failed` に記録し、処理を継続します。
/// 出力パスが重なる入力（例: "a.jpg" と "a.jpeg"）は同じタスク内で順に処理し、
/// 最初に変換できたもの以外は `Error::OutputConflict` になります。
pub fn run(config: &BatchConfig) -> Result<Report, Error> {
    let files = traverse(&config.root, config.recursive)
        .map_err(|e| Error::file_access(&config.root, e))?;
    info!("found {} files under {}", files.len(), config.root.display());

    let groups = group_by_output(&files, config.request.dst);
    let results = if config.jobs == 0 {
        convert_all(&groups, config.request)
    } else {
        match rayon::ThreadPoolBuilder::new().num_threads(config.jobs).build() {
            Ok(pool) => pool.install(|| convert_all(&groups, config.request)),
            Err(err) => {
                warn!("falling back to the global thread pool: {err}");
                convert_all(&groups, config.request)
            }
        }
    };

    let mut report = Report::default();
    for (_, path, result) in results {
        report.record(path, result);
    }
    Ok(report)
}

/// 出力パスごとに（走査順の添字, パス）をまとめる
fn group_by_output(files: &[PathBuf], dst: Format) -> Vec<Vec<(usize, &Path)>> {
    let mut groups: Vec<Vec<(usize, &Path)>> = Vec::new();
    let mut by_output: HashMap<PathBuf, usize> = HashMap::new();

    for (index, path) in files.iter().enumerate() {
        let slot = *by_output
            .entry(output_path(path, dst))
            .or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
        groups[slot].push((index, path.as_path()));
    }
    groups
}

type FileResult = (usize, PathBuf, Result<Outcome, Error>);

fn convert_all(groups: &[Vec<(usize, &Path)>], request: ConversionRequest) -> Vec<FileResult> {
    let mut results: Vec<FileResult> = groups
        .par_iter()
        .flat_map_iter(|group| convert_group(group, request))
        .collect();
    results.sort_by_key(|(index, _, _)| *index);
    results
}

// 同じ出力パスを持つファイル群。出力を書いた後は判定のみ行う
fn convert_group(group: &[(usize, &Path)], request: ConversionRequest) -> Vec<FileResult> {
    let mut claimed_by: Option<&Path> = None;
    let mut results = Vec::with_capacity(group.len());

    for &(index, path) in group {
        let result = match claimed_by {
            None => convert_file(path, request),
            Some(winner) => match open_guarded(path, request) {
                Ok(Decision::Skip(reason)) => Ok(Outcome::Skipped(reason)),
                Ok(Decision::Proceed { .. }) => Err(Error::OutputConflict {
                    path: output_path(path, request.dst),
                    claimed_by: winner.to_path_buf(),
                }),
                Err(err) => Err(err),
            },
        };
        if matches!(result, Ok(Outcome::Converted { .. })) {
            claimed_by = Some(path);
        }
        results.push((index, path.to_path_buf(), result));
    }
    results
}
