//! 크기 기반 로그 파일 회전
//!
//! 현재 파일이 최대 크기를 넘기 직전에 `<이름>-<시각>.log`로 이름을 바꾸고
//! 같은 경로에 새 파일을 엽니다. 압축 옵션이 켜져 있으면 회전된 파일을
//! 백그라운드 스레드에서 gzip으로 압축하고 원본을 삭제합니다.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use flate2::write::GzEncoder;
use flate2::Compression;

const MEGABYTE: u64 = 1024 * 1024;

/// 백업 파일 이름에 붙는 시각 형식 (로컬 시간)
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// 크기 제한이 있는 append 전용 로그 파일
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    compress: bool,
    file: File,
    written: u64,
}

impl RotatingFile {
    /// 로그 파일을 열거나 생성합니다. 기존 파일 크기부터 이어서 계산합니다.
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: u64, compress: bool) -> io::Result<Self> {
        Self::with_max_bytes(path, max_size_mb.max(1) * MEGABYTE, compress)
    }

    /// 바이트 단위 제한으로 파일을 엽니다.
    pub fn with_max_bytes<P: AsRef<Path>>(path: P, max_bytes: u64, compress: bool) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            compress,
            file,
            written,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 현재 파일에 기록된 바이트 수
    pub fn written(&self) -> u64 {
        self.written
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let rotated = backup_name(&self.path, Local::now());
        fs::rename(&self.path, &rotated)?;
        self.file = open_append(&self.path)?;
        self.written = 0;

        if self.compress {
            std::thread::spawn(move || {
                // 로거 내부이므로 log 매크로 대신 stderr 사용
                if let Err(e) = compress_file(&rotated) {
                    eprintln!("❌ 로그 압축 실패: {} ({})", rotated.display(), e);
                }
            });
        }
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// 회전된 파일 경로: `app.log` → `app-2024-05-01T10-00-00.000.log`
pub fn backup_name(path: &Path, now: DateTime<Local>) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let timestamp = now.format(BACKUP_TIME_FORMAT);
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, timestamp, ext.to_string_lossy()),
        None => format!("{}-{}", stem, timestamp),
    };
    path.with_file_name(name)
}

/// 파일을 `<경로>.gz`로 압축하고 원본을 삭제합니다.
pub fn compress_file(path: &Path) -> io::Result<PathBuf> {
    let mut target = path.as_os_str().to_owned();
    target.push(".gz");
    let target = PathBuf::from(target);

    let mut reader = BufReader::new(File::open(path)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(&target)?), Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;

    fs::remove_file(path)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_backup_name() {
        let now = Local.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let path = Path::new("/var/log/orders.log");

        assert_eq!(
            backup_name(path, now),
            PathBuf::from("/var/log/orders-2024-05-01T10-00-00.000.log")
        );
    }

    #[test]
    fn test_rotates_when_limit_exceeded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::with_max_bytes(&path, 16, false).unwrap();

        file.write_all(b"0123456789\n").unwrap();
        assert_eq!(file.written(), 11);

        // 11 + 11 > 16 이므로 기록 전에 회전
        file.write_all(b"abcdefghij\n").unwrap();
        assert_eq!(file.written(), 11);

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();

        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("app-"));
        assert!(names[0].ends_with(".log"));
        assert_eq!(names[1], "app.log");
        assert_eq!(fs::read_to_string(&path).unwrap(), "abcdefghij\n");
    }

    #[test]
    fn test_oversized_single_write_goes_to_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::with_max_bytes(&path, 4, false).unwrap();

        file.write_all(b"longer than limit\n").unwrap();

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_reopen_continues_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "existing\n").unwrap();

        let file = RotatingFile::open(&path, 1, true).unwrap();
        assert_eq!(file.written(), 9);
        assert_eq!(file.path(), path.as_path());
    }

    #[test]
    fn test_compress_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app-old.log");
        fs::write(&path, "line 1\nline 2\n").unwrap();

        let target = compress_file(&path).unwrap();

        assert!(!path.exists());
        assert_eq!(target, dir.path().join("app-old.log.gz"));

        let mut decoded = String::new();
        GzDecoder::new(File::open(&target).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "line 1\nline 2\n");
    }
}
