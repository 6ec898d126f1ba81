//! JSON-lines sink for generated records.
//!
//! Appends one object per line to a log file, optionally mirrors every line to
//! stdout, and rotates the file by size.

use crate::core::config::{DurationFormat, OutputConfig};
use crate::core::event::{EventRecord, FieldValue};
use crate::core::traits::RecordSink;
use chrono::SecondsFormat;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Thread-safe sink shared by every generator task.
pub struct JsonlSink {
    duration_format: DurationFormat,
    state: Mutex<SinkState>,
}

struct SinkState {
    path: PathBuf,
    /// `None` after a failed rotation; reopened on the next write.
    file: Option<File>,
    current_size: u64,
    target_size_bytes: Option<u64>,
    console: Option<Box<dyn Write + Send>>,
}

impl JsonlSink {
    /// Opens (or creates) the log file, creating parent directories as needed.
    pub fn new(
        path: impl Into<PathBuf>,
        console: bool,
        target_size_bytes: Option<u64>,
        duration_format: DurationFormat,
    ) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = open_file(&path)?;
        let current_size = file.metadata()?.len();
        let target_size_bytes = target_size_bytes.filter(|bytes| *bytes > 0);
        let console: Option<Box<dyn Write + Send>> = if console {
            Some(Box::new(io::stdout()))
        } else {
            None
        };
        Ok(Self {
            duration_format,
            state: Mutex::new(SinkState {
                path,
                file: Some(file),
                current_size,
                target_size_bytes,
                console,
            }),
        })
    }

    pub fn from_config(config: &OutputConfig) -> io::Result<Self> {
        Self::new(
            &config.path,
            config.console,
            config
                .target_size_mb
                .map(|size| size.saturating_mul(1024 * 1024)),
            config.duration_format,
        )
    }

    /// Replaces the console destination.
    pub fn with_console_writer(self, writer: Box<dyn Write + Send>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.console = Some(writer);
        }
        self
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, SinkState>> {
        self.state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "jsonl sink lock poisoned"))
    }
}

impl RecordSink for JsonlSink {
    fn emit(&self, record: &EventRecord) -> io::Result<()> {
        let line = encode_record(record, self.duration_format)?;
        let mut state = self.lock()?;
        let size = line.len() as u64;

        state.file()?;
        if let Some(target) = state.target_size_bytes {
            if state.current_size > 0 && state.current_size + size > target {
                state.rotate()?;
            }
        }

        state.file()?.write_all(&line)?;
        state.current_size += size;

        // The file is the record of truth; a broken console only loses the mirror.
        let console_result = match state.console.as_mut() {
            Some(console) => console.write_all(&line).and_then(|()| console.flush()),
            None => Ok(()),
        };
        if let Err(err) = console_result {
            warn!(error = %err, "console output failed, disabling console mirror");
            state.console = None;
        }
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        let mut state = self.lock()?;
        state.file()?.flush()?;
        let console_result = match state.console.as_mut() {
            Some(console) => console.flush(),
            None => Ok(()),
        };
        if let Err(err) = console_result {
            warn!(error = %err, "console flush failed, disabling console mirror");
            state.console = None;
        }
        Ok(())
    }
}

impl SinkState {
    /// Returns the open log file, reopening the configured path if needed.
    fn file(&mut self) -> io::Result<&mut File> {
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                let file = open_file(&self.path)?;
                self.current_size = file.metadata()?.len();
                file
            }
        };
        Ok(self.file.insert(file))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file = None;
        self.current_size = 0;
        match fs::rename(&self.path, next_rotated_path(&self.path)) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        self.file()?;
        Ok(())
    }
}

/// Encodes a record as a single JSON line (trailing newline included).
///
/// Keys come out as `level`, `ts`, `msg`, then the record fields in order.
pub fn encode_record(record: &EventRecord, duration_format: DurationFormat) -> io::Result<Vec<u8>> {
    let mut buffer = serde_json::to_vec(&EncodedRecord {
        record,
        duration_format,
    })
    .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    buffer.push(b'\n');
    Ok(buffer)
}

struct EncodedRecord<'a> {
    record: &'a EventRecord,
    duration_format: DurationFormat,
}

impl Serialize for EncodedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = self.record;
        let mut map = serializer.serialize_map(Some(3 + record.fields.len()))?;
        map.serialize_entry("level", record.level.as_str())?;
        map.serialize_entry(
            "ts",
            &record.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
        )?;
        map.serialize_entry("msg", &record.message)?;
        for (name, value) in &record.fields {
            map.serialize_entry(
                name,
                &EncodedField {
                    value,
                    duration_format: self.duration_format,
                },
            )?;
        }
        map.end()
    }
}

struct EncodedField<'a> {
    value: &'a FieldValue,
    duration_format: DurationFormat,
}

impl Serialize for EncodedField<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            FieldValue::Str(value) => serializer.serialize_str(value),
            FieldValue::Int(value) => serializer.serialize_i64(*value),
            FieldValue::Duration(value) => match self.duration_format {
                DurationFormat::Seconds => serializer.serialize_f64(value.as_secs_f64()),
                DurationFormat::Nanos => {
                    serializer.serialize_u64(u64::try_from(value.as_nanos()).unwrap_or(u64::MAX))
                }
                DurationFormat::String => serializer.collect_str(&format_args!("{value:?}")),
            },
            FieldValue::TraceId(value) => serializer.collect_str(&value.hyphenated()),
            FieldValue::Error(value) => serializer.collect_str(value),
        }
    }
}

fn open_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn next_rotated_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "log".to_string());
    let ext = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let mut index = 1_u64;
    loop {
        let candidate = path.with_file_name(format!("{stem}.{index:06}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        index += 1;
    }
}
