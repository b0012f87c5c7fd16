//! In-memory collaborators for testing.
//!
//! [`MockKernel`] stands in for a real CAD kernel: it writes objects as a tiny
//! STEP-shaped text file and parses the same shape back, recording every path
//! it was handed. [`RecordingNotifier`] captures everything the transcoder says
//! to the user.

use crate::kernel::{CadKernel, KernelOperation};
use crate::notify::Notifier;
use derive_more::{Display, Error};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

const HEADER: &str = "ISO-10303-21;";
const FOOTER: &str = "END-ISO-10303-21;";

/// A document as the mock kernel sees it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MockDocument {
    /// Taken from the file name the document was opened from.
    pub label: String,
    pub objects: Vec<String>,
}

#[derive(Debug, Display, Error)]
pub enum MockError {
    #[display("mock kernel was told to fail on {_0}")]
    Refused(#[error(not(source))] KernelOperation),
    #[display("not a STEP file: {}", _0.display())]
    Malformed(#[error(not(source))] PathBuf),
    #[display("mock kernel I/O error: {_0}")]
    Io(std::io::Error),
}

/// A kernel call as observed by the mock, with the bytes present at `path`
/// when the call was made (empty for exports).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelCall {
    pub operation: KernelOperation,
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// Records every call; see [`failing_on`](Self::failing_on) to simulate a
/// kernel error.
#[derive(Debug, Default)]
pub struct MockKernel {
    calls: Mutex<Vec<KernelCall>>,
    fail_on: Option<KernelOperation>,
}

impl MockKernel {
    /// Make every call of `operation` fail (after recording it).
    #[must_use]
    pub fn failing_on(mut self, operation: KernelOperation) -> Self {
        self.fail_on = Some(operation);
        self
    }

    /// Snapshot of the calls made so far.
    pub fn calls(&self) -> Vec<KernelCall> {
        lock(&self.calls).clone()
    }

    /// Serialize `objects` the way [`export`](CadKernel::export) would.
    #[must_use]
    pub fn render(label: &str, objects: &[String]) -> Vec<u8> {
        let mut out = format!("{HEADER}\nHEADER;\nFILE_NAME('{label}');\nENDSEC;\nDATA;\n");
        for (index, object) in objects.iter().enumerate() {
            out.push_str(&format!("#{}=PRODUCT('{object}');\n", index + 1));
        }
        out.push_str(&format!("ENDSEC;\n{FOOTER}\n"));
        out.into_bytes()
    }

    fn parse(path: &Path, contents: &[u8]) -> Result<Vec<String>, MockError> {
        let malformed = || MockError::Malformed(path.to_path_buf());
        let text = std::str::from_utf8(contents).map_err(|_| malformed())?;
        if !text.starts_with(HEADER) || !text.trim_end().ends_with(FOOTER) {
            return Err(malformed());
        }
        Ok(text
            .lines()
            .filter_map(|line| line.split_once("=PRODUCT('")?.1.strip_suffix("');"))
            .map(str::to_string)
            .collect())
    }

    fn record(&self, operation: KernelOperation, path: &Path) -> Result<Vec<u8>, MockError> {
        let contents = match operation {
            KernelOperation::Export => Vec::new(),
            _ => std::fs::read(path).map_err(MockError::Io)?,
        };
        lock(&self.calls).push(KernelCall {
            operation,
            path: path.to_path_buf(),
            contents: contents.clone(),
        });
        if self.fail_on == Some(operation) {
            return Err(MockError::Refused(operation));
        }
        Ok(contents)
    }
}

fn label_of(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

impl CadKernel for MockKernel {
    type Document = MockDocument;
    type Object = String;
    type Error = MockError;

    fn open(&self, path: &Path) -> Result<MockDocument, MockError> {
        let contents = self.record(KernelOperation::Open, path)?;
        Ok(MockDocument {
            label: label_of(path),
            objects: Self::parse(path, &contents)?,
        })
    }

    fn insert(&self, path: &Path, document: &mut MockDocument) -> Result<(), MockError> {
        let contents = self.record(KernelOperation::Insert, path)?;
        document.objects.extend(Self::parse(path, &contents)?);
        Ok(())
    }

    fn export(&self, objects: &[String], path: &Path) -> Result<(), MockError> {
        self.record(KernelOperation::Export, path)?;
        std::fs::write(path, Self::render(&label_of(path), objects)).map_err(MockError::Io)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Message,
    Warning,
    Error,
    Alert,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    /// Notices at one level, text only.
    pub fn texts(&self, level: NoticeLevel) -> Vec<String> {
        lock(&self.notices).iter().filter(|n| n.level == level).map(|n| n.text.clone()).collect()
    }

    fn push(&self, level: NoticeLevel, text: &str) {
        lock(&self.notices).push(Notice {
            level,
            text: text.to_string(),
        });
    }
}

impl Notifier for RecordingNotifier {
    fn message(&self, text: &str) {
        self.push(NoticeLevel::Message, text);
    }

    fn warning(&self, text: &str) {
        self.push(NoticeLevel::Warning, text);
    }

    fn error(&self, text: &str) {
        self.push(NoticeLevel::Error, text);
    }

    fn alert(&self, text: &str) {
        self.push(NoticeLevel::Alert, text);
    }
}

// A panicking test must not take every later assertion down with it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
