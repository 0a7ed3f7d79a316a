//! Spreadsheet template helpers.
//!
//! Two bundled workbooks can be copied out of a template directory, and one
//! user-provided workbook can be taken in for the session and saved back out
//! under a fixed name.

use crate::error::{Result, SnapBoxError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Name an uploaded workbook is saved under.
pub const CUSTOM_TEMPLATE_NAME: &str = "custom.xlsx";

/// Bundled workbooks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Ledger workbook.
    Ledger,
    /// Expense request form.
    ExpenseRequest,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 2] = [TemplateKind::Ledger, TemplateKind::ExpenseRequest];

    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::Ledger => "sisimna.xlsx",
            TemplateKind::ExpenseRequest => "request.xlsx",
        }
    }
}

impl FromStr for TemplateKind {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ledger" | "sisimna" | "sisimna.xlsx" => Ok(Self::Ledger),
            "expense" | "expense_request" | "request" | "request.xlsx" => Ok(Self::ExpenseRequest),
            _ => Err(()),
        }
    }
}

/// Directory holding the bundled workbooks.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, kind: TemplateKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    /// Every kind with whether its file is present.
    pub fn available(&self) -> Vec<(TemplateKind, bool)> {
        TemplateKind::ALL
            .iter()
            .map(|&k| (k, self.path(k).is_file()))
            .collect()
    }

    /// Copies the bundled `kind` into `dest_dir`, keeping its file name.
    pub fn download(&self, kind: TemplateKind, dest_dir: &Path) -> Result<PathBuf> {
        let src = self.path(kind);
        if !src.is_file() {
            return Err(SnapBoxError::TemplateMissing(src));
        }
        fs::create_dir_all(dest_dir)?;
        let dest = dest_dir.join(kind.file_name());
        fs::copy(&src, &dest)?;
        info!(?dest, "template downloaded");
        Ok(dest)
    }
}

/// A user-provided workbook held in memory, renamed to [`CUSTOM_TEMPLATE_NAME`].
#[derive(Debug, Clone)]
pub struct UploadedTemplate {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedTemplate {
    /// Accepts only files whose name ends in `.xlsx` (lowercase, as written).
    pub fn new(original_name: &str, bytes: Vec<u8>) -> Result<Self> {
        if !original_name.ends_with(".xlsx") {
            return Err(SnapBoxError::NotXlsx(original_name.to_string()));
        }
        Ok(Self {
            name: CUSTOM_TEMPLATE_NAME.to_string(),
            bytes,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let original = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        // reject before reading
        if !original.ends_with(".xlsx") {
            return Err(SnapBoxError::NotXlsx(original));
        }
        Self::new(&original, fs::read(path)?)
    }

    /// Writes the workbook into `dir` and returns its path.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let dest = dir.join(&self.name);
        fs::write(&dest, &self.bytes)?;
        info!(?dest, "uploaded template saved");
        Ok(dest)
    }
}

/// Saves the session's uploaded workbook, if any.
pub fn save_uploaded(upload: Option<&UploadedTemplate>, dir: &Path) -> Result<PathBuf> {
    upload.ok_or(SnapBoxError::NoUploadedTemplate)?.save_to(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_from_aliases() {
        assert_eq!("ledger".parse(), Ok(TemplateKind::Ledger));
        assert_eq!("SISIMNA".parse(), Ok(TemplateKind::Ledger));
        assert_eq!("request".parse(), Ok(TemplateKind::ExpenseRequest));
        assert!("invoice".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn upload_is_renamed_and_checked() {
        let t = UploadedTemplate::new("Budget 2024.xlsx", vec![1, 2, 3]).expect("xlsx");
        assert_eq!(t.name, CUSTOM_TEMPLATE_NAME);
        assert!(matches!(
            UploadedTemplate::new("budget.xls", vec![]),
            Err(SnapBoxError::NotXlsx(_))
        ));
    }

    #[test]
    fn upload_extension_is_case_sensitive() {
        assert!(matches!(
            UploadedTemplate::new("BUDGET.XLSX", vec![1]),
            Err(SnapBoxError::NotXlsx(name)) if name == "BUDGET.XLSX"
        ));
    }

    #[test]
    fn nothing_uploaded_is_an_error() {
        let r = save_uploaded(None, Path::new("unused"));
        assert!(matches!(r, Err(SnapBoxError::NoUploadedTemplate)));
    }
}
