// ==============================================================================
// validator.rs - Input File Validation
// ==============================================================================
// Description: Validates uploaded spreadsheets (size, type, magic number) and
//              fingerprints them for the run report
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// Security: Allowlist-only file types, magic number verification
// ==============================================================================

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::output::InputFingerprint;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024; // 50 MB

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];
const OLE_MAGIC: [u8; 4] = [0xd0, 0xcf, 0x11, 0xe0];

#[derive(Debug, Clone)]
pub struct ValidatedFile {
    pub original_name: String,
    pub extension: String,
    pub size: u64,
    pub hash_sha256: String,
    pub validated_at: chrono::DateTime<chrono::Utc>,
}

impl ValidatedFile {
    pub fn fingerprint(&self) -> InputFingerprint {
        InputFingerprint {
            file_name: self.original_name.clone(),
            size: self.size,
            hash_sha256: self.hash_sha256.clone(),
        }
    }
}

pub struct FileValidator {
    max_file_size: u64,
    allowed_types: HashMap<&'static str, &'static [u8]>,
}

impl FileValidator {
    pub fn new() -> Self {
        Self::with_max_file_size(DEFAULT_MAX_FILE_SIZE)
    }

    pub fn with_max_file_size(max_file_size: u64) -> Self {
        let mut allowed_types: HashMap<&'static str, &'static [u8]> = HashMap::new();

        // Office Open XML and OpenDocument are zip containers
        allowed_types.insert("xlsx", &ZIP_MAGIC);
        allowed_types.insert("xlsm", &ZIP_MAGIC);
        allowed_types.insert("ods", &ZIP_MAGIC);

        // Legacy Excel (OLE2 compound document)
        allowed_types.insert("xls", &OLE_MAGIC);

        // Plain text, no magic number
        allowed_types.insert("csv", &[]);

        Self {
            max_file_size,
            allowed_types,
        }
    }

    pub fn is_allowed(&self, path: &Path) -> bool {
        self.get_extension(path)
            .map(|ext| self.allowed_types.contains_key(ext.as_str()))
            .unwrap_or(false)
    }

    pub fn validate_upload(&self, file_path: &Path) -> Result<ValidatedFile> {
        let file_name = file_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid file path"))?
            .to_string_lossy()
            .to_string();

        info!("Validating file: {}", file_name);

        // 1. Size check
        let metadata = std::fs::metadata(file_path)
            .with_context(|| format!("Failed to get file metadata for {}", file_name))?;
        let size = metadata.len();

        if size > self.max_file_size {
            anyhow::bail!(
                "File too large: {} ({} bytes, max: {} bytes)",
                file_name,
                size,
                self.max_file_size
            );
        }
        debug!("Size check passed: {} bytes", size);

        // 2. Extension check (allowlist)
        let ext = self.get_extension(file_path)?;
        let expected_magic = match self.allowed_types.get(ext.as_str()) {
            Some(magic) => *magic,
            None => anyhow::bail!("Invalid file type: .{} ({})", ext, file_name),
        };
        debug!("Extension check passed: {}", ext);

        // 3. Magic number verification
        if !expected_magic.is_empty() {
            let actual_magic = self.read_magic_number(file_path, expected_magic.len())?;
            if !self.verify_magic_number(expected_magic, &actual_magic) {
                anyhow::bail!("Magic number mismatch for .{} file: {}", ext, file_name);
            }
            debug!("Magic number check passed");
        }

        // 4. Compute SHA-256 hash
        let hash = self.compute_sha256(file_path)?;
        debug!("SHA-256: {}", hash);

        Ok(ValidatedFile {
            original_name: file_name,
            extension: ext,
            size,
            hash_sha256: hash,
            validated_at: chrono::Utc::now(),
        })
    }

    fn get_extension(&self, path: &Path) -> Result<String> {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .ok_or_else(|| anyhow::anyhow!("No file extension found: {:?}", path))
    }

    fn read_magic_number(&self, path: &Path, len: usize) -> Result<Vec<u8>> {
        let file = File::open(path)?;
        let mut buffer = Vec::with_capacity(len);
        file.take(len as u64).read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    fn verify_magic_number(&self, expected: &[u8], actual: &[u8]) -> bool {
        expected.len() <= actual.len()
            && expected.iter().zip(actual.iter()).all(|(e, a)| e == a)
    }

    fn compute_sha256(&self, path: &Path) -> Result<String> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; 8192];

        loop {
            let n = file.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn temp_file(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_get_extension() {
        let validator = FileValidator::new();

        assert_eq!(validator.get_extension(Path::new("73_panel.XLSX")).unwrap(), "xlsx");
        assert_eq!(validator.get_extension(Path::new("rs.totales.csv")).unwrap(), "csv");
        assert!(validator.get_extension(Path::new("README")).is_err());
    }

    #[test]
    fn test_is_allowed() {
        let validator = FileValidator::new();

        assert!(validator.is_allowed(Path::new("a.xlsx")));
        assert!(validator.is_allowed(Path::new("a.xls")));
        assert!(validator.is_allowed(Path::new("a.csv")));
        assert!(!validator.is_allowed(Path::new("a.txt")));
        assert!(!validator.is_allowed(Path::new("a")));
    }

    #[test]
    fn test_validate_csv() {
        let validator = FileValidator::new();
        let file = temp_file(".csv", b"dbSNP ID,Variant Frequency\nrs1,0.5\n");

        let validated = validator.validate_upload(file.path()).unwrap();
        assert_eq!(validated.extension, "csv");
        assert_eq!(validated.size, 35);
        assert_eq!(validated.hash_sha256.len(), 64);
        assert_eq!(validated.fingerprint().hash_sha256, validated.hash_sha256);
    }

    #[test]
    fn test_hash_is_sha256() {
        let validator = FileValidator::new();
        let file = temp_file(".csv", b"abc");

        let validated = validator.validate_upload(file.path()).unwrap();
        assert_eq!(
            validated.hash_sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_magic_number_mismatch() {
        let validator = FileValidator::new();
        let file = temp_file(".xlsx", b"not a zip archive");

        let err = validator.validate_upload(file.path()).unwrap_err();
        assert!(err.to_string().contains("Magic number mismatch"));
    }

    #[test]
    fn test_truncated_workbook() {
        let validator = FileValidator::new();
        let file = temp_file(".xls", &[0xd0, 0xcf]);

        assert!(validator.validate_upload(file.path()).is_err());
    }

    #[test]
    fn test_zip_magic_accepted() {
        let validator = FileValidator::new();
        let file = temp_file(".xlsx", &[0x50, 0x4b, 0x03, 0x04, 0x14, 0x00]);

        let validated = validator.validate_upload(file.path()).unwrap();
        assert_eq!(validated.extension, "xlsx");
    }

    #[test]
    fn test_rejects_disallowed_type() {
        let validator = FileValidator::new();
        let file = temp_file(".txt", b"rs1\t1\t100\tAA\n");

        let err = validator.validate_upload(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid file type"));
    }

    #[test]
    fn test_rejects_oversized_file() {
        let validator = FileValidator::with_max_file_size(4);
        let file = temp_file(".csv", b"too long");

        let err = validator.validate_upload(file.path()).unwrap_err();
        assert!(err.to_string().contains("File too large"));
    }
}
