//! Low-stock report download and alert notification

use super::ApiClient;
use crate::error::{ApiError, CoreError, ValidationError};
use chrono::NaiveDate;
use reqwest::Method;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const LOW_STOCK_REPORT_PATH: &str = "reporte/productos-inventario-bajo";
pub const LOW_STOCK_ALERT_PATH: &str = "productos/reportar-inventario";

#[derive(Serialize)]
struct AlertRequest<'a> {
    mensaje: &'a str,
}

impl ApiClient {
    /// Download the low-stock PDF generated by the server
    pub async fn low_stock_report(&self) -> Result<Vec<u8>, ApiError> {
        let bytes = self
            .call::<()>(Method::GET, LOW_STOCK_REPORT_PATH, None)
            .await?;
        if bytes.is_empty() {
            return Err(ApiError::MalformedPayload {
                endpoint: format!("GET {}", LOW_STOCK_REPORT_PATH),
                message: "empty report".to_string(),
            });
        }
        Ok(bytes)
    }

    /// Send a free-text low-stock alert
    pub async fn report_low_stock(&self, message: &str) -> Result<(), ApiError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ValidationError::MissingField { field: "Message" }.into());
        }
        self.call(
            Method::POST,
            LOW_STOCK_ALERT_PATH,
            Some(&AlertRequest { mensaje: message }),
        )
        .await?;
        info!("Low-stock alert sent");
        Ok(())
    }
}

/// `reporte-inventario-bajo-YYYY-MM-DD.pdf`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("reporte-inventario-bajo-{}.pdf", date.format("%Y-%m-%d"))
}

/// Write a downloaded report into `dir` under today's file name
pub fn save_report(bytes: &[u8], dir: &Path) -> Result<PathBuf, CoreError> {
    let path = dir.join(report_file_name(chrono::Local::now().date_naive()));
    std::fs::create_dir_all(dir).map_err(|source| CoreError::FileWrite {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::write(&path, bytes).map_err(|source| CoreError::FileWrite {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "Report saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(
            report_file_name(date),
            "reporte-inventario-bajo-2026-03-09.pdf"
        );
    }

    #[test]
    fn test_save_report_writes_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = save_report(b"%PDF-1.4", dir.path()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("reporte-inventario-bajo-"));
    }
}
