//! Spreadsheet upload page.
//!
//! `Idle → FileSelected → Uploading → {Succeeded, Failed}`. A failed
//! upload keeps the file so it can be retried; a successful one clears
//! it. Files that do not look like Excel spreadsheets are rejected before
//! any request is made.

use std::path::Path;

use metrovia_client::upload::{file_name, is_spreadsheet_path};
use metrovia_client::{ClientError, IncidenciasApi, SelectedFile};
use metrovia_incidencia_models::UploadResponse;

/// Fallback shown when a failed upload carries no server detail.
pub const ERROR_GENERICO: &str = "Error al subir el archivo";

/// Where the page is in the upload lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// Nothing selected.
    Idle,
    /// A spreadsheet is selected and ready to send.
    FileSelected,
    /// The upload request is in flight.
    Uploading,
    /// The last upload succeeded; the selection was cleared.
    Succeeded,
    /// The last upload failed; the selection was kept.
    Failed,
}

/// The message shown after an upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Whether the upload succeeded.
    pub success: bool,
    /// Display text.
    pub message: String,
}

/// A selection refused by the client-side spreadsheet check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Por favor, selecciona un archivo Excel válido (.xlsx o .xls)")]
pub struct RejectedFile {
    /// Name of the refused file.
    pub name: String,
}

/// Runs the spreadsheet check on `path` without reading the file.
///
/// # Errors
///
/// Returns [`RejectedFile`] if neither the name nor the guessed MIME type
/// indicates a spreadsheet.
pub fn comprobar_ruta(path: &Path) -> Result<(), RejectedFile> {
    if is_spreadsheet_path(path) {
        Ok(())
    } else {
        Err(RejectedFile {
            name: file_name(path),
        })
    }
}

/// State of the upload page.
#[derive(Debug)]
pub struct UploadPage {
    file: Option<SelectedFile>,
    phase: UploadPhase,
    outcome: Option<UploadOutcome>,
}

impl Default for UploadPage {
    fn default() -> Self {
        Self {
            file: None,
            phase: UploadPhase::Idle,
            outcome: None,
        }
    }
}

impl UploadPage {
    /// Creates an idle page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `file` for upload.
    ///
    /// # Errors
    ///
    /// Returns [`RejectedFile`] if neither the name nor the MIME type
    /// indicates a spreadsheet. The current selection is left as it was.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), RejectedFile> {
        if !file.is_spreadsheet() {
            log::warn!("Rejected non-spreadsheet file {}", file.name);
            return Err(RejectedFile { name: file.name });
        }

        log::debug!("Selected {} ({:.2} MB)", file.name, file.size_mb());
        self.file = Some(file);
        self.phase = UploadPhase::FileSelected;
        self.outcome = None;
        Ok(())
    }

    /// Drops the selection and any previous message.
    pub fn clear_selection(&mut self) {
        self.file = None;
        self.phase = UploadPhase::Idle;
        self.outcome = None;
    }

    /// The selected file, if any.
    #[must_use]
    pub const fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    #[must_use]
    pub const fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// Message from the last finished attempt.
    #[must_use]
    pub const fn outcome(&self) -> Option<&UploadOutcome> {
        self.outcome.as_ref()
    }

    /// Returns `true` if a file is selected and no upload is in flight.
    #[must_use]
    pub fn can_upload(&self) -> bool {
        self.file.is_some() && self.phase != UploadPhase::Uploading
    }

    /// Marks the upload as started and returns the file to send, or `None`
    /// when there is nothing to upload.
    pub fn begin_upload(&mut self) -> Option<SelectedFile> {
        if !self.can_upload() {
            return None;
        }
        self.phase = UploadPhase::Uploading;
        self.outcome = None;
        self.file.clone()
    }

    /// Applies the result of the request started by
    /// [`begin_upload`](Self::begin_upload).
    pub fn finish_upload(&mut self, result: Result<UploadResponse, ClientError>) -> &UploadOutcome {
        let outcome = match result {
            Ok(response) => {
                log::info!(
                    "Upload finished: {} rows imported",
                    response.incidencias_importadas
                );
                self.file = None;
                self.phase = UploadPhase::Succeeded;
                UploadOutcome {
                    success: true,
                    message: mensaje_exito(&response),
                }
            }
            Err(e) => {
                log::error!("Upload failed: {e}");
                self.phase = UploadPhase::Failed;
                UploadOutcome {
                    success: false,
                    message: mensaje_error(&e),
                }
            }
        };
        self.outcome.insert(outcome)
    }

    /// Uploads the selected file through `api`.
    ///
    /// Returns `None` without touching the network when no file is
    /// selected or an upload is already running.
    pub async fn upload(&mut self, api: &dyn IncidenciasApi) -> Option<&UploadOutcome> {
        let file = self.begin_upload()?;
        let result = api.upload_file(&file).await;
        Some(self.finish_upload(result))
    }
}

/// `✅ {message} - {n} incidencias importadas`
#[must_use]
pub fn mensaje_exito(response: &UploadResponse) -> String {
    format!(
        "✅ {} - {} incidencias importadas",
        response.message, response.incidencias_importadas
    )
}

/// `❌ Error: {detail}`, or the generic text when the server sent none.
#[must_use]
pub fn mensaje_error(error: &ClientError) -> String {
    format!("❌ Error: {}", error.detail().unwrap_or(ERROR_GENERICO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{Call, FakeApi};

    fn xlsx() -> SelectedFile {
        SelectedFile::new("data.xlsx", None, b"PK\x03\x04".to_vec())
    }

    #[test]
    fn rejects_non_spreadsheet_without_changing_state() {
        let mut page = UploadPage::new();
        let err = page
            .select_file(SelectedFile::new("report.pdf", Some("application/pdf".into()), vec![1]))
            .unwrap_err();

        assert_eq!(err.name, "report.pdf");
        assert_eq!(
            err.to_string(),
            "Por favor, selecciona un archivo Excel válido (.xlsx o .xls)"
        );
        assert_eq!(page.phase(), UploadPhase::Idle);
        assert!(!page.can_upload());
    }

    #[test]
    fn path_check_runs_before_reading() {
        let err = comprobar_ruta(Path::new("/nonexistent/report.pdf")).unwrap_err();
        assert_eq!(err.name, "report.pdf");
        assert!(comprobar_ruta(Path::new("/nonexistent/DATA.XLSX")).is_ok());
        assert!(comprobar_ruta(Path::new("datos.xls")).is_ok());
    }

    #[tokio::test]
    async fn rejected_file_issues_no_request() {
        let api = FakeApi::default();
        let mut page = UploadPage::new();
        let _ = page.select_file(SelectedFile::new("report.pdf", None, vec![1]));

        assert!(page.upload(&api).await.is_none());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn successful_upload_clears_file() {
        let api = FakeApi {
            upload: Some(UploadResponse {
                message: "Archivo procesado".to_string(),
                incidencias_importadas: 128,
            }),
            ..FakeApi::default()
        };
        let mut page = UploadPage::new();
        page.select_file(xlsx()).unwrap();
        assert_eq!(page.phase(), UploadPhase::FileSelected);

        let outcome = page.upload(&api).await.unwrap().clone();
        assert!(outcome.success);
        assert_eq!(
            outcome.message,
            "✅ Archivo procesado - 128 incidencias importadas"
        );
        assert_eq!(api.calls(), vec![Call::Upload("data.xlsx".to_string())]);
        assert_eq!(page.phase(), UploadPhase::Succeeded);
        assert!(page.file().is_none());
    }

    #[tokio::test]
    async fn failed_upload_keeps_file_for_retry() {
        let api = FakeApi {
            upload_detail: Some("Solo se permiten archivos Excel".to_string()),
            ..FakeApi::default()
        };
        let mut page = UploadPage::new();
        page.select_file(xlsx()).unwrap();

        let outcome = page.upload(&api).await.unwrap().clone();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "❌ Error: Solo se permiten archivos Excel");
        assert_eq!(page.phase(), UploadPhase::Failed);
        assert!(page.can_upload());

        page.upload(&api).await.unwrap();
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn failure_without_detail_uses_generic_text() {
        let api = FakeApi::default();
        let mut page = UploadPage::new();
        page.select_file(xlsx()).unwrap();

        let outcome = page.upload(&api).await.unwrap();
        assert_eq!(outcome.message, "❌ Error: Error al subir el archivo");
    }

    #[test]
    fn in_flight_upload_cannot_start_twice() {
        let mut page = UploadPage::new();
        page.select_file(xlsx()).unwrap();

        assert!(page.begin_upload().is_some());
        assert_eq!(page.phase(), UploadPhase::Uploading);
        assert!(page.begin_upload().is_none());
    }

    #[test]
    fn clearing_returns_to_idle() {
        let mut page = UploadPage::new();
        page.select_file(xlsx()).unwrap();
        page.clear_selection();
        assert_eq!(page.phase(), UploadPhase::Idle);
        assert!(page.file().is_none());
    }
}
