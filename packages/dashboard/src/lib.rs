#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Page state for the Metrovía incident dashboard.
//!
//! Each page is a plain state machine driven through an
//! [`IncidenciasApi`](metrovia_client::IncidenciasApi) implementation:
//!
//! * [`upload::UploadPage`]: spreadsheet selection and upload.
//! * [`consultas::ConsultasPage`]: filters, search, capped result table and
//!   CSV export.
//! * [`reportes::ReportesPage`]: daily aggregate and yearly trend, with
//!   request fencing so a stale response never overwrites fresher data.
//!
//! Rendering lives in the binary; this crate only exposes display-ready
//! values ([`charts`], table rows, messages).

pub mod charts;
pub mod consultas;
pub mod export;
pub mod fecha;
pub mod fence;
pub mod reportes;
pub mod upload;

#[cfg(test)]
mod fake;
