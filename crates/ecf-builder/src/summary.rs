//! Commercial-approval (ACECF) document builder.
//!
//! A much flatter shape than the primary document: one
//! `DetalleAprobacionComercial` object wrapped in the `ACECF` envelope with
//! two namespace-declaration metadata entries the external schema expects.

use chrono::Local;
use ecf_model::Row;
use serde_json::Value;
use tracing::warn;

use crate::document::ObjectBuilder;
use crate::numeric::{format_amount, format_state};
use crate::primary::TIMESTAMP_FORMAT;

const XMLNS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XMLNS_XSD: &str = "http://www.w3.org/2001/XMLSchema";

/// Build one ACECF document from a row.
///
/// Amounts are de-trailing-zero strings, the approval state an integer
/// string, and the approval timestamp defaults to now.
pub fn build_acecf(row: &Row) -> Value {
    let mut detail = ObjectBuilder::new();
    detail.add_cell(
        "Version",
        row.get("Version").or_else(|| Some("1.0".into())),
    );
    detail.add_cell("RNCEmisor", row.get("RNCEmisor"));
    detail.add_cell("eNCF", row.get("eNCF").or_else(|| row.get("ENCF")));
    detail.add_cell("FechaEmision", row.get("FechaEmision"));
    detail.add_if(
        "MontoTotal",
        row.get("MontoTotal").as_ref().and_then(format_amount),
    );
    detail.add_cell("RNCComprador", row.get("RNCComprador"));
    detail.add_if("Estado", row.get("Estado").as_ref().and_then(format_state));
    // Present only on rejections (Estado=2); omitted otherwise.
    detail.add_cell("DetalleMotivoRechazo", row.get("DetalleMotivoRechazo"));

    let approved_at = row
        .get_str("FechaHoraAprobacionComercial")
        .unwrap_or_else(|| Local::now().format(TIMESTAMP_FORMAT).to_string());
    detail.set("FechaHoraAprobacionComercial", approved_at);

    let mut envelope = ObjectBuilder::new();
    envelope.set("DetalleAprobacionComercial", detail.build());
    envelope.set("_xmlns:xsi", XMLNS_XSI);
    envelope.set("_xmlns:xsd", XMLNS_XSD);

    let mut root = ObjectBuilder::new();
    root.set("ACECF", envelope.build());
    root.build()
}

/// Build ACECF documents for a batch of rows with per-row isolation: a
/// row that cannot produce a document is logged and skipped, siblings
/// proceed independently.
pub fn build_acecf_batch(rows: &[Row]) -> Vec<Value> {
    let mut documents = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if row.is_empty() {
            warn!(row = index + 1, "skipping empty approval row");
            continue;
        }
        documents.push(build_acecf(row));
    }
    documents
}
