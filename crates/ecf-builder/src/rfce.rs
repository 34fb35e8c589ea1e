//! Consumer-invoice summary (RFCE) derivation.
//!
//! A type-32 ECF under the 250,000 threshold is delivered through the
//! summary endpoint, which accepts a reduced projection of the header with
//! its own field allow-lists, its own totals order, and numeric fields as
//! native integers rather than strings. The divergence from the primary
//! format is part of the external schema and is preserved here verbatim.

use rand::Rng;
use serde_json::Value;
use tracing::warn;

use crate::document::ObjectBuilder;
use crate::numeric::{value_to_amount_int, value_to_int};
use crate::primary::TRANSPORT_THRESHOLD;

const ID_DOC_STRING_FIELDS: [&str; 2] = ["eNCF", "TipoIngresos"];
const ISSUER_FIELDS: [&str; 3] = ["RNCEmisor", "RazonSocialEmisor", "FechaEmision"];
const BUYER_FIELDS: [&str; 2] = ["RNCComprador", "RazonSocialComprador"];
const GRAVADO_FIELDS: [&str; 4] = [
    "MontoGravadoTotal",
    "MontoGravadoI1",
    "MontoGravadoI2",
    "MontoGravadoI3",
];
const ITBIS_FIELDS: [&str; 4] = ["TotalITBIS", "TotalITBIS1", "TotalITBIS2", "TotalITBIS3"];

const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const TOKEN_LENGTH: usize = 6;

/// Whether a built ECF document routes through the summary endpoint:
/// type 32 with a grand total under 250,000.
///
/// A missing grand total counts as zero; an unparseable one fails closed
/// to "not eligible" with a diagnostic, matching the delivery behavior the
/// remote service was validated against.
pub fn is_consumer_summary(ecf: &Value) -> bool {
    let header = &ecf["ECF"]["Encabezado"];
    if value_to_int(&header["IdDoc"]["TipoeCF"]) != 32 {
        return false;
    }
    let total = &header["Totales"]["MontoTotal"];
    let amount = match total {
        Value::Null => 0.0,
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => match s.trim().replace(',', "").parse::<f64>() {
            Ok(amount) => amount,
            Err(_) => {
                warn!(value = %s, "unparseable MontoTotal; not routing through summary endpoint");
                return false;
            }
        },
        _ => return false,
    };
    amount < TRANSPORT_THRESHOLD
}

/// Derive the RFCE summary variant from an already-built primary document.
///
/// Everything outside the allow-lists is dropped, including the line items
/// and the signature timestamp, which the summary schema rejects.
pub fn ecf_to_rfce(ecf: &Value) -> Value {
    let source_header = &ecf["ECF"]["Encabezado"];

    let mut header = ObjectBuilder::new();
    header.set(
        "Version",
        source_header
            .get("Version")
            .cloned()
            .unwrap_or_else(|| Value::from("1.0")),
    );
    header.set("IdDoc", project_id_doc(&source_header["IdDoc"]));
    header.set("Emisor", project_allowed(&source_header["Emisor"], &ISSUER_FIELDS));

    if let Some(buyer) = project_buyer(&source_header["Comprador"]) {
        header.set("Comprador", buyer);
    }

    header.set("Totales", project_totals(&source_header["Totales"]));
    header.set("CodigoSeguridadeCF", security_code(source_header));

    let mut rfce = ObjectBuilder::new();
    rfce.set("Encabezado", header.build());
    let mut root = ObjectBuilder::new();
    root.set("RFCE", rfce.build());
    root.build()
}

/// Reduced IdDoc: type and payment codes as integers; the gravado
/// indicator and sequence expiration are dropped.
fn project_id_doc(source: &Value) -> Value {
    let mut id_doc = ObjectBuilder::new();
    if let Some(code) = source.get("TipoeCF") {
        id_doc.set("TipoeCF", value_to_int(code));
    }
    for field in ID_DOC_STRING_FIELDS {
        if let Some(value) = source.get(field) {
            id_doc.set(field, value.clone());
        }
    }
    if let Some(payment) = source.get("TipoPago") {
        id_doc.set("TipoPago", value_to_int(payment));
    }
    // eNCF must precede TipoIngresos per the source order.
    id_doc.build()
}

fn project_allowed(source: &Value, fields: &[&str]) -> Value {
    let mut projected = ObjectBuilder::new();
    for field in fields {
        if let Some(value) = source.get(field) {
            projected.set(field, value.clone());
        }
    }
    projected.build()
}

fn project_buyer(source: &Value) -> Option<Value> {
    if source.as_object().is_none_or(serde_json::Map::is_empty) {
        return None;
    }
    let mut buyer = ObjectBuilder::new();
    for field in BUYER_FIELDS {
        if let Some(value) = source.get(field) {
            buyer.set(field, value.clone());
        }
    }
    buyer.build_nonempty()
}

/// Totals rebuilt in the summary endpoint's fixed order, every amount a
/// native integer: gravado totals, the required exempt amount (before the
/// tax totals, unlike the primary order), tax totals, grand total, then
/// the two synthesized required fields.
fn project_totals(source: &Value) -> Value {
    let mut totals = ObjectBuilder::new();
    for field in GRAVADO_FIELDS {
        if let Some(value) = source.get(field) {
            totals.set(field, value_to_amount_int(value));
        }
    }
    totals.set(
        "MontoExento",
        source
            .get("MontoExento")
            .map(value_to_amount_int)
            .unwrap_or(0),
    );
    for field in ITBIS_FIELDS {
        if let Some(value) = source.get(field) {
            totals.set(field, value_to_amount_int(value));
        }
    }
    let mut grand_total = 0;
    if let Some(value) = source.get("MontoTotal") {
        grand_total = value_to_amount_int(value);
        totals.set("MontoTotal", grand_total);
    }
    totals.set("MontoNoFacturable", 0);
    totals.set("MontoPeriodo", grand_total);
    totals.build()
}

/// The security token is required and may not be empty: copied from the
/// source header, otherwise six random uppercase alphanumerics from the
/// thread-local RNG.
fn security_code(source_header: &Value) -> String {
    if let Some(code) = source_header
        .get("CodigoSeguridadeCF")
        .and_then(Value::as_str)
        && !code.is_empty()
    {
        return code.to_string();
    }
    let mut rng = rand::thread_rng();
    (0..TOKEN_LENGTH)
        .map(|_| TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}
