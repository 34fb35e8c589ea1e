//! Tests for the ACECF commercial-approval builder.

use ecf_builder::{build_acecf, build_acecf_batch};
use ecf_model::Row;
use serde_json::Value;

fn row(pairs: &[(&str, &str)]) -> Row {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn approval_row() -> Row {
    row(&[
        ("RNCEmisor", "131880681"),
        ("eNCF", "E310000000001"),
        ("FechaEmision", "01-04-2026"),
        ("MontoTotal", "7080.0"),
        ("RNCComprador", "131037879"),
        ("Estado", "1"),
        ("FechaHoraAprobacionComercial", "15-01-2026 12:05:21"),
    ])
}

#[test]
fn envelope_carries_namespace_metadata() {
    let doc = build_acecf(&approval_row());
    let envelope = &doc["ACECF"];
    assert_eq!(
        envelope["_xmlns:xsi"],
        Value::from("http://www.w3.org/2001/XMLSchema-instance")
    );
    assert_eq!(
        envelope["_xmlns:xsd"],
        Value::from("http://www.w3.org/2001/XMLSchema")
    );
    assert!(envelope.get("DetalleAprobacionComercial").is_some());
}

#[test]
fn detail_fields_follow_schema_order() {
    let doc = build_acecf(&approval_row());
    let json = serde_json::to_string(&doc["ACECF"]["DetalleAprobacionComercial"])
        .expect("serialize");
    let pos = |key: &str| json.find(&format!("\"{key}\"")).expect(key);
    assert!(pos("Version") < pos("RNCEmisor"));
    assert!(pos("RNCEmisor") < pos("eNCF"));
    assert!(pos("MontoTotal") < pos("RNCComprador"));
    assert!(pos("Estado") < pos("FechaHoraAprobacionComercial"));
}

#[test]
fn amount_drops_trailing_zero() {
    let doc = build_acecf(&approval_row());
    let detail = &doc["ACECF"]["DetalleAprobacionComercial"];
    assert_eq!(detail["Version"], Value::from("1.0"));
    assert_eq!(detail["MontoTotal"], Value::from("7080"));
    assert_eq!(detail["Estado"], Value::from("1"));
    assert!(detail.get("DetalleMotivoRechazo").is_none());
}

#[test]
fn rejection_reason_rides_along_when_present() {
    let doc = build_acecf(&row(&[
        ("RNCEmisor", "131880681"),
        ("ENCF", "E310000000002"),
        ("MontoTotal", "500.25"),
        ("Estado", "2.0"),
        ("DetalleMotivoRechazo", "Monto no coincide"),
    ]));
    let detail = &doc["ACECF"]["DetalleAprobacionComercial"];
    assert_eq!(detail["eNCF"], Value::from("E310000000002"));
    assert_eq!(detail["MontoTotal"], Value::from("500.25"));
    assert_eq!(detail["Estado"], Value::from("2"));
    assert_eq!(detail["DetalleMotivoRechazo"], Value::from("Monto no coincide"));
}

#[test]
fn approval_timestamp_defaults_to_now() {
    let doc = build_acecf(&row(&[
        ("RNCEmisor", "131880681"),
        ("eNCF", "E310000000003"),
        ("Estado", "1"),
    ]));
    let stamp = doc["ACECF"]["DetalleAprobacionComercial"]["FechaHoraAprobacionComercial"]
        .as_str()
        .expect("timestamp");
    // DD-MM-YYYY HH:MM:SS
    assert_eq!(stamp.len(), 19);
    assert_eq!(&stamp[2..3], "-");
    assert_eq!(&stamp[10..11], " ");
    assert_eq!(&stamp[13..14], ":");
}

#[test]
fn batch_skips_empty_rows() {
    let rows = vec![approval_row(), Row::new(), approval_row()];
    let documents = build_acecf_batch(&rows);
    assert_eq!(documents.len(), 2);
}
