//! Primary e-CF document builder.
//!
//! Assembles the full `{"ECF": {...}}` document from one spreadsheet row.
//! Emission order follows the DGII schema exactly; several orderings that
//! look unintuitive (grand total before retention totals, the phone table
//! between two issuer field groups) are validator requirements and must
//! not be rearranged.

use chrono::Local;
use ecf_model::{DocumentType, Result, Row, collect_indexed, indexed};
use serde_json::Value;
use tracing::warn;

use crate::document::{ObjectBuilder, cell_to_value};
use crate::items::collect_line_items;
use crate::numeric::{parse_amount, require_int};

/// Consumer invoices (type 32) at or above this grand total must carry a
/// Transporte block instead of InformacionesAdicionales.
pub const TRANSPORT_THRESHOLD: f64 = 250_000.0;

const MAX_ITEMS: usize = 50;
const MAX_PAYMENT_FORMS: usize = 7;
const MAX_ISSUER_PHONES: usize = 10;
const MAX_DOC_ADJUSTMENTS: usize = 50;

pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

const ISSUER_FIELDS_HEAD: [&str; 6] = [
    "RNCEmisor",
    "RazonSocialEmisor",
    "NombreComercial",
    "DireccionEmisor",
    "Municipio",
    "Provincia",
];

const ISSUER_FIELDS_TAIL: [&str; 7] = [
    "CorreoEmisor",
    "WebSite",
    "CodigoVendedor",
    "NumeroFacturaInterna",
    "NumeroPedidoInterno",
    "ZonaVenta",
    "FechaEmision",
];

const BUYER_CONTACT_FIELDS: [&str; 6] = [
    "RazonSocialComprador",
    "ContactoComprador",
    "CorreoComprador",
    "DireccionComprador",
    "MunicipioComprador",
    "ProvinciaComprador",
];

const BUYER_DELIVERY_FIELDS: [&str; 4] = [
    "FechaEntrega",
    "FechaOrdenCompra",
    "NumeroOrdenCompra",
    "CodigoInternoComprador",
];

const TRANSPORT_FIELDS: [&str; 9] = [
    "Conductor",
    "DocumentoTransporte",
    "Ficha",
    "Placa",
    "RutaTransporte",
    "ZonaTransporte",
    "NumeroAlbaran",
    "PaisDestino",
    "PaisOrigen",
];

/// The only fields the DGII XSD accepts inside InformacionesAdicionales,
/// in the only order it accepts them. Anything else is a code-2 rejection.
const ADDITIONAL_INFO_FIELDS: [&str; 12] = [
    "FechaEmbarque",
    "NumeroEmbarque",
    "NumeroContenedor",
    "NumeroReferencia",
    "PesoBruto",
    "PesoNeto",
    "UnidadPesoBruto",
    "UnidadPesoNeto",
    "CantidadBulto",
    "UnidadBulto",
    "VolumenBulto",
    "UnidadVolumen",
];

const GRAVADO_TOTALS: [&str; 6] = [
    "MontoGravadoTotal",
    "MontoGravadoI1",
    "MontoGravadoI2",
    "MontoGravadoI3",
    "MontoGravadoI4",
    "MontoGravadoI5",
];

const ITBIS_TOTALS: [&str; 11] = [
    "ITBIS1",
    "ITBIS2",
    "ITBIS3",
    "ITBIS4",
    "ITBIS5",
    "TotalITBIS",
    "TotalITBIS1",
    "TotalITBIS2",
    "TotalITBIS3",
    "TotalITBIS4",
    "TotalITBIS5",
];

const FOREIGN_CURRENCY_TOTALS: [&str; 12] = [
    "TipoMoneda",
    "TipoCambio",
    "MontoGravadoTotalOtraMoneda",
    "MontoGravado1OtraMoneda",
    "MontoGravado2OtraMoneda",
    "MontoGravado3OtraMoneda",
    "MontoExentoOtraMoneda",
    "TotalITBISOtraMoneda",
    "TotalITBIS1OtraMoneda",
    "TotalITBIS2OtraMoneda",
    "TotalITBIS3OtraMoneda",
    "MontoTotalOtraMoneda",
];

/// Build the full ECF document from one row.
///
/// Pure and deterministic apart from the signature-timestamp default.
/// Missing fields are omitted; the only failures are present-but-malformed
/// numeric values in schema-numeric columns.
pub fn build_ecf(row: &Row) -> Result<Value> {
    let doc_type = DocumentType::from_row(row);

    let mut header = ObjectBuilder::new();
    header.add_cell(
        "Version",
        row.get("Version").or_else(|| Some("1.0".into())),
    );
    header.set("IdDoc", build_id_doc(row, doc_type.as_ref())?);
    header.set("Emisor", build_issuer(row));
    if let Some(buyer) = build_buyer(row) {
        header.set("Comprador", buyer);
    }

    let include_transport = should_include_transport(row, doc_type.as_ref());
    if include_transport {
        if let Some(transport) = build_transport(row) {
            header.set("Transporte", transport);
        }
    } else if let Some(info) = build_additional_info(row) {
        header.set("InformacionesAdicionales", info);
    }

    header.set("Totales", build_totals(row));

    // OtraMoneda nests after Totales inside Encabezado, not at the root.
    if doc_type
        .as_ref()
        .is_some_and(DocumentType::has_foreign_currency_block)
        && let Some(currency) = build_foreign_currency(row)
    {
        header.set("OtraMoneda", currency);
    }

    let mut ecf = ObjectBuilder::new();
    ecf.set("Encabezado", header.build());

    let line_items = collect_line_items(row, MAX_ITEMS)?;
    if !line_items.is_empty() {
        let mut details = ObjectBuilder::new();
        details.set("Item", line_items);
        ecf.set("DetallesItems", details.build());
    }

    if let Some(adjustments) = build_document_adjustments(row) {
        ecf.set("DescuentosORecargos", adjustments);
    }

    if doc_type
        .as_ref()
        .is_some_and(DocumentType::references_prior_document)
        && let Some(reference) = build_reference(row)
    {
        ecf.set("InformacionReferencia", reference);
    }

    let signed_at = row
        .get("FechaHoraFirma")
        .map(cell_to_value)
        .unwrap_or_else(|| Value::from(Local::now().format(TIMESTAMP_FORMAT).to_string()));
    ecf.set("FechaHoraFirma", signed_at);

    let mut root = ObjectBuilder::new();
    root.set("ECF", ecf.build());
    Ok(root.build())
}

fn build_id_doc(row: &Row, doc_type: Option<&DocumentType>) -> Result<Value> {
    let mut id_doc = ObjectBuilder::new();
    id_doc.add_cell("TipoeCF", row.get("TipoeCF"));
    // Both column spellings occur in the wild.
    id_doc.add_cell("eNCF", row.get("ENCF").or_else(|| row.get("eNCF")));

    if doc_type.is_some_and(DocumentType::is_credit_note) {
        id_doc.add_cell("IndicadorNotaCredito", row.get("IndicadorNotaCredito"));
    }

    id_doc.add_cell(
        "FechaVencimientoSecuencia",
        row.get("FechaVencimientoSecuencia"),
    );
    id_doc.add_cell("IndicadorMontoGravado", row.get("IndicadorMontoGravado"));
    id_doc.add_cell("TipoIngresos", row.get("TipoIngresos"));
    id_doc.add_cell("TipoPago", row.get("TipoPago"));

    if let Some(table) = build_payment_table(row)? {
        id_doc.set("TablaFormasPago", table);
    }
    Ok(id_doc.build())
}

/// Zip `FormaPago[i]` / `MontoPago[i]` positionally into the payment table.
fn build_payment_table(row: &Row) -> Result<Option<Value>> {
    let mut forms = Vec::new();
    for i in 1..=MAX_PAYMENT_FORMS {
        let form_column = indexed("FormaPago", i);
        let form = row.get(&form_column);
        let amount = row.get(&indexed("MontoPago", i));
        if form.is_none() && amount.is_none() {
            continue;
        }
        let mut entry = ObjectBuilder::new();
        if let Some(cell) = form {
            entry.set("FormaPago", require_int(&form_column, &cell)?);
        }
        entry.add_cell("MontoPago", amount);
        if let Some(entry) = entry.build_nonempty() {
            forms.push(entry);
        }
    }
    if forms.is_empty() {
        return Ok(None);
    }
    let mut table = ObjectBuilder::new();
    table.set("FormaDePago", forms);
    Ok(Some(table.build()))
}

fn build_issuer(row: &Row) -> Value {
    let mut issuer = ObjectBuilder::new();
    for field in ISSUER_FIELDS_HEAD {
        issuer.add_cell(field, row.get(field));
    }
    // The phone table sits between the two field groups; fixed contract.
    let phones = collect_indexed(row, "TelefonoEmisor", MAX_ISSUER_PHONES);
    if !phones.is_empty() {
        let mut table = ObjectBuilder::new();
        table.set(
            "TelefonoEmisor",
            phones.into_iter().map(cell_to_value).collect::<Vec<_>>(),
        );
        issuer.set("TablaTelefonoEmisor", table.build());
    }
    for field in ISSUER_FIELDS_TAIL {
        issuer.add_cell(field, row.get(field));
    }
    issuer.build()
}

fn build_buyer(row: &Row) -> Option<Value> {
    let mut buyer = ObjectBuilder::new();
    // Foreign identifier and local tax id are mutually exclusive; the
    // foreign one is probed first.
    buyer.add_cell("IdentificadorExtranjero", row.get("IdentificadorExtranjero"));
    buyer.add_cell("RNCComprador", row.get("RNCComprador"));
    for field in BUYER_CONTACT_FIELDS {
        buyer.add_cell(field, row.get(field));
    }
    // Meaningful for type 32 only, but harmless to pass through.
    buyer.add_cell("TelefonoAdicional", row.get("TelefonoAdicional"));
    for field in BUYER_DELIVERY_FIELDS {
        buyer.add_cell(field, row.get(field));
    }
    buyer.build_nonempty()
}

/// Transport vs AdditionalInfo is mutually exclusive. Type 32 switches on
/// the 250,000 threshold; an unparseable grand total fails closed to the
/// no-transport path with a diagnostic so malformed high-value rows are
/// at least visible.
fn should_include_transport(row: &Row, doc_type: Option<&DocumentType>) -> bool {
    if doc_type.is_some_and(DocumentType::is_consumer_invoice)
        && let Some(total) = row.get("MontoTotal")
    {
        match parse_amount(&total) {
            Some(amount) if amount >= TRANSPORT_THRESHOLD => return true,
            Some(_) => {}
            None => warn!(
                column = "MontoTotal",
                value = ?total,
                "unparseable grand total; treating as below the transport threshold"
            ),
        }
    }
    doc_type.is_some_and(DocumentType::uses_transport_fields) && build_transport(row).is_some()
}

fn build_transport(row: &Row) -> Option<Value> {
    let mut transport = ObjectBuilder::new();
    for field in TRANSPORT_FIELDS {
        transport.add_cell(field, row.get(field));
    }
    transport.build_nonempty()
}

fn build_additional_info(row: &Row) -> Option<Value> {
    let mut info = ObjectBuilder::new();
    for field in ADDITIONAL_INFO_FIELDS {
        // Some workbooks ship this header with a trailing space only.
        let value = if field == "NumeroContenedor" {
            row.get("NumeroContenedor ").or_else(|| row.get(field))
        } else {
            row.get(field)
        };
        info.add_cell(field, value);
    }
    info.build_nonempty()
}

fn build_totals(row: &Row) -> Value {
    let mut totals = ObjectBuilder::new();
    for field in GRAVADO_TOTALS {
        totals.add_cell(field, row.get(field));
    }
    totals.add_cell("MontoExento", row.get("MontoExento"));
    for field in ITBIS_TOTALS {
        totals.add_cell(field, row.get(field));
    }

    // MontoTotal strictly before the retention and non-billable tail;
    // the validator rejects the intuitive ordering. The tail fields are
    // presence-gated only, never type-gated: whichever document type
    // carries them, they pass through.
    totals.add_cell("MontoTotal", row.get("MontoTotal"));
    totals.add_cell("MontoPeriodo", row.get("MontoPeriodo"));
    totals.add_cell("ValorPagar", row.get("ValorPagar"));
    totals.add_cell("TotalITBISRetenido", row.get("TotalITBISRetenido"));
    totals.add_cell("TotalISRRetencion", row.get("TotalISRRetencion"));
    totals.add_cell("MontoNoFacturable", row.get("MontoNoFacturable"));
    totals.build()
}

fn build_document_adjustments(row: &Row) -> Option<Value> {
    let mut adjustments = Vec::new();
    for i in 1..=MAX_DOC_ADJUSTMENTS {
        let Some(line) = row.get(&indexed("NumeroLineaDoR", i)) else {
            continue;
        };
        let mut entry = ObjectBuilder::new();
        entry.set("NumeroLinea", cell_to_value(line));
        entry.add_cell("TipoAjuste", row.get(&indexed("TipoAjuste", i)));
        entry.add_cell(
            "DescripcionDescuentooRecargo",
            row.get(&indexed("DescripcionDescuentooRecargo", i)),
        );
        entry.add_cell("TipoValor", row.get(&indexed("TipoValor", i)));
        entry.add_cell(
            "MontoDescuentooRecargo",
            row.get(&indexed("MontoDescuentooRecargo", i)),
        );
        entry.add_cell(
            "IndicadorFacturacionDescuentooRecargo",
            row.get(&indexed("IndicadorFacturacionDescuentooRecargo", i)),
        );
        adjustments.push(entry.build());
    }
    if adjustments.is_empty() {
        return None;
    }
    let mut table = ObjectBuilder::new();
    table.set("DescuentoORecargo", adjustments);
    Some(table.build())
}

fn build_reference(row: &Row) -> Option<Value> {
    let mut reference = ObjectBuilder::new();
    reference.add_cell(
        "NCFModificado",
        row.get("NCFModificado").or_else(|| row.get("eNCFReferencia")),
    );
    reference.add_cell("RNCAnterior", row.get("RNCAnterior"));
    reference.add_cell(
        "FechaNCFModificado",
        row.get("FechaNCFModificado")
            .or_else(|| row.get("FechaNCFReferencia")),
    );
    reference.add_cell("CodigoModificacion", row.get("CodigoModificacion"));
    reference.add_cell("RazonModificacion", row.get("RazonModificacion"));
    reference.build_nonempty()
}

fn build_foreign_currency(row: &Row) -> Option<Value> {
    let mut currency = ObjectBuilder::new();
    for field in FOREIGN_CURRENCY_TOTALS {
        currency.add_cell(field, row.get(field));
    }
    currency.build_nonempty()
}
