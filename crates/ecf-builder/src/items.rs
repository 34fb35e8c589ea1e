//! Line-item assembly (`DetallesItems.Item[]`).
//!
//! Field order within an item is part of the wire contract; the numbered
//! steps below mirror the schema's sibling order, not discovery order.

use ecf_model::{CellValue, Result, Row, indexed, indexed2};
use serde_json::Value;

use crate::document::{ObjectBuilder, cell_to_value};
use crate::numeric::{require_int, to_int};

const MAX_SUB_ENTRIES: usize = 9;

/// Collect every line item of a row, up to `max_items`.
///
/// An index is an item iff `NumeroLinea[i]` parses to an integer; anything
/// else skips that index without stopping the scan, so non-contiguous
/// spreadsheets keep their remaining items.
pub(crate) fn collect_line_items(row: &Row, max_items: usize) -> Result<Vec<Value>> {
    let mut items = Vec::new();
    for i in 1..=max_items {
        let Some(line_number) = row.get(&indexed("NumeroLinea", i)).as_ref().and_then(to_int)
        else {
            continue;
        };
        items.push(build_item(row, i, line_number)?);
    }
    Ok(items)
}

fn build_item(row: &Row, i: usize, line_number: i64) -> Result<Value> {
    let mut item = ObjectBuilder::new();

    // 1. NumeroLinea always leads.
    item.set("NumeroLinea", line_number);

    // 2. TablaCodigosItem (types 46/47), before IndicadorFacturacion.
    if let Some(codes) = item_codes_table(row, i) {
        item.set("TablaCodigosItem", codes);
    }

    // 3. IndicadorFacturacion.
    let column = indexed("IndicadorFacturacion", i);
    if let Some(cell) = row.get(&column) {
        item.set("IndicadorFacturacion", require_int(&column, &cell)?);
    }

    // 4. Retencion (types 41/47), before NombreItem.
    if let Some(retention) = retention_block(row, i) {
        item.set("Retencion", retention);
    }

    item.add_cell("NombreItem", row.get(&indexed("NombreItem", i)));

    let column = indexed("IndicadorBienoServicio", i);
    if let Some(cell) = row.get(&column) {
        item.set("IndicadorBienoServicio", require_int(&column, &cell)?);
    }

    item.add_cell("DescripcionItem", row.get(&indexed("DescripcionItem", i)));
    item.add_cell("CantidadItem", row.get(&indexed("CantidadItem", i)));
    item.add_cell("UnidadMedida", row.get(&indexed("UnidadMedida", i)));
    item.add_cell("PrecioUnitarioItem", row.get(&indexed("PrecioUnitarioItem", i)));

    // 11/12. Discount and surcharge amounts, each with its sub-table.
    // A numeric zero amount suppresses the whole block; the text "0"
    // does not.
    if let Some(discount) = row
        .get(&indexed("DescuentoMonto", i))
        .filter(CellValue::is_truthy)
    {
        item.set("DescuentoMonto", cell_to_value(discount.clone()));
        if let Some(entries) = sub_adjustment_table(
            row,
            i,
            &discount,
            "TipoSubDescuento",
            "SubDescuentoPorcentaje",
            "MontoSubDescuento",
        ) {
            let mut table = ObjectBuilder::new();
            table.set("SubDescuento", entries);
            item.set("TablaSubDescuento", table.build());
        }
    }

    if let Some(surcharge) = row
        .get(&indexed("RecargoMonto", i))
        .filter(CellValue::is_truthy)
    {
        item.set("RecargoMonto", cell_to_value(surcharge.clone()));
        if let Some(entries) = sub_adjustment_table(
            row,
            i,
            &surcharge,
            "TipoSubRecargo",
            "SubRecargoPorcentaje",
            "MontoSubRecargo",
        ) {
            let mut table = ObjectBuilder::new();
            table.set("SubRecargo", entries);
            item.set("TablaSubRecargo", table.build());
        }
    }

    // 13. OtraMonedaDetalle (type 45), before MontoItem.
    if let Some(detail) = foreign_currency_detail(row, i) {
        item.set("OtraMonedaDetalle", detail);
    }

    // 14. MontoItem closes the item. ItbisItem is never emitted; the DGII
    // schema rejects it inside items.
    item.add_cell("MontoItem", row.get(&indexed("MontoItem", i)));

    Ok(item.build())
}

fn item_codes_table(row: &Row, i: usize) -> Option<Value> {
    let mut codes = Vec::new();
    for j in 1..=MAX_SUB_ENTRIES {
        let code_type = row.get(&indexed2("TipoCodigo", i, j));
        let code = row.get(&indexed2("CodigoItem", i, j));
        // The entry trigger is truthiness, not mere presence; the fields
        // inside keep presence semantics.
        if !code_type.as_ref().is_some_and(CellValue::is_truthy)
            && !code.as_ref().is_some_and(CellValue::is_truthy)
        {
            continue;
        }
        let mut entry = ObjectBuilder::new();
        entry.add_cell("TipoCodigo", code_type);
        entry.add_cell("CodigoItem", code);
        if let Some(entry) = entry.build_nonempty() {
            codes.push(entry);
        }
    }
    if codes.is_empty() {
        return None;
    }
    let mut table = ObjectBuilder::new();
    table.set("CodigosItem", codes);
    Some(table.build())
}

fn retention_block(row: &Row, i: usize) -> Option<Value> {
    let indicator = row.get(&indexed("IndicadorAgenteRetencionoPercepcion", i));
    let itbis = row.get(&indexed("MontoITBISRetenido", i));
    let isr = row.get(&indexed("MontoISRRetenido", i));
    // Triggered by any truthy field; numeric zeros alone do not open
    // the block.
    if ![&indicator, &itbis, &isr]
        .into_iter()
        .any(|cell| cell.as_ref().is_some_and(CellValue::is_truthy))
    {
        return None;
    }
    let mut retention = ObjectBuilder::new();
    if let Some(cell) = indicator {
        // Numeric when parseable, raw passthrough otherwise.
        match to_int(&cell) {
            Some(n) => retention.set("IndicadorAgenteRetencionoPercepcion", n),
            None => retention.set("IndicadorAgenteRetencionoPercepcion", cell_to_value(cell)),
        }
    }
    retention.add_cell("MontoITBISRetenido", itbis);
    retention.add_cell("MontoISRRetenido", isr);
    retention.build_nonempty()
}

/// Shared shape of `TablaSubDescuento` / `TablaSubRecargo` entries.
///
/// The first sub-entry inherits the parent item's single adjustment amount
/// when its own amount is absent but its type code is present. An explicit
/// fallback for that one position, not a general default.
fn sub_adjustment_table(
    row: &Row,
    i: usize,
    parent_amount: &CellValue,
    type_base: &str,
    pct_base: &str,
    amount_base: &str,
) -> Option<Vec<Value>> {
    let mut entries = Vec::new();
    for j in 1..=MAX_SUB_ENTRIES {
        let entry_type = row.get(&indexed2(type_base, i, j));
        let pct = row.get(&indexed2(pct_base, i, j));
        let mut amount = row.get(&indexed2(amount_base, i, j));

        if j == 1 && entry_type.is_some() && amount.is_none() {
            amount = Some(parent_amount.clone());
        }

        if entry_type.is_none() && pct.is_none() && amount.is_none() {
            continue;
        }
        let mut entry = ObjectBuilder::new();
        entry.add_cell(type_base, entry_type);
        entry.add_cell(pct_base, pct);
        entry.add_cell(amount_base, amount);
        if let Some(entry) = entry.build_nonempty() {
            entries.push(entry);
        }
    }
    if entries.is_empty() { None } else { Some(entries) }
}

fn foreign_currency_detail(row: &Row, i: usize) -> Option<Value> {
    let amount = row.get(&indexed("MontoItemOtraMoneda", i));
    let price = row.get(&indexed("PrecioOtraMoneda", i));
    if amount.is_none() && price.is_none() {
        return None;
    }
    let mut detail = ObjectBuilder::new();
    detail.add_cell("PrecioOtraMoneda", price);
    detail.add_cell("MontoItemOtraMoneda", amount);
    detail.add_cell(
        "MontoDescuentoOtraMoneda",
        row.get(&indexed("MontoDescuentoOtraMoneda", i)),
    );
    detail.add_cell(
        "MontoItemConDescuentoOtraMoneda",
        row.get(&indexed("MontoItemConDescuentoOtraMoneda", i)),
    );
    detail.build_nonempty()
}
