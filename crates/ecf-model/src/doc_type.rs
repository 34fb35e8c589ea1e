use std::fmt;

use crate::cell::CellValue;
use crate::row::Row;

/// The ten e-CF document types, keyed by their two-digit DGII code.
///
/// The code drives every conditional branch in the primary builder. An
/// unrecognized code is carried through as [`DocumentType::Other`] and
/// degrades to the most permissive field set: none of the type-gated
/// sections fire, nothing fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentType {
    /// 31 - Factura de Crédito Fiscal
    CreditoFiscal,
    /// 32 - Factura de Consumo
    Consumo,
    /// 33 - Nota de Débito
    NotaDebito,
    /// 34 - Nota de Crédito
    NotaCredito,
    /// 41 - Compras
    Compras,
    /// 43 - Gastos Menores
    GastosMenores,
    /// 44 - Regímenes Especiales
    RegimenesEspeciales,
    /// 45 - Gubernamental
    Gubernamental,
    /// 46 - Exportaciones
    Exportaciones,
    /// 47 - Pagos al Exterior
    PagosAlExterior,
    /// Anything else; not validated here, trusted as given.
    Other(String),
}

impl DocumentType {
    /// Parse a code string. Never fails; unknown codes become `Other`.
    pub fn parse(code: &str) -> DocumentType {
        match code.trim() {
            "31" => DocumentType::CreditoFiscal,
            "32" => DocumentType::Consumo,
            "33" => DocumentType::NotaDebito,
            "34" => DocumentType::NotaCredito,
            "41" => DocumentType::Compras,
            "43" => DocumentType::GastosMenores,
            "44" => DocumentType::RegimenesEspeciales,
            "45" => DocumentType::Gubernamental,
            "46" => DocumentType::Exportaciones,
            "47" => DocumentType::PagosAlExterior,
            other => DocumentType::Other(other.to_string()),
        }
    }

    /// Read the `TipoeCF` column of a row. Numeric cells with an integral
    /// value are accepted alongside text codes.
    pub fn from_row(row: &Row) -> Option<DocumentType> {
        match row.get("TipoeCF")? {
            CellValue::Text(s) => Some(DocumentType::parse(&s)),
            CellValue::Number(n) if n.fract() == 0.0 => {
                Some(DocumentType::parse(&format!("{}", n as i64)))
            }
            _ => None,
        }
    }

    /// The two-digit wire code.
    pub fn code(&self) -> &str {
        match self {
            DocumentType::CreditoFiscal => "31",
            DocumentType::Consumo => "32",
            DocumentType::NotaDebito => "33",
            DocumentType::NotaCredito => "34",
            DocumentType::Compras => "41",
            DocumentType::GastosMenores => "43",
            DocumentType::RegimenesEspeciales => "44",
            DocumentType::Gubernamental => "45",
            DocumentType::Exportaciones => "46",
            DocumentType::PagosAlExterior => "47",
            DocumentType::Other(code) => code,
        }
    }

    /// Type 34 carries `IndicadorNotaCredito` in `IdDoc`.
    pub fn is_credit_note(&self) -> bool {
        matches!(self, DocumentType::NotaCredito)
    }

    /// Types 33/34 reference a prior document (`InformacionReferencia`).
    pub fn references_prior_document(&self) -> bool {
        matches!(self, DocumentType::NotaDebito | DocumentType::NotaCredito)
    }

    /// Type 32, the consumer invoice with the 250,000 transport threshold
    /// and the RFCE summary path.
    pub fn is_consumer_invoice(&self) -> bool {
        matches!(self, DocumentType::Consumo)
    }

    /// Types 44-47 include a Transporte block whenever any transport field
    /// is present.
    pub fn uses_transport_fields(&self) -> bool {
        matches!(
            self,
            DocumentType::RegimenesEspeciales
                | DocumentType::Gubernamental
                | DocumentType::Exportaciones
                | DocumentType::PagosAlExterior
        )
    }

    /// Type 45 nests the foreign-currency totals block (`OtraMoneda`).
    pub fn has_foreign_currency_block(&self) -> bool {
        matches!(self, DocumentType::Gubernamental)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_codes() {
        assert_eq!(DocumentType::parse("32"), DocumentType::Consumo);
        assert_eq!(DocumentType::parse(" 34 "), DocumentType::NotaCredito);
        assert_eq!(DocumentType::parse("47"), DocumentType::PagosAlExterior);
    }

    #[test]
    fn unknown_code_is_other() {
        let doc_type = DocumentType::parse("99");
        assert_eq!(doc_type, DocumentType::Other("99".to_string()));
        assert!(!doc_type.is_credit_note());
        assert!(!doc_type.uses_transport_fields());
        assert_eq!(doc_type.code(), "99");
    }

    #[test]
    fn numeric_cell_is_accepted() {
        let row = Row::from_iter([("TipoeCF", 32i64)]);
        assert_eq!(DocumentType::from_row(&row), Some(DocumentType::Consumo));
    }

    #[test]
    fn predicates_by_code() {
        assert!(DocumentType::parse("44").uses_transport_fields());
        assert!(DocumentType::parse("45").has_foreign_currency_block());
        assert!(DocumentType::parse("33").references_prior_document());
        assert!(!DocumentType::parse("31").uses_transport_fields());
    }
}
