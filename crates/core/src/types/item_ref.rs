//! Typed references to the thing a submitted line item points at.
//!
//! Older payloads identify items with prefixed strings (`global_123` for the
//! shared catalog, `fornecedor_45` for a supplier's own item). Those are
//! parsed once, here, into [`ItemRef`]; nothing downstream looks at prefixes.

use serde::{Deserialize, Serialize};

use super::id::{CatalogItemId, SupplierItemId};
use super::status::Unit;

const CATALOG_PREFIX: &str = "global_";
const SUPPLIER_PREFIX: &str = "fornecedor_";

/// Errors from parsing a legacy item identifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemRefError {
    #[error("unknown item reference prefix: {0:?}")]
    UnknownPrefix(String),
    #[error("invalid id in item reference {0:?}")]
    InvalidId(String),
}

/// What a submitted item refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemRef {
    /// An item of the shared catalog.
    Catalog { id: CatalogItemId },
    /// An item registered under a specific supplier.
    SupplierItem { id: SupplierItemId },
    /// An ad-hoc item that only exists inside one list.
    Temporary { name: String, unit: Unit },
}

impl ItemRef {
    /// Parse a legacy `global_<id>` / `fornecedor_<id>` identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ItemRefError`] if the prefix is unknown or the id is not numeric.
    pub fn parse_legacy(raw: &str) -> Result<Self, ItemRefError> {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix(CATALOG_PREFIX) {
            let id = rest
                .parse::<CatalogItemId>()
                .map_err(|_| ItemRefError::InvalidId(raw.to_owned()))?;
            return Ok(Self::Catalog { id });
        }
        if let Some(rest) = raw.strip_prefix(SUPPLIER_PREFIX) {
            let id = rest
                .parse::<SupplierItemId>()
                .map_err(|_| ItemRefError::InvalidId(raw.to_owned()))?;
            return Ok(Self::SupplierItem { id });
        }
        Err(ItemRefError::UnknownPrefix(raw.to_owned()))
    }

    /// Build a temporary reference.
    #[must_use]
    pub fn temporary(name: impl Into<String>, unit: Unit) -> Self {
        Self::Temporary {
            name: name.into(),
            unit,
        }
    }

    /// Returns `true` for list-local items that are not in any catalog.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary { .. })
    }

}

impl std::str::FromStr for ItemRef {
    type Err = ItemRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_legacy(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_catalog() {
        assert_eq!(
            ItemRef::parse_legacy("global_123").unwrap(),
            ItemRef::Catalog {
                id: CatalogItemId::new(123)
            }
        );
    }

    #[test]
    fn test_parse_legacy_supplier() {
        assert_eq!(
            "fornecedor_45".parse::<ItemRef>().unwrap(),
            ItemRef::SupplierItem {
                id: SupplierItemId::new(45)
            }
        );
    }

    #[test]
    fn test_parse_legacy_errors() {
        assert!(matches!(
            ItemRef::parse_legacy("local_1"),
            Err(ItemRefError::UnknownPrefix(_))
        ));
        assert!(matches!(
            ItemRef::parse_legacy("global_abc"),
            Err(ItemRefError::InvalidId(_))
        ));
        assert!(matches!(
            ItemRef::parse_legacy("fornecedor_"),
            Err(ItemRefError::InvalidId(_))
        ));
    }

    #[test]
    fn test_serde_is_tagged() {
        let json = serde_json::to_value(ItemRef::Catalog {
            id: CatalogItemId::new(3),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"kind": "catalog", "id": 3}));

        let temp: ItemRef =
            serde_json::from_str(r#"{"kind":"temporary","name":"Gelo","unit":"pct"}"#).unwrap();
        assert!(temp.is_temporary());
    }
}
