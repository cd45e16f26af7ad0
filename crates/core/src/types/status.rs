//! Status and classification enums shared by the back-office.
//!
//! Wire values follow the upstream API (`PENDENTE`, `APROVADO`, ...) so the
//! enums can be deserialized straight from its JSON.

use serde::{Deserialize, Serialize};

/// Purchase-order line status ("pedido").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pendente,
    Aprovado,
    Rejeitado,
}

impl OrderStatus {
    /// Returns `true` once an administrator has decided on the line.
    #[must_use]
    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::Pendente)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pendente => write!(f, "PENDENTE"),
            Self::Aprovado => write!(f, "APROVADO"),
            Self::Rejeitado => write!(f, "REJEITADO"),
        }
    }
}

/// Kind of submitted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// A list submitted from a master list, one order line per item.
    Traditional,
    /// A collaborator-initiated "lista rápida" with priorities and discard flags.
    Quick,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Traditional => write!(f, "traditional"),
            Self::Quick => write!(f, "quick"),
        }
    }
}

/// Lifecycle status of a submitted list.
///
/// Archiving is tracked separately (see `archived` on the list), so an
/// archived list keeps whatever status it had when it was archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// Quick list still being composed ("rascunho").
    Rascunho,
    Pendente,
    /// Traditional lists only: some lines approved, some rejected.
    ParcialmenteAprovado,
    Aprovado,
    Rejeitado,
}

impl SubmissionStatus {
    /// Sort rank used by the submissions table.
    ///
    /// `PENDENTE=0, PARCIALMENTE_APROVADO=1, APROVADO=2, REJEITADO=3`; drafts
    /// sort after everything else.
    #[must_use]
    pub const fn severity(self) -> u8 {
        match self {
            Self::Pendente => 0,
            Self::ParcialmenteAprovado => 1,
            Self::Aprovado => 2,
            Self::Rejeitado => 3,
            Self::Rascunho => 4,
        }
    }

    /// Human-readable label, as shown to collaborators.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rascunho => "Rascunho",
            Self::Pendente => "Pendente",
            Self::ParcialmenteAprovado => "Parcialmente aprovado",
            Self::Aprovado => "Aprovado",
            Self::Rejeitado => "Rejeitado",
        }
    }

    /// Returns `true` for the states an administrator reaches by deciding.
    #[must_use]
    pub const fn is_decided(self) -> bool {
        matches!(
            self,
            Self::Aprovado | Self::Rejeitado | Self::ParcialmenteAprovado
        )
    }

    /// Returns `true` if a list of `kind` may ever hold this status.
    #[must_use]
    pub const fn allowed_for(self, kind: ListKind) -> bool {
        match self {
            Self::Rascunho => matches!(kind, ListKind::Quick),
            Self::ParcialmenteAprovado => matches!(kind, ListKind::Traditional),
            Self::Pendente | Self::Aprovado | Self::Rejeitado => true,
        }
    }

    /// Derive a traditional list's status from its order lines.
    ///
    /// Any line still pending keeps the list pending. Otherwise the list is
    /// approved, rejected, or partially approved depending on the mix.
    #[must_use]
    pub fn from_order_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = OrderStatus>,
    {
        let mut approved = 0usize;
        let mut rejected = 0usize;
        for status in statuses {
            match status {
                OrderStatus::Pendente => return Self::Pendente,
                OrderStatus::Aprovado => approved += 1,
                OrderStatus::Rejeitado => rejected += 1,
            }
        }
        match (approved, rejected) {
            (0, 0) => Self::Pendente,
            (_, 0) => Self::Aprovado,
            (0, _) => Self::Rejeitado,
            _ => Self::ParcialmenteAprovado,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rascunho => write!(f, "RASCUNHO"),
            Self::Pendente => write!(f, "PENDENTE"),
            Self::ParcialmenteAprovado => write!(f, "PARCIALMENTE_APROVADO"),
            Self::Aprovado => write!(f, "APROVADO"),
            Self::Rejeitado => write!(f, "REJEITADO"),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RASCUNHO" => Ok(Self::Rascunho),
            "PENDENTE" => Ok(Self::Pendente),
            "PARCIALMENTE_APROVADO" => Ok(Self::ParcialmenteAprovado),
            "APROVADO" => Ok(Self::Aprovado),
            "REJEITADO" => Ok(Self::Rejeitado),
            _ => Err(format!("invalid submission status: {s}")),
        }
    }
}

/// Priority of a quick-list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Stock is fine for now, buying ahead.
    #[default]
    Prevencao,
    PrecisaComprar,
    Urgente,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prevencao => write!(f, "prevencao"),
            Self::PrecisaComprar => write!(f, "precisa_comprar"),
            Self::Urgente => write!(f, "urgente"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prevencao" => Ok(Self::Prevencao),
            "precisa_comprar" => Ok(Self::PrecisaComprar),
            "urgente" => Ok(Self::Urgente),
            _ => Err(format!("invalid priority: {s}")),
        }
    }
}

/// Broad classification of a unit of measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Mass,
    Volume,
    Count,
}

/// Unit of measure of a stock item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "l")]
    Liter,
    #[serde(rename = "ml")]
    Milliliter,
    #[default]
    #[serde(rename = "un")]
    Each,
    #[serde(rename = "cx")]
    Box,
    #[serde(rename = "pct")]
    Package,
}

impl Unit {
    /// Returns the unit's kind.
    #[must_use]
    pub const fn kind(self) -> UnitKind {
        match self {
            Self::Kilogram | Self::Gram => UnitKind::Mass,
            Self::Liter | Self::Milliliter => UnitKind::Volume,
            Self::Each | Self::Box | Self::Package => UnitKind::Count,
        }
    }

    /// Wire/display abbreviation.
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Kilogram => "kg",
            Self::Gram => "g",
            Self::Liter => "l",
            Self::Milliliter => "ml",
            Self::Each => "un",
            Self::Box => "cx",
            Self::Package => "pct",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" => Ok(Self::Kilogram),
            "g" => Ok(Self::Gram),
            "l" | "lt" => Ok(Self::Liter),
            "ml" => Ok(Self::Milliliter),
            "un" | "und" | "unidade" => Ok(Self::Each),
            "cx" | "caixa" => Ok(Self::Box),
            "pct" | "pacote" => Ok(Self::Package),
            _ => Err(format!("invalid unit: {s}")),
        }
    }
}

impl std::str::FromStr for UnitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mass" | "massa" => Ok(Self::Mass),
            "volume" => Ok(Self::Volume),
            "count" | "contagem" => Ok(Self::Count),
            _ => Err(format!("invalid unit kind: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        let mut statuses = vec![
            SubmissionStatus::Rejeitado,
            SubmissionStatus::Aprovado,
            SubmissionStatus::Pendente,
            SubmissionStatus::ParcialmenteAprovado,
        ];
        statuses.sort_by_key(|s| s.severity());
        assert_eq!(
            statuses,
            vec![
                SubmissionStatus::Pendente,
                SubmissionStatus::ParcialmenteAprovado,
                SubmissionStatus::Aprovado,
                SubmissionStatus::Rejeitado,
            ]
        );
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::ParcialmenteAprovado).unwrap(),
            "\"PARCIALMENTE_APROVADO\""
        );
        let parsed: SubmissionStatus = serde_json::from_str("\"PENDENTE\"").unwrap();
        assert_eq!(parsed, SubmissionStatus::Pendente);
        assert_eq!("aprovado".parse::<SubmissionStatus>().unwrap(), SubmissionStatus::Aprovado);
    }

    #[test]
    fn test_status_allowed_for_kind() {
        assert!(SubmissionStatus::Rascunho.allowed_for(ListKind::Quick));
        assert!(!SubmissionStatus::Rascunho.allowed_for(ListKind::Traditional));
        assert!(SubmissionStatus::ParcialmenteAprovado.allowed_for(ListKind::Traditional));
        assert!(!SubmissionStatus::ParcialmenteAprovado.allowed_for(ListKind::Quick));
    }

    #[test]
    fn test_from_order_statuses() {
        use OrderStatus::{Aprovado, Pendente, Rejeitado};

        assert_eq!(
            SubmissionStatus::from_order_statuses([]),
            SubmissionStatus::Pendente
        );
        assert_eq!(
            SubmissionStatus::from_order_statuses([Aprovado, Pendente]),
            SubmissionStatus::Pendente
        );
        assert_eq!(
            SubmissionStatus::from_order_statuses([Aprovado, Aprovado]),
            SubmissionStatus::Aprovado
        );
        assert_eq!(
            SubmissionStatus::from_order_statuses([Rejeitado]),
            SubmissionStatus::Rejeitado
        );
        assert_eq!(
            SubmissionStatus::from_order_statuses([Aprovado, Rejeitado]),
            SubmissionStatus::ParcialmenteAprovado
        );
    }

    #[test]
    fn test_priority_wire_format() {
        assert_eq!(
            serde_json::to_string(&Priority::PrecisaComprar).unwrap(),
            "\"precisa_comprar\""
        );
        assert_eq!("urgente".parse::<Priority>().unwrap(), Priority::Urgente);
    }

    #[test]
    fn test_unit_kind_and_parse() {
        assert_eq!(Unit::Kilogram.kind(), UnitKind::Mass);
        assert_eq!(Unit::Milliliter.kind(), UnitKind::Volume);
        assert_eq!(Unit::Box.kind(), UnitKind::Count);
        assert_eq!("Massa".parse::<UnitKind>().unwrap(), UnitKind::Mass);
        assert!("peso".parse::<UnitKind>().is_err());
        assert_eq!("KG".parse::<Unit>().unwrap(), Unit::Kilogram);
        assert_eq!(serde_json::to_string(&Unit::Package).unwrap(), "\"pct\"");
        assert!("bushel".parse::<Unit>().is_err());
    }
}
