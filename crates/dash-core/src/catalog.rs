//! Canonical sensor variables and their resolution against table columns.
//!
//! Each [`CanonicalVariable`] owns an ordered keyword list. A
//! [`VariableCatalog`] resolves all of them once per table into concrete
//! column references, so chart code never searches labels at plot time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashError;
use crate::models::CleanTable;

// ── Column discovery ──────────────────────────────────────────────────────────

/// Return the first column containing one of `keywords`.
///
/// Keywords are tried in priority order and every column is scanned for
/// keyword *i* before keyword *i + 1* is considered. Matching is a
/// case-sensitive substring test; callers pass already lower-cased labels.
pub fn find_column<'a, S: AsRef<str>>(columns: &'a [S], keywords: &[&str]) -> Option<&'a str> {
    keywords.iter().find_map(|keyword| {
        columns
            .iter()
            .map(AsRef::as_ref)
            .find(|column| column.contains(keyword))
    })
}

// ── Groups ────────────────────────────────────────────────────────────────────

/// Dashboard section a variable belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableGroup {
    Thermal,
    Voltage,
    Current,
    Energy,
}

impl VariableGroup {
    pub const ALL: [VariableGroup; 4] = [
        VariableGroup::Thermal,
        VariableGroup::Voltage,
        VariableGroup::Current,
        VariableGroup::Energy,
    ];

    /// Section heading in the individual analysis.
    pub fn title(self) -> &'static str {
        match self {
            VariableGroup::Thermal => "Análise Térmica",
            VariableGroup::Voltage => "Parâmetros Elétricos: Tensão",
            VariableGroup::Current => "Parâmetros Elétricos: Corrente",
            VariableGroup::Energy => "Consumo Energético",
        }
    }

    /// Section heading in the comparison view.
    pub fn comparison_title(self) -> &'static str {
        match self {
            VariableGroup::Thermal => "Térmica",
            VariableGroup::Voltage => "Tensão",
            VariableGroup::Current => "Corrente",
            VariableGroup::Energy => "Consumo Energético",
        }
    }

    /// Variables of this group in display order.
    pub fn variables(self) -> impl Iterator<Item = CanonicalVariable> {
        CanonicalVariable::ALL
            .into_iter()
            .filter(move |v| v.group() == self)
    }
}

// ── Canonical variables ───────────────────────────────────────────────────────

/// A fixed, human-readable sensor variable mapped to whatever column a file
/// actually uses for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalVariable {
    TemperaturaAmbiente,
    TemperaturaExterna,
    TempSuperaquecimento,
    TensaoA,
    TensaoB,
    TensaoC,
    CorrenteA,
    CorrenteB,
    CorrenteC,
    EnergiaAtiva,
}

impl CanonicalVariable {
    /// Every variable, in the order the overlay picker lists them.
    pub const ALL: [CanonicalVariable; 10] = [
        CanonicalVariable::TemperaturaAmbiente,
        CanonicalVariable::TemperaturaExterna,
        CanonicalVariable::TempSuperaquecimento,
        CanonicalVariable::TensaoA,
        CanonicalVariable::TensaoB,
        CanonicalVariable::TensaoC,
        CanonicalVariable::CorrenteA,
        CanonicalVariable::CorrenteB,
        CanonicalVariable::CorrenteC,
        CanonicalVariable::EnergiaAtiva,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            CanonicalVariable::TemperaturaAmbiente => "Temperatura Ambiente",
            CanonicalVariable::TemperaturaExterna => "Temperatura Externa",
            CanonicalVariable::TempSuperaquecimento => "Temp. Superaquecimento",
            CanonicalVariable::TensaoA => "Tensão A",
            CanonicalVariable::TensaoB => "Tensão B",
            CanonicalVariable::TensaoC => "Tensão C",
            CanonicalVariable::CorrenteA => "Corrente A",
            CanonicalVariable::CorrenteB => "Corrente B",
            CanonicalVariable::CorrenteC => "Corrente C",
            CanonicalVariable::EnergiaAtiva => "Energia Ativa",
        }
    }

    /// Lower-case substrings searched for in column labels, highest priority
    /// first.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            CanonicalVariable::TemperaturaAmbiente => &["temperatura ambiente"],
            CanonicalVariable::TemperaturaExterna => &["temperatura externa"],
            CanonicalVariable::TempSuperaquecimento => &["temperatura de superaquecimento"],
            CanonicalVariable::TensaoA => &["tensão a"],
            CanonicalVariable::TensaoB => &["tensão b"],
            CanonicalVariable::TensaoC => &["tensão c"],
            CanonicalVariable::CorrenteA => &["corrente a"],
            CanonicalVariable::CorrenteB => &["corrente b"],
            CanonicalVariable::CorrenteC => &["corrente c"],
            CanonicalVariable::EnergiaAtiva => &["energia ativa"],
        }
    }

    /// Title of the variable's own chart.
    pub fn chart_title(self) -> &'static str {
        match self {
            CanonicalVariable::TensaoA => "Tensão - Fase A",
            CanonicalVariable::TensaoB => "Tensão - Fase B",
            CanonicalVariable::TensaoC => "Tensão - Fase C",
            CanonicalVariable::CorrenteA => "Corrente - Fase A",
            CanonicalVariable::CorrenteB => "Corrente - Fase B",
            CanonicalVariable::CorrenteC => "Corrente - Fase C",
            other => other.display_name(),
        }
    }

    /// Title of the variable's chart in the comparison view.
    pub fn comparison_title(self) -> &'static str {
        match self {
            CanonicalVariable::EnergiaAtiva => "Energia Ativa (Acumulada)",
            other => other.chart_title(),
        }
    }

    /// Y-axis label.
    pub fn unit_label(self) -> &'static str {
        match self.group() {
            VariableGroup::Thermal => "°C",
            VariableGroup::Voltage => "Volts (V)",
            VariableGroup::Current => "Amperes (A)",
            VariableGroup::Energy => "Energia (kWh)",
        }
    }

    /// Line color of the variable's own chart.
    pub fn default_color(self) -> &'static str {
        match self {
            CanonicalVariable::TemperaturaAmbiente => "blue",
            CanonicalVariable::TemperaturaExterna => "red",
            CanonicalVariable::TempSuperaquecimento => "orange",
            CanonicalVariable::TensaoA => "#1f77b4",
            CanonicalVariable::TensaoB => "#ff7f0e",
            CanonicalVariable::TensaoC => "#2ca02c",
            CanonicalVariable::CorrenteA => "#9467bd",
            CanonicalVariable::CorrenteB => "#e377c2",
            CanonicalVariable::CorrenteC => "#8c564b",
            CanonicalVariable::EnergiaAtiva => "green",
        }
    }

    pub fn group(self) -> VariableGroup {
        match self {
            CanonicalVariable::TemperaturaAmbiente
            | CanonicalVariable::TemperaturaExterna
            | CanonicalVariable::TempSuperaquecimento => VariableGroup::Thermal,
            CanonicalVariable::TensaoA | CanonicalVariable::TensaoB | CanonicalVariable::TensaoC => {
                VariableGroup::Voltage
            }
            CanonicalVariable::CorrenteA
            | CanonicalVariable::CorrenteB
            | CanonicalVariable::CorrenteC => VariableGroup::Current,
            CanonicalVariable::EnergiaAtiva => VariableGroup::Energy,
        }
    }

    /// Resolve this variable against a list of lower-cased labels.
    pub fn find_in<'a, S: AsRef<str>>(self, columns: &'a [S]) -> Option<&'a str> {
        find_column(columns, self.keywords())
    }
}

impl fmt::Display for CanonicalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for CanonicalVariable {
    type Err = DashError;

    /// Accepts the display name or the primary keyword, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CanonicalVariable::ALL
            .into_iter()
            .find(|v| {
                v.display_name().to_lowercase() == wanted
                    || v.keywords().first().is_some_and(|k| *k == wanted)
            })
            .ok_or_else(|| DashError::UnknownVariable(s.to_string()))
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────────

/// A resolved column: its label and position in
/// [`CleanTable::column_names`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    pub name: String,
    pub index: usize,
}

/// Canonical variables present in one table, in [`CanonicalVariable::ALL`]
/// order. Absent variables are simply not listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableCatalog {
    entries: Vec<(CanonicalVariable, ColumnRef)>,
}

impl VariableCatalog {
    /// Resolve every canonical variable against `table`'s labels.
    pub fn resolve(table: &CleanTable) -> Self {
        Self::from_columns(&table.column_names())
    }

    /// Resolve against an explicit label list.
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        let entries = CanonicalVariable::ALL
            .into_iter()
            .filter_map(|variable| {
                let name = variable.find_in(columns)?;
                let index = columns.iter().position(|c| c.as_ref() == name)?;
                Some((
                    variable,
                    ColumnRef {
                        name: name.to_string(),
                        index,
                    },
                ))
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, variable: CanonicalVariable) -> Option<&ColumnRef> {
        self.entries
            .iter()
            .find(|(v, _)| *v == variable)
            .map(|(_, c)| c)
    }

    pub fn contains(&self, variable: CanonicalVariable) -> bool {
        self.get(variable).is_some()
    }

    /// Present variables in display order.
    pub fn variables(&self) -> impl Iterator<Item = CanonicalVariable> + '_ {
        self.entries.iter().map(|(v, _)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalVariable, &ColumnRef)> {
        self.entries.iter().map(|(v, c)| (*v, c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_column_single_keyword() {
        let cols = ["temperatura ambiente (°c)", "tensão a (v)"];
        assert_eq!(
            find_column(&cols, &["temperatura ambiente"]),
            Some("temperatura ambiente (°c)")
        );
    }

    #[test]
    fn test_find_column_falls_through_to_later_keyword() {
        let cols = ["data", "hora", "tensão b (v)"];
        assert_eq!(
            find_column(&cols, &["tensão a", "tensão b"]),
            Some("tensão b (v)")
        );
    }

    #[test]
    fn test_find_column_keyword_priority_beats_column_order() {
        let cols = ["corrente b", "corrente a"];
        assert_eq!(
            find_column(&cols, &["corrente a", "corrente b"]),
            Some("corrente a")
        );
    }

    #[test]
    fn test_find_column_first_column_wins_within_keyword() {
        let cols = ["energia ativa (kwh)", "energia ativa total"];
        assert_eq!(
            find_column(&cols, &["energia ativa"]),
            Some("energia ativa (kwh)")
        );
    }

    #[test]
    fn test_find_column_is_case_sensitive_and_absent() {
        let cols = ["Temperatura Ambiente"];
        assert_eq!(find_column(&cols, &["temperatura ambiente"]), None);
        let empty: [&str; 0] = [];
        assert_eq!(find_column(&empty, &["x"]), None);
    }

    #[test]
    fn test_variable_metadata() {
        let v = CanonicalVariable::TensaoB;
        assert_eq!(v.display_name(), "Tensão B");
        assert_eq!(v.chart_title(), "Tensão - Fase B");
        assert_eq!(v.unit_label(), "Volts (V)");
        assert_eq!(v.group(), VariableGroup::Voltage);
        assert_eq!(
            CanonicalVariable::EnergiaAtiva.comparison_title(),
            "Energia Ativa (Acumulada)"
        );
        assert_eq!(
            CanonicalVariable::TempSuperaquecimento.chart_title(),
            "Temp. Superaquecimento"
        );
    }

    #[test]
    fn test_group_variables_in_order() {
        let thermal: Vec<_> = VariableGroup::Thermal.variables().collect();
        assert_eq!(
            thermal,
            vec![
                CanonicalVariable::TemperaturaAmbiente,
                CanonicalVariable::TemperaturaExterna,
                CanonicalVariable::TempSuperaquecimento,
            ]
        );
        assert_eq!(VariableGroup::Energy.variables().count(), 1);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "tensão a".parse::<CanonicalVariable>().unwrap(),
            CanonicalVariable::TensaoA
        );
        assert_eq!(
            "ENERGIA ATIVA".parse::<CanonicalVariable>().unwrap(),
            CanonicalVariable::EnergiaAtiva
        );
        assert_eq!(
            "temp. superaquecimento".parse::<CanonicalVariable>().unwrap(),
            CanonicalVariable::TempSuperaquecimento
        );
        assert!("pressão".parse::<CanonicalVariable>().is_err());
    }

    #[test]
    fn test_catalog_from_columns() {
        let cols = [
            "data",
            "hora",
            "tensão a (v)",
            "temperatura ambiente (°c)",
            "energia ativa (kwh)",
            "Tempo",
        ];
        let catalog = VariableCatalog::from_columns(&cols);
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.variables().collect::<Vec<_>>(),
            vec![
                CanonicalVariable::TemperaturaAmbiente,
                CanonicalVariable::TensaoA,
                CanonicalVariable::EnergiaAtiva,
            ]
        );
        let tensao = catalog.get(CanonicalVariable::TensaoA).unwrap();
        assert_eq!(tensao.name, "tensão a (v)");
        assert_eq!(tensao.index, 2);
        assert!(!catalog.contains(CanonicalVariable::CorrenteC));
    }

    #[test]
    fn test_catalog_empty_when_nothing_matches() {
        let catalog = VariableCatalog::from_columns(&["a", "b", "c"]);
        assert!(catalog.is_empty());
    }
}
