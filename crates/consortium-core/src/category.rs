use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::ConsortiumError;
use crate::types::Rate;
use crate::ConsortiumResult;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Consortium product line. Selects the fee table used by a simulation.
///
/// Serialises as its snake_case key; deserialises through `FromStr`, so JSON
/// and config files accept the same labels as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Vehicle,
    RealEstate,
    Electronics,
    Services,
    Boat,
    Solar,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Vehicle,
        Category::RealEstate,
        Category::Electronics,
        Category::Services,
        Category::Boat,
        Category::Solar,
    ];

    /// Canonical snake_case key, as used in configuration files.
    pub fn key(self) -> &'static str {
        match self {
            Category::Vehicle => "vehicle",
            Category::RealEstate => "real_estate",
            Category::Electronics => "electronics",
            Category::Services => "services",
            Category::Boat => "boat",
            Category::Solar => "solar",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = ConsortiumError;

    /// Accepts the canonical keys and the Portuguese labels used on the site
    /// forms, case-insensitively, with or without accents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalised.as_str() {
            "vehicle" | "auto" | "automovel" | "automóvel" => Ok(Category::Vehicle),
            "real_estate" | "imovel" | "imóvel" => Ok(Category::RealEstate),
            "electronics" | "eletronicos" | "eletrônicos" => Ok(Category::Electronics),
            "services" | "servicos" | "serviços" => Ok(Category::Services),
            "boat" | "embarcacao" | "embarcação" | "nautico" | "náutico" => Ok(Category::Boat),
            "solar" | "energia_solar" => Ok(Category::Solar),
            _ => Err(ConsortiumError::InvalidCategory(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Fee tables
// ---------------------------------------------------------------------------

/// Charges levied by the administrator, all as rates on the gross credit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTable {
    /// One-time fixed reserve fund ("fundo de reserva").
    pub reserve_fund_rate: Rate,
    /// One-time administration tax ("taxa de administração").
    pub admin_tax_rate: Rate,
    /// Monthly life insurance.
    pub life_insurance_rate: Rate,
    /// Monthly damage insurance.
    pub damage_insurance_rate: Rate,
}

impl FeeTable {
    pub fn monthly_insurance_rate(&self) -> Rate {
        self.life_insurance_rate + self.damage_insurance_rate
    }

    pub fn validate(&self, category: Category) -> ConsortiumResult<()> {
        let rates = [
            ("reserve_fund_rate", self.reserve_fund_rate),
            ("admin_tax_rate", self.admin_tax_rate),
            ("life_insurance_rate", self.life_insurance_rate),
            ("damage_insurance_rate", self.damage_insurance_rate),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(ConsortiumError::InvalidInput {
                    field: format!("fees.{category}.{name}"),
                    reason: format!("Rate must be in [0, 1), got {rate}"),
                });
            }
        }
        Ok(())
    }
}

/// Fee tables keyed by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeSchedule {
    tables: BTreeMap<Category, FeeTable>,
}

impl FeeSchedule {
    /// An empty schedule. Every lookup fails until tables are inserted.
    pub fn empty() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, category: Category, table: FeeTable) -> Option<FeeTable> {
        self.tables.insert(category, table)
    }

    /// Fee table for `category`, or `InvalidCategory` when none is configured.
    pub fn table_for(&self, category: Category) -> ConsortiumResult<&FeeTable> {
        self.tables.get(&category).ok_or_else(|| {
            ConsortiumError::InvalidCategory(format!("no fee table configured for '{category}'"))
        })
    }

    /// Overlay `other` on top of this schedule, replacing matching categories.
    pub fn merge(&mut self, other: FeeSchedule) {
        self.tables.extend(other.tables);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, &FeeTable)> + '_ {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn validate(&self) -> ConsortiumResult<()> {
        for (category, table) in &self.tables {
            table.validate(*category)?;
        }
        Ok(())
    }
}

impl Default for FeeSchedule {
    /// Published rates of the broker's partner administrator.
    fn default() -> Self {
        let table = |admin_tax_rate: Rate| FeeTable {
            reserve_fund_rate: dec!(0.005),
            admin_tax_rate,
            life_insurance_rate: dec!(0.0012),
            damage_insurance_rate: dec!(0.0007),
        };

        let tables = Category::ALL
            .into_iter()
            .map(|category| {
                let admin = match category {
                    Category::Vehicle => dec!(0.16),
                    Category::RealEstate => dec!(0.15),
                    Category::Electronics => dec!(0.17),
                    Category::Services => dec!(0.17),
                    Category::Boat => dec!(0.16),
                    Category::Solar => dec!(0.15),
                };
                (category, table(admin))
            })
            .collect();

        Self { tables }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
