//! Scenario files: a warehouse, its rules and demands, referenced by name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use stockres_core::{
    Attributes, DomainError, LocationId, PackagingTypeId, Predicate, ProductId, Quantity, RuleId,
};
use stockres_engine::{Allocator, EngineConfig};
use stockres_inventory::{InMemoryQuantStore, Packaging, ProductCatalog, Quant};
use stockres_locations::LocationTree;
use stockres_rules::{Demand, RemovalRule, RemovalStrategy, ReserveRule, RuleBook};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML scenario: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported scenario format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error("unknown {kind} '{name}'")]
    UnknownReference { kind: &'static str, name: String },

    #[error("duplicate {kind} '{name}'")]
    Duplicate { kind: &'static str, name: String },

    #[error("{context}: {source}")]
    Domain {
        context: String,
        source: DomainError,
    },
}

impl ScenarioError {
    fn unknown(kind: &'static str, name: &str) -> Self {
        Self::UnknownReference {
            kind,
            name: name.to_string(),
        }
    }

    fn domain(context: impl Into<String>) -> impl FnOnce(DomainError) -> Self {
        let context = context.into();
        move |source| Self::Domain { context, source }
    }
}

/// On-disk scenario layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub locations: Vec<LocationEntry>,
    #[serde(default)]
    pub packaging_types: Vec<PackagingTypeEntry>,
    #[serde(default)]
    pub products: Vec<ProductEntry>,
    #[serde(default)]
    pub quants: Vec<QuantEntry>,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
    #[serde(default)]
    pub demands: Vec<DemandEntry>,
}

/// A location; `parent` is the parent's complete name (`WH/Stock`).
/// Parents must be listed before their children.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationEntry {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackagingTypeEntry {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub sequence: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductEntry {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub packagings: Vec<PackagingEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackagingEntry {
    pub name: String,
    pub quantity: Decimal,
    /// Packaging type code.
    #[serde(default)]
    pub packaging_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuantEntry {
    pub product: String,
    pub location: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub lot: Option<String>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub in_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    pub name: String,
    #[serde(default)]
    pub sequence: i32,
    pub location: String,
    #[serde(default)]
    pub fallback_location: Option<String>,
    #[serde(default)]
    pub rule_domain: Predicate,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub removals: Vec<RemovalEntry>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemovalEntry {
    pub location: String,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default)]
    pub strategy: StrategyEntry,
    #[serde(default)]
    pub quant_domain: Predicate,
}

/// Removal strategy with packaging types referenced by code.
#[derive(Debug, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyEntry {
    #[default]
    #[serde(alias = "default")]
    Plain,
    EmptyBin,
    Packaging {
        #[serde(default)]
        packaging_types: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemandEntry {
    pub name: String,
    pub product: String,
    pub quantity: Decimal,
    pub source: String,
    #[serde(default)]
    pub attributes: Attributes,
}

/// A demand with the name it was given in the scenario.
#[derive(Debug, Clone)]
pub struct NamedDemand {
    pub name: String,
    pub demand: Demand,
}

/// A fully resolved scenario, ready to allocate.
#[derive(Debug)]
pub struct Scenario {
    pub tree: LocationTree,
    pub catalog: ProductCatalog,
    pub quants: InMemoryQuantStore,
    pub rules: RuleBook,
    pub demands: Vec<NamedDemand>,
    pub config: EngineConfig,
}

impl Scenario {
    /// Load a `.toml` or `.json` scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let file = match extension.as_str() {
            "toml" => ScenarioFile::from_toml(&raw)?,
            "json" => ScenarioFile::from_json(&raw)?,
            other => return Err(ScenarioError::UnsupportedFormat(other.to_string())),
        };
        tracing::debug!(path = %path.display(), "loaded scenario file");
        file.resolve()
    }

    pub fn allocator(&self) -> Allocator<'_, &InMemoryQuantStore> {
        Allocator::new(&self.tree, &self.quants, &self.catalog, self.rules.rules())
            .with_config(self.config.clone())
    }

    pub fn demand(&self, name: &str) -> Option<&NamedDemand> {
        self.demands.iter().find(|d| d.name == name)
    }

    pub fn location_name(&self, id: LocationId) -> String {
        self.tree
            .get(id)
            .map(|l| l.complete_name.clone())
            .unwrap_or_else(|_| id.to_string())
    }

    pub fn product_name(&self, id: ProductId) -> String {
        self.catalog
            .product(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|_| id.to_string())
    }

    pub fn rule_name(&self, id: RuleId) -> String {
        self.rules
            .get(id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|_| id.to_string())
    }
}

impl ScenarioFile {
    pub fn from_toml(raw: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Resolve names to identifiers and validate every rule.
    pub fn resolve(self) -> Result<Scenario, ScenarioError> {
        let mut names = Names::default();

        let mut builder = LocationTree::builder();
        for entry in &self.locations {
            let (id, complete_name) = match &entry.parent {
                None => (builder.add_root(entry.name.as_str()), entry.name.clone()),
                Some(parent) => {
                    let parent_id = names.location(parent)?;
                    let id = builder
                        .add_child(parent_id, entry.name.as_str())
                        .map_err(ScenarioError::domain(format!("location '{}'", entry.name)))?;
                    (id, format!("{parent}/{}", entry.name))
                }
            };
            insert_unique(&mut names.locations, "location", complete_name, id)?;
        }
        let tree = builder.build();

        let mut catalog = ProductCatalog::new();
        for entry in &self.packaging_types {
            let id = catalog.add_packaging_type(entry.name.as_str(), entry.code.as_str(), entry.sequence);
            insert_unique(&mut names.packaging_types, "packaging type", entry.code.clone(), id)?;
        }
        for entry in &self.products {
            let id = catalog.add_product(entry.name.as_deref().unwrap_or(&entry.code));
            insert_unique(&mut names.products, "product", entry.code.clone(), id)?;
            for packaging in &entry.packagings {
                let packaging_type = packaging
                    .packaging_type
                    .as_deref()
                    .map(|code| names.packaging_type(code))
                    .transpose()?;
                catalog
                    .add_packaging(
                        id,
                        Packaging {
                            name: packaging.name.clone(),
                            quantity: packaging.quantity,
                            packaging_type,
                        },
                    )
                    .map_err(ScenarioError::domain(format!("product '{}'", entry.code)))?;
            }
        }

        let quants = InMemoryQuantStore::new();
        for entry in self.quants {
            let mut quant = Quant::new(
                names.product(&entry.product)?,
                names.location(&entry.location)?,
                entry.quantity,
            );
            if let Some(lot) = entry.lot {
                quant = quant.with_lot(lot);
            }
            if let Some(package) = entry.package {
                quant = quant.with_package(package);
            }
            if let Some(in_date) = entry.in_date {
                quant = quant.with_in_date(in_date);
            }
            quant.attributes.extend(entry.attributes);
            quants.add(quant);
        }

        let mut rules = RuleBook::new();
        for entry in self.rules {
            let rule = names.rule(entry)?;
            let name = rule.name.clone();
            rules
                .create(rule, &tree)
                .map_err(ScenarioError::domain(format!("rule '{name}'")))?;
        }

        let mut demands = Vec::with_capacity(self.demands.len());
        for entry in self.demands {
            if demands.iter().any(|d: &NamedDemand| d.name == entry.name) {
                return Err(ScenarioError::Duplicate {
                    kind: "demand",
                    name: entry.name,
                });
            }
            let context = format!("demand '{}'", entry.name);
            let quantity = Quantity::new(entry.quantity)
                .map_err(ScenarioError::domain(context.clone()))?;
            let mut demand = Demand::new(
                names.product(&entry.product)?,
                quantity,
                names.location(&entry.source)?,
            )
            .map_err(ScenarioError::domain(context))?
            .with_attribute("product", entry.product.as_str());
            for (key, value) in entry.attributes {
                demand = demand.with_attribute(key, value);
            }
            demands.push(NamedDemand {
                name: entry.name,
                demand,
            });
        }

        tracing::info!(
            locations = tree.len(),
            rules = rules.len(),
            demands = demands.len(),
            "scenario resolved"
        );
        Ok(Scenario {
            tree,
            catalog,
            quants,
            rules,
            demands,
            config: self.engine,
        })
    }
}

fn insert_unique<T>(
    map: &mut HashMap<String, T>,
    kind: &'static str,
    name: String,
    value: T,
) -> Result<(), ScenarioError> {
    if map.contains_key(&name) {
        return Err(ScenarioError::Duplicate { kind, name });
    }
    map.insert(name, value);
    Ok(())
}

/// Name → identifier lookups built while resolving.
#[derive(Default)]
struct Names {
    locations: HashMap<String, LocationId>,
    products: HashMap<String, ProductId>,
    packaging_types: HashMap<String, PackagingTypeId>,
}

impl Names {
    fn location(&self, name: &str) -> Result<LocationId, ScenarioError> {
        self.locations
            .get(name)
            .copied()
            .ok_or_else(|| ScenarioError::unknown("location", name))
    }

    fn product(&self, code: &str) -> Result<ProductId, ScenarioError> {
        self.products
            .get(code)
            .copied()
            .ok_or_else(|| ScenarioError::unknown("product", code))
    }

    fn packaging_type(&self, code: &str) -> Result<PackagingTypeId, ScenarioError> {
        self.packaging_types
            .get(code)
            .copied()
            .ok_or_else(|| ScenarioError::unknown("packaging type", code))
    }

    fn rule(&self, entry: RuleEntry) -> Result<ReserveRule, ScenarioError> {
        let mut rule = ReserveRule::new(entry.name, self.location(&entry.location)?)
            .with_sequence(entry.sequence)
            .with_domain(entry.rule_domain);
        if let Some(fallback) = &entry.fallback_location {
            rule = rule.with_fallback(self.location(fallback)?);
        }
        rule.active = entry.active;

        for removal in entry.removals {
            let strategy = match removal.strategy {
                StrategyEntry::Plain => RemovalStrategy::Plain,
                StrategyEntry::EmptyBin => RemovalStrategy::EmptyBin,
                StrategyEntry::Packaging { packaging_types } => RemovalStrategy::Packaging {
                    packaging_types: packaging_types
                        .iter()
                        .map(|code| self.packaging_type(code))
                        .collect::<Result<_, _>>()?,
                },
            };
            rule = rule.with_removal(
                RemovalRule::new(self.location(&removal.location)?)
                    .with_sequence(removal.sequence)
                    .with_strategy(strategy)
                    .with_quant_domain(removal.quant_domain),
            );
        }
        Ok(rule)
    }
}
