//! The `Entity` trait and its declarative configuration.
//!
//! An entity type names a table and declares how models of that table behave:
//! which attributes may be mass assigned, which are dates, whether timestamps
//! are maintained, and so on. `#[derive(Entity)]` generates the impl.

use crate::attributes::AttributeItem;

/// Default name of the creation timestamp column.
pub const CREATED_AT: &str = "created_at";
/// Default name of the update timestamp column.
pub const UPDATED_AT: &str = "updated_at";

/// Class-level configuration shared by all models of one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelConfig {
    /// Connection name; `None` uses the resolver's default connection.
    pub connection: Option<&'static str>,
    /// Whether the primary key is generated by the database.
    pub incrementing: bool,
    /// Whether `created_at` / `updated_at` are maintained on save.
    pub timestamps: bool,
    /// Creation timestamp column. Empty disables stamping it.
    pub created_at: &'static str,
    /// Update timestamp column. Empty disables stamping it.
    pub updated_at: &'static str,
    /// Storage date format (chrono strftime); `None` defers to the connection.
    pub date_format: Option<&'static str>,
    /// Attributes cast to date/time.
    pub dates: &'static [&'static str],
    /// Attributes that may be mass assigned.
    pub fillable: &'static [&'static str],
    /// Attributes that may not be mass assigned. `["*"]` guards everything.
    pub guarded: &'static [&'static str],
    /// Relations whose owners are touched when this model is saved.
    pub touches: &'static [&'static str],
}

impl ModelConfig {
    pub const fn new() -> Self {
        Self {
            connection: None,
            incrementing: true,
            timestamps: true,
            created_at: CREATED_AT,
            updated_at: UPDATED_AT,
            date_format: None,
            dates: &[],
            fillable: &[],
            guarded: &["*"],
            touches: &[],
        }
    }

    pub const fn connection(mut self, name: &'static str) -> Self {
        self.connection = Some(name);
        self
    }

    pub const fn incrementing(mut self, value: bool) -> Self {
        self.incrementing = value;
        self
    }

    pub const fn timestamps(mut self, value: bool) -> Self {
        self.timestamps = value;
        self
    }

    pub const fn created_at(mut self, column: &'static str) -> Self {
        self.created_at = column;
        self
    }

    pub const fn updated_at(mut self, column: &'static str) -> Self {
        self.updated_at = column;
        self
    }

    pub const fn date_format(mut self, format: &'static str) -> Self {
        self.date_format = Some(format);
        self
    }

    pub const fn dates(mut self, dates: &'static [&'static str]) -> Self {
        self.dates = dates;
        self
    }

    pub const fn fillable(mut self, fillable: &'static [&'static str]) -> Self {
        self.fillable = fillable;
        self
    }

    pub const fn guarded(mut self, guarded: &'static [&'static str]) -> Self {
        self.guarded = guarded;
        self
    }

    pub const fn touches(mut self, touches: &'static [&'static str]) -> Self {
        self.touches = touches;
        self
    }

    /// Attributes cast to date/time with timestamps enabled or disabled.
    ///
    /// The timestamp columns are appended (when non-empty and not already listed)
    /// only while `timestamps` is on.
    pub fn date_attributes(&self, timestamps: bool) -> Vec<String> {
        let mut dates: Vec<String> = Vec::with_capacity(self.dates.len() + 2);
        for &date in self.dates {
            if !dates.iter().any(|d| d == date) {
                dates.push(date.to_owned());
            }
        }
        if timestamps {
            for column in [self.created_at, self.updated_at] {
                if !column.is_empty() && !dates.iter().any(|d| d == column) {
                    dates.push(column.to_owned());
                }
            }
        }
        dates
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A database-backed entity type.
pub trait Entity: 'static {
    /// Table the entity maps to.
    const TABLE_NAME: &'static str;

    /// Primary key column. An empty name means the entity has no primary key.
    const PRIMARY_KEY: &'static str = "id";

    fn config() -> ModelConfig {
        ModelConfig::new()
    }

    /// Attributes every new instance starts with.
    fn default_attributes() -> Vec<AttributeItem> {
        Vec::new()
    }

    /// Short type name used in messages and the guardable column cache key.
    fn model_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }
}

/// Convert `CamelCase` to `snake_case`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.char_indices() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
