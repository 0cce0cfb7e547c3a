//! `created_at` / `updated_at` maintenance.

use crate::model::Model;
use chrono::{Local, NaiveDateTime};
use tinymodel_core::{Entity, Result, Value};

impl<E: Entity> Model<E> {
    pub fn uses_timestamps(&self) -> bool {
        self.timestamps
    }

    /// Turn timestamp maintenance on or off for this instance.
    pub fn set_use_timestamps(&mut self, value: bool) -> &mut Self {
        self.timestamps = value;
        let dates = self.get_dates();
        self.transformer = self.transformer.clone().with_dates(dates);
        self
    }

    pub fn get_created_at_column(&self) -> &'static str {
        E::config().created_at
    }

    pub fn get_updated_at_column(&self) -> &'static str {
        E::config().updated_at
    }

    /// `created_at` column prefixed with the table, empty when disabled.
    pub fn get_qualified_created_at_column(&self) -> String {
        self.qualify_timestamp(self.get_created_at_column())
    }

    /// `updated_at` column prefixed with the table, empty when disabled.
    pub fn get_qualified_updated_at_column(&self) -> String {
        self.qualify_timestamp(self.get_updated_at_column())
    }

    fn qualify_timestamp(&self, column: &str) -> String {
        if column.is_empty() {
            return String::new();
        }
        self.qualify_column(column)
    }

    pub fn fresh_timestamp(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    /// Current time in the storage date format.
    pub fn fresh_timestamp_string(&self) -> String {
        self.transformer().format_datetime(&self.fresh_timestamp())
    }

    pub fn set_created_at(&mut self, value: impl Into<Value>) -> &mut Self {
        let column = self.get_created_at_column();
        self.set_attribute(column, value)
    }

    pub fn set_updated_at(&mut self, value: impl Into<Value>) -> &mut Self {
        let column = self.get_updated_at_column();
        self.set_attribute(column, value)
    }

    /// Stamp the timestamp columns the caller has not set explicitly.
    ///
    /// `created_at` is only stamped on models that do not exist yet.
    pub fn update_timestamps(&mut self) -> &mut Self {
        let time = self.fresh_timestamp();

        let updated_at = self.get_updated_at_column();
        if !updated_at.is_empty() && !self.is_dirty_any(&[updated_at]) {
            self.set_updated_at(time);
        }

        let created_at = self.get_created_at_column();
        if !self.exists && !created_at.is_empty() && !self.is_dirty_any(&[created_at]) {
            self.set_created_at(time);
        }
        self
    }

    /// Stamp `updated_at` and save.
    ///
    /// Returns `false` without a query when timestamps are off.
    pub fn touch(&mut self) -> Result<bool> {
        if !self.uses_timestamps() {
            return Ok(false);
        }
        self.update_timestamps();
        self.save(crate::SaveOptions::default())
    }
}
