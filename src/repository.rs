use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::Class;
use crate::validation::to_midnight_utc;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("class already exists")]
    AlreadyExists,
}

pub trait ClassStore: Send + Sync {
    /// Inserts `class` unless one with the same name is already stored.
    fn create(&self, class: Class) -> Result<(), StoreError>;
    fn get_by_name(&self, name: &str) -> Option<Class>;
}

pub trait BookingStore: Send + Sync {
    /// Appends `member_name` to the bookings of `class_name` on the day of `date`.
    fn create(&self, class_name: &str, member_name: &str, date: DateTime<Utc>);
}

#[derive(Debug, Default)]
pub struct InMemoryClassStore {
    classes: RwLock<HashMap<String, Class>>,
}

impl InMemoryClassStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl InMemoryClassStore {
    pub(crate) fn len(&self) -> usize {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClassStore for InMemoryClassStore {
    fn create(&self, class: Class) -> Result<(), StoreError> {
        // Check and insert under one write guard.
        let mut classes = self.classes.write().unwrap_or_else(PoisonError::into_inner);
        if classes.contains_key(&class.name) {
            return Err(StoreError::AlreadyExists);
        }
        classes.insert(class.name.clone(), class);
        Ok(())
    }

    fn get_by_name(&self, name: &str) -> Option<Class> {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

/// class name -> day (midnight UTC) -> members in booking order
type BookingIndex = HashMap<String, HashMap<DateTime<Utc>, Vec<String>>>;

#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    bookings: RwLock<BookingIndex>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl InMemoryBookingStore {
    /// Members booked into `class_name` on the day of `date`, in booking order.
    pub(crate) fn members(&self, class_name: &str, date: DateTime<Utc>) -> Vec<String> {
        let date = to_midnight_utc(&date);
        self.bookings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(class_name)
            .and_then(|days| days.get(&date))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of distinct days that have at least one booking for `class_name`.
    pub(crate) fn booked_days(&self, class_name: &str) -> usize {
        self.bookings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(class_name)
            .map_or(0, HashMap::len)
    }
}

impl BookingStore for InMemoryBookingStore {
    fn create(&self, class_name: &str, member_name: &str, date: DateTime<Utc>) {
        let mut bookings = self.bookings.write().unwrap_or_else(PoisonError::into_inner);
        let date = to_midnight_utc(&date);
        bookings
            .entry(class_name.to_string())
            .or_default()
            .entry(date)
            .or_default()
            .push(member_name.to_string());
    }
}
