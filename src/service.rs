//! Class and booking rules on top of the stores.
//!
//! Every operation runs inside a fault boundary: a panic raised while
//! handling one request is logged and reported as
//! [`ScheduleError::Internal`] instead of unwinding into the caller.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::models::Class;
use crate::repository::{BookingStore, ClassStore, StoreError};
use crate::validation::{is_date_in_range, parse_date, validate_date_order};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid start date format, expected YYYY-MM-DD")]
    InvalidStartDate,
    #[error("invalid end date format, expected YYYY-MM-DD")]
    InvalidEndDate,
    #[error("start date cannot be after end date")]
    InvalidStartEndDate,
    #[error("class already exists")]
    ClassAlreadyExists,
    #[error("invalid date format, expected YYYY-MM-DD")]
    InvalidDate,
    #[error("class not found")]
    ClassNotFound,
    #[error("date {date} is not valid for class {class_name}")]
    DateNotValidForClass { date: NaiveDate, class_name: String },
    #[error("internal server error")]
    Internal,
}

impl From<StoreError> for ScheduleError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::AlreadyExists => ScheduleError::ClassAlreadyExists,
        }
    }
}

pub trait SchedulingService: Send + Sync {
    fn create_class(
        &self,
        name: &str,
        start_date: &str,
        end_date: &str,
        capacity: u32,
    ) -> Result<(), ScheduleError>;

    fn book_class(
        &self,
        class_name: &str,
        member_name: &str,
        date: &str,
    ) -> Result<(), ScheduleError>;
}

#[derive(Clone)]
pub struct ClassService {
    classes: Arc<dyn ClassStore>,
    bookings: Arc<dyn BookingStore>,
}

impl ClassService {
    pub fn new(classes: Arc<dyn ClassStore>, bookings: Arc<dyn BookingStore>) -> Self {
        Self { classes, bookings }
    }

    fn try_create_class(
        &self,
        name: &str,
        start_date: &str,
        end_date: &str,
        capacity: u32,
    ) -> Result<(), ScheduleError> {
        let start = parse_date(start_date).map_err(|_| ScheduleError::InvalidStartDate)?;
        let end = parse_date(end_date).map_err(|_| ScheduleError::InvalidEndDate)?;
        validate_date_order(&start, &end).map_err(|_| ScheduleError::InvalidStartEndDate)?;

        self.classes.create(Class {
            name: name.to_string(),
            start_date: start,
            end_date: end,
            capacity,
        })?;
        info!(class = name, %start_date, %end_date, capacity, "Class created");
        Ok(())
    }

    fn try_book_class(
        &self,
        class_name: &str,
        member_name: &str,
        date: &str,
    ) -> Result<(), ScheduleError> {
        let date = parse_date(date).map_err(|_| ScheduleError::InvalidDate)?;
        let class = self
            .classes
            .get_by_name(class_name)
            .ok_or(ScheduleError::ClassNotFound)?;

        if !is_date_in_range(&date, &class.start_date, &class.end_date) {
            return Err(ScheduleError::DateNotValidForClass {
                date: date.date_naive(),
                class_name: class_name.to_string(),
            });
        }

        self.bookings.create(class_name, member_name, date);
        info!(class = class_name, member = member_name, date = %date.date_naive(), "Booking created");
        Ok(())
    }
}

impl SchedulingService for ClassService {
    fn create_class(
        &self,
        name: &str,
        start_date: &str,
        end_date: &str,
        capacity: u32,
    ) -> Result<(), ScheduleError> {
        guarded("create_class", || {
            self.try_create_class(name, start_date, end_date, capacity)
        })
    }

    fn book_class(
        &self,
        class_name: &str,
        member_name: &str,
        date: &str,
    ) -> Result<(), ScheduleError> {
        guarded("book_class", || self.try_book_class(class_name, member_name, date))
    }
}

fn guarded<T>(
    operation: &'static str,
    f: impl FnOnce() -> Result<T, ScheduleError>,
) -> Result<T, ScheduleError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            debug!(operation, error = %err, "Request rejected");
            Err(err)
        }
        Err(payload) => {
            error!(
                operation,
                panic = panic_message(&*payload),
                "Panic recovered"
            );
            Err(ScheduleError::Internal)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use chrono::{DateTime, Utc};

    use super::*;
    use crate::repository::{InMemoryBookingStore, InMemoryClassStore};

    struct Fixture {
        classes: Arc<InMemoryClassStore>,
        bookings: Arc<InMemoryBookingStore>,
        service: ClassService,
    }

    fn fixture() -> Fixture {
        let classes = Arc::new(InMemoryClassStore::new());
        let bookings = Arc::new(InMemoryBookingStore::new());
        let service = ClassService::new(classes.clone(), bookings.clone());
        Fixture {
            classes,
            bookings,
            service,
        }
    }

    fn day(value: &str) -> DateTime<Utc> {
        parse_date(value).unwrap()
    }

    struct PanickingClassStore;

    impl ClassStore for PanickingClassStore {
        fn create(&self, _class: Class) -> Result<(), StoreError> {
            panic!("class store exploded");
        }

        fn get_by_name(&self, _name: &str) -> Option<Class> {
            panic!("class store exploded");
        }
    }

    #[test]
    fn test_create_class_stores_fields() {
        let f = fixture();
        f.service
            .create_class("Yoga", "2025-06-01", "2025-06-20", 10)
            .unwrap();

        let class = f.classes.get_by_name("Yoga").unwrap();
        assert_eq!(class.name, "Yoga");
        assert_eq!(class.start_date, day("2025-06-01"));
        assert_eq!(class.end_date, day("2025-06-20"));
        assert_eq!(class.capacity, 10);
    }

    #[test]
    fn test_create_class_same_start_and_end() {
        let f = fixture();
        assert!(f.service.create_class("Spin", "2025-06-01", "2025-06-01", 5).is_ok());
    }

    #[test]
    fn test_create_class_invalid_dates() {
        let f = fixture();
        assert_eq!(
            f.service.create_class("Yoga", "2025-06-01T00:00:00Z", "2025-06-20", 10),
            Err(ScheduleError::InvalidStartDate)
        );
        assert_eq!(
            f.service.create_class("Yoga", "2025-06-01", "2025/06/20", 10),
            Err(ScheduleError::InvalidEndDate)
        );
        assert_eq!(
            f.service.create_class("Yoga", "2025-06-21", "2025-06-01", 10),
            Err(ScheduleError::InvalidStartEndDate)
        );
        assert!(f.classes.is_empty());
    }

    #[test]
    fn test_create_class_twice_conflicts() {
        let f = fixture();
        f.service
            .create_class("Yoga", "2025-06-01", "2025-06-20", 10)
            .unwrap();
        assert_eq!(
            f.service.create_class("Yoga", "2025-07-01", "2025-07-20", 3),
            Err(ScheduleError::ClassAlreadyExists)
        );

        let class = f.classes.get_by_name("Yoga").unwrap();
        assert_eq!(class.start_date, day("2025-06-01"));
        assert_eq!(class.capacity, 10);
    }

    #[test]
    fn test_book_class_happy_path_and_endpoints() {
        let f = fixture();
        f.service
            .create_class("Yoga", "2025-06-01", "2025-06-20", 10)
            .unwrap();

        for date in ["2025-06-01", "2025-06-10", "2025-06-20"] {
            f.service.book_class("Yoga", "Alice", date).unwrap();
            assert_eq!(f.bookings.members("Yoga", day(date)), vec!["Alice"]);
        }
    }

    #[test]
    fn test_book_class_outside_range() {
        let f = fixture();
        f.service
            .create_class("Yoga", "2025-06-01", "2025-06-20", 10)
            .unwrap();

        let err = f.service.book_class("Yoga", "Alice", "2025-06-21").unwrap_err();
        assert_eq!(err.to_string(), "date 2025-06-21 is not valid for class Yoga");

        let err = f.service.book_class("Yoga", "Alice", "2025-05-31").unwrap_err();
        assert_eq!(err.to_string(), "date 2025-05-31 is not valid for class Yoga");

        assert_eq!(f.bookings.booked_days("Yoga"), 0);
    }

    #[test]
    fn test_book_class_unknown_class() {
        let f = fixture();
        assert_eq!(
            f.service.book_class("Pilates", "Alice", "2025-06-05"),
            Err(ScheduleError::ClassNotFound)
        );
        assert_eq!(f.bookings.booked_days("Pilates"), 0);
    }

    #[test]
    fn test_book_class_invalid_date() {
        let f = fixture();
        f.service
            .create_class("Yoga", "2025-06-01", "2025-06-20", 10)
            .unwrap();
        assert_eq!(
            f.service.book_class("Yoga", "Alice", "2025/06/05"),
            Err(ScheduleError::InvalidDate)
        );
    }

    #[test]
    fn test_book_class_allows_repeat_member_and_ignores_capacity() {
        let f = fixture();
        f.service
            .create_class("Yoga", "2025-06-01", "2025-06-20", 1)
            .unwrap();
        f.service.book_class("Yoga", "Alice", "2025-06-05").unwrap();
        f.service.book_class("Yoga", "Alice", "2025-06-05").unwrap();
        f.service.book_class("Yoga", "Bob", "2025-06-05").unwrap();
        assert_eq!(
            f.bookings.members("Yoga", day("2025-06-05")),
            vec!["Alice", "Alice", "Bob"]
        );
    }

    #[test]
    fn test_panics_become_internal_errors() {
        let service = ClassService::new(
            Arc::new(PanickingClassStore),
            Arc::new(InMemoryBookingStore::new()),
        );
        assert_eq!(
            service.create_class("Yoga", "2025-06-01", "2025-06-20", 10),
            Err(ScheduleError::Internal)
        );
        assert_eq!(
            service.book_class("Yoga", "Alice", "2025-06-05"),
            Err(ScheduleError::Internal)
        );
        // validation still runs before the store is touched
        assert_eq!(
            service.create_class("Yoga", "bad", "2025-06-20", 10),
            Err(ScheduleError::InvalidStartDate)
        );
    }

    #[test]
    fn test_concurrent_create_class_single_winner() {
        let f = fixture();
        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    s.spawn(|| f.service.create_class("Yoga", "2025-06-01", "2025-06-20", 10))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| **r == Err(ScheduleError::ClassAlreadyExists))
                .count(),
            15
        );
    }

    #[test]
    fn test_concurrent_bookings_are_all_recorded() {
        let f = fixture();
        f.service
            .create_class("Yoga", "2025-06-01", "2025-06-20", 10)
            .unwrap();

        thread::scope(|s| {
            for i in 0..32 {
                let service = &f.service;
                s.spawn(move || {
                    service
                        .book_class("Yoga", &format!("member-{i}"), "2025-06-05")
                        .unwrap()
                });
            }
        });

        let members = f.bookings.members("Yoga", day("2025-06-05"));
        assert_eq!(members.len(), 32);
        for i in 0..32 {
            assert!(members.contains(&format!("member-{i}")));
        }
    }
}
