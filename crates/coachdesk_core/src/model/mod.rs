mod application;
mod people;
mod task;

pub use application::{ApplicationStatus, HireDetails, HireRequest, JobApplication, JobPosting};
pub use people::{CoachIdentity, SeekerRef};
pub use task::{
    LeadTime, LeadUnit, Priority, Recurrence, RecurringFrequency, Task, TaskStatus, END_OF_DAY,
};

time::serde::format_description!(pub(crate) calendar_date, Date, "[year]-[month]-[day]");
time::serde::format_description!(pub(crate) time_of_day, Time, "[hour]:[minute]");

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
pub const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");
