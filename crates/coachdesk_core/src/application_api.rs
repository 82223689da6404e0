//! Job application pipeline: creation, notes, and status transitions.
//!
//! `hired` and `rejected` are terminal. Any other status may move to any
//! status; the pipeline order is for display only. Moving to `hired` needs a
//! [`HireRequest`] with the start date, job title and weekly hours.

use crate::error::AppError;
use crate::model::{
    ApplicationStatus, HireDetails, HireRequest, JobApplication, JobPosting, SeekerRef,
};
use crate::notify::Notifier;
use crate::storage::{ApplicationStore, application_not_found, next_id};
use std::collections::HashSet;
use time::{Date, OffsetDateTime};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub job_title: String,
    pub company: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub seeker: Option<SeekerRef>,
    /// Defaults to the date of `now`.
    pub applied_date: Option<Date>,
    pub notes: String,
}

#[derive(Debug)]
pub struct TransitionOutcome {
    pub application: JobApplication,
    pub previous: ApplicationStatus,
    /// Set when the hire celebration could not be delivered. The transition
    /// itself is committed either way.
    pub celebration_error: Option<AppError>,
}

/// Applies a status change to an application in place.
///
/// On error the application is left untouched.
pub fn set_status(
    app: &mut JobApplication,
    new_status: ApplicationStatus,
    hire: Option<HireRequest>,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    if app.status.is_terminal() {
        return Err(AppError::invalid_transition(format!(
            "application is already {}",
            app.status
        )));
    }

    let hired = match (new_status, hire) {
        (ApplicationStatus::Hired, Some(request)) => Some(hire_details(request)?),
        (ApplicationStatus::Hired, None) => {
            return Err(AppError::incomplete_data(
                "hire details are required to mark an application hired",
            ));
        }
        (_, Some(_)) => {
            return Err(AppError::validation(
                "hire details are only accepted for the hired status",
            ));
        }
        (_, None) => None,
    };

    app.status = new_status;
    app.hired = hired;
    app.last_updated = now;
    Ok(())
}

/// Attaches the optional success story to a hired application.
pub fn add_success_story(
    app: &mut JobApplication,
    story: &str,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    let story = story.trim();
    if story.is_empty() {
        return Err(AppError::validation("success story is required"));
    }
    let hired = app.hired.as_mut().ok_or_else(|| {
        AppError::invalid_transition("success stories can only be added to hired applications")
    })?;
    hired.success_story = Some(story.to_string());
    app.last_updated = now;
    Ok(())
}

fn hire_details(request: HireRequest) -> Result<HireDetails, AppError> {
    let start_date = request
        .start_date
        .ok_or_else(|| AppError::incomplete_data("start date is required"))?;
    let job_title = request
        .job_title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or_else(|| AppError::incomplete_data("job title is required"))?;
    let hours_per_week = request
        .hours_per_week
        .ok_or_else(|| AppError::incomplete_data("hours per week is required"))?;

    if hours_per_week == 0 || hours_per_week > 168 {
        return Err(AppError::validation(
            "hours per week must be between 1 and 168",
        ));
    }
    if let Some(wage) = request.hourly_wage
        && !(wage.is_finite() && wage > 0.0)
    {
        return Err(AppError::validation("hourly wage must be a positive amount"));
    }

    Ok(HireDetails {
        start_date,
        job_title,
        hourly_wage: request.hourly_wage,
        hours_per_week,
        success_story: None,
    })
}

pub fn create_application<S: ApplicationStore + ?Sized>(
    store: &mut S,
    input: NewApplication,
    now: OffsetDateTime,
) -> Result<JobApplication, AppError> {
    let job_title = input.job_title.trim();
    if job_title.is_empty() {
        return Err(AppError::validation("job title is required"));
    }
    let company = input.company.trim();
    if company.is_empty() {
        return Err(AppError::validation("company is required"));
    }

    let existing: HashSet<String> = store
        .applications()?
        .into_iter()
        .map(|app| app.id)
        .collect();
    let application = JobApplication {
        id: next_id("app", |id| existing.contains(id)),
        job: JobPosting {
            title: job_title.to_string(),
            company: company.to_string(),
            source: non_blank(input.source),
            url: non_blank(input.url),
        },
        seeker: input.seeker,
        applied_date: input.applied_date.unwrap_or(now.date()),
        last_updated: now,
        notes: input.notes.trim().to_string(),
        status: ApplicationStatus::Applied,
        hired: None,
    };

    store.insert_application(application.clone())?;
    tracing::debug!(application_id = %application.id, "application created");
    Ok(application)
}

pub fn get_application<S: ApplicationStore + ?Sized>(
    store: &S,
    id: &str,
) -> Result<JobApplication, AppError> {
    let trimmed_id = required_id(id)?;
    store
        .application(trimmed_id)?
        .ok_or_else(|| application_not_found(trimmed_id))
}

/// Applications, most recently updated first.
pub fn list_applications<S: ApplicationStore + ?Sized>(
    store: &S,
) -> Result<Vec<JobApplication>, AppError> {
    let mut applications = store.applications()?;
    applications.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
    Ok(applications)
}

pub fn update_notes<S: ApplicationStore + ?Sized>(
    store: &mut S,
    id: &str,
    notes: &str,
    now: OffsetDateTime,
) -> Result<JobApplication, AppError> {
    let mut application = get_application(store, id)?;
    application.notes = notes.trim().to_string();
    application.last_updated = now;
    store.replace_application(application.clone())?;
    Ok(application)
}

pub fn delete_application<S: ApplicationStore + ?Sized>(
    store: &mut S,
    id: &str,
) -> Result<JobApplication, AppError> {
    let trimmed_id = required_id(id)?;
    let removed = store.remove_application(trimmed_id)?;
    tracing::debug!(application_id = %removed.id, "application deleted");
    Ok(removed)
}

/// Loads, transitions and saves an application. A successful hire sends a
/// celebration through `notifier` after the write.
pub fn transition_application<S: ApplicationStore + ?Sized>(
    store: &mut S,
    id: &str,
    new_status: ApplicationStatus,
    hire: Option<HireRequest>,
    notifier: &dyn Notifier,
    now: OffsetDateTime,
) -> Result<TransitionOutcome, AppError> {
    let mut application = get_application(store, id)?;
    let previous = application.status;
    set_status(&mut application, new_status, hire, now)?;
    store.replace_application(application.clone())?;
    tracing::debug!(
        application_id = %application.id,
        from = %previous,
        to = %new_status,
        "application status changed"
    );

    let celebration_error = if new_status == ApplicationStatus::Hired {
        notifier.celebrate(&application).err().inspect(|err| {
            tracing::warn!(
                application_id = %application.id,
                error = %err,
                "hire celebration failed"
            );
        })
    } else {
        None
    };

    Ok(TransitionOutcome {
        application,
        previous,
        celebration_error,
    })
}

pub fn record_success_story<S: ApplicationStore + ?Sized>(
    store: &mut S,
    id: &str,
    story: &str,
    now: OffsetDateTime,
) -> Result<JobApplication, AppError> {
    let mut application = get_application(store, id)?;
    add_success_story(&mut application, story, now)?;
    store.replace_application(application.clone())?;
    Ok(application)
}

/// Number of applications per status, in pipeline order, zeros included.
pub fn pipeline_counts(applications: &[JobApplication]) -> Vec<(ApplicationStatus, usize)> {
    ApplicationStatus::ALL
        .into_iter()
        .map(|status| {
            let count = applications
                .iter()
                .filter(|app| app.status == status)
                .count();
            (status, count)
        })
        .collect()
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("id is required"));
    }
    Ok(trimmed)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{
        NewApplication, add_success_story, create_application, delete_application,
        get_application, list_applications, pipeline_counts, record_success_story, set_status,
        transition_application, update_notes,
    };
    use crate::error::AppError;
    use crate::model::{ApplicationStatus, HireRequest, JobApplication, JobPosting, Task};
    use crate::notify::Notifier;
    use crate::storage::{ApplicationStore, MemoryStore};
    use std::cell::RefCell;
    use time::macros::{date, datetime};

    fn application(status: ApplicationStatus) -> JobApplication {
        JobApplication {
            id: "app-1".to_string(),
            job: JobPosting {
                title: "Warehouse Associate".to_string(),
                company: "Acme Logistics".to_string(),
                source: Some("Indeed".to_string()),
                url: None,
            },
            seeker: None,
            applied_date: date!(2025 - 01 - 02),
            last_updated: datetime!(2025-01-02 12:00 UTC),
            notes: String::new(),
            status,
            hired: None,
        }
    }

    fn hire_request() -> HireRequest {
        HireRequest {
            start_date: Some(date!(2025 - 02 - 15)),
            job_title: Some("Warehouse Associate".to_string()),
            hourly_wage: Some(18.25),
            hours_per_week: Some(40),
        }
    }

    fn hired(now: time::OffsetDateTime) -> JobApplication {
        let mut app = application(ApplicationStatus::Offered);
        set_status(&mut app, ApplicationStatus::Hired, Some(hire_request()), now).unwrap();
        app
    }

    #[test]
    fn lateral_and_backward_moves_are_allowed() {
        let now = datetime!(2025-01-10 09:00 UTC);
        let mut app = application(ApplicationStatus::FirstInterview);

        set_status(&mut app, ApplicationStatus::Applied, None, now).unwrap();
        assert_eq!(app.status, ApplicationStatus::Applied);
        assert_eq!(app.last_updated, now);

        set_status(&mut app, ApplicationStatus::Offered, None, now).unwrap();
        set_status(&mut app, ApplicationStatus::PhoneScreen, None, now).unwrap();
        assert_eq!(app.status, ApplicationStatus::PhoneScreen);
    }

    #[test]
    fn terminal_statuses_reject_every_transition() {
        let now = datetime!(2025-01-10 09:00 UTC);
        for terminal in [ApplicationStatus::Hired, ApplicationStatus::Rejected] {
            for target in ApplicationStatus::ALL {
                let mut app = if terminal == ApplicationStatus::Hired {
                    hired(now)
                } else {
                    application(terminal)
                };
                let before = app.clone();
                let hire = (target == ApplicationStatus::Hired).then(hire_request);

                let err = set_status(&mut app, target, hire, now).unwrap_err();
                assert_eq!(err.code(), "invalid_transition", "{terminal} -> {target}");
                assert_eq!(app, before);
            }
        }
    }

    #[test]
    fn hiring_without_details_is_incomplete() {
        let mut app = application(ApplicationStatus::Offered);
        let before = app.clone();

        let err = set_status(
            &mut app,
            ApplicationStatus::Hired,
            None,
            datetime!(2025-01-10 09:00 UTC),
        )
        .unwrap_err();
        assert_eq!(err.code(), "incomplete_data");
        assert_eq!(app, before);
    }

    #[test]
    fn hiring_with_missing_fields_is_incomplete() {
        let now = datetime!(2025-01-10 09:00 UTC);
        let partials = [
            HireRequest {
                start_date: None,
                ..hire_request()
            },
            HireRequest {
                job_title: Some("  ".to_string()),
                ..hire_request()
            },
            HireRequest {
                hours_per_week: None,
                ..hire_request()
            },
            HireRequest::default(),
        ];

        for partial in partials {
            let mut app = application(ApplicationStatus::Applied);
            let err = set_status(&mut app, ApplicationStatus::Hired, Some(partial), now)
                .unwrap_err();
            assert_eq!(err.code(), "incomplete_data");
            assert_eq!(app.status, ApplicationStatus::Applied);
            assert!(app.hired.is_none());
        }
    }

    #[test]
    fn hiring_with_details_commits_status_and_data() {
        let now = datetime!(2025-01-10 09:00 UTC);
        let app = hired(now);

        assert_eq!(app.status, ApplicationStatus::Hired);
        let details = app.hired.expect("hire details");
        assert_eq!(details.start_date, date!(2025 - 02 - 15));
        assert_eq!(details.job_title, "Warehouse Associate");
        assert_eq!(details.hourly_wage, Some(18.25));
        assert_eq!(details.hours_per_week, 40);
        assert_eq!(details.success_story, None);
    }

    #[test]
    fn hourly_wage_is_optional() {
        let mut app = application(ApplicationStatus::Offered);
        let request = HireRequest {
            hourly_wage: None,
            ..hire_request()
        };

        set_status(
            &mut app,
            ApplicationStatus::Hired,
            Some(request),
            datetime!(2025-01-10 09:00 UTC),
        )
        .unwrap();
        assert_eq!(app.hired.unwrap().hourly_wage, None);
    }

    #[test]
    fn invalid_hire_values_are_validation_errors() {
        let now = datetime!(2025-01-10 09:00 UTC);
        for request in [
            HireRequest {
                hours_per_week: Some(0),
                ..hire_request()
            },
            HireRequest {
                hourly_wage: Some(-3.0),
                ..hire_request()
            },
        ] {
            let mut app = application(ApplicationStatus::Offered);
            let err = set_status(&mut app, ApplicationStatus::Hired, Some(request), now)
                .unwrap_err();
            assert_eq!(err.code(), "validation_error");
        }
    }

    #[test]
    fn hire_details_for_other_status_are_rejected() {
        let mut app = application(ApplicationStatus::Applied);
        let err = set_status(
            &mut app,
            ApplicationStatus::Offered,
            Some(hire_request()),
            datetime!(2025-01-10 09:00 UTC),
        )
        .unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert_eq!(app.status, ApplicationStatus::Applied);
    }

    #[test]
    fn rejecting_needs_no_payload() {
        let mut app = application(ApplicationStatus::FinalInterview);
        set_status(
            &mut app,
            ApplicationStatus::Rejected,
            None,
            datetime!(2025-01-10 09:00 UTC),
        )
        .unwrap();
        assert_eq!(app.status, ApplicationStatus::Rejected);
        assert!(app.hired.is_none());
    }

    #[test]
    fn success_story_is_a_field_patch() {
        let now = datetime!(2025-01-10 09:00 UTC);
        let mut app = hired(now);
        let later = datetime!(2025-03-01 09:00 UTC);

        add_success_story(&mut app, " Promoted after 30 days ", later).unwrap();
        assert_eq!(app.status, ApplicationStatus::Hired);
        assert_eq!(
            app.hired.as_ref().unwrap().success_story.as_deref(),
            Some("Promoted after 30 days")
        );
        assert_eq!(app.last_updated, later);
    }

    #[test]
    fn success_story_requires_hired_application() {
        let mut app = application(ApplicationStatus::Offered);
        let err = add_success_story(&mut app, "Great news", datetime!(2025-01-10 09:00 UTC))
            .unwrap_err();
        assert_eq!(err.code(), "invalid_transition");

        let mut hired_app = hired(datetime!(2025-01-10 09:00 UTC));
        let err = add_success_story(&mut hired_app, "  ", datetime!(2025-01-10 09:00 UTC))
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    struct CountingNotifier {
        celebrated: RefCell<Vec<String>>,
        fail: bool,
    }

    impl CountingNotifier {
        fn new(fail: bool) -> Self {
            Self {
                celebrated: RefCell::new(Vec::new()),
                fail,
            }
        }
    }

    impl Notifier for CountingNotifier {
        fn remind(&self, _task: &Task) -> Result<(), AppError> {
            Ok(())
        }

        fn celebrate(&self, application: &JobApplication) -> Result<(), AppError> {
            self.celebrated.borrow_mut().push(application.id.clone());
            if self.fail {
                Err(AppError::io("notification daemon unavailable"))
            } else {
                Ok(())
            }
        }
    }

    fn new_application() -> NewApplication {
        NewApplication {
            job_title: "Line Cook".to_string(),
            company: "Harbor Diner".to_string(),
            source: Some("  ".to_string()),
            ..NewApplication::default()
        }
    }

    #[test]
    fn create_application_starts_at_applied() {
        let mut store = MemoryStore::new();
        let now = datetime!(2025-01-10 09:00 UTC);

        let app = create_application(&mut store, new_application(), now).unwrap();
        assert!(app.id.starts_with("app-"));
        assert_eq!(app.status, ApplicationStatus::Applied);
        assert_eq!(app.applied_date, date!(2025 - 01 - 10));
        assert_eq!(app.job.source, None);
        assert_eq!(get_application(&store, &app.id).unwrap(), app);
    }

    #[test]
    fn create_application_requires_title_and_company() {
        let mut store = MemoryStore::new();
        let now = datetime!(2025-01-10 09:00 UTC);
        let missing_company = NewApplication {
            company: String::new(),
            ..new_application()
        };
        let missing_title = NewApplication {
            job_title: " ".to_string(),
            ..new_application()
        };

        for input in [missing_company, missing_title] {
            let err = create_application(&mut store, input, now).unwrap_err();
            assert_eq!(err.code(), "validation_error");
        }
        assert!(store.applications().unwrap().is_empty());
    }

    #[test]
    fn transition_application_persists_and_celebrates_hire() {
        let mut store = MemoryStore::new();
        let now = datetime!(2025-01-10 09:00 UTC);
        let app = create_application(&mut store, new_application(), now).unwrap();
        let notifier = CountingNotifier::new(false);

        let outcome = transition_application(
            &mut store,
            &app.id,
            ApplicationStatus::Hired,
            Some(hire_request()),
            &notifier,
            now,
        )
        .unwrap();

        assert_eq!(outcome.previous, ApplicationStatus::Applied);
        assert!(outcome.celebration_error.is_none());
        assert_eq!(*notifier.celebrated.borrow(), vec![app.id.clone()]);
        let stored = get_application(&store, &app.id).unwrap();
        assert_eq!(stored.status, ApplicationStatus::Hired);
        assert!(stored.hired.is_some());
    }

    #[test]
    fn transition_application_keeps_hire_when_celebration_fails() {
        let mut store = MemoryStore::new();
        let now = datetime!(2025-01-10 09:00 UTC);
        let app = create_application(&mut store, new_application(), now).unwrap();
        let notifier = CountingNotifier::new(true);

        let outcome = transition_application(
            &mut store,
            &app.id,
            ApplicationStatus::Hired,
            Some(hire_request()),
            &notifier,
            now,
        )
        .unwrap();

        assert_eq!(
            outcome.celebration_error.map(|err| err.code()),
            Some("io_error")
        );
        assert_eq!(
            get_application(&store, &app.id).unwrap().status,
            ApplicationStatus::Hired
        );
    }

    #[test]
    fn transition_application_without_hire_does_not_celebrate() {
        let mut store = MemoryStore::new();
        let now = datetime!(2025-01-10 09:00 UTC);
        let app = create_application(&mut store, new_application(), now).unwrap();
        let notifier = CountingNotifier::new(false);

        transition_application(
            &mut store,
            &app.id,
            ApplicationStatus::PhoneScreen,
            None,
            &notifier,
            now,
        )
        .unwrap();
        assert!(notifier.celebrated.borrow().is_empty());
    }

    #[test]
    fn failed_transition_leaves_store_unchanged() {
        let mut store = MemoryStore::new();
        let now = datetime!(2025-01-10 09:00 UTC);
        let app = create_application(&mut store, new_application(), now).unwrap();
        let notifier = CountingNotifier::new(false);

        let err = transition_application(
            &mut store,
            &app.id,
            ApplicationStatus::Hired,
            None,
            &notifier,
            datetime!(2025-01-11 09:00 UTC),
        )
        .unwrap_err();

        assert_eq!(err.code(), "incomplete_data");
        assert_eq!(get_application(&store, &app.id).unwrap(), app);
        assert!(notifier.celebrated.borrow().is_empty());
    }

    #[test]
    fn transition_unknown_application_is_not_found() {
        let mut store = MemoryStore::new();
        let err = transition_application(
            &mut store,
            "app-404",
            ApplicationStatus::Offered,
            None,
            &CountingNotifier::new(false),
            datetime!(2025-01-10 09:00 UTC),
        )
        .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn notes_story_and_delete_round_out_the_lifecycle() {
        let mut store = MemoryStore::with_applications(vec![hired(datetime!(
            2025-01-10 09:00 UTC
        ))]);
        let now = datetime!(2025-02-01 09:00 UTC);

        let noted = update_notes(&mut store, "app-1", " Starts on nights ", now).unwrap();
        assert_eq!(noted.notes, "Starts on nights");

        let story = record_success_story(&mut store, "app-1", "Loves the team", now).unwrap();
        assert_eq!(
            story.hired.unwrap().success_story.as_deref(),
            Some("Loves the team")
        );

        delete_application(&mut store, "app-1").unwrap();
        assert!(store.applications().unwrap().is_empty());
        assert_eq!(
            delete_application(&mut store, "app-1").unwrap_err().code(),
            "not_found"
        );
    }

    #[test]
    fn list_applications_puts_recent_first() {
        let mut older = application(ApplicationStatus::Applied);
        older.id = "app-old".to_string();
        let mut newer = application(ApplicationStatus::Offered);
        newer.id = "app-new".to_string();
        newer.last_updated = datetime!(2025-03-01 00:00 UTC);
        let store = MemoryStore::with_applications(vec![older, newer]);

        let ids: Vec<_> = list_applications(&store)
            .unwrap()
            .into_iter()
            .map(|app| app.id)
            .collect();
        assert_eq!(ids, vec!["app-new", "app-old"]);
    }

    #[test]
    fn pipeline_counts_cover_every_status() {
        let apps = vec![
            application(ApplicationStatus::Applied),
            application(ApplicationStatus::Applied),
            application(ApplicationStatus::Rejected),
        ];

        let counts = pipeline_counts(&apps);
        assert_eq!(counts.len(), ApplicationStatus::ALL.len());
        assert_eq!(counts[0], (ApplicationStatus::Applied, 2));
        assert_eq!(counts[5], (ApplicationStatus::Hired, 0));
        assert_eq!(counts[6], (ApplicationStatus::Rejected, 1));
    }
}
