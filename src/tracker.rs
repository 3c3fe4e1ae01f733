use tracing::info;

use crate::error::Result;
use crate::models::{job_id, ApplicationStatus, JobPosting, SavedJobRecord};
use crate::store::{JobStore, SavedJobs};

pub const JOB_NOT_FOUND: &str = "Job not found in saved jobs";

/// Owns the saved-jobs collection and writes it through to `S` on every
/// mutation.
///
/// If a write fails the in-memory collection is already updated; callers
/// should treat the error as "retry the whole operation".
pub struct Tracker<S: JobStore> {
    jobs: SavedJobs,
    store: S,
}

impl<S: JobStore> Tracker<S> {
    pub fn open(store: S) -> Result<Self> {
        let jobs = store.load()?;
        Ok(Self { jobs, store })
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Saves `job`, replacing any record with the same id. Notes, status and
    /// `saved_at` start over.
    pub fn save(&mut self, job: JobPosting) -> Result<String> {
        let id = job_id(&job);
        let replaced = self
            .jobs
            .insert(id.clone(), SavedJobRecord::new(job))
            .is_some();
        self.persist()?;
        info!(%id, replaced, "saved job");
        Ok(id)
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        if self.jobs.remove(id).is_none() {
            return Ok(false);
        }
        self.persist()?;
        info!(%id, "removed job");
        Ok(true)
    }

    pub fn update_notes(&mut self, id: &str, notes: &str) -> Result<bool> {
        let Some(record) = self.jobs.get_mut(id) else {
            return Ok(false);
        };
        record.notes = notes.to_string();
        self.persist()?;
        Ok(true)
    }

    pub fn update_application_status(
        &mut self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<bool> {
        let Some(record) = self.jobs.get_mut(id) else {
            return Ok(false);
        };
        record.application_status = status;
        self.persist()?;
        Ok(true)
    }

    pub fn get(&self, id: &str) -> Option<&SavedJobRecord> {
        self.jobs.get(id)
    }

    pub fn list_all(&self) -> &SavedJobs {
        &self.jobs
    }

    /// Marks the job as applied and reports it back.
    ///
    /// Nothing is sent anywhere: the cover letter is accepted for the caller's
    /// convenience and dropped. This only records that the user applied.
    pub fn apply(&mut self, id: &str, _cover_letter: Option<&str>) -> Result<(bool, String)> {
        if !self.update_application_status(id, ApplicationStatus::Applied)? {
            return Ok((false, JOB_NOT_FOUND.to_string()));
        }
        let job = &self.jobs[id].job;
        info!(%id, "marked job as applied");
        Ok((
            true,
            format!(
                "Application submitted for {} at {}",
                job.title(),
                job.company_name()
            ),
        ))
    }

    fn persist(&mut self) -> Result<()> {
        self.store.persist(&self.jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use crate::store::MemoryStore;

    fn posting(title: &str, company: &str, location: &str) -> JobPosting {
        JobPosting::new(title, company)
            .with("location", location)
            .with("via", "via LinkedIn")
            .with("description", "Build things.")
    }

    fn tracker() -> Tracker<MemoryStore> {
        Tracker::open(MemoryStore::new()).unwrap()
    }

    #[test]
    fn save_returns_derived_id_and_writes_through() {
        let mut t = tracker();
        let id = t.save(posting("Backend Engineer", "Acme Corp", "NYC")).unwrap();

        assert_eq!(id, "Backend_Engineer_Acme_Corp");
        assert_eq!(t.store().writes(), 1);
        let record = t.get(&id).unwrap();
        assert_eq!(record.notes, "");
        assert_eq!(record.application_status, ApplicationStatus::NotApplied);
    }

    #[test]
    fn resave_overwrites_everything() {
        let mut t = tracker();
        let id = t.save(posting("Engineer", "Acme", "New York")).unwrap();
        t.update_notes(&id, "call back Tuesday").unwrap();
        t.apply(&id, None).unwrap();
        let first_saved_at = t.get(&id).unwrap().saved_at;

        let again = t.save(posting("Engineer", "Acme", "Remote")).unwrap();

        assert_eq!(again, id);
        assert_eq!(t.list_all().len(), 1);
        let record = t.get(&id).unwrap();
        assert_eq!(record.job.location(), "Remote");
        assert_eq!(record.notes, "");
        assert_eq!(record.application_status, ApplicationStatus::NotApplied);
        assert!(record.saved_at >= first_saved_at);
    }

    #[test]
    fn remove_is_final() {
        let mut t = tracker();
        let id = t.save(posting("Engineer", "Acme", "")).unwrap();

        assert!(t.remove(&id).unwrap());
        assert!(t.get(&id).is_none());
        assert!(!t.remove(&id).unwrap());
        assert_eq!(t.store().writes(), 2);
    }

    #[test]
    fn missing_ids_are_no_ops() {
        let mut t = tracker();

        assert!(!t.update_notes("nonexistent", "x").unwrap());
        assert!(
            !t.update_application_status("nonexistent", ApplicationStatus::Applied)
                .unwrap()
        );
        assert!(t.list_all().is_empty());
        assert_eq!(t.store().writes(), 0);
    }

    #[test]
    fn status_can_be_set_back() {
        let mut t = tracker();
        let id = t.save(posting("Engineer", "Acme", "")).unwrap();

        assert!(t.update_application_status(&id, ApplicationStatus::Applied).unwrap());
        assert!(t.update_application_status(&id, ApplicationStatus::NotApplied).unwrap());
        assert_eq!(t.get(&id).unwrap().application_status, ApplicationStatus::NotApplied);
    }

    #[test]
    fn apply_marks_applied_and_reports() {
        let mut t = tracker();
        let id = t.save(posting("Backend Engineer", "Acme Corp", "")).unwrap();

        let (ok, message) = t.apply(&id, Some("Dear hiring manager...")).unwrap();

        assert!(ok);
        assert_eq!(
            message,
            "Application submitted for Backend Engineer at Acme Corp"
        );
        assert_eq!(t.get(&id).unwrap().application_status, ApplicationStatus::Applied);
        // Cover letter goes nowhere.
        assert!(!t.store().contents().unwrap().contains("Dear hiring manager"));
    }

    #[test]
    fn apply_twice_still_succeeds_and_persists() {
        let mut t = tracker();
        let id = t.save(posting("Engineer", "Acme", "")).unwrap();

        assert!(t.apply(&id, None).unwrap().0);
        assert!(t.apply(&id, None).unwrap().0);
        assert_eq!(t.store().writes(), 3);
    }

    #[test]
    fn apply_unknown_job_fails_softly() {
        let mut t = tracker();
        let (ok, message) = t.apply("Nope_Nobody", Some("hi")).unwrap();
        assert!(!ok);
        assert_eq!(message, JOB_NOT_FOUND);
    }

    #[test]
    fn loads_legacy_records_without_status() {
        let raw = r#"{
            "QA_Initech": {
                "job": {"title": "QA", "company_name": "Initech", "location": "Austin, TX",
                        "via": "via Indeed", "description": ""},
                "saved_at": "2024-03-01T10:15:30.123456+00:00",
                "notes": ""
            }
        }"#;
        let t = Tracker::open(MemoryStore::with_contents(raw)).unwrap();
        assert_eq!(
            t.get("QA_Initech").unwrap().application_status,
            ApplicationStatus::NotApplied
        );
    }

    #[test]
    fn malformed_store_fails_to_open() {
        let result = Tracker::open(MemoryStore::with_contents("[1, 2"));
        assert!(matches!(result, Err(PersistenceError::Parse { .. })));
    }

    #[test]
    fn write_failure_propagates() {
        let mut store = MemoryStore::new();
        store.fail_writes(true);
        let mut t = Tracker::open(store).unwrap();

        let err = t.save(posting("Engineer", "Acme", "")).unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));
    }
}
