use super::error::Result;
use crate::core::api::{JobQuery, JobRecord, TamarindApi};
use tracing::debug;

/// Which jobs to list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub job_name: Option<String>,
    /// Include jobs of other members of the organization.
    pub organization: bool,
    /// List the member jobs of every batch instead of the batch entries.
    pub expand_batch: bool,
    /// Keep only jobs of this model. Batch entries are matched on the model they run.
    pub job_type: Option<String>,
}

impl JobFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            job_name: Some(name.into()),
            ..Self::default()
        }
    }

    fn query(&self) -> JobQuery {
        JobQuery {
            job_name: self.job_name.clone(),
            organization: self.organization,
            include_subjobs: self.expand_batch,
        }
    }
}

/// Lists jobs matching `filter`.
///
/// When the listing contains batch members (recognised by their `Batch` field), the batch
/// entries themselves are dropped. Otherwise every batch entry gets its own name as `Batch`.
pub fn list_jobs(api: &dyn TamarindApi, filter: &JobFilter) -> Result<Vec<JobRecord>> {
    let mut jobs = api.list_jobs(&filter.query())?;

    if let Some(job_type) = &filter.job_type {
        jobs.retain(|j| j.model() == job_type);
    }

    if jobs.iter().any(|j| j.batch.is_some()) {
        jobs.retain(|j| !j.is_batch());
    } else {
        for job in jobs.iter_mut().filter(|j| j.is_batch()) {
            job.batch = Some(job.name.clone());
        }
    }
    debug!("{} job(s) selected by {:?}", jobs.len(), filter);
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::fake::{FakeApi, job};
    use serde_json::json;

    fn batch_entry(name: &str, model: &str) -> JobRecord {
        let mut j = job(name, "Running");
        j.job_type = "batch".into();
        j.settings = json!(model);
        j
    }

    fn member(name: &str, batch: &str) -> JobRecord {
        let mut j = job(name, "Queued");
        j.batch = Some(batch.into());
        j
    }

    #[test]
    fn filter_translates_to_query_parameters() {
        let api = FakeApi::new();
        let filter = JobFilter {
            organization: true,
            expand_batch: true,
            ..JobFilter::named("x")
        };
        list_jobs(&api, &filter).unwrap();
        let query = &api.job_queries.borrow()[0];
        assert_eq!(query.job_name.as_deref(), Some("x"));
        assert!(query.organization);
        assert!(query.include_subjobs);
    }

    #[test]
    fn batch_entries_label_themselves_when_not_expanded() {
        let api = FakeApi::new()
            .with_job_frames(vec![vec![batch_entry("b1", "boltz"), job("solo", "Complete")]]);
        let jobs = list_jobs(&api, &JobFilter::all()).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].batch.as_deref(), Some("b1"));
        assert_eq!(jobs[1].batch, None);
    }

    #[test]
    fn expanded_listing_drops_batch_entries() {
        let api = FakeApi::new().with_job_frames(vec![vec![
            batch_entry("b1", "alphafold"),
            member("m1", "b1"),
            member("m2", "b1"),
        ]]);
        let filter = JobFilter {
            expand_batch: true,
            ..JobFilter::all()
        };
        let names: Vec<_> = list_jobs(&api, &filter)
            .unwrap()
            .into_iter()
            .map(|j| j.name)
            .collect();
        assert_eq!(names, vec!["m1", "m2"]);
    }

    #[test]
    fn model_filter_matches_batch_settings() {
        let api = FakeApi::new().with_job_frames(vec![vec![
            batch_entry("b1", "boltz"),
            batch_entry("b2", "alphafold"),
            job("solo", "Complete"),
        ]]);
        let filter = JobFilter {
            job_type: Some("alphafold".into()),
            ..JobFilter::all()
        };
        let names: Vec<_> = list_jobs(&api, &filter)
            .unwrap()
            .into_iter()
            .map(|j| j.name)
            .collect();
        assert_eq!(names, vec!["b2", "solo"]);
    }
}
