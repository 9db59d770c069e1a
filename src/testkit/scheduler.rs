use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{self, Result};
use crate::scheduler::{DeleteOutcome, InstalledApp, Scheduler};

/// [`Scheduler`] that keeps submitted jobs as running apps and records
/// every call
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    apps: Mutex<Vec<InstalledApp>>,
    submitted: Mutex<Vec<Value>>,
    deleted: Mutex<Vec<String>>,
    lists: Mutex<usize>,
    failure: Mutex<Option<(u16, String)>>,
}

fn labels_of(job: &Value) -> BTreeMap<String, String> {
    job.get("labels")
        .and_then(Value::as_object)
        .map(|labels| {
            labels
                .iter()
                .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

impl RecordingScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `app` is already running
    pub fn add_app(&self, app: InstalledApp) {
        self.apps.lock().expect("apps lock").push(app);
    }

    /// Make every call answer with `status` and `body`
    pub fn fail_with(&self, status: u16, body: &str) {
        *self.failure.lock().expect("failure lock") = Some((status, body.to_string()));
    }

    pub fn apps(&self) -> Vec<InstalledApp> {
        self.apps.lock().expect("apps lock").clone()
    }

    /// Every job passed to `submit`, in order
    pub fn submitted(&self) -> Vec<Value> {
        self.submitted.lock().expect("submitted lock").clone()
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().expect("submitted lock").len()
    }

    /// Every id passed to `delete`, in order
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("deleted lock").clone()
    }

    pub fn delete_count(&self) -> usize {
        self.deleted.lock().expect("deleted lock").len()
    }

    pub fn list_count(&self) -> usize {
        *self.lists.lock().expect("lists lock")
    }

    fn check(&self) -> Result<()> {
        match self.failure.lock().expect("failure lock").as_ref() {
            Some((status, body)) => Err(error::scheduler::request_failed(*status, body.clone())),
            None => Ok(()),
        }
    }
}

impl Scheduler for RecordingScheduler {
    fn submit(&self, job: &Value) -> Result<String> {
        self.submitted.lock().expect("submitted lock").push(job.clone());
        self.check()?;

        let id = job
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.add_app(InstalledApp::new(id.clone(), labels_of(job)));

        Ok(serde_json::json!({"id": id, "deployments": [{"id": "deployment-1"}]}).to_string())
    }

    fn list_apps(&self) -> Result<Vec<InstalledApp>> {
        *self.lists.lock().expect("lists lock") += 1;
        self.check()?;
        Ok(self.apps())
    }

    fn delete(&self, app_id: &str) -> Result<DeleteOutcome> {
        self.deleted.lock().expect("deleted lock").push(app_id.to_string());
        self.check()?;

        let mut apps = self.apps.lock().expect("apps lock");
        let before = apps.len();
        apps.retain(|app| app.id != app_id);
        if apps.len() == before {
            Ok(DeleteOutcome::AlreadyGone)
        } else {
            Ok(DeleteOutcome::Deleted)
        }
    }
}
