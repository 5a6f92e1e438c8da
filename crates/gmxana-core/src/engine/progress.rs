/// Progress events emitted while plugins work through their phases.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// A phase (`run`, `analyze`, `plot`) starts over all selected plugins.
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    /// The named plugin is about to be processed.
    PluginStart { plugin: String },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_ignores_events() {
        ProgressReporter::new().report(Progress::PhaseFinish);
    }

    #[test]
    fn reporter_forwards_events_in_order() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| seen.lock().unwrap().push(p)));

        reporter.report(Progress::PhaseStart { name: "run" });
        reporter.report(Progress::PluginStart {
            plugin: "Dsite".into(),
        });
        reporter.report(Progress::PhaseFinish);
        drop(reporter);

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![
                Progress::PhaseStart { name: "run" },
                Progress::PluginStart {
                    plugin: "Dsite".into()
                },
                Progress::PhaseFinish,
            ]
        );
    }
}
