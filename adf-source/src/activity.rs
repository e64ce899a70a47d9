use crate::domain::RemoteActivity;
use adf_domain::Task;

pub const DEFAULT_TASK_NAME: &str = "activity";
pub const DEFAULT_TASK_TYPE: &str = "Activity";
pub const COPY_ACTIVITY_TYPE: &str = "Copy";

impl From<&RemoteActivity> for Task {
    fn from(activity: &RemoteActivity) -> Self {
        let task_type = non_empty(activity.activity_type.as_deref());

        // Only copy activities carry a dependency hint, and it is the sink
        // type rather than another task's name.
        let downstream_tasks = match task_type {
            Some(COPY_ACTIVITY_TYPE) => non_empty(activity.sink_type()).map(|s| vec![s.to_owned()]),
            _ => None,
        };

        Task {
            name: non_empty(activity.name.as_deref())
                .unwrap_or(DEFAULT_TASK_NAME)
                .to_owned(),
            task_type: task_type.unwrap_or(DEFAULT_TASK_TYPE).to_owned(),
            downstream_tasks,
        }
    }
}

/// Flattens activity descriptors into tasks, preserving source order.
pub fn build_tasks(activities: &[RemoteActivity]) -> Vec<Task> {
    activities.iter().map(Task::from).collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
