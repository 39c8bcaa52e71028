/// Domain models
///
/// - `task`: the task record, its status set and mutation payloads

pub mod task;
